//! Document requests: keyword classification and single-page PDF output.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use thiserror::Error;

/// Substrings (lowercase) that turn a message into a document request.
pub const DOCUMENT_KEYWORDS: [&str; 3] = ["documentize", "document", "agreement"];

/// Stored in place of the reply when the reply is delivered as a document.
pub const DOCUMENT_PLACEHOLDER: &str = "Check your Web3 Storage for the requested document.";

/// `Content-Disposition` of the PDF response.
pub const DOCUMENT_DISPOSITION: &str = "attachment; filename=document.pdf";

// US Letter, in points.
const PAGE_WIDTH: i64 = 612;
const PAGE_HEIGHT: i64 = 792;
const MARGIN: i64 = 50;
const FONT_SIZE: i64 = 12;
const LEADING: i64 = 14;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("pdf encoding failed: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("pdf write failed: {0}")]
    Io(#[from] std::io::Error),
}

/// `true` when the lowercase message contains any of [`DOCUMENT_KEYWORDS`].
pub fn is_document_request(message: &str) -> bool {
    let lowered = message.to_lowercase();
    DOCUMENT_KEYWORDS.iter().any(|k| lowered.contains(k))
}

/// Render `text` onto a single page: Helvetica 12pt, black, starting 50pt
/// from the top-left corner. Each input line becomes one PDF text line;
/// nothing is wrapped or paginated.
pub fn render_pdf(text: &str) -> Result<Vec<u8>, DocumentError> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let content = Content {
        operations: text_operations(text),
    };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![page_id.into()],
        "Count" => 1,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    Ok(bytes)
}

fn text_operations(text: &str) -> Vec<Operation> {
    let mut ops = vec![
        Operation::new("BT", vec![]),
        Operation::new("rg", vec![0.into(), 0.into(), 0.into()]),
        Operation::new("Tf", vec!["F1".into(), FONT_SIZE.into()]),
        Operation::new("TL", vec![LEADING.into()]),
        Operation::new("Td", vec![MARGIN.into(), (PAGE_HEIGHT - MARGIN).into()]),
    ];
    for (i, line) in text.lines().enumerate() {
        if i > 0 {
            ops.push(Operation::new("T*", vec![]));
        }
        ops.push(Operation::new("Tj", vec![Object::string_literal(win_ansi(line))]));
    }
    ops.push(Operation::new("ET", vec![]));
    ops
}

/// Encode as WinAnsi (CP1252) for the standard 14 fonts. Printable ASCII and
/// the Latin-1 upper half map straight through, typographic punctuation and
/// the other 0x80-0x9F glyphs use their CP1252 slots. Anything else (and
/// control characters) becomes `?`.
fn win_ansi(line: &str) -> Vec<u8> {
    line.chars()
        .map(|c| match c {
            '\t' => b' ',
            ' '..='~' | '\u{a0}'..='\u{ff}' => c as u8,
            _ => cp1252_high(c).unwrap_or(b'?'),
        })
        .collect()
}

fn cp1252_high(c: char) -> Option<u8> {
    let byte = match c {
        '\u{20ac}' => 0x80, // euro
        '\u{201a}' => 0x82,
        '\u{0192}' => 0x83,
        '\u{201e}' => 0x84,
        '\u{2026}' => 0x85, // ellipsis
        '\u{2020}' => 0x86,
        '\u{2021}' => 0x87,
        '\u{02c6}' => 0x88,
        '\u{2030}' => 0x89,
        '\u{0160}' => 0x8a,
        '\u{2039}' => 0x8b,
        '\u{0152}' => 0x8c,
        '\u{017d}' => 0x8e,
        '\u{2018}' => 0x91, // curly quotes
        '\u{2019}' => 0x92,
        '\u{201c}' => 0x93,
        '\u{201d}' => 0x94,
        '\u{2022}' => 0x95, // bullet
        '\u{2013}' => 0x96, // en dash
        '\u{2014}' => 0x97, // em dash
        '\u{02dc}' => 0x98,
        '\u{2122}' => 0x99,
        '\u{0161}' => 0x9a,
        '\u{203a}' => 0x9b,
        '\u{0153}' => 0x9c,
        '\u{017e}' => 0x9e,
        '\u{0178}' => 0x9f,
        _ => return None,
    };
    Some(byte)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
