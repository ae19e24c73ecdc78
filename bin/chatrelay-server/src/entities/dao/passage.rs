use chrono::{DateTime, Utc};

/// A passage to be written to the `vector_store` table.
#[derive(Debug, Clone)]
pub struct NewPassage {
    pub workspace_id: String,
    pub content: String,
    /// Free-form JSON object kept alongside the text.
    pub metadata: serde_json::Value,
    pub embedding: Vec<f32>,
}

/// A stored passage, without its embedding.
#[derive(Debug, Clone)]
pub struct Passage {
    pub id: i64,
    pub workspace_id: String,
    pub content: String,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// A retrieval hit: the passage and its cosine similarity to the query.
#[derive(Debug, Clone)]
pub struct PassageMatch {
    pub passage: Passage,
    pub similarity: f32,
}
