pub mod chat;
pub mod passage;

pub use chat::{ChatMessage, Role};
pub use passage::{NewPassage, Passage, PassageMatch};
