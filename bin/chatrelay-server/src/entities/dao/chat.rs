use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Author of a logged message.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    ToSchema,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A single row in the `chat` table.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    /// Store-assigned insertion id; breaks ties between equal timestamps.
    pub id: i64,
    pub workspace_id: String,
    pub content: String,
    pub role: Role,
    /// Assigned by the store at insert time.
    pub created_at: DateTime<Utc>,
}
