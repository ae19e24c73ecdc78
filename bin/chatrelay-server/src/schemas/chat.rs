use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::{ChatMessage, Role};

/// Request body for `POST /api/chat`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct SendMessageRequest {
    /// The user's message. Missing and empty are rejected alike.
    #[serde(default)]
    pub message: Option<String>,
}

/// Response body for `POST /api/chat` when the reply is not a document.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SendMessageResponse {
    /// The generated assistant text.
    pub reply: String,
}

/// One logged message as returned by `GET /api/chat`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChatMessageResponse {
    pub id: i64,
    pub workspace_id: String,
    pub content: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl From<ChatMessage> for ChatMessageResponse {
    fn from(m: ChatMessage) -> Self {
        Self {
            id: m.id,
            workspace_id: m.workspace_id,
            content: m.content,
            role: m.role,
            created_at: m.created_at,
        }
    }
}

/// Response body for `GET /api/chat`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChatHistoryResponse {
    /// Messages of the workspace, oldest first.
    pub chats: Vec<ChatMessageResponse>,
}
