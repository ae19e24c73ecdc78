use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Request body for `POST /api/documents`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct IngestPassageRequest {
    /// Text to embed and make retrievable for the workspace.
    #[serde(default)]
    pub content: Option<String>,
    /// Optional JSON object stored with the passage.
    #[serde(default)]
    #[schema(value_type = Object)]
    pub metadata: Option<serde_json::Value>,
}

/// Response body for `POST /api/documents`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IngestPassageResponse {
    pub id: i64,
}
