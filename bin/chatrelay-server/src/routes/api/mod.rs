pub mod chat;
pub mod documents;

use std::sync::Arc;

use axum::http::HeaderMap;
use axum::Router;
use utoipa::OpenApi;

use crate::error::ServerError;
use crate::state::AppState;

/// Header carrying the tenant the request is scoped to.
pub const WORKSPACE_HEADER: &str = "workspace_id";

/// Header selecting domain-augmented replies when exactly `"true"`. Clients
/// send it as `isRealEstateAgent`; header names are matched case-insensitively.
pub const DOMAIN_MODE_HEADER: &str = "isrealestateagent";

pub const WORKSPACE_REQUIRED: &str = "Workspace ID is required.";

/// Routes nested under `/api`.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .merge(chat::router())
        .merge(documents::router())
}

pub fn api_docs() -> utoipa::openapi::OpenApi {
    let mut doc = chat::ChatApi::openapi();
    doc.merge(documents::DocumentsApi::openapi());
    doc
}

/// The non-empty `workspace_id` header, or a validation error.
pub(crate) fn workspace_id(headers: &HeaderMap) -> Result<String, ServerError> {
    headers
        .get(WORKSPACE_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
        .ok_or_else(|| ServerError::validation(WORKSPACE_REQUIRED))
}

pub(crate) fn header_flag(headers: &HeaderMap, name: &str) -> bool {
    headers.get(name).and_then(|v| v.to_str().ok()) == Some("true")
}
