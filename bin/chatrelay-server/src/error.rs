//! Unified server error type.
//!
//! Handlers return `Result<T, ServerError>`. Validation failures are the only
//! errors whose message reaches the client (with 400). Everything else is
//! logged with full detail and answered with a generic message and 500, so
//! SQL, provider responses and file paths never leak to callers.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::provider::GenerationError;
use crate::services::document::DocumentError;

/// All errors that can occur in the chatrelay-server request lifecycle.
#[derive(Debug, Error)]
pub enum ServerError {
    /// A required input is missing; the message is shown to the caller.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Propagated from the conversation log or vector index.
    #[error("persistence error: {0}")]
    Persistence(#[from] sqlx::Error),

    /// Propagated from the LLM / embedding provider.
    #[error("generation error: {0}")]
    Generation(#[from] GenerationError),

    /// The PDF could not be produced.
    #[error("document error: {0}")]
    Document(#[from] DocumentError),

    /// The request body was not the expected JSON.
    #[error("malformed request body: {0}")]
    MalformedBody(#[from] serde_json::Error),
}

impl ServerError {
    pub fn validation(message: impl Into<String>) -> Self {
        ServerError::Validation(message.into())
    }

    /// Convert into a response, using `public_message` for every 500.
    pub fn into_response_with(self, public_message: &str) -> Response {
        let (status, client_message) = match &self {
            ServerError::Validation(m) => (StatusCode::BAD_REQUEST, m.clone()),
            ServerError::Persistence(e) => {
                error!(error = %e, "persistence error");
                (StatusCode::INTERNAL_SERVER_ERROR, public_message.to_owned())
            }
            ServerError::Generation(e) => {
                error!(error = %e, "generation error");
                (StatusCode::INTERNAL_SERVER_ERROR, public_message.to_owned())
            }
            ServerError::Document(e) => {
                error!(error = %e, "document error");
                (StatusCode::INTERNAL_SERVER_ERROR, public_message.to_owned())
            }
            ServerError::MalformedBody(e) => {
                error!(error = %e, "malformed request body");
                (StatusCode::INTERNAL_SERVER_ERROR, public_message.to_owned())
            }
        };
        (status, Json(json!({ "error": client_message }))).into_response()
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
