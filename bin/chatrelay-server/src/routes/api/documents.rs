//! Passage ingestion for domain-augmented replies.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use tracing::info;
use utoipa::OpenApi;

use crate::entities::NewPassage;
use crate::error::ServerError;
use crate::routes::api::workspace_id;
use crate::schemas::documents::{IngestPassageRequest, IngestPassageResponse};
use crate::state::AppState;

pub const NO_CONTENT: &str = "No content provided.";
pub const INGEST_FAILED: &str = "Failed to store document.";

#[derive(OpenApi)]
#[openapi(
    paths(ingest_passage),
    components(schemas(IngestPassageRequest, IngestPassageResponse))
)]
pub struct DocumentsApi;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/documents", post(ingest_passage))
}

/// Embed a passage and add it to the workspace's index (`POST /api/documents`).
#[utoipa::path(
    post,
    path = "/api/documents",
    tag = "documents",
    params(
        ("workspace_id" = String, Header, description = "Workspace the passage belongs to"),
    ),
    request_body = IngestPassageRequest,
    responses(
        (status = 201, description = "Passage stored", body = IngestPassageResponse),
        (status = 400, description = "Missing workspace ID or content"),
        (status = 500, description = "Embedding or store failure"),
    )
)]
pub async fn ingest_passage(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    match ingest(&state, &headers, &body).await {
        Ok(id) => (StatusCode::CREATED, Json(IngestPassageResponse { id })).into_response(),
        Err(e) => e.into_response_with(INGEST_FAILED),
    }
}

async fn ingest(state: &AppState, headers: &HeaderMap, body: &[u8]) -> Result<i64, ServerError> {
    let workspace_id = workspace_id(headers)?;
    let request: IngestPassageRequest = serde_json::from_slice(body)?;
    let content = request
        .content
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| ServerError::validation(NO_CONTENT))?;

    let embedding = state.embedder.embed(&content).await?;
    let id = state
        .vectors
        .insert_passage(NewPassage {
            workspace_id: workspace_id.clone(),
            content,
            metadata: request
                .metadata
                .unwrap_or_else(|| serde_json::Value::Object(Default::default())),
            embedding,
        })
        .await?;

    info!(workspace_id = %workspace_id, id, "passage stored");
    Ok(id)
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use super::*;
    use crate::routes::api::WORKSPACE_HEADER;
    use crate::testing::{test_state, FakeModel, MemoryStore};
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn request(workspace: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = Request::post("/api/documents");
        if let Some(ws) = workspace {
            builder = builder.header(WORKSPACE_HEADER, ws);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn call(store: Arc<MemoryStore>, req: Request<Body>) -> (StatusCode, Value) {
        let app = crate::routes::build(Arc::new(test_state(
            store,
            Arc::new(FakeModel::replying("unused")),
        )));
        let response = app.oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn stores_embedded_passage() {
        let store = Arc::new(MemoryStore::default());
        let (status, body) = call(
            store.clone(),
            request(Some("ws-1"), json!({ "content": "3 bed, 2 bath", "metadata": { "mls": 42 } })),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["id"], 1);
        let passages = store.passages();
        assert_eq!(passages.len(), 1);
        assert_eq!(passages[0].workspace_id, "ws-1");
        assert_eq!(passages[0].metadata["mls"], 42);
        assert_eq!(passages[0].embedding, vec![1.0, 0.0]);
    }

    #[tokio::test]
    async fn rejects_missing_inputs() {
        let store = Arc::new(MemoryStore::default());
        let (status, body) = call(store.clone(), request(None, json!({ "content": "x" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Workspace ID is required.");

        let (status, body) = call(store.clone(), request(Some("ws-1"), json!({ "content": "  " }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], NO_CONTENT);
        assert!(store.passages().is_empty());
    }
}
