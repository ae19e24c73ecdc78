//! Chat relay routes.
//!
//! `POST /api/chat` logs the user's message, generates a reply, logs the
//! reply (or a placeholder when the reply goes out as a PDF) and answers with
//! JSON or the PDF. `GET /api/chat` returns the workspace's log.
//!
//! Each step runs once, in order; the first failure ends the request. A reply
//! that fails after the user row was written leaves that row in place.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use tracing::info;
use utoipa::OpenApi;

use crate::entities::Role;
use crate::error::ServerError;
use crate::routes::api::{header_flag, workspace_id, DOMAIN_MODE_HEADER};
use crate::schemas::chat::{
    ChatHistoryResponse, ChatMessageResponse, SendMessageRequest, SendMessageResponse,
};
use crate::services::document::{
    is_document_request, render_pdf, DOCUMENT_DISPOSITION, DOCUMENT_PLACEHOLDER,
};
use crate::services::reply::{ConversationContext, Strategy};
use crate::state::AppState;

pub const NO_MESSAGE: &str = "No message provided.";
pub const SEND_FAILED: &str = "Failed to process request.";
pub const HISTORY_FAILED: &str = "Failed to fetch chat history.";

#[derive(OpenApi)]
#[openapi(
    paths(send_message, get_history),
    components(schemas(
        SendMessageRequest,
        SendMessageResponse,
        ChatHistoryResponse,
        ChatMessageResponse,
        Role
    ))
)]
pub struct ChatApi;

/// Register chat routes.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/chat", post(send_message).get(get_history))
}

/// Relay one message (`POST /api/chat`).
///
/// Messages mentioning "document", "documentize" or "agreement" are answered
/// with a PDF attachment instead of JSON.
#[utoipa::path(
    post,
    path = "/api/chat",
    tag = "chat",
    params(
        ("workspace_id" = String, Header, description = "Workspace the conversation belongs to"),
        ("isRealEstateAgent" = Option<String>, Header, description = "`true` answers from the workspace's documents"),
    ),
    request_body = SendMessageRequest,
    responses(
        (status = 200, description = "Reply as JSON, or `application/pdf` for document requests", body = SendMessageResponse),
        (status = 400, description = "Missing workspace ID or message"),
        (status = 500, description = "Store, provider or document failure"),
    )
)]
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    match relay_message(&state, &headers, &body).await {
        Ok(response) => response,
        Err(e) => e.into_response_with(SEND_FAILED),
    }
}

/// Conversation log of a workspace, oldest first (`GET /api/chat`).
#[utoipa::path(
    get,
    path = "/api/chat",
    tag = "chat",
    params(
        ("workspace_id" = String, Header, description = "Workspace whose log to return"),
    ),
    responses(
        (status = 200, description = "Chat history", body = ChatHistoryResponse),
        (status = 400, description = "Missing workspace ID"),
        (status = 500, description = "Store failure"),
    )
)]
pub async fn get_history(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    match load_history(&state, &headers).await {
        Ok(history) => Json(history).into_response(),
        Err(e) => e.into_response_with(HISTORY_FAILED),
    }
}

async fn relay_message(
    state: &AppState,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<Response, ServerError> {
    let workspace_id = workspace_id(headers)?;
    let strategy = Strategy::from_domain_flag(header_flag(headers, DOMAIN_MODE_HEADER));

    let request: SendMessageRequest = serde_json::from_slice(body)?;
    let message = request
        .message
        .filter(|m| !m.is_empty())
        .ok_or_else(|| ServerError::validation(NO_MESSAGE))?;

    let user_row = state
        .chats
        .append_message(&workspace_id, Role::User, &message)
        .await?;

    let context = conversation_context(state, &workspace_id, user_row.id).await?;
    info!(
        workspace_id = %workspace_id,
        strategy = %strategy,
        context_turns = context.turns().len(),
        "generating reply"
    );
    let reply = state
        .reply_generator()
        .generate(&workspace_id, strategy, &context, &message)
        .await?;

    let document = is_document_request(&message);
    let stored = if document { DOCUMENT_PLACEHOLDER } else { reply.as_str() };
    state
        .chats
        .append_message(&workspace_id, Role::Assistant, stored)
        .await?;

    if document {
        let pdf = render_pdf(&reply)?;
        info!(workspace_id = %workspace_id, bytes = pdf.len(), "reply delivered as document");
        return Ok((
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "application/pdf"),
                (header::CONTENT_DISPOSITION, DOCUMENT_DISPOSITION),
            ],
            pdf,
        )
            .into_response());
    }

    Ok(Json(SendMessageResponse { reply }).into_response())
}

/// Prior turns for the reply, read back from the log. Seeding is skipped
/// entirely when `history_turns` is 0.
async fn conversation_context(
    state: &AppState,
    workspace_id: &str,
    current_id: i64,
) -> Result<ConversationContext, ServerError> {
    let limit = state.config.history_turns;
    if limit == 0 {
        return Ok(ConversationContext::empty());
    }
    let recent = state
        .chats
        .recent_messages(workspace_id, current_id, limit)
        .await?;
    Ok(ConversationContext::from_history(&recent, current_id, limit))
}

async fn load_history(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<ChatHistoryResponse, ServerError> {
    let workspace_id = workspace_id(headers)?;
    let messages = state.chats.list_messages(&workspace_id).await?;
    Ok(ChatHistoryResponse {
        chats: messages.into_iter().map(ChatMessageResponse::from).collect(),
    })
}

// ── Tests ──────────────────────────────────────────────────────────────────────
