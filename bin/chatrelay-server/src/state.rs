//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use crate::config::Config;
use crate::entities::{ChatStore, VectorIndex};
use crate::provider::{Embedder, LanguageModel};
use crate::services::reply::ReplyGenerator;

/// State shared across all HTTP handlers.
///
/// Each collaborator is held behind its capability trait so tests can swap in
/// fakes; in production the store fields share one SQLite pool and the
/// provider fields share one HTTP client.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration (env-derived).
    pub config: Arc<Config>,
    /// Conversation log.
    pub chats: Arc<dyn ChatStore>,
    /// Workspace-scoped passage index.
    pub vectors: Arc<dyn VectorIndex>,
    /// Chat and completion model.
    pub model: Arc<dyn LanguageModel>,
    /// Embedding model used for retrieval and ingestion.
    pub embedder: Arc<dyn Embedder>,
}

impl AppState {
    pub fn reply_generator(&self) -> ReplyGenerator<'_> {
        ReplyGenerator {
            model: self.model.as_ref(),
            embedder: self.embedder.as_ref(),
            index: self.vectors.as_ref(),
            match_count: self.config.match_count,
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
