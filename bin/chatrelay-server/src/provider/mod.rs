//! Text generation and embedding capabilities.
//!
//! The router only sees [`LanguageModel`] and [`Embedder`]; the default
//! implementation is [`openai::OpenAiProvider`], which talks to any
//! OpenAI-compatible REST endpoint.

pub mod openai;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::entities::Role;

/// Errors raised while calling the generation provider.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The request never produced a response (DNS, TLS, timeout, ...).
    #[error("provider request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with a non-success status.
    #[error("provider returned {status}: {message}")]
    Api { status: u16, message: String },

    /// No API key is configured.
    #[error("no API key configured for the generation provider")]
    MissingApiKey,

    /// The provider answered successfully but without usable output.
    #[error("provider returned no {0}")]
    Empty(&'static str),
}

/// One prior turn handed to the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptMessage {
    pub role: Role,
    pub content: String,
}

impl PromptMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    #[cfg(test)]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}

/// A hosted model that can answer a chat transcript or continue a prompt.
#[async_trait]
pub trait LanguageModel: Send + Sync + 'static {
    /// Chat completion over an ordered transcript; returns the assistant text.
    async fn chat(&self, messages: &[PromptMessage]) -> Result<String, GenerationError>;

    /// Plain text completion of `prompt`.
    async fn complete(&self, prompt: &str) -> Result<String, GenerationError>;
}

/// Turns text into a dense vector for similarity search.
#[async_trait]
pub trait Embedder: Send + Sync + 'static {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, GenerationError>;
}
