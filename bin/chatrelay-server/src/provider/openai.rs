//! OpenAI-compatible provider.
//!
//! Speaks `/chat/completions`, `/completions` and `/embeddings` against a
//! configurable base URL, so any service following the OpenAI wire format
//! can stand in for the hosted API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ProviderConfig;
use crate::provider::{Embedder, GenerationError, LanguageModel, PromptMessage};

/// Token ceiling for text completions.
const COMPLETION_MAX_TOKENS: u32 = 256;

/// Longest slice of an error body carried into [`GenerationError::Api`].
const MAX_ERROR_BODY_CHARS: usize = 512;

pub struct OpenAiProvider {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    chat_model: String,
    completion_model: String,
    embedding_model: String,
    temperature: f32,
}

impl OpenAiProvider {
    pub fn new(config: &ProviderConfig) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .connect_timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_else(|_| Client::new()),
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            api_key: config.api_key.clone(),
            chat_model: config.chat_model.clone(),
            completion_model: config.completion_model.clone(),
            embedding_model: config.embedding_model.clone(),
            temperature: config.temperature,
        }
    }

    async fn post<B, R>(&self, path: &str, body: &B) -> Result<R, GenerationError>
    where
        B: Serialize + ?Sized,
        R: for<'de> Deserialize<'de>,
    {
        let api_key = self.api_key.as_deref().ok_or(GenerationError::MissingApiKey)?;
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "provider request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Api {
                status: status.as_u16(),
                message: api_error_message(&body),
            });
        }

        Ok(response.json::<R>().await?)
    }
}

#[async_trait]
impl LanguageModel for OpenAiProvider {
    async fn chat(&self, messages: &[PromptMessage]) -> Result<String, GenerationError> {
        let request = ChatRequest {
            model: &self.chat_model,
            messages,
            temperature: self.temperature,
        };
        let response: ChatResponse = self.post("/chat/completions", &request).await?;
        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(GenerationError::Empty("chat completion"))
    }

    async fn complete(&self, prompt: &str) -> Result<String, GenerationError> {
        let request = CompletionRequest {
            model: &self.completion_model,
            prompt,
            temperature: self.temperature,
            max_tokens: COMPLETION_MAX_TOKENS,
        };
        let response: CompletionResponse = self.post("/completions", &request).await?;
        response
            .choices
            .into_iter()
            .next()
            .map(|c| c.text.trim().to_owned())
            .ok_or(GenerationError::Empty("completion"))
    }
}

#[async_trait]
impl Embedder for OpenAiProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, GenerationError> {
        let request = EmbeddingRequest {
            model: &self.embedding_model,
            input: [text],
        };
        let response: EmbeddingResponse = self.post("/embeddings", &request).await?;
        response
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .filter(|e| !e.is_empty())
            .ok_or(GenerationError::Empty("embedding"))
    }
}

/// Pull `error.message` out of an OpenAI-style error body, or fall back to the
/// raw (truncated) text.
fn api_error_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct Envelope {
        error: Detail,
    }
    #[derive(Deserialize)]
    struct Detail {
        message: String,
    }

    match serde_json::from_str::<Envelope>(body) {
        Ok(envelope) => envelope.error.message,
        Err(_) => body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
    }
}

// ── Wire types ────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [PromptMessage],
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    text: String,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: [&'a str; 1],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    #[serde(default)]
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

// ── Tests ──────────────────────────────────────────────────────────────────────
