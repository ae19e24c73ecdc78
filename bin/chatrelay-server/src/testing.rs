//! In-memory fakes for the capability traits, shared by unit tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;

use crate::config::{Config, ProviderConfig};
use crate::entities::vector::{cosine_similarity, rank};
use crate::entities::{ChatMessage, ChatStore, NewPassage, Passage, PassageMatch, Role, VectorIndex};
use crate::provider::{Embedder, GenerationError, LanguageModel, PromptMessage};
use crate::state::AppState;

pub fn test_config() -> Config {
    Config {
        bind_address: "127.0.0.1:0".into(),
        database_url: "sqlite::memory:".into(),
        log_level: "debug".into(),
        log_json: false,
        log_dir: None,
        cors_allowed_origins: None,
        enable_swagger: false,
        provider: ProviderConfig {
            api_key: None,
            base_url: "http://127.0.0.1:9".into(),
            chat_model: "chat".into(),
            completion_model: "completion".into(),
            embedding_model: "embedding".into(),
            temperature: 0.7,
            timeout_secs: 5,
        },
        match_count: 4,
        history_turns: 20,
    }
}

pub fn test_state(store: Arc<MemoryStore>, model: Arc<FakeModel>) -> AppState {
    AppState {
        config: Arc::new(test_config()),
        chats: store.clone(),
        vectors: store,
        model,
        embedder: Arc::new(FakeEmbedder),
    }
}

/// Conversation log and passage index kept in vectors.
#[derive(Default)]
pub struct MemoryStore {
    messages: Mutex<Vec<ChatMessage>>,
    passages: Mutex<Vec<(i64, NewPassage)>>,
    /// Appends fail once this many have succeeded.
    append_limit: Mutex<Option<usize>>,
    fail_reads: AtomicBool,
    interactions: AtomicUsize,
}

impl MemoryStore {
    pub fn fail_appends_after(&self, successes: usize) {
        *self.append_limit.lock().unwrap() = Some(successes);
    }

    pub fn fail_reads(&self) {
        self.fail_reads.store(true, Ordering::SeqCst);
    }

    /// Every call made through either trait, failed ones included.
    pub fn interactions(&self) -> usize {
        self.interactions.load(Ordering::SeqCst)
    }

    pub fn messages(&self) -> Vec<ChatMessage> {
        self.messages.lock().unwrap().clone()
    }

    pub fn add_passage(&self, workspace_id: &str, content: &str, embedding: Vec<f32>) {
        let mut passages = self.passages.lock().unwrap();
        let id = passages.len() as i64 + 1;
        passages.push((
            id,
            NewPassage {
                workspace_id: workspace_id.into(),
                content: content.into(),
                metadata: serde_json::json!({}),
                embedding,
            },
        ));
    }

    pub fn passages(&self) -> Vec<NewPassage> {
        self.passages.lock().unwrap().iter().map(|(_, p)| p.clone()).collect()
    }
}

#[async_trait]
impl ChatStore for MemoryStore {
    async fn append_message(
        &self,
        workspace_id: &str,
        role: Role,
        content: &str,
    ) -> Result<ChatMessage, sqlx::Error> {
        self.interactions.fetch_add(1, Ordering::SeqCst);
        let mut messages = self.messages.lock().unwrap();
        if let Some(limit) = *self.append_limit.lock().unwrap() {
            if messages.len() >= limit {
                return Err(sqlx::Error::PoolTimedOut);
            }
        }
        let message = ChatMessage {
            id: messages.len() as i64 + 1,
            workspace_id: workspace_id.into(),
            content: content.into(),
            role,
            created_at: Utc::now(),
        };
        messages.push(message.clone());
        Ok(message)
    }

    async fn list_messages(&self, workspace_id: &str) -> Result<Vec<ChatMessage>, sqlx::Error> {
        self.interactions.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(sqlx::Error::PoolTimedOut);
        }
        Ok(self
            .messages
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.workspace_id == workspace_id)
            .cloned()
            .collect())
    }

    async fn recent_messages(
        &self,
        workspace_id: &str,
        before_id: i64,
        limit: usize,
    ) -> Result<Vec<ChatMessage>, sqlx::Error> {
        self.interactions.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(sqlx::Error::PoolTimedOut);
        }
        let messages = self.messages.lock().unwrap();
        let prior: Vec<ChatMessage> = messages
            .iter()
            .filter(|m| m.workspace_id == workspace_id && m.id < before_id)
            .cloned()
            .collect();
        let skip = prior.len().saturating_sub(limit);
        Ok(prior.into_iter().skip(skip).collect())
    }

    async fn ping(&self) -> Result<(), sqlx::Error> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(sqlx::Error::PoolTimedOut);
        }
        Ok(())
    }
}

#[async_trait]
impl VectorIndex for MemoryStore {
    async fn insert_passage(&self, passage: NewPassage) -> Result<i64, sqlx::Error> {
        self.interactions.fetch_add(1, Ordering::SeqCst);
        let mut passages = self.passages.lock().unwrap();
        let id = passages.len() as i64 + 1;
        passages.push((id, passage));
        Ok(id)
    }

    async fn match_passages(
        &self,
        workspace_id: &str,
        embedding: &[f32],
        count: usize,
    ) -> Result<Vec<PassageMatch>, sqlx::Error> {
        self.interactions.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(sqlx::Error::PoolTimedOut);
        }
        let mut matches: Vec<PassageMatch> = self
            .passages
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, p)| p.workspace_id == workspace_id)
            .map(|(id, p)| PassageMatch {
                similarity: cosine_similarity(&p.embedding, embedding),
                passage: Passage {
                    id: *id,
                    workspace_id: p.workspace_id.clone(),
                    content: p.content.clone(),
                    metadata: p.metadata.clone(),
                    created_at: Utc::now(),
                },
            })
            .collect();
        rank(&mut matches, count);
        Ok(matches)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ModelCall {
    Chat(Vec<PromptMessage>),
    Complete(String),
}

/// Answers every call with a fixed reply (or a fixed error) and records it.
/// When observing a store, the store's log is captured at each call.
#[derive(Default)]
pub struct FakeModel {
    reply: Option<String>,
    calls: Mutex<Vec<ModelCall>>,
    observed: Option<Arc<MemoryStore>>,
    snapshots: Mutex<Vec<Vec<ChatMessage>>>,
}

impl FakeModel {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_owned()),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self::default()
    }

    pub fn observing(store: Arc<MemoryStore>, reply: &str) -> Self {
        Self {
            observed: Some(store),
            ..Self::replying(reply)
        }
    }

    pub fn calls(&self) -> Vec<ModelCall> {
        self.calls.lock().unwrap().clone()
    }

    /// The observed store's log as it was at each call.
    pub fn snapshots(&self) -> Vec<Vec<ChatMessage>> {
        self.snapshots.lock().unwrap().clone()
    }

    fn answer(&self, call: ModelCall) -> Result<String, GenerationError> {
        if let Some(store) = &self.observed {
            self.snapshots.lock().unwrap().push(store.messages());
        }
        self.calls.lock().unwrap().push(call);
        self.reply.clone().ok_or(GenerationError::Api {
            status: 500,
            message: "fake provider failure".into(),
        })
    }
}

#[async_trait]
impl LanguageModel for FakeModel {
    async fn chat(&self, messages: &[PromptMessage]) -> Result<String, GenerationError> {
        self.answer(ModelCall::Chat(messages.to_vec()))
    }

    async fn complete(&self, prompt: &str) -> Result<String, GenerationError> {
        self.answer(ModelCall::Complete(prompt.to_owned()))
    }
}

/// Embeds everything as the same unit vector.
pub struct FakeEmbedder;

#[async_trait]
impl Embedder for FakeEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>, GenerationError> {
        Ok(vec![1.0, 0.0])
    }
}
