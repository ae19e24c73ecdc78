//! Reply generation.
//!
//! Two strategies produce the assistant text for a message:
//!
//! - [`Strategy::Plain`] sends the conversation context and the message to
//!   the chat model.
//! - [`Strategy::DomainAugmented`] answers from the workspace's vector index:
//!   the message (condensed with prior turns into a standalone question when
//!   there are any) is embedded, the closest passages are retrieved, and the
//!   completion model answers using those passages as context.

use std::fmt::Write as _;

use tracing::debug;

use crate::entities::{ChatMessage, PassageMatch, Role, VectorIndex};
use crate::error::ServerError;
use crate::provider::{Embedder, LanguageModel, PromptMessage};

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum Strategy {
    Plain,
    DomainAugmented,
}

impl Strategy {
    pub fn from_domain_flag(domain_mode: bool) -> Self {
        if domain_mode {
            Strategy::DomainAugmented
        } else {
            Strategy::Plain
        }
    }
}

/// Prior turns supplied to the generator for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationContext {
    turns: Vec<PromptMessage>,
}

impl ConversationContext {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The last `limit` rows of `history` written before the row with id
    /// `current_id` (the message being answered). Rows appended after it by
    /// concurrent requests are not part of this turn's context.
    pub fn from_history(history: &[ChatMessage], current_id: i64, limit: usize) -> Self {
        let prior: Vec<&ChatMessage> = history.iter().filter(|m| m.id < current_id).collect();
        let skip = prior.len().saturating_sub(limit);
        let turns = prior
            .into_iter()
            .skip(skip)
            .map(|m| PromptMessage {
                role: m.role,
                content: m.content.clone(),
            })
            .collect();
        Self { turns }
    }

    pub fn turns(&self) -> &[PromptMessage] {
        &self.turns
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

/// Borrowed view of the collaborators a reply needs.
pub struct ReplyGenerator<'a> {
    pub model: &'a dyn LanguageModel,
    pub embedder: &'a dyn Embedder,
    pub index: &'a dyn VectorIndex,
    /// Passages retrieved per domain-augmented reply.
    pub match_count: usize,
}

impl ReplyGenerator<'_> {
    pub async fn generate(
        &self,
        workspace_id: &str,
        strategy: Strategy,
        context: &ConversationContext,
        message: &str,
    ) -> Result<String, ServerError> {
        match strategy {
            Strategy::Plain => self.plain(context, message).await,
            Strategy::DomainAugmented => self.domain_augmented(workspace_id, context, message).await,
        }
    }

    async fn plain(
        &self,
        context: &ConversationContext,
        message: &str,
    ) -> Result<String, ServerError> {
        let mut messages = context.turns().to_vec();
        messages.push(PromptMessage::user(message));
        Ok(self.model.chat(&messages).await?)
    }

    async fn domain_augmented(
        &self,
        workspace_id: &str,
        context: &ConversationContext,
        message: &str,
    ) -> Result<String, ServerError> {
        let question = if context.is_empty() {
            message.to_owned()
        } else {
            self.model.complete(&condense_prompt(context, message)).await?
        };

        let embedding = self.embedder.embed(&question).await?;
        let passages = self
            .index
            .match_passages(workspace_id, &embedding, self.match_count)
            .await?;
        debug!(
            workspace_id,
            retrieved = passages.len(),
            top_similarity = passages.first().map(|m| m.similarity),
            "retrieved passages"
        );

        Ok(self.model.complete(&answer_prompt(&passages, &question)).await?)
    }
}

/// Prompt that folds prior turns and a follow-up into one standalone question.
pub fn condense_prompt(context: &ConversationContext, follow_up: &str) -> String {
    let mut prompt = String::from(
        "Given the following conversation and a follow up question, rephrase the \
         follow up question to be a standalone question.\n\nChat History:\n",
    );
    for turn in context.turns() {
        let speaker = match turn.role {
            Role::User => "Human",
            Role::Assistant => "Assistant",
        };
        let _ = writeln!(prompt, "{speaker}: {}", turn.content);
    }
    let _ = write!(prompt, "Follow Up Input: {follow_up}\nStandalone question:");
    prompt
}

/// Prompt that answers `question` from the retrieved passages.
pub fn answer_prompt(passages: &[PassageMatch], question: &str) -> String {
    let context = passages
        .iter()
        .map(|m| m.passage.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");
    format!(
        "Use the following pieces of context to answer the question at the end. \
         If you don't know the answer, say that you don't know instead of making \
         one up.\n\n{context}\n\nQuestion: {question}\nHelpful Answer:"
    )
}

// ── Tests ──────────────────────────────────────────────────────────────────────
