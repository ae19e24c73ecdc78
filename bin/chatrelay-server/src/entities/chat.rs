use async_trait::async_trait;
use chrono::Utc;

use crate::entities::{dao::ChatMessage, parse_timestamp, timestamp, Role, SqliteStore};

/// Append-only conversation log keyed by workspace.
#[async_trait]
pub trait ChatStore: Send + Sync + 'static {
    /// Persist one message. The store assigns `id` and `created_at`.
    async fn append_message(
        &self,
        workspace_id: &str,
        role: Role,
        content: &str,
    ) -> Result<ChatMessage, sqlx::Error>;

    /// All messages of a workspace, oldest first.
    async fn list_messages(&self, workspace_id: &str) -> Result<Vec<ChatMessage>, sqlx::Error>;

    /// The latest `limit` messages of a workspace with an id below
    /// `before_id`, oldest first.
    async fn recent_messages(
        &self,
        workspace_id: &str,
        before_id: i64,
        limit: usize,
    ) -> Result<Vec<ChatMessage>, sqlx::Error>;

    /// Cheap round trip used by the health check.
    async fn ping(&self) -> Result<(), sqlx::Error>;
}

type ChatRow = (i64, String, String, String, String);

fn decode_rows(rows: Vec<ChatRow>) -> Result<Vec<ChatMessage>, sqlx::Error> {
    rows.into_iter()
        .map(|(id, workspace_id, content, role, created_at)| {
            let role = role
                .parse::<Role>()
                .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
            Ok(ChatMessage {
                id,
                workspace_id,
                content,
                role,
                created_at: parse_timestamp(&created_at, "chat"),
            })
        })
        .collect()
}

#[async_trait]
impl ChatStore for SqliteStore {
    async fn append_message(
        &self,
        workspace_id: &str,
        role: Role,
        content: &str,
    ) -> Result<ChatMessage, sqlx::Error> {
        let created_at = Utc::now();
        let result = sqlx::query(
            "INSERT INTO chat (workspace_id, content, role, created_at) \
             VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(workspace_id)
        .bind(content)
        .bind(role.as_ref())
        .bind(timestamp(created_at))
        .execute(&self.pool)
        .await?;

        Ok(ChatMessage {
            id: result.last_insert_rowid(),
            workspace_id: workspace_id.to_owned(),
            content: content.to_owned(),
            role,
            created_at,
        })
    }

    async fn list_messages(&self, workspace_id: &str) -> Result<Vec<ChatMessage>, sqlx::Error> {
        let rows: Vec<ChatRow> = sqlx::query_as(
            "SELECT id, workspace_id, content, role, created_at \
             FROM chat WHERE workspace_id = ?1 ORDER BY created_at ASC, id ASC",
        )
        .bind(workspace_id)
        .fetch_all(&self.pool)
        .await?;

        decode_rows(rows)
    }

    async fn recent_messages(
        &self,
        workspace_id: &str,
        before_id: i64,
        limit: usize,
    ) -> Result<Vec<ChatMessage>, sqlx::Error> {
        let mut rows: Vec<ChatRow> = sqlx::query_as(
            "SELECT id, workspace_id, content, role, created_at \
             FROM chat WHERE workspace_id = ?1 AND id < ?2 \
             ORDER BY created_at DESC, id DESC LIMIT ?3",
        )
        .bind(workspace_id)
        .bind(before_id)
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await?;

        rows.reverse();
        decode_rows(rows)
    }

    async fn ping(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
