//! Workspace-scoped semantic index over stored passages.
//!
//! Embeddings are kept as JSON arrays next to the text; matching loads the
//! workspace's rows and ranks them by cosine similarity in process.

use async_trait::async_trait;
use chrono::Utc;

use crate::entities::dao::{NewPassage, Passage, PassageMatch};
use crate::entities::{parse_timestamp, timestamp, SqliteStore};

#[async_trait]
pub trait VectorIndex: Send + Sync + 'static {
    /// Store a passage and return its id.
    async fn insert_passage(&self, passage: NewPassage) -> Result<i64, sqlx::Error>;

    /// The `count` passages of `workspace_id` most similar to `embedding`,
    /// best match first.
    async fn match_passages(
        &self,
        workspace_id: &str,
        embedding: &[f32],
        count: usize,
    ) -> Result<Vec<PassageMatch>, sqlx::Error>;
}

#[async_trait]
impl VectorIndex for SqliteStore {
    async fn insert_passage(&self, passage: NewPassage) -> Result<i64, sqlx::Error> {
        let embedding = serde_json::to_string(&passage.embedding)
            .map_err(|e| sqlx::Error::Encode(Box::new(e)))?;
        let result = sqlx::query(
            "INSERT INTO vector_store (workspace_id, content, metadata, embedding, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&passage.workspace_id)
        .bind(&passage.content)
        .bind(passage.metadata.to_string())
        .bind(&embedding)
        .bind(timestamp(Utc::now()))
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    async fn match_passages(
        &self,
        workspace_id: &str,
        embedding: &[f32],
        count: usize,
    ) -> Result<Vec<PassageMatch>, sqlx::Error> {
        let rows: Vec<(i64, String, String, String, String, String)> = sqlx::query_as(
            "SELECT id, workspace_id, content, metadata, embedding, created_at \
             FROM vector_store WHERE workspace_id = ?1",
        )
        .bind(workspace_id)
        .fetch_all(&self.pool)
        .await?;

        let mut matches: Vec<PassageMatch> = rows
            .into_iter()
            .filter_map(|(id, workspace_id, content, metadata, stored, created_at)| {
                let stored: Vec<f32> = match serde_json::from_str(&stored) {
                    Ok(v) => v,
                    Err(e) => {
                        tracing::warn!(id, error = %e, "skipping passage with unreadable embedding");
                        return None;
                    }
                };
                let metadata = serde_json::from_str(&metadata)
                    .unwrap_or_else(|_| serde_json::Value::Object(Default::default()));
                Some(PassageMatch {
                    similarity: cosine_similarity(&stored, embedding),
                    passage: Passage {
                        id,
                        workspace_id,
                        content,
                        metadata,
                        created_at: parse_timestamp(&created_at, "vector_store"),
                    },
                })
            })
            .collect();

        rank(&mut matches, count);
        Ok(matches)
    }
}

/// Sort best-first and keep the top `count`.
pub fn rank(matches: &mut Vec<PassageMatch>, count: usize) {
    matches.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    matches.truncate(count);
}

/// Cosine similarity; vectors of different dimension or zero norm score 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    fn passage(workspace: &str, content: &str, embedding: Vec<f32>) -> NewPassage {
        NewPassage {
            workspace_id: workspace.into(),
            content: content.into(),
            metadata: json!({ "source": "test" }),
            embedding,
        }
    }

    #[test]
    fn cosine_identical_is_one() {
        let sim = cosine_similarity(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0]);
        assert!((sim - 1.0).abs() < 0.0001);
    }

    #[test]
    fn cosine_orthogonal_is_zero() {
        let sim = cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]);
        assert!(sim.abs() < 0.0001);
    }

    #[test]
    fn cosine_degenerate_inputs_score_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0, 2.0, 3.0], &[1.0, 2.0]), 0.0);
    }

    #[tokio::test]
    async fn match_ranks_by_similarity_within_workspace() {
        let store = SqliteStore::in_memory().await.unwrap();
        store
            .insert_passage(passage("ws", "listing terms", vec![1.0, 0.0, 0.0]))
            .await
            .unwrap();
        store
            .insert_passage(passage("ws", "closing costs", vec![0.7, 0.7, 0.0]))
            .await
            .unwrap();
        store
            .insert_passage(passage("ws", "weather", vec![0.0, 0.0, 1.0]))
            .await
            .unwrap();
        store
            .insert_passage(passage("other", "not mine", vec![1.0, 0.0, 0.0]))
            .await
            .unwrap();

        let hits = store.match_passages("ws", &[1.0, 0.1, 0.0], 2).await.unwrap();
        let contents: Vec<&str> = hits.iter().map(|m| m.passage.content.as_str()).collect();
        assert_eq!(contents, ["listing terms", "closing costs"]);
        assert!(hits[0].similarity >= hits[1].similarity);
        assert_eq!(hits[0].passage.metadata["source"], "test");
    }

    #[tokio::test]
    async fn match_on_empty_workspace_is_empty() {
        let store = SqliteStore::in_memory().await.unwrap();
        let hits = store.match_passages("ws", &[1.0], 4).await.unwrap();
        assert!(hits.is_empty());
    }
}
