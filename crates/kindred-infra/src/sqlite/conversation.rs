//! SQLite conversation repository implementation.
//!
//! Messages carry a per-conversation sequence number so that ordering stays
//! stable even when two messages share a timestamp.

use chrono::Utc;
use sqlx::Row;
use uuid::Uuid;

use kindred_core::repository::conversation::ConversationRepository;
use kindred_types::agent::AgentId;
use kindred_types::chat::{ChatMessage, ChatRole, Conversation};
use kindred_types::emotion::Emotion;
use kindred_types::error::RepositoryError;
use kindred_types::user::UserId;

use super::pool::DatabasePool;
use super::{format_datetime, parse_datetime, query_err};

/// SQLite-backed implementation of `ConversationRepository`.
pub struct SqliteConversationRepository {
    pool: DatabasePool,
}

impl SqliteConversationRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

fn conversation_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Conversation, RepositoryError> {
    let id: String = row.try_get("id").map_err(query_err)?;
    let user_id: String = row.try_get("user_id").map_err(query_err)?;
    let agent_id: String = row.try_get("agent_id").map_err(query_err)?;
    let created_at: String = row.try_get("created_at").map_err(query_err)?;
    let updated_at: String = row.try_get("updated_at").map_err(query_err)?;

    Ok(Conversation {
        id: id
            .parse()
            .map_err(|e| RepositoryError::Query(format!("invalid conversation id: {e}")))?,
        user_id: user_id
            .parse()
            .map_err(|e| RepositoryError::Query(format!("invalid user id: {e}")))?,
        agent_id: agent_id
            .parse()
            .map_err(|e| RepositoryError::Query(format!("invalid agent id: {e}")))?,
        created_at: parse_datetime(&created_at)?,
        updated_at: parse_datetime(&updated_at)?,
    })
}

fn message_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<ChatMessage, RepositoryError> {
    let id: String = row.try_get("id").map_err(query_err)?;
    let conversation_id: String = row.try_get("conversation_id").map_err(query_err)?;
    let role: String = row.try_get("role").map_err(query_err)?;
    let content: String = row.try_get("content").map_err(query_err)?;
    let emotion: String = row.try_get("emotion").map_err(query_err)?;
    let created_at: String = row.try_get("created_at").map_err(query_err)?;

    Ok(ChatMessage {
        id: id
            .parse()
            .map_err(|e| RepositoryError::Query(format!("invalid message id: {e}")))?,
        conversation_id: conversation_id
            .parse()
            .map_err(|e| RepositoryError::Query(format!("invalid conversation id: {e}")))?,
        role: role.parse::<ChatRole>().map_err(RepositoryError::Query)?,
        content,
        emotion: emotion.parse::<Emotion>().map_err(RepositoryError::Query)?,
        created_at: parse_datetime(&created_at)?,
    })
}

impl ConversationRepository for SqliteConversationRepository {
    async fn get_or_create(
        &self,
        user_id: &UserId,
        agent_id: &AgentId,
    ) -> Result<Conversation, RepositoryError> {
        let now = format_datetime(&Utc::now());
        sqlx::query(
            "INSERT OR IGNORE INTO conversations (id, user_id, agent_id, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(Uuid::now_v7().to_string())
        .bind(user_id.to_string())
        .bind(agent_id.to_string())
        .bind(&now)
        .bind(&now)
        .execute(&self.pool.writer)
        .await
        .map_err(query_err)?;

        // Read back through the writer so a just-inserted row is always visible.
        let row = sqlx::query("SELECT * FROM conversations WHERE user_id = ? AND agent_id = ?")
            .bind(user_id.to_string())
            .bind(agent_id.to_string())
            .fetch_one(&self.pool.writer)
            .await
            .map_err(query_err)?;

        conversation_from_row(&row)
    }

    async fn find(
        &self,
        user_id: &UserId,
        agent_id: &AgentId,
    ) -> Result<Option<Conversation>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM conversations WHERE user_id = ? AND agent_id = ?")
            .bind(user_id.to_string())
            .bind(agent_id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_err)?;

        row.as_ref().map(conversation_from_row).transpose()
    }

    async fn append(&self, message: &ChatMessage) -> Result<(), RepositoryError> {
        let mut tx = self.pool.writer.begin().await.map_err(query_err)?;

        let result = sqlx::query(
            "INSERT INTO messages (id, conversation_id, seq, role, content, emotion, created_at)
             VALUES (?, ?, (SELECT COALESCE(MAX(seq), 0) + 1 FROM messages WHERE conversation_id = ?), ?, ?, ?, ?)",
        )
        .bind(message.id.to_string())
        .bind(message.conversation_id.to_string())
        .bind(message.conversation_id.to_string())
        .bind(message.role.to_string())
        .bind(&message.content)
        .bind(message.emotion.to_string())
        .bind(format_datetime(&message.created_at))
        .execute(&mut *tx)
        .await;

        match result {
            Ok(_) => {}
            Err(sqlx::Error::Database(db_err)) if db_err.message().contains("FOREIGN KEY") => {
                return Err(RepositoryError::NotFound);
            }
            Err(e) => return Err(query_err(e)),
        }

        sqlx::query("UPDATE conversations SET updated_at = ? WHERE id = ?")
            .bind(format_datetime(&message.created_at))
            .bind(message.conversation_id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(query_err)?;

        tx.commit().await.map_err(query_err)
    }

    async fn messages(
        &self,
        conversation_id: &Uuid,
        limit: Option<u32>,
    ) -> Result<Vec<ChatMessage>, RepositoryError> {
        let rows = match limit {
            Some(limit) => {
                sqlx::query(
                    "SELECT * FROM (
                        SELECT * FROM messages WHERE conversation_id = ? ORDER BY seq DESC LIMIT ?
                     ) ORDER BY seq ASC",
                )
                .bind(conversation_id.to_string())
                .bind(i64::from(limit))
                .fetch_all(&self.pool.reader)
                .await
            }
            None => {
                sqlx::query("SELECT * FROM messages WHERE conversation_id = ? ORDER BY seq ASC")
                    .bind(conversation_id.to_string())
                    .fetch_all(&self.pool.reader)
                    .await
            }
        }
        .map_err(query_err)?;

        rows.iter().map(message_from_row).collect()
    }

    async fn clear(&self, user_id: &UserId, agent_id: &AgentId) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            "DELETE FROM messages WHERE conversation_id IN (
                SELECT id FROM conversations WHERE user_id = ? AND agent_id = ?
             )",
        )
        .bind(user_id.to_string())
        .bind(agent_id.to_string())
        .execute(&self.pool.writer)
        .await
        .map_err(query_err)?;

        Ok(result.rows_affected())
    }

    async fn count_for_user(&self, user_id: &UserId) -> Result<u64, RepositoryError> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM conversations WHERE user_id = ?")
                .bind(user_id.to_string())
                .fetch_one(&self.pool.reader)
                .await
                .map_err(query_err)?;

        Ok(count.max(0) as u64)
    }
}
