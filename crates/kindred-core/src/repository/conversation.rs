//! Conversation repository trait definition.

use uuid::Uuid;

use kindred_types::agent::AgentId;
use kindred_types::chat::{ChatMessage, Conversation};
use kindred_types::error::RepositoryError;
use kindred_types::user::UserId;

/// Repository trait for conversations and their append-only message logs.
///
/// There is at most one conversation per `(user, agent)` pair.
pub trait ConversationRepository: Send + Sync {
    /// Return the conversation for the pair, creating it on first use.
    fn get_or_create(
        &self,
        user_id: &UserId,
        agent_id: &AgentId,
    ) -> impl std::future::Future<Output = Result<Conversation, RepositoryError>> + Send;

    fn find(
        &self,
        user_id: &UserId,
        agent_id: &AgentId,
    ) -> impl std::future::Future<Output = Result<Option<Conversation>, RepositoryError>> + Send;

    /// Append one message and bump the conversation's `updated_at`.
    fn append(
        &self,
        message: &ChatMessage,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// The most recent `limit` messages (all when `None`), oldest first.
    fn messages(
        &self,
        conversation_id: &Uuid,
        limit: Option<u32>,
    ) -> impl std::future::Future<Output = Result<Vec<ChatMessage>, RepositoryError>> + Send;

    /// Bulk-delete every message of the pair's conversation. Returns how many were removed.
    fn clear(
        &self,
        user_id: &UserId,
        agent_id: &AgentId,
    ) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;

    /// Number of conversations the user has started.
    fn count_for_user(
        &self,
        user_id: &UserId,
    ) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;
}
