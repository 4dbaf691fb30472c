//! Agent repository trait definition.

use kindred_types::agent::{Agent, AgentId};
use kindred_types::error::RepositoryError;
use kindred_types::user::UserId;

/// Filter criteria for listing agents.
#[derive(Debug, Clone, Default)]
pub struct AgentFilter {
    /// Only agents this user may chat with (public, default, or owned).
    pub visible_to: Option<UserId>,
    /// Only default (seeded) agents, or only non-default ones.
    pub is_default: Option<bool>,
}

/// Repository trait for agent persistence.
///
/// Implementations live in kindred-infra (e.g., SqliteAgentRepository).
/// Uses native async fn in traits (Rust 2024 edition, no async_trait macro).
pub trait AgentRepository: Send + Sync {
    fn create(
        &self,
        agent: &Agent,
    ) -> impl std::future::Future<Output = Result<Agent, RepositoryError>> + Send;

    fn get_by_id(
        &self,
        id: &AgentId,
    ) -> impl std::future::Future<Output = Result<Option<Agent>, RepositoryError>> + Send;

    /// List agents, oldest first.
    fn list(
        &self,
        filter: Option<AgentFilter>,
    ) -> impl std::future::Future<Output = Result<Vec<Agent>, RepositoryError>> + Send;

    /// Delete an agent and, with it, every conversation held with it.
    fn delete(
        &self,
        id: &AgentId,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
