use thiserror::Error;

/// Errors related to agent operations.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("agent not found")]
    NotFound,

    #[error("invalid agent: {0}")]
    InvalidInput(String),

    #[error("only the owner can modify this agent")]
    Forbidden,

    #[error("default agents cannot be deleted")]
    DefaultAgentImmutable,

    #[error("storage error: {0}")]
    StorageError(String),
}

/// Errors related to users and their profiles.
#[derive(Debug, Error)]
pub enum UserError {
    #[error("user not found")]
    NotFound,

    #[error("invalid user: {0}")]
    InvalidInput(String),

    #[error("email '{0}' is already registered")]
    EmailConflict(String),

    #[error("storage error: {0}")]
    StorageError(String),
}

/// Errors surfaced by the chat flow around the composer.
///
/// The composer itself never fails; these cover input validation and the
/// store operations on either side of it.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("message must not be empty")]
    EmptyMessage,

    #[error("agent not found")]
    AgentNotFound,

    #[error("user not found")]
    UserNotFound,

    #[error("agent is not available to this user")]
    Forbidden,

    #[error("storage error: {0}")]
    StorageError(String),
}

/// Errors from repository operations (used by trait definitions in kindred-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}
