//! User repository trait definition.

use kindred_types::error::RepositoryError;
use kindred_types::user::{UserId, UserProfile};

/// Repository trait for users, their profiles and their API keys.
pub trait UserRepository: Send + Sync {
    /// Create a user. Fails with `Conflict` if the email is taken.
    fn create(
        &self,
        user: &UserProfile,
    ) -> impl std::future::Future<Output = Result<UserProfile, RepositoryError>> + Send;

    fn get_by_id(
        &self,
        id: &UserId,
    ) -> impl std::future::Future<Output = Result<Option<UserProfile>, RepositoryError>> + Send;

    /// Look up a user by email (case-insensitive).
    fn get_by_email(
        &self,
        email: &str,
    ) -> impl std::future::Future<Output = Result<Option<UserProfile>, RepositoryError>> + Send;

    fn list(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<UserProfile>, RepositoryError>> + Send;

    /// Persist name, dob, interests and traits. Returns the stored profile.
    fn update(
        &self,
        user: &UserProfile,
    ) -> impl std::future::Future<Output = Result<UserProfile, RepositoryError>> + Send;

    /// Delete a user together with their agents, conversations and keys.
    fn delete(
        &self,
        id: &UserId,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Store the hash of a freshly issued API key.
    fn add_api_key(
        &self,
        user_id: &UserId,
        key_hash: &str,
        label: &str,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Resolve an API key hash to its owner, touching `last_used_at`.
    fn get_by_api_key_hash(
        &self,
        key_hash: &str,
    ) -> impl std::future::Future<Output = Result<Option<UserProfile>, RepositoryError>> + Send;
}
