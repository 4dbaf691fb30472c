//! API key authentication extractor.
//!
//! Extracts and verifies API keys from:
//! - `Authorization: Bearer <key>` header
//! - `X-API-Key: <key>` header
//!
//! Keys are SHA-256 hashed and resolved to their owning user through the
//! user service. Plaintext keys are never stored.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use sha2::{Digest, Sha256};

use kindred_types::user::UserProfile;

use crate::http::error::AppError;
use crate::state::AppState;

/// Prefix on every issued key, so leaked keys are recognizable.
pub const API_KEY_PREFIX: &str = "kin_";

/// The user behind a valid API key. Extracting this authenticates the request.
pub struct Authenticated(pub UserProfile);

impl FromRequestParts<AppState> for Authenticated {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let api_key = extract_api_key(parts)?;
        let key_hash = hash_api_key(&api_key);

        match state.user_service.authenticate(&key_hash).await? {
            Some(user) => Ok(Authenticated(user)),
            None => Err(AppError::Unauthorized(
                "Invalid API key. Provide a valid key via 'Authorization: Bearer <key>' or 'X-API-Key: <key>' header.".to_string(),
            )),
        }
    }
}

/// An authenticated admin. Rejects other users with 403.
pub struct Admin(pub UserProfile);

impl FromRequestParts<AppState> for Admin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Authenticated(user) = Authenticated::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            return Err(AppError::Forbidden("admin role required".to_string()));
        }
        Ok(Admin(user))
    }
}

/// Extract the API key from request headers.
fn extract_api_key(parts: &Parts) -> Result<String, AppError> {
    if let Some(auth) = parts.headers.get("authorization") {
        let auth_str = auth.to_str().map_err(|_| {
            AppError::Unauthorized("Invalid Authorization header encoding".to_string())
        })?;
        if let Some(key) = auth_str.strip_prefix("Bearer ") {
            return Ok(key.trim().to_string());
        }
    }

    if let Some(key) = parts.headers.get("x-api-key") {
        let key_str = key.to_str().map_err(|_| {
            AppError::Unauthorized("Invalid X-API-Key header encoding".to_string())
        })?;
        return Ok(key_str.trim().to_string());
    }

    Err(AppError::Unauthorized(
        "Missing API key. Provide via 'Authorization: Bearer <key>' or 'X-API-Key: <key>' header.".to_string(),
    ))
}

/// Compute SHA-256 hash of an API key (lowercase hex).
pub fn hash_api_key(key: &str) -> String {
    let digest = Sha256::digest(key.as_bytes());
    format!("{digest:x}")
}

/// Generate a fresh plaintext key: the prefix plus 64 random hex chars.
pub fn generate_api_key() -> String {
    format!(
        "{API_KEY_PREFIX}{}{}",
        uuid::Uuid::new_v4().simple(),
        uuid::Uuid::new_v4().simple()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with(header: &str, value: &str) -> Parts {
        let (parts, ()) = Request::builder()
            .header(header, value)
            .body(())
            .unwrap()
            .into_parts();
        parts
    }

    #[test]
    fn test_hash_is_lowercase_sha256_hex() {
        assert_eq!(
            hash_api_key("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_generated_keys_are_unique_and_prefixed() {
        let a = generate_api_key();
        let b = generate_api_key();
        assert_ne!(a, b);
        assert!(a.starts_with(API_KEY_PREFIX));
        assert_eq!(a.len(), API_KEY_PREFIX.len() + 64);
    }

    #[test]
    fn test_extract_from_bearer_or_header() {
        let bearer = parts_with("authorization", "Bearer kin_123 ");
        assert_eq!(extract_api_key(&bearer).unwrap(), "kin_123");

        let header = parts_with("x-api-key", "kin_456");
        assert_eq!(extract_api_key(&header).unwrap(), "kin_456");
    }

    #[test]
    fn test_extract_missing_key() {
        let parts = parts_with("accept", "application/json");
        assert!(matches!(extract_api_key(&parts), Err(AppError::Unauthorized(_))));
    }
}
