//! Self-service signup.

use axum::Json;
use axum::extract::State;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use kindred_types::user::{CreateUserRequest, UserProfile, UserRole};

use crate::http::error::AppError;
use crate::http::extractors::auth::{generate_api_key, hash_api_key};
use crate::http::response::{ApiResponse, RequestTimer};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub dob: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub user: UserProfile,
    /// Plaintext key. Returned exactly once; only its hash is stored.
    pub api_key: String,
}

/// POST /api/v1/auth/signup - Register a user and issue their first API key.
///
/// Signup always creates a regular user; admins are made from the CLI.
pub async fn signup(
    State(state): State<AppState>,
    Json(body): Json<SignupRequest>,
) -> Result<ApiResponse<SignupResponse>, AppError> {
    let timer = RequestTimer::start();

    let user = state
        .user_service
        .register(CreateUserRequest {
            full_name: body.full_name,
            email: body.email,
            dob: body.dob,
            role: UserRole::User,
        })
        .await?;

    let api_key = generate_api_key();
    state
        .user_service
        .add_api_key(&user.id, &hash_api_key(&api_key), "signup")
        .await?;

    tracing::info!(user_id = %user.id, "User signed up");

    Ok(timer
        .success(SignupResponse { user, api_key })
        .created()
        .with_link("profile", "/api/v1/profile")
        .with_link("agents", "/api/v1/agents"))
}
