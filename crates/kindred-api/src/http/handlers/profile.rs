//! Profile handlers.

use axum::Json;
use axum::extract::State;

use kindred_types::discovery::Discoveries;
use kindred_types::user::{UpdateProfileRequest, UserProfile};

use crate::http::error::AppError;
use crate::http::extractors::auth::Authenticated;
use crate::http::response::{ApiResponse, RequestTimer};
use crate::state::AppState;

/// GET /api/v1/profile
pub async fn get_profile(Authenticated(user): Authenticated) -> ApiResponse<UserProfile> {
    RequestTimer::start()
        .success(user)
        .with_link("self", "/api/v1/profile")
}

/// PUT /api/v1/profile - Explicit edit. Supplied lists replace the old ones.
pub async fn update_profile(
    State(state): State<AppState>,
    Authenticated(user): Authenticated,
    Json(body): Json<UpdateProfileRequest>,
) -> Result<ApiResponse<UserProfile>, AppError> {
    let timer = RequestTimer::start();
    let updated = state.user_service.update_profile(&user.id, body).await?;
    Ok(timer.success(updated))
}

/// POST /api/v1/profile/discoveries - Accept discovered facts (union only).
pub async fn accept_discoveries(
    State(state): State<AppState>,
    Authenticated(user): Authenticated,
    Json(body): Json<Discoveries>,
) -> Result<ApiResponse<UserProfile>, AppError> {
    let timer = RequestTimer::start();
    let updated = state
        .user_service
        .merge_discoveries(&user.id, &body, state.config.discovery_merge)
        .await?;
    Ok(timer.success(updated))
}
