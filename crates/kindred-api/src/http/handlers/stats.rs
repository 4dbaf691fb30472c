//! Dashboard stats handler.

use axum::extract::State;

use kindred_types::chat::DashboardStats;

use crate::http::error::AppError;
use crate::http::extractors::auth::Authenticated;
use crate::http::response::{ApiResponse, RequestTimer};
use crate::state::AppState;

/// GET /api/v1/stats - Per-user dashboard counters.
pub async fn get_stats(
    State(state): State<AppState>,
    Authenticated(user): Authenticated,
) -> Result<ApiResponse<DashboardStats>, AppError> {
    let timer = RequestTimer::start();
    let stats = state.chat_service.dashboard(&user.id).await?;
    Ok(timer.success(stats))
}
