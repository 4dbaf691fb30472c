//! Admin-only handlers.

use axum::extract::{Path, State};

use kindred_types::agent::Agent;
use kindred_types::error::UserError;
use kindred_types::user::{UserId, UserProfile};

use crate::http::error::AppError;
use crate::http::extractors::auth::Admin;
use crate::http::response::{ApiResponse, RequestTimer};
use crate::state::AppState;

/// GET /api/v1/admin/users
pub async fn list_users(
    State(state): State<AppState>,
    _admin: Admin,
) -> Result<ApiResponse<Vec<UserProfile>>, AppError> {
    let timer = RequestTimer::start();
    let users = state.user_service.list_users().await?;
    Ok(timer.success(users))
}

/// DELETE /api/v1/admin/users/{id} - Cascades to the user's agents and chats.
pub async fn delete_user(
    State(state): State<AppState>,
    Admin(admin): Admin,
    Path(id): Path<String>,
) -> Result<ApiResponse<serde_json::Value>, AppError> {
    let timer = RequestTimer::start();
    let id: UserId = id.parse().map_err(|_| AppError::User(UserError::NotFound))?;
    if id == admin.id {
        return Err(AppError::Validation(
            "admins cannot delete their own account".to_string(),
        ));
    }

    state.user_service.delete_user(&id).await?;
    tracing::info!(user_id = %id, admin_id = %admin.id, "User deleted by admin");

    Ok(timer.success(serde_json::json!({ "deleted": true, "id": id.to_string() })))
}

/// GET /api/v1/admin/agents - Every agent in the store.
pub async fn list_agents(
    State(state): State<AppState>,
    _admin: Admin,
) -> Result<ApiResponse<Vec<Agent>>, AppError> {
    let timer = RequestTimer::start();
    let agents = state.agent_service.list_all().await?;
    Ok(timer.success(agents))
}
