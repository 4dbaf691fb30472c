//! Axum router configuration with middleware.
//!
//! All routes are under `/api/v1/`, except the unauthenticated `/health`.
//! Middleware: CORS, tracing.

use axum::Router;
use axum::routing::{delete, get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/auth/signup", post(handlers::auth::signup))
        // Agents
        .route(
            "/agents",
            get(handlers::agent::list_agents).post(handlers::agent::create_agent),
        )
        .route("/agents/enhance", post(handlers::agent::enhance_prompt))
        .route("/agents/{id}", delete(handlers::agent::delete_agent))
        // Chat
        .route("/chat", post(handlers::chat::send_message))
        .route("/chat/{agent_id}", delete(handlers::chat::clear_chat))
        .route(
            "/chat/{agent_id}/messages",
            get(handlers::chat::get_messages),
        )
        // Profile
        .route(
            "/profile",
            get(handlers::profile::get_profile).put(handlers::profile::update_profile),
        )
        .route(
            "/profile/discoveries",
            post(handlers::profile::accept_discoveries),
        )
        .route("/stats", get(handlers::stats::get_stats))
        // Admin
        .route("/admin/users", get(handlers::admin::list_users))
        .route("/admin/users/{id}", delete(handlers::admin::delete_user))
        .route("/admin/agents", get(handlers::admin::list_agents));

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
