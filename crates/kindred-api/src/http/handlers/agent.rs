//! Agent handlers for the REST API.

use axum::Json;
use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};

use kindred_core::enhance::PromptEnhancer;
use kindred_types::agent::{Agent, AgentId, CreateAgentRequest};
use kindred_types::error::AgentError;

use crate::http::error::AppError;
use crate::http::extractors::auth::Authenticated;
use crate::http::response::{ApiResponse, RequestTimer};
use crate::state::AppState;

/// GET /api/v1/agents - Agents the caller can chat with.
pub async fn list_agents(
    State(state): State<AppState>,
    Authenticated(user): Authenticated,
) -> Result<ApiResponse<Vec<Agent>>, AppError> {
    let timer = RequestTimer::start();
    let agents = state.agent_service.list_visible(&user.id).await?;
    Ok(timer.success(agents).with_link("self", "/api/v1/agents"))
}

/// POST /api/v1/agents - Create a custom agent owned by the caller.
pub async fn create_agent(
    State(state): State<AppState>,
    Authenticated(user): Authenticated,
    Json(body): Json<CreateAgentRequest>,
) -> Result<ApiResponse<Agent>, AppError> {
    let timer = RequestTimer::start();
    let agent = state.agent_service.create_agent(&user, body).await?;
    let chat_link = format!("/api/v1/chat/{}/messages", agent.id);

    Ok(timer
        .success(agent)
        .created()
        .with_link("messages", &chat_link))
}

/// DELETE /api/v1/agents/{id} - Delete one of the caller's agents.
pub async fn delete_agent(
    State(state): State<AppState>,
    Authenticated(user): Authenticated,
    Path(id): Path<String>,
) -> Result<ApiResponse<serde_json::Value>, AppError> {
    let timer = RequestTimer::start();
    let id: AgentId = id.parse().map_err(|_| AppError::Agent(AgentError::NotFound))?;

    state.agent_service.delete_agent(&user, &id).await?;

    Ok(timer.success(serde_json::json!({ "deleted": true, "id": id.to_string() })))
}

#[derive(Debug, Deserialize)]
pub struct EnhanceRequest {
    pub prompt: String,
}

#[derive(Debug, Serialize)]
pub struct EnhanceResponse {
    pub enhanced_prompt: String,
}

/// POST /api/v1/agents/enhance - Rewrite a short persona prompt.
pub async fn enhance_prompt(
    State(state): State<AppState>,
    _auth: Authenticated,
    Json(body): Json<EnhanceRequest>,
) -> Result<ApiResponse<EnhanceResponse>, AppError> {
    let timer = RequestTimer::start();
    let enhanced_prompt = PromptEnhancer::enhance(
        &state.provider,
        &body.prompt,
        state.config.enhancer_model.as_deref(),
    )
    .await?;
    Ok(timer.success(EnhanceResponse { enhanced_prompt }))
}
