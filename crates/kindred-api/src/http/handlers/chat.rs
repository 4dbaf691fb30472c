//! Chat handlers: send a message, read and clear a conversation.

use axum::Json;
use axum::extract::{Path, State};
use serde::Deserialize;

use kindred_types::agent::AgentId;
use kindred_types::chat::{ChatMessage, ChatReply};
use kindred_types::error::ChatError;

use crate::http::error::AppError;
use crate::http::extractors::auth::Authenticated;
use crate::http::response::{ApiResponse, RequestTimer};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub agent_id: AgentId,
    pub message: String,
}

fn parse_agent_id(raw: &str) -> Result<AgentId, AppError> {
    raw.parse()
        .map_err(|_| AppError::Chat(ChatError::AgentNotFound))
}

/// POST /api/v1/chat - Send one message and get the agent's reply.
///
/// Completion failures never surface here; the reply is the fallback text.
/// Discoveries are returned for the client to accept via
/// `POST /api/v1/profile/discoveries`.
pub async fn send_message(
    State(state): State<AppState>,
    Authenticated(user): Authenticated,
    Json(body): Json<SendMessageRequest>,
) -> Result<ApiResponse<ChatReply>, AppError> {
    let timer = RequestTimer::start();

    let reply = state
        .chat_service
        .send_message(&user.id, &body.agent_id, &body.message)
        .await?;

    let mut resp = timer
        .success(reply)
        .with_link("messages", &format!("/api/v1/chat/{}/messages", body.agent_id));
    if resp.data.discoveries.is_some() {
        resp = resp.with_link("accept", "/api/v1/profile/discoveries");
    }
    Ok(resp)
}

/// GET /api/v1/chat/{agent_id}/messages - Full history, oldest first.
pub async fn get_messages(
    State(state): State<AppState>,
    Authenticated(user): Authenticated,
    Path(agent_id): Path<String>,
) -> Result<ApiResponse<Vec<ChatMessage>>, AppError> {
    let timer = RequestTimer::start();
    let agent_id = parse_agent_id(&agent_id)?;
    let messages = state.chat_service.history(&user.id, &agent_id).await?;
    Ok(timer.success(messages))
}

/// DELETE /api/v1/chat/{agent_id} - Forget every message with this agent.
pub async fn clear_chat(
    State(state): State<AppState>,
    Authenticated(user): Authenticated,
    Path(agent_id): Path<String>,
) -> Result<ApiResponse<serde_json::Value>, AppError> {
    let timer = RequestTimer::start();
    let agent_id = parse_agent_id(&agent_id)?;
    let removed = state.chat_service.clear(&user.id, &agent_id).await?;
    Ok(timer.success(serde_json::json!({ "removed": removed })))
}
