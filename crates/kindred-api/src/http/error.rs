//! Application error type mapping to HTTP status codes and envelope format.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use kindred_types::error::{AgentError, ChatError, UserError};
use kindred_types::llm::LlmError;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    Agent(AgentError),
    User(UserError),
    Chat(ChatError),
    /// Completion provider failure surfaced directly (prompt enhancement).
    Llm(LlmError),
    /// Missing or unknown API key.
    Unauthorized(String),
    /// Authenticated, but not allowed.
    Forbidden(String),
    Validation(String),
    Internal(String),
}

impl From<AgentError> for AppError {
    fn from(e: AgentError) -> Self {
        AppError::Agent(e)
    }
}

impl From<UserError> for AppError {
    fn from(e: UserError) -> Self {
        AppError::User(e)
    }
}

impl From<ChatError> for AppError {
    fn from(e: ChatError) -> Self {
        AppError::Chat(e)
    }
}

impl From<LlmError> for AppError {
    fn from(e: LlmError) -> Self {
        AppError::Llm(e)
    }
}

impl AppError {
    /// HTTP status, machine-readable code and message for this error.
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Agent(AgentError::NotFound) | AppError::Chat(ChatError::AgentNotFound) => {
                (StatusCode::NOT_FOUND, "AGENT_NOT_FOUND", "Agent not found".to_string())
            }
            AppError::Agent(AgentError::InvalidInput(msg))
            | AppError::User(UserError::InvalidInput(msg)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            AppError::Agent(e @ AgentError::Forbidden)
            | AppError::Agent(e @ AgentError::DefaultAgentImmutable) => {
                (StatusCode::FORBIDDEN, "FORBIDDEN", e.to_string())
            }
            AppError::Agent(e) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "AGENT_ERROR", e.to_string())
            }
            AppError::User(UserError::NotFound) | AppError::Chat(ChatError::UserNotFound) => {
                (StatusCode::NOT_FOUND, "USER_NOT_FOUND", "User not found".to_string())
            }
            AppError::User(e @ UserError::EmailConflict(_)) => {
                (StatusCode::CONFLICT, "EMAIL_CONFLICT", e.to_string())
            }
            AppError::User(e) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "USER_ERROR", e.to_string())
            }
            AppError::Chat(e @ ChatError::EmptyMessage) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", e.to_string())
            }
            AppError::Chat(e @ ChatError::Forbidden) => {
                (StatusCode::FORBIDDEN, "FORBIDDEN", e.to_string())
            }
            AppError::Chat(e) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "CHAT_ERROR", e.to_string())
            }
            AppError::Llm(e @ LlmError::InvalidRequest(_)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", e.to_string())
            }
            AppError::Llm(e @ LlmError::RateLimited { .. }) => {
                (StatusCode::TOO_MANY_REQUESTS, "PROVIDER_RATE_LIMITED", e.to_string())
            }
            AppError::Llm(e @ LlmError::Timeout(_)) => {
                (StatusCode::GATEWAY_TIMEOUT, "PROVIDER_TIMEOUT", e.to_string())
            }
            AppError::Llm(e) => (StatusCode::BAD_GATEWAY, "PROVIDER_ERROR", e.to_string()),
            AppError::Unauthorized(msg) => {
                (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
            }
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            AppError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg.clone())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();
        if status.is_server_error() {
            tracing::error!(code, %message, "Request failed");
        }

        let body = json!({
            "data": null,
            "meta": {
                "request_id": "",
                "timestamp": chrono::Utc::now().to_rfc3339(),
                "response_time_ms": 0
            },
            "errors": [{
                "code": code,
                "message": message,
            }]
        });

        (
            status,
            [(axum::http::header::CONTENT_TYPE, "application/json")],
            body.to_string(),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(AppError::from(AgentError::NotFound).parts().0, StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::from(AgentError::DefaultAgentImmutable).parts().0,
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::from(UserError::EmailConflict("a@b.co".into())).parts().0,
            StatusCode::CONFLICT
        );
        assert_eq!(AppError::from(ChatError::EmptyMessage).parts().0, StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::from(LlmError::AuthenticationFailed).parts().0,
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_storage_errors_are_server_errors() {
        let (status, code, _) = AppError::from(ChatError::StorageError("disk".into())).parts();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(code, "CHAT_ERROR");
    }
}
