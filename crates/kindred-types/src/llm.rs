//! LLM request/response types for Kindred.
//!
//! These types model the data shapes for completion provider interactions:
//! turn sequences, generation parameters, usage tracking, and error handling.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role of a turn in an outbound completion request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::System => write!(f, "system"),
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
        }
    }
}

impl FromStr for MessageRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "system" => Ok(MessageRole::System),
            "user" => Ok(MessageRole::User),
            "assistant" => Ok(MessageRole::Assistant),
            other => Err(format!("invalid message role: '{other}'")),
        }
    }
}

/// A single turn in an outbound completion request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// Sampling parameters sent with every completion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    pub temperature: f64,
    pub top_p: f64,
    pub max_output_tokens: u32,
}

/// Request to a completion provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub params: GenerationParams,
}

/// Response from a completion provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub content: String,
    pub model: String,
    #[serde(default)]
    pub usage: Usage,
}

/// Token usage reported by the provider, when it reports any.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// Errors from completion provider operations.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("provider error: {message}")]
    Provider { message: String },

    #[error("deserialization error: {0}")]
    Deserialization(String),

    #[error("rate limited (retry after {retry_after_ms:?}ms)")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("provider overloaded: {0}")]
    Overloaded(String),

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("completion timed out after {0}s")]
    Timeout(u64),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Type of completion provider backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderType {
    #[default]
    Gemini,
    Ollama,
    #[serde(rename = "openai_compatible")]
    OpenAiCompatible,
}

impl ProviderType {
    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderType::Gemini => "gemini-2.5-flash",
            ProviderType::Ollama => "llama3.1:latest",
            ProviderType::OpenAiCompatible => "gpt-4o-mini",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            ProviderType::Gemini => "https://generativelanguage.googleapis.com/v1beta",
            ProviderType::Ollama => "http://127.0.0.1:11434",
            ProviderType::OpenAiCompatible => "https://api.openai.com/v1",
        }
    }

    /// Environment variable holding the API key, if the backend needs one.
    pub fn default_api_key_env(&self) -> Option<&'static str> {
        match self {
            ProviderType::Gemini => Some("GEMINI_API_KEY"),
            ProviderType::Ollama => None,
            ProviderType::OpenAiCompatible => Some("OPENAI_API_KEY"),
        }
    }
}

impl fmt::Display for ProviderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderType::Gemini => write!(f, "gemini"),
            ProviderType::Ollama => write!(f, "ollama"),
            ProviderType::OpenAiCompatible => write!(f, "openai_compatible"),
        }
    }
}

impl FromStr for ProviderType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gemini" => Ok(ProviderType::Gemini),
            "ollama" => Ok(ProviderType::Ollama),
            "openai_compatible" => Ok(ProviderType::OpenAiCompatible),
            other => Err(format!("invalid provider type: '{other}'")),
        }
    }
}

/// Which completion backend to bind for this deployment.
///
/// Unset fields fall back to the per-backend defaults on [`ProviderType`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub provider_type: ProviderType,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
    /// Name of the environment variable the API key is read from.
    #[serde(default)]
    pub api_key_env: Option<String>,
}

impl ProviderConfig {
    pub fn model(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or_else(|| self.provider_type.default_model())
    }

    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.provider_type.default_base_url())
    }

    pub fn api_key_env(&self) -> Option<&str> {
        self.api_key_env
            .as_deref()
            .or_else(|| self.provider_type.default_api_key_env())
    }
}
