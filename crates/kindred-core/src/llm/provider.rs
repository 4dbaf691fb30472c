//! LlmProvider trait definition.
//!
//! This is the single completion capability every backend implements.
//! Which backend is bound is decided once, by configuration, when the
//! provider is constructed.

use kindred_types::llm::{CompletionRequest, CompletionResponse, LlmError};

/// Trait for completion backends (Gemini, Ollama, OpenAI-compatible).
///
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
/// Implementations live in kindred-infra (e.g., `GeminiProvider`).
pub trait LlmProvider: Send + Sync {
    /// Human-readable provider name (e.g., "gemini", "ollama").
    fn name(&self) -> &str;

    /// Model used when a request leaves `model` empty.
    fn model(&self) -> &str;

    /// Send a completion request and receive the full response.
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl std::future::Future<Output = Result<CompletionResponse, LlmError>> + Send;
}
