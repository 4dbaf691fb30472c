//! Completion provider implementations.
//!
//! Concrete implementations of the [`LlmProvider`] trait defined in
//! `kindred-core`, a factory ([`create_provider`]) that binds exactly one of
//! them from a [`ProviderConfig`], and a connection probe
//! ([`test_provider_connection`]).
//!
//! [`LlmProvider`]: kindred_core::llm::provider::LlmProvider

pub mod gemini;
pub mod ollama;
pub mod openai_compat;

use secrecy::SecretString;

use kindred_core::llm::box_provider::BoxLlmProvider;
use kindred_types::llm::{
    CompletionRequest, GenerationParams, LlmError, Message, ProviderConfig, ProviderType,
};

use self::gemini::GeminiProvider;
use self::ollama::OllamaProvider;
use self::openai_compat::OpenAiCompatibleProvider;

/// Create a [`BoxLlmProvider`] from a [`ProviderConfig`].
///
/// Gemini and OpenAI-compatible backends require an API key; Ollama ignores it.
pub fn create_provider(
    config: &ProviderConfig,
    api_key: Option<SecretString>,
) -> Result<BoxLlmProvider, LlmError> {
    let model = config.model();
    let base_url = config.base_url();

    match config.provider_type {
        ProviderType::Gemini => {
            let key = api_key.ok_or(LlmError::AuthenticationFailed)?;
            Ok(BoxLlmProvider::new(GeminiProvider::new(key, model, base_url)?))
        }
        ProviderType::Ollama => Ok(BoxLlmProvider::new(OllamaProvider::new(model, base_url)?)),
        ProviderType::OpenAiCompatible => {
            let key = api_key.ok_or(LlmError::AuthenticationFailed)?;
            Ok(BoxLlmProvider::new(OpenAiCompatibleProvider::new(
                key, model, base_url,
            )))
        }
    }
}

/// Test provider connectivity by sending a minimal completion request.
pub async fn test_provider_connection(provider: &BoxLlmProvider) -> Result<(), LlmError> {
    let request = CompletionRequest {
        model: String::new(),
        messages: vec![Message::user("Hello")],
        params: GenerationParams {
            temperature: 0.0,
            top_p: 1.0,
            max_output_tokens: 16,
        },
    };
    provider.complete(&request).await?;
    Ok(())
}

/// Map a non-success HTTP status to an [`LlmError`].
pub(crate) fn map_status(status: u16, body: String) -> LlmError {
    match status {
        401 | 403 => LlmError::AuthenticationFailed,
        429 => LlmError::RateLimited {
            retry_after_ms: None,
        },
        503 | 529 => LlmError::Overloaded(body),
        400 | 404 => LlmError::InvalidRequest(format!("HTTP {status}: {body}")),
        _ => LlmError::Provider {
            message: format!("HTTP {status}: {body}"),
        },
    }
}
