//! BoxLlmProvider -- object-safe dynamic dispatch wrapper for LlmProvider.
//!
//! 1. Define an object-safe `LlmProviderDyn` trait with boxed futures
//! 2. Blanket-impl `LlmProviderDyn` for all `T: LlmProvider`
//! 3. `BoxLlmProvider` wraps `Box<dyn LlmProviderDyn>` and delegates

use std::future::Future;
use std::pin::Pin;

use kindred_types::llm::{CompletionRequest, CompletionResponse, LlmError};

use super::provider::LlmProvider;

/// Object-safe version of [`LlmProvider`] with boxed futures.
pub trait LlmProviderDyn: Send + Sync {
    fn name(&self) -> &str;

    fn model(&self) -> &str;

    fn complete_boxed<'a>(
        &'a self,
        request: &'a CompletionRequest,
    ) -> Pin<Box<dyn Future<Output = Result<CompletionResponse, LlmError>> + Send + 'a>>;
}

impl<T: LlmProvider> LlmProviderDyn for T {
    fn name(&self) -> &str {
        LlmProvider::name(self)
    }

    fn model(&self) -> &str {
        LlmProvider::model(self)
    }

    fn complete_boxed<'a>(
        &'a self,
        request: &'a CompletionRequest,
    ) -> Pin<Box<dyn Future<Output = Result<CompletionResponse, LlmError>> + Send + 'a>> {
        Box::pin(self.complete(request))
    }
}

/// Type-erased completion provider for runtime backend selection.
///
/// Since `LlmProvider` uses RPITIT, it cannot be used as a trait object directly.
/// `BoxLlmProvider` provides equivalent methods that delegate to the inner
/// `LlmProviderDyn` trait object.
pub struct BoxLlmProvider {
    inner: Box<dyn LlmProviderDyn + Send + Sync>,
}

impl BoxLlmProvider {
    /// Wrap a concrete `LlmProvider` in a type-erased box.
    pub fn new<T: LlmProvider + 'static>(provider: T) -> Self {
        Self {
            inner: Box::new(provider),
        }
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    pub fn model(&self) -> &str {
        self.inner.model()
    }

    /// Send a completion request and receive the full response.
    pub async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, LlmError> {
        self.inner.complete_boxed(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kindred_types::llm::{GenerationParams, Message, Usage};

    struct EchoProvider;

    impl LlmProvider for EchoProvider {
        fn name(&self) -> &str {
            "echo"
        }

        fn model(&self) -> &str {
            "echo-1"
        }

        fn complete(
            &self,
            request: &CompletionRequest,
        ) -> impl Future<Output = Result<CompletionResponse, LlmError>> + Send {
            let last = request
                .messages
                .last()
                .map(|m| m.content.clone())
                .unwrap_or_default();
            let model = request.model.clone();
            async move {
                Ok(CompletionResponse {
                    content: last,
                    model,
                    usage: Usage::default(),
                })
            }
        }
    }

    #[tokio::test]
    async fn test_box_provider_delegates() {
        let provider = BoxLlmProvider::new(EchoProvider);
        assert_eq!(provider.name(), "echo");
        assert_eq!(provider.model(), "echo-1");

        let request = CompletionRequest {
            model: "echo-1".to_string(),
            messages: vec![Message::user("ping")],
            params: GenerationParams {
                temperature: 0.7,
                top_p: 0.9,
                max_output_tokens: 16,
            },
        };
        let response = provider.complete(&request).await.unwrap();
        assert_eq!(response.content, "ping");
        assert_eq!(response.model, "echo-1");
    }
}
