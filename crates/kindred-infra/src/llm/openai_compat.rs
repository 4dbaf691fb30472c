//! OpenAI-compatible chat-completions provider.
//!
//! One adapter for any endpoint that speaks the OpenAI chat API (OpenAI,
//! Mistral, LM Studio, vLLM and friends), selected by base URL.

use async_openai::config::OpenAIConfig;
use async_openai::types::chat::{
    ChatCompletionRequestAssistantMessage, ChatCompletionRequestAssistantMessageContent,
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
    ChatCompletionRequestSystemMessageContent, ChatCompletionRequestUserMessage,
    ChatCompletionRequestUserMessageContent, CreateChatCompletionRequest,
};
use async_openai::Client;
use secrecy::{ExposeSecret, SecretString};

use kindred_core::llm::provider::LlmProvider;
use kindred_types::llm::{
    CompletionRequest, CompletionResponse, LlmError, Message, MessageRole, Usage,
};

/// Provider for any OpenAI-compatible API.
///
/// Does NOT derive Debug: the API key lives inside the `async_openai::Client`.
pub struct OpenAiCompatibleProvider {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiCompatibleProvider {
    pub fn new(api_key: SecretString, model: &str, base_url: &str) -> Self {
        let config = OpenAIConfig::new()
            .with_api_key(api_key.expose_secret())
            .with_api_base(base_url.trim_end_matches('/'));

        Self {
            client: Client::with_config(config),
            model: model.to_string(),
        }
    }

    fn build_request(&self, request: &CompletionRequest) -> CreateChatCompletionRequest {
        let model = if request.model.is_empty() {
            self.model.clone()
        } else {
            request.model.clone()
        };

        CreateChatCompletionRequest {
            model,
            messages: request.messages.iter().map(to_openai_message).collect(),
            max_completion_tokens: Some(request.params.max_output_tokens),
            temperature: Some(request.params.temperature as f32),
            top_p: Some(request.params.top_p as f32),
            ..Default::default()
        }
    }
}

fn to_openai_message(msg: &Message) -> ChatCompletionRequestMessage {
    match msg.role {
        MessageRole::System => {
            ChatCompletionRequestMessage::System(ChatCompletionRequestSystemMessage {
                content: ChatCompletionRequestSystemMessageContent::Text(msg.content.clone()),
                name: None,
            })
        }
        MessageRole::User => ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
            content: ChatCompletionRequestUserMessageContent::Text(msg.content.clone()),
            name: None,
        }),
        MessageRole::Assistant => {
            #[allow(deprecated)]
            ChatCompletionRequestMessage::Assistant(ChatCompletionRequestAssistantMessage {
                content: Some(ChatCompletionRequestAssistantMessageContent::Text(
                    msg.content.clone(),
                )),
                refusal: None,
                name: None,
                audio: None,
                tool_calls: None,
                function_call: None,
            })
        }
    }
}

impl LlmProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        "openai_compatible"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let response = self
            .client
            .chat()
            .create(self.build_request(request))
            .await
            .map_err(map_openai_error)?;

        let content = response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .unwrap_or_default();

        if content.trim().is_empty() {
            return Err(LlmError::Provider {
                message: "provider returned no text".to_string(),
            });
        }

        let usage = response
            .usage
            .map(|u| Usage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            })
            .unwrap_or_default();

        Ok(CompletionResponse {
            content,
            model: response.model,
            usage,
        })
    }
}

/// Map an `async_openai::error::OpenAIError` to an [`LlmError`].
fn map_openai_error(err: async_openai::error::OpenAIError) -> LlmError {
    use async_openai::error::OpenAIError;

    match &err {
        OpenAIError::ApiError(api_err) => {
            let code = api_err.code.as_deref().unwrap_or("");
            let error_type = api_err.r#type.as_deref().unwrap_or("");

            if code == "invalid_api_key"
                || error_type == "authentication_error"
                || api_err.message.contains("Incorrect API key")
            {
                LlmError::AuthenticationFailed
            } else if code == "rate_limit_exceeded" || error_type == "rate_limit_error" {
                LlmError::RateLimited {
                    retry_after_ms: None,
                }
            } else if code == "server_error" || error_type == "overloaded_error" {
                LlmError::Overloaded(api_err.message.clone())
            } else {
                LlmError::Provider {
                    message: err.to_string(),
                }
            }
        }
        OpenAIError::Reqwest(reqwest_err) => match reqwest_err.status() {
            Some(status) => super::map_status(status.as_u16(), err.to_string()),
            None => LlmError::Provider {
                message: err.to_string(),
            },
        },
        OpenAIError::JSONDeserialize(_, content) => {
            LlmError::Deserialization(format!("failed to parse response: {content}"))
        }
        OpenAIError::InvalidArgument(msg) => LlmError::InvalidRequest(msg.clone()),
        _ => LlmError::Provider {
            message: err.to_string(),
        },
    }
}
