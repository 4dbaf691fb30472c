//! Native Ollama `/api/chat` provider for local models. No API key.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use kindred_core::llm::provider::LlmProvider;
use kindred_types::llm::{CompletionRequest, CompletionResponse, LlmError, Usage};

#[derive(Debug)]
pub struct OllamaProvider {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl OllamaProvider {
    pub fn new(model: &str, base_url: &str) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| LlmError::Provider {
                message: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        })
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: Vec<OllamaMessage>,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct OllamaMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct OllamaOptions {
    temperature: f64,
    top_p: f64,
    num_predict: u32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OllamaChatResponse {
    #[serde(default)]
    model: Option<String>,
    message: OllamaMessage,
    #[serde(default)]
    prompt_eval_count: Option<u32>,
    #[serde(default)]
    eval_count: Option<u32>,
}

pub(crate) fn to_ollama_request<'a>(
    request: &CompletionRequest,
    model: &'a str,
) -> OllamaChatRequest<'a> {
    OllamaChatRequest {
        model,
        messages: request
            .messages
            .iter()
            .map(|m| OllamaMessage {
                role: m.role.to_string(),
                content: m.content.clone(),
            })
            .collect(),
        stream: false,
        options: OllamaOptions {
            temperature: request.params.temperature,
            top_p: request.params.top_p,
            num_predict: request.params.max_output_tokens,
        },
    }
}

impl LlmProvider for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let model = if request.model.is_empty() {
            self.model.as_str()
        } else {
            request.model.as_str()
        };

        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&to_ollama_request(request, model))
            .send()
            .await
            .map_err(|e| LlmError::Provider {
                message: format!("HTTP request failed: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(super::map_status(status.as_u16(), error_body));
        }

        let parsed: OllamaChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Deserialization(format!("failed to parse response: {e}")))?;

        if parsed.message.content.trim().is_empty() {
            return Err(LlmError::Provider {
                message: "ollama returned no text".to_string(),
            });
        }

        Ok(CompletionResponse {
            content: parsed.message.content,
            model: parsed.model.unwrap_or_else(|| model.to_string()),
            usage: Usage {
                input_tokens: parsed.prompt_eval_count.unwrap_or(0),
                output_tokens: parsed.eval_count.unwrap_or(0),
            },
        })
    }
}
