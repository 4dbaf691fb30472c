//! Native Gemini `generateContent` provider.
//!
//! Talks to `{base_url}/models/{model}:generateContent` directly over reqwest.
//! The model role is called `model` on this API; system turns are folded into
//! user turns because the request carries the context block as a user turn.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use kindred_core::llm::provider::LlmProvider;
use kindred_types::llm::{CompletionRequest, CompletionResponse, LlmError, MessageRole, Usage};

/// Google Gemini provider.
///
/// Does NOT derive Debug: the API key must never reach logs.
pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    model: String,
}

impl GeminiProvider {
    pub fn new(api_key: SecretString, model: &str, base_url: &str) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| LlmError::Provider {
                message: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        })
    }

    fn url(&self, model: &str) -> String {
        format!("{}/models/{model}:generateContent", self.base_url)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GeminiRequest {
    contents: Vec<GeminiContent>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct GeminiContent {
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct GeminiPart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GeminiGenerationConfig {
    temperature: f64,
    top_p: f64,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    usage_metadata: Option<GeminiUsage>,
    #[serde(default)]
    model_version: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GeminiUsage {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

pub(crate) fn to_gemini_request(request: &CompletionRequest) -> GeminiRequest {
    let contents = request
        .messages
        .iter()
        .map(|msg| GeminiContent {
            role: Some(
                match msg.role {
                    MessageRole::Assistant => "model",
                    MessageRole::User | MessageRole::System => "user",
                }
                .to_string(),
            ),
            parts: vec![GeminiPart {
                text: Some(msg.content.clone()),
            }],
        })
        .collect();

    GeminiRequest {
        contents,
        generation_config: GeminiGenerationConfig {
            temperature: request.params.temperature,
            top_p: request.params.top_p,
            max_output_tokens: request.params.max_output_tokens,
        },
    }
}

/// Concatenate the text parts of the first candidate.
pub(crate) fn from_gemini_response(
    response: GeminiResponse,
    model: &str,
) -> Result<CompletionResponse, LlmError> {
    let content = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| {
            c.parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    if content.trim().is_empty() {
        return Err(LlmError::Provider {
            message: "gemini returned no text".to_string(),
        });
    }

    let usage = response
        .usage_metadata
        .map(|u| Usage {
            input_tokens: u.prompt_token_count,
            output_tokens: u.candidates_token_count,
        })
        .unwrap_or_default();

    Ok(CompletionResponse {
        content,
        model: response.model_version.unwrap_or_else(|| model.to_string()),
        usage,
    })
}

impl LlmProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
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
        let body = to_gemini_request(request);

        let response = self
            .client
            .post(self.url(model))
            .header("x-goog-api-key", self.api_key.expose_secret())
            .json(&body)
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

        let parsed: GeminiResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Deserialization(format!("failed to parse response: {e}")))?;

        from_gemini_response(parsed, model)
    }
}
