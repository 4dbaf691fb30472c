//! Persona prompt enhancement via LLM.
//!
//! `PromptEnhancer` rewrites a short agent system prompt into a fuller one.
//! Unlike the reply composer, failures propagate: the caller is creating an
//! agent interactively and should see why enhancement did not work.

use tracing::{Instrument, info_span};

use kindred_types::agent::PreferredLength;
use kindred_types::llm::{CompletionRequest, GenerationParams, LlmError, Message};

use crate::compose::params::{DEFAULT_TEMPERATURE, TOP_P, max_output_tokens};
use crate::llm::box_provider::BoxLlmProvider;

const ENHANCER_INSTRUCTION: &str = r#"You are an expert AI Prompt Engineer. Your task is to rewrite the given AI system prompt to be more detailed, professional, and effective.

REWRITING RULES:
1. Maintain the original core purpose and persona of the prompt.
2. Add specific behavioral guidelines and tone instructions.
3. Use clear, structured language.
4. If the input is very short (1-5 words), expand it into a comprehensive 3-5 sentence persona.
5. Do NOT include any introductory or concluding text like "Here is the enhanced prompt:". ONLY return the enhanced prompt text itself.
6. The resulting prompt should be ready to use in a system instruction field."#;

pub struct PromptEnhancer;

impl PromptEnhancer {
    /// Build the single-turn request for `prompt`.
    pub fn build_request(prompt: &str, model: &str) -> CompletionRequest {
        let content = format!(
            "{ENHANCER_INSTRUCTION}\n\nINPUT PROMPT:\n\"{}\"\n\nENHANCED PROMPT:",
            prompt.trim()
        );
        CompletionRequest {
            model: model.to_string(),
            messages: vec![Message::user(content)],
            params: GenerationParams {
                temperature: DEFAULT_TEMPERATURE,
                top_p: TOP_P,
                max_output_tokens: max_output_tokens(PreferredLength::Medium),
            },
        }
    }

    /// Rewrite `prompt`. `model` overrides the provider's default model.
    pub async fn enhance(
        provider: &BoxLlmProvider,
        prompt: &str,
        model: Option<&str>,
    ) -> Result<String, LlmError> {
        if prompt.trim().is_empty() {
            return Err(LlmError::InvalidRequest("prompt must not be empty".to_string()));
        }

        let request = Self::build_request(prompt, model.unwrap_or_else(|| provider.model()));

        let span = info_span!(
            "gen_ai.enhance",
            gen_ai.system = provider.name(),
            gen_ai.request.model = %request.model,
            gen_ai.request.temperature = request.params.temperature,
        );

        let response = provider.complete(&request).instrument(span).await?;
        let enhanced = response.content.trim().to_string();
        if enhanced.is_empty() {
            return Err(LlmError::Provider {
                message: "model returned an empty prompt".to_string(),
            });
        }
        Ok(enhanced)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedProvider;

    #[test]
    fn test_request_shape() {
        let request = PromptEnhancer::build_request("  a pirate  ", "m");
        assert_eq!(request.model, "m");
        assert_eq!(request.messages.len(), 1);
        assert!(request.messages[0].content.contains("INPUT PROMPT:\n\"a pirate\""));
        assert!(request.messages[0].content.ends_with("ENHANCED PROMPT:"));
        assert_eq!(request.params.temperature, 0.7);
    }

    #[tokio::test]
    async fn test_enhance_trims_output() {
        let provider = BoxLlmProvider::new(ScriptedProvider::replying("\n  You are a pirate.  \n"));
        let out = PromptEnhancer::enhance(&provider, "pirate", None).await.unwrap();
        assert_eq!(out, "You are a pirate.");
    }

    #[tokio::test]
    async fn test_enhance_propagates_errors() {
        let provider = BoxLlmProvider::new(ScriptedProvider::failing());
        let err = PromptEnhancer::enhance(&provider, "pirate", None).await.unwrap_err();
        assert!(matches!(err, LlmError::Provider { .. }));
    }

    #[tokio::test]
    async fn test_enhance_rejects_blank_prompt() {
        let scripted = ScriptedProvider::replying("x");
        let provider = BoxLlmProvider::new(scripted.clone());
        let err = PromptEnhancer::enhance(&provider, "   ", None).await.unwrap_err();
        assert!(matches!(err, LlmError::InvalidRequest(_)));
        assert!(scripted.requests().is_empty());
    }

    #[tokio::test]
    async fn test_model_override() {
        let scripted = ScriptedProvider::replying("ok");
        let provider = BoxLlmProvider::new(scripted.clone());
        PromptEnhancer::enhance(&provider, "pirate", Some("big-model"))
            .await
            .unwrap();
        assert_eq!(scripted.requests()[0].model, "big-model");
    }
}
