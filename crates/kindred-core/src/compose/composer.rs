//! Reply composer.
//!
//! One call per inbound message: build the context block, replay history,
//! pick generation parameters, call the completion provider once under a
//! bounded timeout, and split the discovery block off the raw text.
//!
//! `compose` never returns an error. Any provider failure or timeout is
//! logged and replaced with [`FALLBACK_REPLY`].

use std::sync::Arc;
use std::time::Duration;

use tracing::{Instrument, field, info, info_span};

use kindred_types::agent::{Agent, PreferredLength};
use kindred_types::chat::{ChatMessage, ChatRole, ComposedReply};
use kindred_types::emotion::Emotion;
use kindred_types::llm::{CompletionRequest, LlmError, Message};
use kindred_types::user::UserProfile;

use crate::llm::box_provider::BoxLlmProvider;

use super::discovery::parse_reply;
use super::params;
use super::prompt::ContextBlockBuilder;

/// Visible reply whenever the completion call fails.
pub const FALLBACK_REPLY: &str =
    "I'm here with you. Something went wrong on my side, but we can keep talking.";

/// Stateless composer bound to one completion provider.
pub struct ReplyComposer {
    provider: Arc<BoxLlmProvider>,
    timeout: Duration,
}

impl ReplyComposer {
    pub fn new(provider: Arc<BoxLlmProvider>, timeout: Duration) -> Self {
        Self { provider, timeout }
    }

    pub fn provider(&self) -> &BoxLlmProvider {
        &self.provider
    }

    /// Assemble the outbound request without sending it.
    ///
    /// The first turn carries the context block in the user role; every
    /// history entry follows in original order, whatever its role pattern.
    pub fn build_request(
        &self,
        agent: &Agent,
        history: &[ChatMessage],
        emotion: Emotion,
        profile: Option<&UserProfile>,
        preferred_length: PreferredLength,
    ) -> CompletionRequest {
        let context = ContextBlockBuilder::build(
            &agent.system_prompt,
            emotion,
            profile,
            preferred_length,
        );

        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(Message::user(context));
        messages.extend(history.iter().map(|m| match m.role {
            ChatRole::User => Message::user(m.content.clone()),
            ChatRole::Assistant => Message::assistant(m.content.clone()),
        }));

        CompletionRequest {
            model: self.provider.model().to_string(),
            messages,
            params: params::select(emotion, preferred_length),
        }
    }

    /// Produce the visible reply and any discoveries for one turn.
    pub async fn compose(
        &self,
        agent: &Agent,
        history: &[ChatMessage],
        emotion: Emotion,
        profile: Option<&UserProfile>,
        preferred_length: PreferredLength,
    ) -> ComposedReply {
        let request = self.build_request(agent, history, emotion, profile, preferred_length);

        let span = info_span!(
            "gen_ai.compose",
            gen_ai.system = self.provider.name(),
            gen_ai.request.model = %request.model,
            gen_ai.request.temperature = request.params.temperature,
            gen_ai.request.top_p = request.params.top_p,
            gen_ai.request.max_tokens = request.params.max_output_tokens,
            gen_ai.usage.input_tokens = field::Empty,
            gen_ai.usage.output_tokens = field::Empty,
            agent_id = %agent.id,
            emotion = %emotion,
            history_len = history.len(),
        );

        async {
            let raw = match self.complete_with_timeout(&request).await {
                Ok(raw) => raw,
                Err(e) => {
                    tracing::error!(
                        error = %e,
                        provider = self.provider.name(),
                        "Completion failed; returning fallback reply"
                    );
                    return ComposedReply {
                        reply: FALLBACK_REPLY.to_string(),
                        discoveries: None,
                    };
                }
            };

            let composed = parse_reply(&raw);
            if let Some(found) = &composed.discoveries {
                info!(
                    interests = found.interests.len(),
                    personality_traits = found.personality_traits.len(),
                    "Model reported discoveries"
                );
            }
            composed
        }
        .instrument(span)
        .await
    }

    async fn complete_with_timeout(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        let response = tokio::time::timeout(self.timeout, self.provider.complete(request))
            .await
            .map_err(|_| LlmError::Timeout(self.timeout.as_secs()))??;

        let span = tracing::Span::current();
        span.record("gen_ai.usage.input_tokens", response.usage.input_tokens);
        span.record("gen_ai.usage.output_tokens", response.usage.output_tokens);

        Ok(response.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::Future;
    use std::sync::Mutex;

    use chrono::Utc;
    use kindred_types::agent::{AgentId, OwnerType};
    use kindred_types::llm::{CompletionResponse, MessageRole, Usage};
    use uuid::Uuid;

    use crate::llm::provider::LlmProvider;

    // --- Mock providers ---

    #[derive(Clone)]
    enum Script {
        Reply(String),
        Fail,
        Hang,
    }

    struct ScriptedProvider {
        script: Script,
        seen: Arc<Mutex<Vec<CompletionRequest>>>,
    }

    impl LlmProvider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        fn model(&self) -> &str {
            "scripted-1"
        }

        fn complete(
            &self,
            request: &CompletionRequest,
        ) -> impl Future<Output = Result<CompletionResponse, LlmError>> + Send {
            self.seen.lock().unwrap().push(request.clone());
            let script = self.script.clone();
            async move {
                match script {
                    Script::Reply(content) => Ok(CompletionResponse {
                        content,
                        model: "scripted-1".to_string(),
                        usage: Usage {
                            input_tokens: 10,
                            output_tokens: 5,
                        },
                    }),
                    Script::Fail => Err(LlmError::Provider {
                        message: "quota exceeded".to_string(),
                    }),
                    Script::Hang => std::future::pending().await,
                }
            }
        }
    }

    fn composer(script: Script) -> (ReplyComposer, Arc<Mutex<Vec<CompletionRequest>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let provider = ScriptedProvider {
            script,
            seen: seen.clone(),
        };
        let composer = ReplyComposer::new(
            Arc::new(BoxLlmProvider::new(provider)),
            Duration::from_millis(50),
        );
        (composer, seen)
    }

    fn agent() -> Agent {
        let now = Utc::now();
        Agent {
            id: AgentId::new(),
            name: "Empathy AI".to_string(),
            description: String::new(),
            system_prompt: "You are a warm listener.".to_string(),
            icon: "Heart".to_string(),
            color: "from-pink-500 to-rose-500".to_string(),
            preferred_length: PreferredLength::Medium,
            is_default: true,
            is_custom: false,
            is_public: true,
            owner_id: None,
            owner_type: OwnerType::Admin,
            created_at: now,
            updated_at: now,
        }
    }

    fn history() -> Vec<ChatMessage> {
        let conv = Uuid::now_v7();
        vec![
            ChatMessage::new(conv, ChatRole::User, "hi".to_string(), Emotion::Neutral),
            ChatMessage::new(conv, ChatRole::Assistant, "hello!".to_string(), Emotion::Neutral),
            ChatMessage::new(conv, ChatRole::User, "I feel lonely".to_string(), Emotion::Lonely),
        ]
    }

    #[tokio::test]
    async fn test_provider_failure_yields_fallback() {
        let (composer, _) = composer(Script::Fail);
        let out = composer
            .compose(&agent(), &history(), Emotion::Lonely, None, PreferredLength::Medium)
            .await;
        assert_eq!(out.reply, FALLBACK_REPLY);
        assert!(out.discoveries.is_none());
    }

    #[tokio::test]
    async fn test_timeout_yields_fallback() {
        let (composer, _) = composer(Script::Hang);
        let out = composer
            .compose(&agent(), &history(), Emotion::Happy, None, PreferredLength::Small)
            .await;
        assert_eq!(out.reply, FALLBACK_REPLY);
        assert!(out.discoveries.is_none());
    }

    #[tokio::test]
    async fn test_discoveries_extracted_and_stripped() {
        let raw = "Chess is a great way to unwind.\n:::DISCOVERY:::\n{\"interests\":[\"X\"],\"personalityTraits\":[]}\n:::";
        let (composer, _) = composer(Script::Reply(raw.to_string()));
        let out = composer
            .compose(&agent(), &history(), Emotion::Happy, None, PreferredLength::Medium)
            .await;
        assert_eq!(out.discoveries.unwrap().interests, vec!["X"]);
        assert!(!out.reply.contains(":::DISCOVERY:::"));
        assert_eq!(out.reply, "Chess is a great way to unwind.");
    }

    #[tokio::test]
    async fn test_plain_reply_passes_through() {
        let raw = "Just a normal answer.\n";
        let (composer, _) = composer(Script::Reply(raw.to_string()));
        let out = composer
            .compose(&agent(), &[], Emotion::Neutral, None, PreferredLength::Medium)
            .await;
        assert_eq!(out.reply, raw);
        assert!(out.discoveries.is_none());
    }

    #[tokio::test]
    async fn test_lonely_uses_gentle_temperature() {
        let (composer, seen) = composer(Script::Reply("ok".to_string()));
        composer
            .compose(&agent(), &history(), Emotion::Lonely, None, PreferredLength::Small)
            .await;
        composer
            .compose(&agent(), &history(), Emotion::Happy, None, PreferredLength::Long)
            .await;

        let seen = seen.lock().unwrap();
        assert_eq!(seen[0].params.temperature, 0.4);
        assert_eq!(seen[0].params.max_output_tokens, 512);
        assert_eq!(seen[1].params.temperature, 0.7);
        assert_eq!(seen[1].params.max_output_tokens, 8192);
        assert_eq!(seen[1].params.top_p, 0.9);
    }

    #[test]
    fn test_turn_sequence() {
        let (composer, _) = composer(Script::Reply("ok".to_string()));
        let request = composer.build_request(
            &agent(),
            &history(),
            Emotion::Lonely,
            None,
            PreferredLength::Medium,
        );

        assert_eq!(request.model, "scripted-1");
        assert_eq!(request.messages.len(), 4);
        assert_eq!(request.messages[0].role, MessageRole::User);
        assert!(request.messages[0]
            .content
            .starts_with("SYSTEM INSTRUCTION: You are a warm listener."));

        let replay: Vec<(MessageRole, &str)> = request.messages[1..]
            .iter()
            .map(|m| (m.role, m.content.as_str()))
            .collect();
        assert_eq!(
            replay,
            vec![
                (MessageRole::User, "hi"),
                (MessageRole::Assistant, "hello!"),
                (MessageRole::User, "I feel lonely"),
            ]
        );
    }

    #[test]
    fn test_irregular_history_order_tolerated() {
        let conv = Uuid::now_v7();
        let history = vec![
            ChatMessage::new(conv, ChatRole::Assistant, "a1".to_string(), Emotion::Neutral),
            ChatMessage::new(conv, ChatRole::Assistant, "a2".to_string(), Emotion::Neutral),
            ChatMessage::new(conv, ChatRole::User, "u1".to_string(), Emotion::Neutral),
            ChatMessage::new(conv, ChatRole::User, "u2".to_string(), Emotion::Neutral),
        ];
        let (composer, _) = composer(Script::Reply("ok".to_string()));
        let request =
            composer.build_request(&agent(), &history, Emotion::Neutral, None, PreferredLength::Medium);
        let roles: Vec<MessageRole> = request.messages.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![
                MessageRole::User,
                MessageRole::Assistant,
                MessageRole::Assistant,
                MessageRole::User,
                MessageRole::User,
            ]
        );
    }

    #[tokio::test]
    async fn test_idempotent_with_deterministic_provider() {
        let raw = "Hey!\n:::DISCOVERY:::{\"personalityTraits\":[\"playful\"]}:::";
        let (composer, _) = composer(Script::Reply(raw.to_string()));
        let a = agent();
        let h = history();
        let first = composer
            .compose(&a, &h, Emotion::Happy, None, PreferredLength::Medium)
            .await;
        let second = composer
            .compose(&a, &h, Emotion::Happy, None, PreferredLength::Medium)
            .await;
        assert_eq!(first, second);
    }
}
