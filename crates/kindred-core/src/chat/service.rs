//! Chat service.
//!
//! Owns the read-then-append discipline around the composer: every
//! `send_message` on the same `(user, agent)` conversation runs under a
//! per-conversation async lock, so at most one composer call appends to a
//! conversation at a time.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;

use kindred_types::agent::{Agent, AgentId};
use kindred_types::chat::{ChatMessage, ChatReply, ChatRole, DashboardStats};
use kindred_types::error::{ChatError, RepositoryError};
use kindred_types::user::UserId;

use crate::compose::composer::ReplyComposer;
use crate::emotion::tagger::EmotionTagger;
use crate::repository::agent::{AgentFilter, AgentRepository};
use crate::repository::conversation::ConversationRepository;
use crate::repository::user::UserRepository;

type ConversationKey = (UserId, AgentId);

/// Service driving one chat turn end to end.
pub struct ChatService<A: AgentRepository, U: UserRepository, C: ConversationRepository> {
    agent_repo: A,
    user_repo: U,
    conversation_repo: C,
    composer: ReplyComposer,
    /// Most recent messages replayed per turn; 0 = all.
    max_history_messages: u32,
    locks: DashMap<ConversationKey, Arc<Mutex<()>>>,
}

impl<A: AgentRepository, U: UserRepository, C: ConversationRepository> ChatService<A, U, C> {
    pub fn new(
        agent_repo: A,
        user_repo: U,
        conversation_repo: C,
        composer: ReplyComposer,
        max_history_messages: u32,
    ) -> Self {
        Self {
            agent_repo,
            user_repo,
            conversation_repo,
            composer,
            max_history_messages,
            locks: DashMap::new(),
        }
    }

    pub fn composer(&self) -> &ReplyComposer {
        &self.composer
    }

    /// Handle one inbound user message and return the assistant's reply.
    ///
    /// The user message is stored before composing and the cleaned reply is
    /// stored after, both tagged with the inbound emotion. Discoveries are
    /// returned to the caller and not merged into the profile here.
    #[tracing::instrument(skip(self, text), fields(user_id = %user_id, agent_id = %agent_id))]
    pub async fn send_message(
        &self,
        user_id: &UserId,
        agent_id: &AgentId,
        text: &str,
    ) -> Result<ChatReply, ChatError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        let agent = self.visible_agent(user_id, agent_id).await?;
        let user = self
            .user_repo
            .get_by_id(user_id)
            .await
            .map_err(storage)?
            .ok_or(ChatError::UserNotFound)?;

        let reading = EmotionTagger::tag(text);
        tracing::debug!(emotion = %reading.label, intensity = %reading.intensity, "Tagged message");

        let entry = LockEntry {
            locks: &self.locks,
            key: (*user_id, *agent_id),
        };
        let lock = self.locks.entry(entry.key).or_default().clone();
        let _guard = lock.lock().await;

        let conversation = self
            .conversation_repo
            .get_or_create(user_id, agent_id)
            .await
            .map_err(storage)?;

        let inbound = ChatMessage::new(
            conversation.id,
            ChatRole::User,
            text.to_string(),
            reading.label,
        );
        self.conversation_repo
            .append(&inbound)
            .await
            .map_err(storage)?;

        let limit = (self.max_history_messages > 0).then_some(self.max_history_messages);
        let history = self
            .conversation_repo
            .messages(&conversation.id, limit)
            .await
            .map_err(storage)?;

        let composed = self
            .composer
            .compose(
                &agent,
                &history,
                reading.label,
                Some(&user),
                agent.preferred_length,
            )
            .await;

        let outbound = ChatMessage::new(
            conversation.id,
            ChatRole::Assistant,
            composed.reply.clone(),
            reading.label,
        );
        self.conversation_repo
            .append(&outbound)
            .await
            .map_err(storage)?;

        Ok(ChatReply {
            reply: composed.reply,
            emotion: reading,
            discoveries: composed.discoveries,
        })
    }

    /// Full message log for the pair, oldest first. Empty if never chatted.
    pub async fn history(
        &self,
        user_id: &UserId,
        agent_id: &AgentId,
    ) -> Result<Vec<ChatMessage>, ChatError> {
        let Some(conversation) = self
            .conversation_repo
            .find(user_id, agent_id)
            .await
            .map_err(storage)?
        else {
            return Ok(Vec::new());
        };

        self.conversation_repo
            .messages(&conversation.id, None)
            .await
            .map_err(storage)
    }

    /// Remove every message with this agent. Returns the number removed.
    pub async fn clear(&self, user_id: &UserId, agent_id: &AgentId) -> Result<u64, ChatError> {
        let removed = self
            .conversation_repo
            .clear(user_id, agent_id)
            .await
            .map_err(storage)?;
        tracing::info!(user_id = %user_id, agent_id = %agent_id, removed, "Cleared conversation");
        Ok(removed)
    }

    pub async fn dashboard(&self, user_id: &UserId) -> Result<DashboardStats, ChatError> {
        let total_chats = self
            .conversation_repo
            .count_for_user(user_id)
            .await
            .map_err(storage)?;

        let visible = self
            .agent_repo
            .list(Some(AgentFilter {
                visible_to: Some(*user_id),
                ..Default::default()
            }))
            .await
            .map_err(storage)?;

        let default_agents = visible.iter().filter(|a| a.is_default).count() as u64;
        Ok(DashboardStats {
            total_chats,
            default_agents,
            custom_agents: visible.len() as u64 - default_agents,
        })
    }

    async fn visible_agent(&self, user_id: &UserId, agent_id: &AgentId) -> Result<Agent, ChatError> {
        let agent = self
            .agent_repo
            .get_by_id(agent_id)
            .await
            .map_err(storage)?
            .ok_or(ChatError::AgentNotFound)?;

        if !agent.is_visible_to(user_id) {
            return Err(ChatError::Forbidden);
        }
        Ok(agent)
    }
}

/// Drops the conversation's lock entry once no other send holds it.
///
/// Declared before the lock handle and its guard so it drops after both,
/// on success, error and cancellation alike.
struct LockEntry<'a> {
    locks: &'a DashMap<ConversationKey, Arc<Mutex<()>>>,
    key: ConversationKey,
}

impl Drop for LockEntry<'_> {
    fn drop(&mut self) {
        self.locks
            .remove_if(&self.key, |_, lock| Arc::strong_count(lock) == 1);
    }
}

fn storage(e: RepositoryError) -> ChatError {
    ChatError::StorageError(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use kindred_types::emotion::Emotion;
    use kindred_types::user::UserRole;

    use crate::compose::composer::FALLBACK_REPLY;
    use crate::llm::box_provider::BoxLlmProvider;
    use crate::testing::{
        InMemoryAgentRepository, InMemoryConversationRepository, InMemoryUserRepository,
        ScriptedProvider, agent, user,
    };

    struct Fixture {
        service: ChatService<InMemoryAgentRepository, InMemoryUserRepository, InMemoryConversationRepository>,
        agents: InMemoryAgentRepository,
        users: InMemoryUserRepository,
        conversations: InMemoryConversationRepository,
        provider: ScriptedProvider,
    }

    fn fixture(provider: ScriptedProvider, max_history: u32) -> Fixture {
        let agents = InMemoryAgentRepository::default();
        let users = InMemoryUserRepository::default();
        let conversations = InMemoryConversationRepository::default();
        let composer = ReplyComposer::new(
            Arc::new(BoxLlmProvider::new(provider.clone())),
            Duration::from_millis(100),
        );
        let service = ChatService::new(
            agents.clone(),
            users.clone(),
            conversations.clone(),
            composer,
            max_history,
        );
        Fixture {
            service,
            agents,
            users,
            conversations,
            provider,
        }
    }

    #[tokio::test]
    async fn test_send_message_round_trip() {
        let raw = "So glad to hear it!\n:::DISCOVERY:::{\"interests\":[\"painting\"]}:::";
        let f = fixture(ScriptedProvider::replying(raw), 50);
        let me = f.users.insert(user(UserRole::User));
        let luna = f.agents.insert(agent(Some(me.id), false));

        let reply = f
            .service
            .send_message(&me.id, &luna.id, "I'm so happy, I started painting")
            .await
            .unwrap();

        assert_eq!(reply.reply, "So glad to hear it!");
        assert_eq!(reply.emotion.label, Emotion::Happy);
        assert_eq!(reply.discoveries.unwrap().interests, vec!["painting"]);

        let history = f.service.history(&me.id, &luna.id).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, ChatRole::User);
        assert_eq!(history[1].role, ChatRole::Assistant);
        assert_eq!(history[1].content, "So glad to hear it!");
        assert_eq!(history[1].emotion, Emotion::Happy);
    }

    #[tokio::test]
    async fn test_new_message_reaches_the_model() {
        let f = fixture(ScriptedProvider::replying("ok"), 50);
        let me = f.users.insert(user(UserRole::User));
        let luna = f.agents.insert(agent(Some(me.id), false));

        f.service.send_message(&me.id, &luna.id, "first").await.unwrap();
        f.service.send_message(&me.id, &luna.id, "second").await.unwrap();

        let seen = f.provider.requests();
        let last = seen.last().unwrap();
        // context block + first, ok, second
        assert_eq!(last.messages.len(), 4);
        assert_eq!(last.messages[3].content, "second");
    }

    #[tokio::test]
    async fn test_history_window_is_bounded() {
        let f = fixture(ScriptedProvider::replying("ok"), 3);
        let me = f.users.insert(user(UserRole::User));
        let luna = f.agents.insert(agent(Some(me.id), false));

        for i in 0..4 {
            f.service
                .send_message(&me.id, &luna.id, &format!("msg {i}"))
                .await
                .unwrap();
        }

        let last = f.provider.requests().pop().unwrap();
        assert_eq!(last.messages.len(), 4);
        assert_eq!(last.messages[3].content, "msg 3");
        assert_eq!(f.service.history(&me.id, &luna.id).await.unwrap().len(), 8);
    }

    #[tokio::test]
    async fn test_provider_failure_still_persists_fallback() {
        let f = fixture(ScriptedProvider::failing(), 50);
        let me = f.users.insert(user(UserRole::User));
        let luna = f.agents.insert(agent(Some(me.id), false));

        let reply = f.service.send_message(&me.id, &luna.id, "hello").await.unwrap();
        assert_eq!(reply.reply, FALLBACK_REPLY);

        let history = f.service.history(&me.id, &luna.id).await.unwrap();
        assert_eq!(history[1].content, FALLBACK_REPLY);
    }

    #[tokio::test]
    async fn test_validation_errors() {
        let f = fixture(ScriptedProvider::replying("ok"), 50);
        let me = f.users.insert(user(UserRole::User));
        let other = f.users.insert(user(UserRole::User));
        let private = f.agents.insert(agent(Some(other.id), false));

        assert!(matches!(
            f.service.send_message(&me.id, &private.id, "   ").await,
            Err(ChatError::EmptyMessage)
        ));
        assert!(matches!(
            f.service.send_message(&me.id, &AgentId::new(), "hi").await,
            Err(ChatError::AgentNotFound)
        ));
        assert!(matches!(
            f.service.send_message(&me.id, &private.id, "hi").await,
            Err(ChatError::Forbidden)
        ));
        assert!(f.provider.requests().is_empty());
    }

    #[tokio::test]
    async fn test_clear_and_dashboard() {
        let f = fixture(ScriptedProvider::replying("ok"), 50);
        let me = f.users.insert(user(UserRole::User));
        let mine = f.agents.insert(agent(Some(me.id), false));
        let shared = f.agents.insert(agent(None, true));

        f.service.send_message(&me.id, &mine.id, "hi").await.unwrap();
        f.service.send_message(&me.id, &shared.id, "hi").await.unwrap();

        let stats = f.service.dashboard(&me.id).await.unwrap();
        assert_eq!(stats.total_chats, 2);
        assert_eq!(stats.default_agents, 1);
        assert_eq!(stats.custom_agents, 1);

        assert_eq!(f.service.clear(&me.id, &mine.id).await.unwrap(), 2);
        assert!(f.service.history(&me.id, &mine.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_sends_serialize_per_conversation() {
        let f = Arc::new(fixture(ScriptedProvider::replying("ok"), 0));
        let me = f.users.insert(user(UserRole::User));
        let luna = f.agents.insert(agent(Some(me.id), false));

        let (me_id, luna_id) = (me.id, luna.id);
        let mut handles = Vec::new();
        for i in 0..8 {
            let f = f.clone();
            handles.push(tokio::spawn(async move {
                f.service
                    .send_message(&me_id, &luna_id, &format!("m{i}"))
                    .await
                    .unwrap();
            }));
        }
        for h in handles {
            h.await.unwrap();
        }

        let history = f.service.history(&me.id, &luna.id).await.unwrap();
        assert_eq!(history.len(), 16);
        for pair in history.chunks(2) {
            assert_eq!(pair[0].role, ChatRole::User);
            assert_eq!(pair[1].role, ChatRole::Assistant);
        }
        assert!(f.service.locks.is_empty());
    }

    #[tokio::test]
    async fn test_failed_send_releases_lock_entry() {
        let f = fixture(ScriptedProvider::replying("ok"), 50);
        let me = f.users.insert(user(UserRole::User));
        let luna = f.agents.insert(agent(Some(me.id), false));
        f.conversations.fail_appends();

        let err = f.service.send_message(&me.id, &luna.id, "hi").await.unwrap_err();
        assert!(matches!(err, ChatError::StorageError(_)));
        assert!(f.service.locks.is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_send_releases_lock_entry() {
        let f = fixture(ScriptedProvider::hanging(), 50);
        let me = f.users.insert(user(UserRole::User));
        let luna = f.agents.insert(agent(Some(me.id), false));

        let send = f.service.send_message(&me.id, &luna.id, "hi");
        let outcome = tokio::time::timeout(Duration::from_millis(20), send).await;
        assert!(outcome.is_err());
        assert!(f.service.locks.is_empty());
    }
}
