//! In-memory repositories and a scripted provider for service tests.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use uuid::Uuid;

use kindred_types::agent::{Agent, AgentId, OwnerType, PreferredLength};
use kindred_types::chat::{ChatMessage, Conversation};
use kindred_types::error::RepositoryError;
use kindred_types::llm::{CompletionRequest, CompletionResponse, LlmError, Usage};
use kindred_types::user::{UserId, UserProfile, UserRole};

use crate::llm::provider::LlmProvider;
use crate::repository::agent::{AgentFilter, AgentRepository};
use crate::repository::conversation::ConversationRepository;
use crate::repository::user::UserRepository;

pub fn user(role: UserRole) -> UserProfile {
    let now = Utc::now();
    let id = UserId::new();
    UserProfile {
        id,
        full_name: "Test User".to_string(),
        email: format!("{id}@example.com"),
        dob: None,
        role,
        interests: vec![],
        personality_traits: vec![],
        created_at: now,
        updated_at: now,
    }
}

/// A custom agent owned by `owner`, or a public default agent when `is_default`.
pub fn agent(owner: Option<UserId>, is_default: bool) -> Agent {
    let now = Utc::now();
    Agent {
        id: AgentId::new(),
        name: "Luna".to_string(),
        description: String::new(),
        system_prompt: "You are Luna.".to_string(),
        icon: "Bot".to_string(),
        color: "from-blue-500 to-cyan-500".to_string(),
        preferred_length: PreferredLength::Medium,
        is_default,
        is_custom: !is_default,
        is_public: is_default,
        owner_id: owner,
        owner_type: if is_default {
            OwnerType::Admin
        } else {
            OwnerType::User
        },
        created_at: now,
        updated_at: now,
    }
}

// --- Repositories ---

#[derive(Clone, Default)]
pub struct InMemoryAgentRepository {
    agents: Arc<Mutex<Vec<Agent>>>,
}

impl InMemoryAgentRepository {
    pub fn insert(&self, agent: Agent) -> Agent {
        self.agents.lock().unwrap().push(agent.clone());
        agent
    }
}

impl AgentRepository for InMemoryAgentRepository {
    async fn create(&self, agent: &Agent) -> Result<Agent, RepositoryError> {
        Ok(self.insert(agent.clone()))
    }

    async fn get_by_id(&self, id: &AgentId) -> Result<Option<Agent>, RepositoryError> {
        Ok(self.agents.lock().unwrap().iter().find(|a| a.id == *id).cloned())
    }

    async fn list(&self, filter: Option<AgentFilter>) -> Result<Vec<Agent>, RepositoryError> {
        let filter = filter.unwrap_or_default();
        Ok(self
            .agents
            .lock()
            .unwrap()
            .iter()
            .filter(|a| filter.visible_to.is_none_or(|u| a.is_visible_to(&u)))
            .filter(|a| filter.is_default.is_none_or(|d| a.is_default == d))
            .cloned()
            .collect())
    }

    async fn delete(&self, id: &AgentId) -> Result<(), RepositoryError> {
        let mut agents = self.agents.lock().unwrap();
        let before = agents.len();
        agents.retain(|a| a.id != *id);
        if agents.len() == before {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct InMemoryUserRepository {
    users: Arc<Mutex<Vec<UserProfile>>>,
    keys: Arc<Mutex<Vec<(String, UserId)>>>,
}

impl InMemoryUserRepository {
    pub fn insert(&self, user: UserProfile) -> UserProfile {
        self.users.lock().unwrap().push(user.clone());
        user
    }
}

impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: &UserProfile) -> Result<UserProfile, RepositoryError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == user.email) {
            return Err(RepositoryError::Conflict(user.email.clone()));
        }
        users.push(user.clone());
        Ok(user.clone())
    }

    async fn get_by_id(&self, id: &UserId) -> Result<Option<UserProfile>, RepositoryError> {
        Ok(self.users.lock().unwrap().iter().find(|u| u.id == *id).cloned())
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<UserProfile>, RepositoryError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn list(&self) -> Result<Vec<UserProfile>, RepositoryError> {
        Ok(self.users.lock().unwrap().clone())
    }

    async fn update(&self, user: &UserProfile) -> Result<UserProfile, RepositoryError> {
        let mut users = self.users.lock().unwrap();
        let slot = users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or(RepositoryError::NotFound)?;
        *slot = user.clone();
        Ok(user.clone())
    }

    async fn delete(&self, id: &UserId) -> Result<(), RepositoryError> {
        self.users.lock().unwrap().retain(|u| u.id != *id);
        self.keys.lock().unwrap().retain(|(_, u)| u != id);
        Ok(())
    }

    async fn add_api_key(
        &self,
        user_id: &UserId,
        key_hash: &str,
        _label: &str,
    ) -> Result<(), RepositoryError> {
        self.keys
            .lock()
            .unwrap()
            .push((key_hash.to_string(), *user_id));
        Ok(())
    }

    async fn get_by_api_key_hash(
        &self,
        key_hash: &str,
    ) -> Result<Option<UserProfile>, RepositoryError> {
        let owner = self
            .keys
            .lock()
            .unwrap()
            .iter()
            .find(|(hash, _)| hash == key_hash)
            .map(|(_, id)| *id);
        match owner {
            Some(id) => self.get_by_id(&id).await,
            None => Ok(None),
        }
    }
}

#[derive(Clone, Default)]
pub struct InMemoryConversationRepository {
    conversations: Arc<Mutex<Vec<Conversation>>>,
    messages: Arc<Mutex<Vec<ChatMessage>>>,
    fail_appends: Arc<AtomicBool>,
}

impl InMemoryConversationRepository {
    /// Make every later `append` fail with a query error.
    pub fn fail_appends(&self) {
        self.fail_appends.store(true, Ordering::SeqCst);
    }
}

impl ConversationRepository for InMemoryConversationRepository {
    async fn get_or_create(
        &self,
        user_id: &UserId,
        agent_id: &AgentId,
    ) -> Result<Conversation, RepositoryError> {
        let mut conversations = self.conversations.lock().unwrap();
        if let Some(c) = conversations
            .iter()
            .find(|c| c.user_id == *user_id && c.agent_id == *agent_id)
        {
            return Ok(c.clone());
        }
        let now = Utc::now();
        let conversation = Conversation {
            id: Uuid::now_v7(),
            user_id: *user_id,
            agent_id: *agent_id,
            created_at: now,
            updated_at: now,
        };
        conversations.push(conversation.clone());
        Ok(conversation)
    }

    async fn find(
        &self,
        user_id: &UserId,
        agent_id: &AgentId,
    ) -> Result<Option<Conversation>, RepositoryError> {
        Ok(self
            .conversations
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.user_id == *user_id && c.agent_id == *agent_id)
            .cloned())
    }

    async fn append(&self, message: &ChatMessage) -> Result<(), RepositoryError> {
        if self.fail_appends.load(Ordering::SeqCst) {
            return Err(RepositoryError::Query("disk full".to_string()));
        }
        self.messages.lock().unwrap().push(message.clone());
        Ok(())
    }

    async fn messages(
        &self,
        conversation_id: &Uuid,
        limit: Option<u32>,
    ) -> Result<Vec<ChatMessage>, RepositoryError> {
        let all: Vec<ChatMessage> = self
            .messages
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.conversation_id == *conversation_id)
            .cloned()
            .collect();
        let skip = limit.map_or(0, |l| all.len().saturating_sub(l as usize));
        Ok(all.into_iter().skip(skip).collect())
    }

    async fn clear(&self, user_id: &UserId, agent_id: &AgentId) -> Result<u64, RepositoryError> {
        let Some(conversation) = self.find(user_id, agent_id).await? else {
            return Ok(0);
        };
        let mut messages = self.messages.lock().unwrap();
        let before = messages.len();
        messages.retain(|m| m.conversation_id != conversation.id);
        Ok((before - messages.len()) as u64)
    }

    async fn count_for_user(&self, user_id: &UserId) -> Result<u64, RepositoryError> {
        Ok(self
            .conversations
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.user_id == *user_id)
            .count() as u64)
    }
}

// --- Provider ---

/// Provider returning a fixed reply (or a fixed error) and recording requests.
#[derive(Clone)]
pub struct ScriptedProvider {
    reply: Option<String>,
    hang: bool,
    seen: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl ScriptedProvider {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            hang: false,
            seen: Arc::default(),
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: None,
            hang: false,
            seen: Arc::default(),
        }
    }

    /// Never completes; the caller's timeout decides the outcome.
    pub fn hanging() -> Self {
        Self {
            reply: None,
            hang: true,
            seen: Arc::default(),
        }
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.seen.lock().unwrap().clone()
    }
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
        let reply = self.reply.clone();
        let hang = self.hang;
        async move {
            if hang {
                std::future::pending::<()>().await;
            }
            match reply {
                Some(content) => Ok(CompletionResponse {
                    content,
                    model: "scripted-1".to_string(),
                    usage: Usage::default(),
                }),
                None => Err(LlmError::Provider {
                    message: "scripted failure".to_string(),
                }),
            }
        }
    }
}
