//! Agent management service.
//!
//! Agents are immutable once created. Users see public agents, default
//! agents, and their own; only the owner may delete a custom agent and
//! default agents cannot be deleted at all.

use chrono::Utc;

use kindred_types::agent::{
    Agent, AgentId, CreateAgentRequest, DEFAULT_AGENT_COLOR, DEFAULT_AGENT_ICON, OwnerType,
};
use kindred_types::error::{AgentError, RepositoryError};
use kindred_types::user::{UserId, UserProfile};

use crate::repository::agent::{AgentFilter, AgentRepository};

use super::catalogue::DEFAULT_AGENTS;

/// Service orchestrating the agent lifecycle.
pub struct AgentService<A: AgentRepository> {
    agent_repo: A,
}

impl<A: AgentRepository> AgentService<A> {
    pub fn new(agent_repo: A) -> Self {
        Self { agent_repo }
    }

    /// Create a custom agent owned by `owner`.
    pub async fn create_agent(
        &self,
        owner: &UserProfile,
        request: CreateAgentRequest,
    ) -> Result<Agent, AgentError> {
        let name = request.name.trim().to_string();
        if name.is_empty() {
            return Err(AgentError::InvalidInput("name is required".to_string()));
        }
        let system_prompt = request.system_prompt.trim().to_string();
        if system_prompt.is_empty() {
            return Err(AgentError::InvalidInput("system prompt is required".to_string()));
        }

        let now = Utc::now();
        let agent = Agent {
            id: AgentId::new(),
            name,
            description: request.description.trim().to_string(),
            system_prompt,
            icon: non_blank(request.icon).unwrap_or_else(|| DEFAULT_AGENT_ICON.to_string()),
            color: non_blank(request.color).unwrap_or_else(|| DEFAULT_AGENT_COLOR.to_string()),
            preferred_length: request.preferred_length,
            is_default: false,
            is_custom: true,
            is_public: request.is_public,
            owner_id: Some(owner.id),
            owner_type: OwnerType::from(owner.role),
            created_at: now,
            updated_at: now,
        };

        let agent = self.agent_repo.create(&agent).await.map_err(storage)?;
        tracing::info!(agent_id = %agent.id, owner = %owner.id, "Created agent");
        Ok(agent)
    }

    pub async fn get_agent(&self, id: &AgentId) -> Result<Agent, AgentError> {
        self.agent_repo
            .get_by_id(id)
            .await
            .map_err(storage)?
            .ok_or(AgentError::NotFound)
    }

    /// Agents the user may chat with: public, default, or owned.
    pub async fn list_visible(&self, user_id: &UserId) -> Result<Vec<Agent>, AgentError> {
        self.agent_repo
            .list(Some(AgentFilter {
                visible_to: Some(*user_id),
                ..Default::default()
            }))
            .await
            .map_err(storage)
    }

    /// Every agent, for admins.
    pub async fn list_all(&self) -> Result<Vec<Agent>, AgentError> {
        self.agent_repo.list(None).await.map_err(storage)
    }

    /// Delete a custom agent. Its conversations go with it.
    pub async fn delete_agent(&self, user: &UserProfile, id: &AgentId) -> Result<(), AgentError> {
        let agent = self.get_agent(id).await?;

        if agent.is_default {
            return Err(AgentError::DefaultAgentImmutable);
        }
        if agent.owner_id != Some(user.id) {
            return Err(AgentError::Forbidden);
        }

        self.agent_repo.delete(id).await.map_err(|e| match e {
            RepositoryError::NotFound => AgentError::NotFound,
            other => storage(other),
        })?;
        tracing::info!(agent_id = %id, "Deleted agent");
        Ok(())
    }

    /// Install any missing default agents, owned by `admin`.
    ///
    /// Matching is by name against existing default agents, so running this
    /// twice installs nothing the second time. Returns the number installed.
    pub async fn seed_defaults(&self, admin: &UserProfile) -> Result<usize, AgentError> {
        if !admin.is_admin() {
            return Err(AgentError::Forbidden);
        }

        let existing = self
            .agent_repo
            .list(Some(AgentFilter {
                is_default: Some(true),
                ..Default::default()
            }))
            .await
            .map_err(storage)?;

        let mut installed = 0;
        for entry in DEFAULT_AGENTS {
            if existing.iter().any(|a| a.name == entry.name) {
                continue;
            }

            let now = Utc::now();
            let agent = Agent {
                id: AgentId::new(),
                name: entry.name.to_string(),
                description: entry.description.to_string(),
                system_prompt: entry.system_prompt.to_string(),
                icon: entry.icon.to_string(),
                color: entry.color.to_string(),
                preferred_length: entry.preferred_length,
                is_default: true,
                is_custom: false,
                is_public: true,
                owner_id: Some(admin.id),
                owner_type: OwnerType::Admin,
                created_at: now,
                updated_at: now,
            };
            self.agent_repo.create(&agent).await.map_err(storage)?;
            installed += 1;
        }

        if installed > 0 {
            tracing::info!(installed, "Seeded default agents");
        }
        Ok(installed)
    }
}

fn storage(e: RepositoryError) -> AgentError {
    AgentError::StorageError(e.to_string())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{InMemoryAgentRepository, user};
    use kindred_types::agent::PreferredLength;
    use kindred_types::user::UserRole;

    fn request(name: &str, prompt: &str) -> CreateAgentRequest {
        CreateAgentRequest {
            name: name.to_string(),
            description: String::new(),
            system_prompt: prompt.to_string(),
            icon: None,
            color: Some("  ".to_string()),
            preferred_length: PreferredLength::Small,
            is_public: false,
        }
    }

    #[tokio::test]
    async fn test_create_agent_fills_defaults() {
        let svc = AgentService::new(InMemoryAgentRepository::default());
        let owner = user(UserRole::User);

        let agent = svc.create_agent(&owner, request(" Sage ", "You are wise.")).await.unwrap();
        assert_eq!(agent.name, "Sage");
        assert_eq!(agent.icon, "Bot");
        assert_eq!(agent.color, "from-blue-500 to-cyan-500");
        assert!(agent.is_custom);
        assert!(!agent.is_default);
        assert_eq!(agent.owner_id, Some(owner.id));
        assert_eq!(agent.owner_type, OwnerType::User);
    }

    #[tokio::test]
    async fn test_create_agent_requires_name_and_prompt() {
        let svc = AgentService::new(InMemoryAgentRepository::default());
        let owner = user(UserRole::User);

        assert!(matches!(
            svc.create_agent(&owner, request("", "p")).await,
            Err(AgentError::InvalidInput(_))
        ));
        assert!(matches!(
            svc.create_agent(&owner, request("Sage", "  ")).await,
            Err(AgentError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_only_owner_deletes() {
        let svc = AgentService::new(InMemoryAgentRepository::default());
        let owner = user(UserRole::User);
        let stranger = user(UserRole::Admin);

        let agent = svc.create_agent(&owner, request("Sage", "p")).await.unwrap();
        assert!(matches!(
            svc.delete_agent(&stranger, &agent.id).await,
            Err(AgentError::Forbidden)
        ));
        svc.delete_agent(&owner, &agent.id).await.unwrap();
        assert!(matches!(svc.get_agent(&agent.id).await, Err(AgentError::NotFound)));
    }

    #[tokio::test]
    async fn test_only_admins_seed() {
        let svc = AgentService::new(InMemoryAgentRepository::default());
        assert!(matches!(
            svc.seed_defaults(&user(UserRole::User)).await,
            Err(AgentError::Forbidden)
        ));
        assert!(svc.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_defaults_seeded_once_and_immutable() {
        let svc = AgentService::new(InMemoryAgentRepository::default());
        let admin = user(UserRole::Admin);

        let first = svc.seed_defaults(&admin).await.unwrap();
        assert_eq!(first, DEFAULT_AGENTS.len());
        assert_eq!(svc.seed_defaults(&admin).await.unwrap(), 0);

        let all = svc.list_all().await.unwrap();
        let empathy = all.iter().find(|a| a.name == "Empathy AI").unwrap();
        assert!(empathy.is_default && empathy.is_public);
        assert!(matches!(
            svc.delete_agent(&admin, &empathy.id).await,
            Err(AgentError::DefaultAgentImmutable)
        ));
    }

    #[tokio::test]
    async fn test_visibility_listing() {
        let svc = AgentService::new(InMemoryAgentRepository::default());
        let admin = user(UserRole::Admin);
        let alice = user(UserRole::User);
        let bob = user(UserRole::User);

        svc.seed_defaults(&admin).await.unwrap();
        svc.create_agent(&alice, request("Private", "p")).await.unwrap();
        let mut public = request("Shared", "p");
        public.is_public = true;
        svc.create_agent(&alice, public).await.unwrap();

        let alice_sees = svc.list_visible(&alice.id).await.unwrap();
        let bob_sees = svc.list_visible(&bob.id).await.unwrap();
        assert_eq!(alice_sees.len(), DEFAULT_AGENTS.len() + 2);
        assert_eq!(bob_sees.len(), DEFAULT_AGENTS.len() + 1);
        assert!(!bob_sees.iter().any(|a| a.name == "Private"));
    }
}
