//! Application state wiring all services together.
//!
//! AppState holds the concrete service instances used by both CLI and REST API.
//! Services are generic over repository traits, but AppState pins them to the
//! SQLite implementations and binds exactly one completion provider.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use secrecy::SecretString;

use kindred_core::chat::service::ChatService;
use kindred_core::compose::composer::ReplyComposer;
use kindred_core::llm::box_provider::BoxLlmProvider;
use kindred_core::llm::provider::LlmProvider;
use kindred_core::service::agent::AgentService;
use kindred_core::service::user::UserService;
use kindred_infra::config::{load_global_config, resolve_api_key, resolve_data_dir};
use kindred_infra::llm::create_provider;
use kindred_infra::sqlite::agent::SqliteAgentRepository;
use kindred_infra::sqlite::conversation::SqliteConversationRepository;
use kindred_infra::sqlite::pool::{DatabasePool, database_url};
use kindred_infra::sqlite::user::SqliteUserRepository;
use kindred_types::config::GlobalConfig;
use kindred_types::error::UserError;
use kindred_types::llm::{CompletionRequest, CompletionResponse, LlmError, ProviderConfig};
use kindred_types::user::{CreateUserRequest, UserProfile, UserRole};

/// Concrete type aliases for the service generics pinned to infra implementations.
pub type ConcreteAgentService = AgentService<SqliteAgentRepository>;

pub type ConcreteUserService = UserService<SqliteUserRepository>;

pub type ConcreteChatService =
    ChatService<SqliteAgentRepository, SqliteUserRepository, SqliteConversationRepository>;

/// Email of the local admin account the CLI acts as by default.
pub const OPERATOR_EMAIL: &str = "operator@kindred.local";

/// Shared application state holding all services.
#[derive(Clone)]
pub struct AppState {
    pub agent_service: Arc<ConcreteAgentService>,
    pub user_service: Arc<ConcreteUserService>,
    pub chat_service: Arc<ConcreteChatService>,
    pub provider: Arc<BoxLlmProvider>,
    pub config: Arc<GlobalConfig>,
    pub data_dir: PathBuf,
}

impl AppState {
    /// Resolve the data directory, load `config.toml`, then open the state.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        tokio::fs::create_dir_all(&data_dir).await?;

        let config = load_global_config(&data_dir).await;
        let api_key = resolve_api_key(&config.provider);
        Self::open(data_dir, config, api_key).await
    }

    /// Connect to `{data_dir}/kindred.db` and wire services around one provider.
    pub async fn open(
        data_dir: PathBuf,
        config: GlobalConfig,
        api_key: Option<SecretString>,
    ) -> anyhow::Result<Self> {
        let db_pool = DatabasePool::new(&database_url(&data_dir)).await?;

        let provider = match create_provider(&config.provider, api_key) {
            Ok(provider) => provider,
            Err(e) => {
                tracing::warn!(
                    provider = %config.provider.provider_type,
                    error = %e,
                    "Completion provider unavailable; replies will use the fallback"
                );
                BoxLlmProvider::new(UnavailableProvider::new(&config.provider))
            }
        };
        let provider = Arc::new(provider);

        let composer = ReplyComposer::new(
            Arc::clone(&provider),
            Duration::from_secs(config.completion_timeout_secs),
        );

        let chat_service = ChatService::new(
            SqliteAgentRepository::new(db_pool.clone()),
            SqliteUserRepository::new(db_pool.clone()),
            SqliteConversationRepository::new(db_pool.clone()),
            composer,
            config.max_history_messages,
        );

        Ok(Self {
            agent_service: Arc::new(AgentService::new(SqliteAgentRepository::new(
                db_pool.clone(),
            ))),
            user_service: Arc::new(UserService::new(SqliteUserRepository::new(db_pool))),
            chat_service: Arc::new(chat_service),
            provider,
            config: Arc::new(config),
            data_dir,
        })
    }

    /// The user a CLI command acts as: `--as <email>`, else the local operator.
    ///
    /// The operator is an admin created on first use, at which point the
    /// default agent catalogue is seeded.
    pub async fn acting_user(&self, as_email: Option<&str>) -> anyhow::Result<UserProfile> {
        if let Some(email) = as_email {
            return self
                .user_service
                .get_by_email(email)
                .await
                .map_err(|e| match e {
                    UserError::NotFound => anyhow::anyhow!(
                        "no user with email '{email}'. Create one with: kindred user create"
                    ),
                    other => other.into(),
                });
        }

        match self.user_service.get_by_email(OPERATOR_EMAIL).await {
            Ok(user) => Ok(user),
            Err(UserError::NotFound) => {
                let operator = self
                    .user_service
                    .register(CreateUserRequest {
                        full_name: "Local Operator".to_string(),
                        email: OPERATOR_EMAIL.to_string(),
                        dob: None,
                        role: UserRole::Admin,
                    })
                    .await?;
                let seeded = self.agent_service.seed_defaults(&operator).await?;
                tracing::info!(seeded, "Created local operator and seeded default agents");
                Ok(operator)
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Stand-in bound when the configured backend cannot be constructed (usually
/// a missing API key). Every call fails, so chat degrades to the fallback
/// reply and `status --check` reports the cause.
struct UnavailableProvider {
    name: String,
    model: String,
    reason: String,
}

impl UnavailableProvider {
    fn new(config: &ProviderConfig) -> Self {
        let reason = match config.api_key_env() {
            Some(var) => format!("API key not set; export {var}"),
            None => "provider could not be constructed".to_string(),
        };
        Self {
            name: config.provider_type.to_string(),
            model: config.model().to_string(),
            reason,
        }
    }
}

impl LlmProvider for UnavailableProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, _request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        Err(LlmError::Provider {
            message: self.reason.clone(),
        })
    }
}
