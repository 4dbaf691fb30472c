//! CLI command definitions for the `kindred` binary.
//!
//! Uses clap derive macros for argument parsing. Commands are grouped by
//! noun (`kindred agent create`, `kindred profile show`).

pub mod agent;
pub mod chat;
pub mod enhance;
pub mod profile;
pub mod status;
pub mod user;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

use kindred_types::agent::AgentId;
use kindred_types::user::UserProfile;

use crate::state::AppState;

/// Emotionally aware companion chat.
#[derive(Parser)]
#[command(name = "kindred", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export tracing spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    /// Act as the user with this email instead of the local operator.
    #[arg(long = "as", global = true, value_name = "EMAIL", env = "KINDRED_AS")]
    pub as_user: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage agents (personas).
    Agent {
        #[command(subcommand)]
        action: agent::AgentCommand,
    },

    /// Manage user accounts.
    User {
        #[command(subcommand)]
        action: user::UserCommand,
    },

    /// View or edit your profile.
    Profile {
        #[command(subcommand)]
        action: profile::ProfileCommand,
    },

    /// Start an interactive chat with an agent.
    Chat {
        /// Agent name or ID.
        agent: String,
    },

    /// Rewrite a short persona prompt into a fuller one.
    Enhance {
        /// The prompt to enhance.
        #[arg(required = true, num_args = 1..)]
        prompt: Vec<String>,
    },

    /// System status dashboard.
    Status {
        /// Also send a tiny request to the completion provider.
        #[arg(long)]
        check: bool,
    },

    /// Start the REST API server.
    Serve {
        /// Port to listen on.
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to.
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

/// Resolve an agent the user can see by ID or by (case-insensitive) name.
pub async fn resolve_agent(
    state: &AppState,
    user: &UserProfile,
    name_or_id: &str,
) -> anyhow::Result<kindred_types::agent::Agent> {
    let visible = state.agent_service.list_visible(&user.id).await?;

    if let Ok(id) = name_or_id.parse::<AgentId>() {
        if let Some(agent) = visible.iter().find(|a| a.id == id) {
            return Ok(agent.clone());
        }
    }

    let wanted = name_or_id.trim().to_lowercase();
    let mut matches = visible.into_iter().filter(|a| a.name.to_lowercase() == wanted);
    match (matches.next(), matches.next()) {
        (Some(agent), None) => Ok(agent),
        (Some(_), Some(_)) => anyhow::bail!(
            "more than one agent is named '{name_or_id}'; use its ID (see: kindred agent list)"
        ),
        (None, _) => anyhow::bail!("agent '{name_or_id}' not found (see: kindred agent list)"),
    }
}

/// Split a comma-separated flag value into trimmed, non-empty items.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Truncate on a char boundary, appending "..." when shortened.
pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{kept}...")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_global_flags() {
        let cli = Cli::try_parse_from(["kindred", "--json", "-vv", "--as", "a@b.co", "status"])
            .unwrap();
        assert!(cli.json);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.as_user.as_deref(), Some("a@b.co"));
        assert!(matches!(cli.command, Commands::Status { check: false }));
    }

    #[test]
    fn test_split_list() {
        assert_eq!(split_list(" chess, ,hiking ,"), vec!["chess", "hiking"]);
        assert!(split_list("").is_empty());
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("héllo wörld", 8), "héllo...");
    }

    #[tokio::test]
    async fn test_resolve_agent_by_name_and_id() {
        let state = crate::state::test_support::test_state().await;
        let me = state.acting_user(None).await.unwrap();

        let by_name = resolve_agent(&state, &me, "empathy ai").await.unwrap();
        assert_eq!(by_name.name, "Empathy AI");

        let by_id = resolve_agent(&state, &me, &by_name.id.to_string()).await.unwrap();
        assert_eq!(by_id.id, by_name.id);

        assert!(resolve_agent(&state, &me, "nobody").await.is_err());
    }
}
