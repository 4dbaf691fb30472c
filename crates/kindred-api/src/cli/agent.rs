//! Agent CLI commands: create, list, delete, seed.

use anyhow::Result;
use clap::Subcommand;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use dialoguer::{Confirm, Input, Select};
use indicatif::{ProgressBar, ProgressStyle};

use kindred_core::enhance::PromptEnhancer;
use kindred_types::agent::{Agent, CreateAgentRequest, PreferredLength};

use crate::cli::{resolve_agent, truncate};
use crate::state::AppState;

#[derive(Subcommand)]
pub enum AgentCommand {
    /// Create a custom agent (interactive when flags are omitted).
    Create {
        /// Agent name.
        #[arg(long)]
        name: Option<String>,

        /// Short description shown in listings.
        #[arg(long)]
        description: Option<String>,

        /// Persona / system prompt.
        #[arg(long)]
        prompt: Option<String>,

        /// Reply length: small, medium or long.
        #[arg(long)]
        length: Option<PreferredLength>,

        /// Icon name for clients.
        #[arg(long)]
        icon: Option<String>,

        /// CSS gradient classes for clients.
        #[arg(long)]
        color: Option<String>,

        /// Make the agent visible to every user.
        #[arg(long)]
        public: bool,

        /// Run the prompt through the enhancer before saving.
        #[arg(long)]
        enhance: bool,
    },

    /// List agents you can chat with.
    List {
        /// List every agent in the store (admin only).
        #[arg(long)]
        all: bool,
    },

    /// Delete one of your custom agents and its conversations.
    Delete {
        /// Agent name or ID.
        agent: String,

        /// Skip the confirmation prompt.
        #[arg(long)]
        force: bool,
    },

    /// Insert the built-in default agents (admin only, idempotent).
    Seed,
}

pub async fn run(
    state: &AppState,
    action: AgentCommand,
    as_user: Option<&str>,
    json: bool,
) -> Result<()> {
    match action {
        AgentCommand::Create {
            name,
            description,
            prompt,
            length,
            icon,
            color,
            public,
            enhance,
        } => {
            let draft = AgentDraft {
                name,
                description,
                prompt,
                length,
                icon,
                color,
                public,
                enhance,
            };
            create_agent(state, draft, as_user, json).await
        }
        AgentCommand::List { all } => list_agents(state, all, as_user, json).await,
        AgentCommand::Delete { agent, force } => {
            delete_agent(state, &agent, force, as_user, json).await
        }
        AgentCommand::Seed => seed_agents(state, as_user, json).await,
    }
}

struct AgentDraft {
    name: Option<String>,
    description: Option<String>,
    prompt: Option<String>,
    length: Option<PreferredLength>,
    icon: Option<String>,
    color: Option<String>,
    public: bool,
    enhance: bool,
}

/// Create a new agent via interactive wizard or one-shot flags.
///
/// # Examples
///
/// ```bash
/// # Interactive wizard
/// kindred agent create
///
/// # One-shot with flags
/// kindred agent create --name "Sage" --prompt "A calm philosophy tutor" --length long
/// ```
async fn create_agent(
    state: &AppState,
    draft: AgentDraft,
    as_user: Option<&str>,
    json: bool,
) -> Result<()> {
    let user = state.acting_user(as_user).await?;

    let name = match draft.name {
        Some(n) => n,
        None => Input::<String>::new()
            .with_prompt("Agent name")
            .interact_text()?,
    };

    let description = match draft.description {
        Some(d) => d,
        None if json => String::new(),
        None => Input::<String>::new()
            .with_prompt("Short description")
            .default(format!("A companion named {name}"))
            .interact_text()?,
    };

    let mut system_prompt = match draft.prompt {
        Some(p) => p,
        None => Input::<String>::new()
            .with_prompt("Persona (system prompt)")
            .interact_text()?,
    };

    let preferred_length = match draft.length {
        Some(l) => l,
        None if json => PreferredLength::default(),
        None => {
            let options = [
                PreferredLength::Small,
                PreferredLength::Medium,
                PreferredLength::Long,
            ];
            let picked = Select::new()
                .with_prompt("Reply length")
                .items(&options)
                .default(1)
                .interact()?;
            options[picked]
        }
    };

    if draft.enhance {
        let spinner = spinner("Enhancing persona...");
        let enhanced = PromptEnhancer::enhance(
            &state.provider,
            &system_prompt,
            state.config.enhancer_model.as_deref(),
        )
        .await;
        spinner.finish_and_clear();
        system_prompt = enhanced?;
    }

    let request = CreateAgentRequest {
        name,
        description,
        system_prompt,
        icon: draft.icon,
        color: draft.color,
        preferred_length,
        is_public: draft.public,
    };

    let agent = state.agent_service.create_agent(&user, request).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&agent)?);
        return Ok(());
    }

    println!();
    println!("  {} Agent created successfully!", style("✓").green().bold());
    println!();
    println!("  {}    {}", style("Name:").bold(), style(&agent.name).cyan());
    println!("  {}  {}", style("Length:").bold(), agent.preferred_length);
    println!(
        "  {}  {}",
        style("Public:").bold(),
        if agent.is_public { "yes" } else { "no" }
    );
    println!(
        "  {}      {}",
        style("ID:").bold(),
        style(agent.id.to_string()).dim()
    );
    println!();
    println!(
        "  Start chatting: {}",
        style(format!("kindred chat \"{}\"", agent.name)).yellow()
    );
    println!();

    Ok(())
}

/// List agents in a rich colored table.
async fn list_agents(
    state: &AppState,
    all: bool,
    as_user: Option<&str>,
    json: bool,
) -> Result<()> {
    let user = state.acting_user(as_user).await?;

    let agents = if all {
        if !user.is_admin() {
            anyhow::bail!("--all is only available to admins");
        }
        state.agent_service.list_all().await?
    } else {
        state.agent_service.list_visible(&user.id).await?
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&agents)?);
        return Ok(());
    }

    if agents.is_empty() {
        println!();
        println!(
            "  {} No agents found. Create one with: {}",
            style("i").blue().bold(),
            style("kindred agent create").yellow()
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("Name").fg(Color::White),
        Cell::new("Kind").fg(Color::White),
        Cell::new("Length").fg(Color::White),
        Cell::new("Description").fg(Color::White),
        Cell::new("ID").fg(Color::White),
    ]);

    for agent in &agents {
        table.add_row(vec![
            Cell::new(&agent.name).fg(Color::Cyan),
            kind_cell(agent, &user.id),
            Cell::new(agent.preferred_length.to_string()),
            Cell::new(truncate(&agent.description, 50)),
            Cell::new(agent.id.to_string()).fg(Color::DarkGrey),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    println!(
        "  {} agent{}",
        style(agents.len()).bold(),
        if agents.len() == 1 { "" } else { "s" }
    );
    println!();

    Ok(())
}

fn kind_cell(agent: &Agent, viewer: &kindred_types::user::UserId) -> Cell {
    if agent.is_default {
        Cell::new("● default").fg(Color::Green)
    } else if agent.owner_id.as_ref() == Some(viewer) {
        Cell::new("◆ mine").fg(Color::Magenta)
    } else if agent.is_public {
        Cell::new("○ public").fg(Color::Yellow)
    } else {
        Cell::new("◌ private").fg(Color::DarkGrey)
    }
}

/// Delete an agent permanently with confirmation.
async fn delete_agent(
    state: &AppState,
    name_or_id: &str,
    force: bool,
    as_user: Option<&str>,
    json: bool,
) -> Result<()> {
    let user = state.acting_user(as_user).await?;
    let agent = resolve_agent(state, &user, name_or_id).await?;

    if !force && !json {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Permanently delete agent '{}' and its conversations?",
                style(&agent.name).red().bold()
            ))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("  Cancelled.");
            return Ok(());
        }
    }

    state.agent_service.delete_agent(&user, &agent.id).await?;

    if json {
        println!(
            "{}",
            serde_json::json!({"deleted": true, "id": agent.id.to_string()})
        );
    } else {
        println!("  {} Agent '{}' deleted.", style("✓").red().bold(), agent.name);
    }

    Ok(())
}

async fn seed_agents(state: &AppState, as_user: Option<&str>, json: bool) -> Result<()> {
    let user = state.acting_user(as_user).await?;
    let inserted = state.agent_service.seed_defaults(&user).await?;

    if json {
        println!("{}", serde_json::json!({ "inserted": inserted }));
    } else if inserted == 0 {
        println!("  {} Default agents already present.", style("i").blue().bold());
    } else {
        println!(
            "  {} Seeded {} default agent{}.",
            style("✓").green().bold(),
            inserted,
            if inserted == 1 { "" } else { "s" }
        );
    }

    Ok(())
}

/// Steady-ticking spinner with the house style.
pub(crate) fn spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));
    spinner
}
