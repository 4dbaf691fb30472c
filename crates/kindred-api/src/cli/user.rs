//! User account CLI commands: create, list, delete.

use anyhow::Result;
use chrono::NaiveDate;
use clap::Subcommand;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use dialoguer::{Confirm, Input};

use kindred_types::user::{CreateUserRequest, UserId, UserRole};

use crate::http::extractors::auth::{generate_api_key, hash_api_key};
use crate::state::AppState;

#[derive(Subcommand)]
pub enum UserCommand {
    /// Register a user and print a fresh API key for the REST API.
    Create {
        /// Full name.
        #[arg(long)]
        name: Option<String>,

        /// Email address (unique, case-insensitive).
        #[arg(long)]
        email: Option<String>,

        /// Date of birth, YYYY-MM-DD.
        #[arg(long)]
        dob: Option<NaiveDate>,

        /// Grant the admin role (admin only).
        #[arg(long)]
        admin: bool,
    },

    /// List registered users (admin only).
    List,

    /// Issue another API key for a user (admin, or yourself).
    Key {
        /// Email of the user; defaults to the acting user.
        email: Option<String>,

        /// Label stored with the key.
        #[arg(long, default_value = "cli")]
        label: String,
    },

    /// Delete a user with all their agents and conversations (admin only).
    Delete {
        /// Email or ID of the user.
        user: String,

        /// Skip the confirmation prompt.
        #[arg(long)]
        force: bool,
    },
}

pub async fn run(
    state: &AppState,
    action: UserCommand,
    as_user: Option<&str>,
    json: bool,
) -> Result<()> {
    match action {
        UserCommand::Create {
            name,
            email,
            dob,
            admin,
        } => create_user(state, name, email, dob, admin, as_user, json).await,
        UserCommand::List => list_users(state, as_user, json).await,
        UserCommand::Key { email, label } => {
            issue_key(state, email.as_deref(), &label, as_user, json).await
        }
        UserCommand::Delete { user, force } => {
            delete_user(state, &user, force, as_user, json).await
        }
    }
}

async fn create_user(
    state: &AppState,
    name: Option<String>,
    email: Option<String>,
    dob: Option<NaiveDate>,
    admin: bool,
    as_user: Option<&str>,
    json: bool,
) -> Result<()> {
    let actor = state.acting_user(as_user).await?;
    if admin && !actor.is_admin() {
        anyhow::bail!("only admins can create admin users");
    }

    let full_name = match name {
        Some(n) => n,
        None => Input::<String>::new()
            .with_prompt("Full name")
            .interact_text()?,
    };
    let email = match email {
        Some(e) => e,
        None => Input::<String>::new().with_prompt("Email").interact_text()?,
    };

    let user = state
        .user_service
        .register(CreateUserRequest {
            full_name,
            email,
            dob,
            role: if admin { UserRole::Admin } else { UserRole::User },
        })
        .await?;

    let api_key = generate_api_key();
    state
        .user_service
        .add_api_key(&user.id, &hash_api_key(&api_key), "cli")
        .await?;

    if json {
        let out = serde_json::json!({ "user": user, "api_key": api_key });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!();
    println!("  {} User created!", style("✓").green().bold());
    println!();
    println!("  {}   {}", style("Name:").bold(), style(&user.full_name).cyan());
    println!("  {}  {}", style("Email:").bold(), user.email);
    println!("  {}   {}", style("Role:").bold(), user.role);
    println!();
    print_key(&api_key);

    Ok(())
}

async fn list_users(state: &AppState, as_user: Option<&str>, json: bool) -> Result<()> {
    let actor = state.acting_user(as_user).await?;
    if !actor.is_admin() {
        anyhow::bail!("listing users is only available to admins");
    }

    let users = state.user_service.list_users().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&users)?);
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Name").fg(Color::White),
        Cell::new("Email").fg(Color::White),
        Cell::new("Role").fg(Color::White),
        Cell::new("Joined").fg(Color::White),
    ]);

    for user in &users {
        let role = if user.is_admin() {
            Cell::new("admin").fg(Color::Magenta)
        } else {
            Cell::new("user")
        };
        table.add_row(vec![
            Cell::new(&user.full_name).fg(Color::Cyan),
            Cell::new(&user.email),
            role,
            Cell::new(user.created_at.format("%Y-%m-%d").to_string()).fg(Color::DarkGrey),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    println!(
        "  {} user{}",
        style(users.len()).bold(),
        if users.len() == 1 { "" } else { "s" }
    );
    println!();

    Ok(())
}

async fn issue_key(
    state: &AppState,
    email: Option<&str>,
    label: &str,
    as_user: Option<&str>,
    json: bool,
) -> Result<()> {
    let actor = state.acting_user(as_user).await?;
    let target = match email {
        Some(email) => state.user_service.get_by_email(email).await?,
        None => actor.clone(),
    };
    if target.id != actor.id && !actor.is_admin() {
        anyhow::bail!("only admins can issue keys for other users");
    }

    let api_key = generate_api_key();
    state
        .user_service
        .add_api_key(&target.id, &hash_api_key(&api_key), label)
        .await?;

    if json {
        println!(
            "{}",
            serde_json::json!({ "email": target.email, "api_key": api_key })
        );
    } else {
        println!();
        print_key(&api_key);
    }
    Ok(())
}

async fn delete_user(
    state: &AppState,
    email_or_id: &str,
    force: bool,
    as_user: Option<&str>,
    json: bool,
) -> Result<()> {
    let actor = state.acting_user(as_user).await?;
    if !actor.is_admin() {
        anyhow::bail!("deleting users is only available to admins");
    }

    let target = match email_or_id.parse::<UserId>() {
        Ok(id) => state.user_service.get_user(&id).await?,
        Err(_) => state.user_service.get_by_email(email_or_id).await?,
    };
    if target.id == actor.id {
        anyhow::bail!("refusing to delete the account you are acting as");
    }

    if !force && !json {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Permanently delete '{}' with all their agents and chats?",
                style(&target.email).red().bold()
            ))
            .default(false)
            .interact()?;
        if !confirmed {
            println!("  Cancelled.");
            return Ok(());
        }
    }

    state.user_service.delete_user(&target.id).await?;

    if json {
        println!(
            "{}",
            serde_json::json!({"deleted": true, "id": target.id.to_string()})
        );
    } else {
        println!("  {} User '{}' deleted.", style("✓").red().bold(), target.email);
    }
    Ok(())
}

fn print_key(api_key: &str) {
    println!(
        "  {} API key (save this -- it won't be shown again):",
        style("🔑").bold()
    );
    println!();
    println!("  {}", style(api_key).yellow().bold());
    println!();
}
