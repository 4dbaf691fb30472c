//! Profile CLI commands: show, set, accept.

use anyhow::Result;
use chrono::NaiveDate;
use clap::Subcommand;
use console::style;

use kindred_types::discovery::Discoveries;
use kindred_types::user::{UpdateProfileRequest, UserProfile};

use crate::cli::split_list;
use crate::state::AppState;

#[derive(Subcommand)]
pub enum ProfileCommand {
    /// Show your profile.
    Show,

    /// Edit profile fields. List flags replace the whole list.
    Set {
        #[arg(long)]
        name: Option<String>,

        /// Date of birth, YYYY-MM-DD.
        #[arg(long)]
        dob: Option<NaiveDate>,

        /// Comma-separated interests ("" clears the list).
        #[arg(long)]
        interests: Option<String>,

        /// Comma-separated personality traits ("" clears the list).
        #[arg(long)]
        traits: Option<String>,
    },

    /// Add facts to your profile without removing anything.
    Accept {
        /// Comma-separated interests.
        #[arg(long, default_value = "")]
        interests: String,

        /// Comma-separated personality traits.
        #[arg(long, default_value = "")]
        traits: String,
    },
}

pub async fn run(
    state: &AppState,
    action: ProfileCommand,
    as_user: Option<&str>,
    json: bool,
) -> Result<()> {
    let me = state.acting_user(as_user).await?;

    let profile = match action {
        ProfileCommand::Show => me,
        ProfileCommand::Set {
            name,
            dob,
            interests,
            traits,
        } => {
            let request = UpdateProfileRequest {
                full_name: name,
                dob,
                interests: interests.as_deref().map(split_list),
                personality_traits: traits.as_deref().map(split_list),
            };
            state.user_service.update_profile(&me.id, request).await?
        }
        ProfileCommand::Accept { interests, traits } => {
            let found = Discoveries {
                interests: split_list(&interests),
                personality_traits: split_list(&traits),
            };
            if found.is_empty() {
                anyhow::bail!("nothing to accept; pass --interests and/or --traits");
            }
            state
                .user_service
                .merge_discoveries(&me.id, &found, state.config.discovery_merge)
                .await?
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&profile)?);
    } else {
        print_profile(&profile);
    }
    Ok(())
}

fn print_profile(user: &UserProfile) {
    let list = |items: &[String]| {
        if items.is_empty() {
            style("(none)".to_string()).dim()
        } else {
            style(items.join(", "))
        }
    };

    println!();
    println!("  {}", style(&user.full_name).cyan().bold());
    println!("  {}", style(&user.email).dim());
    println!();
    println!("  {}  {}", style("Role:").bold(), user.role);
    if let Some(dob) = user.dob {
        println!("  {}   {}", style("DOB:").bold(), dob.format("%Y-%m-%d"));
    }
    println!("  {}  {}", style("Interests:").bold(), list(&user.interests));
    println!("  {}     {}", style("Traits:").bold(), list(&user.personality_traits));
    println!();
}
