//! Main chat loop orchestration.
//!
//! Coordinates one interactive session with an agent: welcome banner,
//! input loop, composed replies with an emotion footer, discovery prompts
//! and slash commands.

use std::time::Instant;

use console::style;
use tracing::{info, warn};

use kindred_types::agent::Agent;
use kindred_types::chat::ChatRole;
use kindred_types::discovery::Discoveries;
use kindred_types::user::UserProfile;

use crate::cli::agent::spinner;
use crate::cli::truncate;
use crate::state::AppState;

use super::banner::print_welcome_banner;
use super::commands::{self, ChatCommand};
use super::input::{ChatInput, InputEvent};
use super::renderer::{ChatRenderer, accent_for};

/// Run the interactive chat loop between `user` and `agent`.
pub async fn run_chat_loop(
    state: &AppState,
    user: &UserProfile,
    agent: &Agent,
) -> anyhow::Result<()> {
    let model = state.provider.model().to_string();
    let past = state.chat_service.history(&user.id, &agent.id).await?;

    print_welcome_banner(
        &agent.name,
        &agent.description,
        &model,
        &user.full_name,
        past.len(),
    );

    let renderer = ChatRenderer::new(accent_for(&agent.color));
    let mut pending: Option<Discoveries> = None;
    let mut turns = 0u32;

    let prompt = format!("  {} ", style("You >").green().bold());
    let (mut chat_input, _writer) = ChatInput::new(prompt)
        .map_err(|e| anyhow::anyhow!("Failed to initialize input: {e}"))?;

    loop {
        let text = match chat_input.read_line().await {
            InputEvent::Eof => {
                println!("\n  {}", style("Session ended.").dim());
                break;
            }
            InputEvent::Interrupted => {
                println!(
                    "\n  {}",
                    style("Press Ctrl+D to exit, or keep chatting.").dim()
                );
                continue;
            }
            InputEvent::Message(text) if text.is_empty() => continue,
            InputEvent::Message(text) => text,
        };

        if let Some(cmd) = commands::parse(&text) {
            match cmd {
                ChatCommand::Help => commands::print_help(),
                ChatCommand::Clear => chat_input.clear(),
                ChatCommand::Exit => {
                    println!("\n  {}", style("Session ended.").dim());
                    break;
                }
                ChatCommand::History(n) => print_history(state, user, agent, n).await?,
                ChatCommand::Reset => {
                    let removed = state.chat_service.clear(&user.id, &agent.id).await?;
                    pending = None;
                    println!(
                        "\n  {} Forgot {} message{}.\n",
                        style("✓").green().bold(),
                        removed,
                        if removed == 1 { "" } else { "s" }
                    );
                }
                ChatCommand::Accept => match pending.take() {
                    Some(found) => {
                        let updated = state
                            .user_service
                            .merge_discoveries(&user.id, &found, state.config.discovery_merge)
                            .await?;
                        println!(
                            "\n  {} Profile updated: {} interests, {} traits.\n",
                            style("✓").green().bold(),
                            updated.interests.len(),
                            updated.personality_traits.len()
                        );
                    }
                    None => println!(
                        "\n  {} Nothing new to accept yet.\n",
                        style("i").blue().bold()
                    ),
                },
                ChatCommand::Profile => {
                    let me = state.user_service.get_user(&user.id).await?;
                    println!();
                    print_facts("Interests", &me.interests);
                    print_facts("Traits", &me.personality_traits);
                    println!();
                }
                ChatCommand::Unknown(name) => println!(
                    "\n  {} Unknown command: {}. Type /help for available commands.\n",
                    style("?").yellow().bold(),
                    style(name).dim()
                ),
            }
            continue;
        }

        let thinking = spinner("thinking...");
        let start_time = Instant::now();
        let result = state
            .chat_service
            .send_message(&user.id, &agent.id, &text)
            .await;
        thinking.finish_and_clear();

        let reply = match result {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, "Chat turn failed");
                eprintln!("\n  {} {e}", style("!").red().bold());
                eprintln!(
                    "  {}",
                    style("Type a message to retry, /exit to quit.").dim()
                );
                continue;
            }
        };
        turns += 1;

        let response_ms = start_time.elapsed().as_millis() as u64;
        println!("\n  {}", style(&agent.name).cyan().bold());
        println!("  {}", renderer.render_final(&reply.reply).trim());
        renderer.print_stats_footer(&reply.emotion, response_ms, &model);

        if let Some(found) = reply.discoveries.filter(|d| !d.is_empty()) {
            print_discoveries(&found);
            pending = Some(found);
        }
        println!();
    }

    chat_input.flush();
    info!(agent = %agent.name, turns, "Chat session ended");
    Ok(())
}

async fn print_history(
    state: &AppState,
    user: &UserProfile,
    agent: &Agent,
    last: usize,
) -> anyhow::Result<()> {
    let messages = state.chat_service.history(&user.id, &agent.id).await?;
    let skip = messages.len().saturating_sub(last);

    println!();
    if messages.is_empty() {
        println!("  {}", style("No messages yet.").dim());
    }
    for msg in &messages[skip..] {
        let who = match msg.role {
            ChatRole::User => style("You".to_string()).green(),
            ChatRole::Assistant => style(agent.name.clone()).cyan(),
        };
        println!(
            "  {} {} {}",
            style(msg.created_at.format("%H:%M")).dim(),
            who.bold(),
            truncate(&msg.content, 100)
        );
    }
    println!();
    Ok(())
}

fn print_discoveries(found: &Discoveries) {
    println!(
        "  {} I noticed something about you:",
        style("✦").magenta().bold()
    );
    if !found.interests.is_empty() {
        println!("    interests: {}", style(found.interests.join(", ")).cyan());
    }
    if !found.personality_traits.is_empty() {
        println!(
            "    traits:    {}",
            style(found.personality_traits.join(", ")).cyan()
        );
    }
    println!("  {}", style("Type /accept to add these to your profile.").dim());
}

fn print_facts(label: &str, items: &[String]) {
    let shown = if items.is_empty() {
        style("(none yet)".to_string()).dim()
    } else {
        style(items.join(", "))
    };
    println!("  {} {}", style(format!("{label}:")).bold(), shown);
}
