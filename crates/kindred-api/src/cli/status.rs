//! System status dashboard command.

use anyhow::Result;
use console::style;

use kindred_infra::llm::test_provider_connection;

use crate::state::AppState;

/// Display the dashboard for the acting user plus provider details.
///
/// With `check`, also sends a tiny completion to verify the provider.
pub async fn status(state: &AppState, as_user: Option<&str>, check: bool, json: bool) -> Result<()> {
    let user = state.acting_user(as_user).await?;
    let stats = state.chat_service.dashboard(&user.id).await?;

    let connection = if check {
        Some(test_provider_connection(&state.provider).await)
    } else {
        None
    };

    if json {
        let status = serde_json::json!({
            "version": env!("CARGO_PKG_VERSION"),
            "data_dir": state.data_dir.display().to_string(),
            "user": user.email,
            "stats": stats,
            "provider": {
                "name": state.provider.name(),
                "model": state.provider.model(),
                "reachable": connection.as_ref().map(|r| r.is_ok()),
                "error": connection.as_ref().and_then(|r| r.as_ref().err()).map(|e| e.to_string()),
            },
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} Kindred v{}",
        style("♥").magenta().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!();

    println!("  {}", style("── Dashboard ──").dim());
    println!("  User:           {}", style(&user.email).cyan());
    println!("  Chats:          {}", style(stats.total_chats).bold());
    println!("  Default agents: {}", style(stats.default_agents).bold());
    println!("  Custom agents:  {}", style(stats.custom_agents).bold());
    println!();

    println!("  {}", style("── Provider ──").dim());
    println!("  Backend: {}", state.provider.name());
    println!("  Model:   {}", state.provider.model());
    match connection {
        Some(Ok(())) => println!("  Check:   {}", style("✓ reachable").green()),
        Some(Err(e)) => println!("  Check:   {} {}", style("✗").red(), style(e).dim()),
        None => {}
    }
    println!();

    println!("  {}", style("── Storage ──").dim());
    println!(
        "  Data dir: {}",
        style(state.data_dir.display()).dim()
    );
    println!();

    Ok(())
}
