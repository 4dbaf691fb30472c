//! Kindred CLI and REST API entry point.
//!
//! Binary name: `kindred`
//!
//! Parses CLI arguments, initializes database and services, then dispatches
//! to the appropriate command handler or starts the REST API server.

mod cli;
mod http;
mod state;

use clap::Parser;
use clap_complete::generate;

use cli::{Cli, Commands};
use kindred_observe::tracing_setup::{default_filter, init_tracing, shutdown_tracing};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Shell completions don't need tracing or app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "kindred", &mut std::io::stdout());
        return Ok(());
    }

    let json_logs = cli.json && matches!(cli.command, Commands::Serve { .. });
    init_tracing(default_filter(cli.verbose, cli.quiet), json_logs, cli.otel)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let result = run(cli).await;
    shutdown_tracing();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // Initialize application state (DB, services, provider)
    let state = AppState::init().await?;
    let as_user = cli.as_user.as_deref();

    match cli.command {
        Commands::Agent { action } => {
            cli::agent::run(&state, action, as_user, cli.json).await?;
        }

        Commands::User { action } => {
            cli::user::run(&state, action, as_user, cli.json).await?;
        }

        Commands::Profile { action } => {
            cli::profile::run(&state, action, as_user, cli.json).await?;
        }

        Commands::Chat { agent } => {
            let user = state.acting_user(as_user).await?;
            let agent = cli::resolve_agent(&state, &user, &agent).await?;
            cli::chat::loop_runner::run_chat_loop(&state, &user, &agent).await?;
        }

        Commands::Enhance { prompt } => {
            cli::enhance::enhance(&state, &prompt.join(" "), cli.json).await?;
        }

        Commands::Status { check } => {
            cli::status::status(&state, as_user, check, cli.json).await?;
        }

        Commands::Serve { port, host } => {
            // Make sure the default catalogue exists before anyone signs up
            state.acting_user(None).await?;

            let addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr).await?;

            if !cli.quiet {
                println!(
                    "  {} Kindred API listening on {}",
                    console::style("⚡").bold(),
                    console::style(format!("http://{addr}")).cyan()
                );
                println!("  {}", console::style("Press Ctrl+C to stop").dim());
            }
            tracing::info!(%addr, provider = state.provider.name(), "Server started");

            let router = http::router::build_router(state);

            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            if !cli.quiet {
                println!("\n  Server stopped.");
            }
        }

        Commands::Completions { .. } => {}
    }

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
