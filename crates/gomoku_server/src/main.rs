//! Gomoku Server - CLI entry point
//!
//! Serves the AI move API, reports provider status, or evaluates boards offline.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command};
use gomoku_rules::{Board, evaluate};
use gomoku_server::{AiOrchestrator, AppState, ServerConfig, router};
use serde_json::Value;
use std::path::Path;
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,gomoku_server=debug")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve { host, port } => run_server(&cli.config, host, port).await,
        Command::Status => print_status(&cli.config),
        Command::Evaluate {
            size,
            run_length,
            board,
        } => print_evaluation(size, run_length, &board),
    }
}

/// Run the HTTP move service
#[instrument(skip(config_path), fields(config = %config_path.display()))]
async fn run_server(config_path: &Path, host: Option<String>, port: Option<u16>) -> Result<()> {
    let config = ServerConfig::load(config_path)?;
    let host = host.unwrap_or_else(|| config.host().clone());
    let port = port.unwrap_or(*config.port());

    let orchestrator = AiOrchestrator::from_config(&config)?;
    let status = orchestrator.status();
    let app = router(AppState::new(orchestrator, config.is_production()));

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!(
        %addr,
        environment = %config.environment(),
        classic = ?status.classic,
        external = ?status.external,
        "Gomoku server listening on http://{}",
        addr
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

/// Print provider availability
fn print_status(config_path: &Path) -> Result<()> {
    let config = ServerConfig::load(config_path)?;
    let orchestrator = AiOrchestrator::from_config(&config)?;
    println!("{}", serde_json::to_string_pretty(&orchestrator.status())?);
    Ok(())
}

/// Evaluate a board given on the command line
fn print_evaluation(size: usize, run_length: usize, board: &str) -> Result<()> {
    let values: Vec<Value> =
        serde_json::from_str(board).context("Board must be a JSON array")?;
    let board = Board::from_json(&values, size)?;

    println!("{}", board.display());
    println!("{}", serde_json::to_string_pretty(&evaluate(&board, run_length))?);
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    info!("Shutdown signal received");
}
