//! Command-line interface for gomoku_server.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Gomoku move service with heuristic and LLM opponents
#[derive(Parser, Debug)]
#[command(name = "gomoku_server")]
#[command(about = "Gomoku win detection and AI move service", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the TOML config file (optional; defaults apply when missing)
    #[arg(short, long, global = true, default_value = "gomoku.toml")]
    pub config: PathBuf,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP server
    Serve {
        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Print provider availability as JSON
    Status,

    /// Evaluate a board offline
    Evaluate {
        /// Board edge length
        #[arg(short, long)]
        size: usize,

        /// Stones in a row needed to win
        #[arg(short, long, default_value = "5")]
        run_length: usize,

        /// Board as a JSON array of null, "X" or "O" in row-major order
        board: String,
    },
}
