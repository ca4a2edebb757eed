//! Kindred CLI — the main entry point.
//!
//! Commands:
//! - `turn`   — Run a single conversation turn
//! - `doctor` — Validate configuration and show the derived budget

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "kindred",
    about = "Kindred — affective companion runtime",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the config file
    #[arg(short, long, global = true, default_value = "kindred.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single conversation turn
    Turn {
        /// The user's message
        message: String,

        /// User id to resolve identity and mood for
        #[arg(short, long, default_value = "local")]
        user: String,

        /// Session id; a fresh one is generated when omitted
        #[arg(short, long)]
        session: Option<String>,

        /// Print the finalized turn metrics as JSON
        #[arg(long)]
        metrics: bool,
    },

    /// Validate configuration and show the derived budget
    Doctor,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Turn {
            message,
            user,
            session,
            metrics,
        } => commands::turn::run(&cli.config, message, user, session, metrics).await,
        Commands::Doctor => commands::doctor::run(&cli.config),
    }
}
