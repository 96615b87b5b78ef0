//! Framegrid CLI
//!
//! Command-line interface for interacting with the Framegrid coordinator.

mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;

#[derive(Parser)]
#[command(name = "framegrid")]
#[command(about = "Framegrid render farm CLI", long_about = None)]
struct Cli {
    /// Coordinator URL
    #[arg(
        long,
        env = "FRAMEGRID_COORDINATOR_URL",
        default_value = "http://localhost:8080"
    )]
    coordinator_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config {
        coordinator_url: cli.coordinator_url,
    };

    handle_command(cli.command, &config).await
}
