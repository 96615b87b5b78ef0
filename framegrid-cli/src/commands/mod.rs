//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod job;
mod project;
mod render;

pub use job::JobCommands;
pub use render::RenderCommands;

use anyhow::Result;
use clap::Subcommand;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// List available projects
    Projects,
    /// Job management
    Job {
        #[command(subcommand)]
        command: JobCommands,
    },
    /// Rendered output
    Render {
        #[command(subcommand)]
        command: RenderCommands,
    },
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Projects => project::list_projects(config).await,
        Commands::Job { command } => job::handle_job_command(command, config).await,
        Commands::Render { command } => render::handle_render_command(command, config).await,
    }
}
