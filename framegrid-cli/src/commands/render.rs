//! Render command handlers
//!
//! Lists job render directories and the frames rendered so far.

use anyhow::Result;
use clap::Subcommand;
use colored::*;

use framegrid_core::domain::job::JobId;

use framegrid_client::CoordinatorClient;

use crate::config::Config;

/// Render subcommands
#[derive(Subcommand)]
pub enum RenderCommands {
    /// List job render directories, newest first
    List,
    /// List rendered frames for an active job
    Frames {
        /// Job ID
        id: JobId,
    },
}

/// Handle render commands
pub async fn handle_render_command(command: RenderCommands, config: &Config) -> Result<()> {
    let client = CoordinatorClient::new(&config.coordinator_url);

    match command {
        RenderCommands::List => list_renders(&client).await,
        RenderCommands::Frames { id } => list_frames(&client, id).await,
    }
}

async fn list_renders(client: &CoordinatorClient) -> Result<()> {
    let renders = client.list_renders().await?;

    if renders.is_empty() {
        println!("{}", "No renders yet.".yellow());
    } else {
        println!("{}", format!("Found {} render(s):", renders.len()).bold());
        for name in renders {
            println!("  {} {}", "▸".cyan(), name);
        }
    }

    Ok(())
}

async fn list_frames(client: &CoordinatorClient, id: JobId) -> Result<()> {
    let frames = client.list_frames(id).await?;

    if frames.is_empty() {
        println!("{}", format!("No frames rendered yet for job {}.", id).yellow());
    } else {
        println!(
            "{}",
            format!("Job {} has {} rendered frame(s):", id, frames.len()).bold()
        );
        for frame in frames {
            println!("  {} {}", "▸".cyan(), frame);
        }
    }

    Ok(())
}
