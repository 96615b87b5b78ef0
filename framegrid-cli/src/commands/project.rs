//! Project command handlers

use anyhow::Result;
use colored::*;

use framegrid_client::CoordinatorClient;

use crate::config::Config;

/// List the projects available for rendering
pub async fn list_projects(config: &Config) -> Result<()> {
    let client = CoordinatorClient::new(&config.coordinator_url);
    let projects = client.list_projects().await?;

    if projects.is_empty() {
        println!("{}", "No projects available.".yellow());
    } else {
        println!("{}", format!("Found {} project(s):", projects.len()).bold());
        for project in projects {
            println!("  {} {}", "▸".cyan(), project);
        }
    }

    Ok(())
}
