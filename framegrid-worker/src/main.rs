//! Framegrid Worker
//!
//! A stateless render worker that pulls tasks from the coordinator.
//!
//! Architecture:
//! - Configuration: Load settings from environment or defaults
//! - Render: External render tool invocation and output validation
//! - Worker: The pull loop (request, fetch artifact, render, upload, report)
//!
//! The worker polls the coordinator for tasks, renders the checked-out frames
//! with an external tool, uploads the images, and reports the outcome. On any
//! task error it reports failure and exits rather than continuing (fail-fast;
//! restart is left to external supervision).

mod config;
mod render;
mod worker;

use anyhow::{Context, Result};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::render::Renderer;
use crate::worker::Worker;
use framegrid_client::CoordinatorClient;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "framegrid_worker=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Framegrid Worker");

    // Load configuration
    let config = load_config()?;
    info!(
        "Loaded configuration: worker_id={}, coordinator_url={}",
        config.worker_id, config.coordinator_url
    );

    // Probe the render tool before asking for any work
    let renderer = Renderer::new(config.render_bin.clone());
    renderer.check_available()?;

    tokio::fs::create_dir_all(&config.work_dir)
        .await
        .context("Failed to create work directory")?;

    let client = CoordinatorClient::new(config.coordinator_url.clone());

    let worker = Worker::new(config, client, renderer);

    info!("Worker initialized successfully");

    if let Err(e) = worker.run().await {
        error!("Worker terminated: {:#}", e);
        return Err(e);
    }

    Ok(())
}

/// Loads configuration from environment variables with fallback to defaults
fn load_config() -> Result<Config> {
    match Config::from_env() {
        Ok(config) => {
            config.validate()?;
            Ok(config)
        }
        Err(_) => {
            info!("COORDINATOR_URL not set, using defaults");
            let config = Config::default();
            config.validate()?;
            Ok(config)
        }
    }
}
