//! Worker configuration
//!
//! Defines all configurable parameters for the worker including the polling
//! interval, task sizing, render tool binary, and coordinator connection
//! settings.

use std::path::PathBuf;
use std::time::Duration;

/// Worker configuration
///
/// All knobs are configurable to allow tuning for different deployment
/// scenarios (dev vs prod, fast vs slow render nodes).
#[derive(Debug, Clone)]
pub struct Config {
    /// Unique identifier for this worker instance
    pub worker_id: String,

    /// Coordinator base URL (e.g., "http://localhost:8080")
    pub coordinator_url: String,

    /// Maximum frames to check out per task
    pub frames_per_task: usize,

    /// Flat delay between polls when the coordinator has no work. This is a
    /// fixed interval, not an exponential backoff.
    pub poll_interval: Duration,

    /// Render tool executable
    pub render_bin: String,

    /// Local working directory; artifacts are cached per job id beneath it
    pub work_dir: PathBuf,
}

impl Config {
    /// Creates a new configuration with defaults
    pub fn new(worker_id: String, coordinator_url: String) -> Self {
        let work_dir = std::env::temp_dir().join(format!("framegrid-worker-{}", worker_id));
        Self {
            worker_id,
            coordinator_url,
            frames_per_task: 1,
            poll_interval: Duration::from_secs(5),
            render_bin: "blender".to_string(),
            work_dir,
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Expected environment variables:
    /// - COORDINATOR_URL (required)
    /// - WORKER_ID (optional, default: random uuid)
    /// - FRAMES_PER_TASK (optional, default: 1)
    /// - POLL_INTERVAL (optional, seconds, default: 5)
    /// - RENDER_BIN (optional, default: "blender")
    /// - WORK_DIR (optional, default: a per-worker temp directory)
    pub fn from_env() -> anyhow::Result<Self> {
        let coordinator_url = std::env::var("COORDINATOR_URL")
            .map_err(|_| anyhow::anyhow!("COORDINATOR_URL environment variable not set"))?;

        let worker_id = std::env::var("WORKER_ID")
            .unwrap_or_else(|_| uuid::Uuid::new_v4().to_string());

        let mut config = Self::new(worker_id, coordinator_url);

        if let Some(frames) = std::env::var("FRAMES_PER_TASK")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
        {
            config.frames_per_task = frames;
        }

        if let Some(secs) = std::env::var("POLL_INTERVAL")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
        {
            config.poll_interval = Duration::from_secs(secs);
        }

        if let Ok(bin) = std::env::var("RENDER_BIN") {
            config.render_bin = bin;
        }

        if let Ok(dir) = std::env::var("WORK_DIR") {
            config.work_dir = PathBuf::from(dir);
        }

        Ok(config)
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.worker_id.is_empty() {
            anyhow::bail!("worker_id cannot be empty");
        }

        if !self.coordinator_url.starts_with("http://")
            && !self.coordinator_url.starts_with("https://")
        {
            anyhow::bail!("coordinator_url must start with http:// or https://");
        }

        if self.frames_per_task == 0 {
            anyhow::bail!("frames_per_task must be at least 1");
        }

        if self.poll_interval.as_secs() == 0 {
            anyhow::bail!("poll_interval must be greater than 0");
        }

        if self.render_bin.is_empty() {
            anyhow::bail!("render_bin cannot be empty");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(
            uuid::Uuid::new_v4().to_string(),
            "http://localhost:8080".to_string(),
        )
    }
}
