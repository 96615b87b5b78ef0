//! Worker execution loop
//!
//! Pulls tasks from the coordinator one at a time:
//! request -> fetch artifact (cached per job) -> render -> validate ->
//! upload -> report. The coordinator never pushes work.
//!
//! Failure policy is fail-fast: any render or upload error is reported via
//! `/tasks/failed` (so the frames requeue) and then terminates the worker
//! process, which external supervision is expected to restart.

use anyhow::{Context, Result};
use tracing::{debug, error, info};

use framegrid_client::CoordinatorClient;
use framegrid_core::domain::task::Task;

use crate::config::Config;
use crate::render::{self, Renderer, TaskError};

/// Pull-based task worker
pub struct Worker {
    config: Config,
    client: CoordinatorClient,
    renderer: Renderer,
}

impl Worker {
    pub fn new(config: Config, client: CoordinatorClient, renderer: Renderer) -> Self {
        Self {
            config,
            client,
            renderer,
        }
    }

    /// Runs the polling loop until an unrecoverable error
    pub async fn run(&self) -> Result<()> {
        info!(
            "Starting task loop (frames per task: {}, poll interval: {:?})",
            self.config.frames_per_task, self.config.poll_interval
        );

        loop {
            let task = self
                .client
                .request_task(self.config.frames_per_task, &self.config.worker_id)
                .await
                .context("Failed to request task")?;

            let Some(task) = task else {
                debug!("No work available, waiting {:?}", self.config.poll_interval);
                tokio::time::sleep(self.config.poll_interval).await;
                continue;
            };

            info!(
                "Received task {} of job {} ({} frames)",
                task.task_id,
                task.job_id,
                task.frames.len()
            );

            if let Err(err) = self.execute_task(&task).await {
                error!("Task {} failed: {:#}", task.task_id, err);

                self.client
                    .fail_task(task.job_id, &task.task_id, &err.to_string())
                    .await
                    .context("Failed to report task failure")?;

                // Fail-fast: the frames are requeued upstream, but this
                // worker does not resume polling on its own.
                return Err(err).context(format!("Task {} failed", task.task_id));
            }

            self.client
                .complete_task(task.job_id, &task.task_id)
                .await
                .context("Failed to report task completion")?;

            info!("Completed task {}, waiting for next", task.task_id);
        }
    }

    /// Executes a single task end to end
    async fn execute_task(&self, task: &Task) -> Result<(), TaskError> {
        let jobdir = self.config.work_dir.join(task.job_id.to_string());
        tokio::fs::create_dir_all(&jobdir).await?;

        // Fetch the project artifact unless a previous task for this job
        // already cached it in this worker's lifetime.
        let blendfile = jobdir.join(format!("{}.blend", task.project));
        if blendfile.is_file() {
            debug!("Artifact {} already cached", blendfile.display());
        } else {
            info!("Fetching artifact {} for job {}", task.project, task.job_id);
            let bytes = self
                .client
                .download_artifact(task.job_id, &task.project)
                .await
                .map_err(|source| TaskError::Artifact {
                    project: task.project.clone(),
                    source,
                })?;
            tokio::fs::write(&blendfile, bytes).await?;
        }

        self.renderer
            .render(&blendfile, &jobdir, &task.frames)
            .await?;

        render::validate_outputs(&jobdir, &task.frames)?;

        info!("Uploading {} frame(s) for task {}", task.frames.len(), task.task_id);
        for &frame in &task.frames {
            let filename = render::frame_output_name(frame);
            let body = tokio::fs::read(jobdir.join(&filename)).await?;
            self.client
                .upload_render(task.job_id, &filename, body)
                .await
                .map_err(|source| TaskError::Upload { filename, source })?;
        }

        Ok(())
    }
}
