//! Task protocol endpoints

use reqwest::StatusCode;

use crate::CoordinatorClient;
use crate::error::Result;
use framegrid_core::domain::job::JobId;
use framegrid_core::domain::task::Task;
use framegrid_core::dto::task::TaskReport;

impl CoordinatorClient {
    /// Request the next chunk of work from the allocator
    ///
    /// # Arguments
    /// * `frames` - Maximum number of frames to check out
    /// * `worker` - Identity reported with the task
    ///
    /// # Returns
    /// `Ok(None)` when the coordinator has no queued frames; callers are
    /// expected to back off and poll again.
    pub async fn request_task(&self, frames: usize, worker: &str) -> Result<Option<Task>> {
        let url = format!("{}/tasks/request", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("frames", frames.to_string()), ("worker", worker.to_string())])
            .send()
            .await?;

        // 204 is the coordinator's "no work available" signal
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        self.handle_response(response).await.map(Some)
    }

    /// Report a task as successfully completed
    pub async fn complete_task(&self, job_id: JobId, task_id: &str) -> Result<()> {
        let url = format!("{}/tasks/complete", self.base_url);
        let report = TaskReport {
            job_id,
            task_id: task_id.to_string(),
            error: None,
        };
        let response = self.client.put(&url).json(&report).send().await?;

        self.handle_empty_response(response).await
    }

    /// Report a task as failed; the coordinator requeues its frames
    ///
    /// # Arguments
    /// * `error` - Human-readable failure detail (logged by the coordinator)
    pub async fn fail_task(&self, job_id: JobId, task_id: &str, error: &str) -> Result<()> {
        let url = format!("{}/tasks/failed", self.base_url);
        let report = TaskReport {
            job_id,
            task_id: task_id.to_string(),
            error: Some(error.to_string()),
        };
        let response = self.client.put(&url).json(&report).send().await?;

        self.handle_empty_response(response).await
    }
}
