//! Job-related API endpoints

use crate::CoordinatorClient;
use crate::error::Result;
use framegrid_core::domain::job::{Job, JobId};
use framegrid_core::dto::job::SubmitJob;

impl CoordinatorClient {
    /// Submit a new render job
    ///
    /// # Arguments
    /// * `req` - The job submission request
    ///
    /// # Returns
    /// The created job, including its assigned id
    pub async fn submit_job(&self, req: &SubmitJob) -> Result<Job> {
        let url = format!("{}/jobs", self.base_url);
        let response = self.client.put(&url).json(req).send().await?;

        self.handle_response(response).await
    }

    /// List active jobs in scheduling order
    pub async fn list_jobs(&self) -> Result<Vec<Job>> {
        let url = format!("{}/jobs", self.base_url);
        let response = self.client.get(&url).send().await?;

        self.handle_response(response).await
    }

    /// Delete a job regardless of its completion state
    ///
    /// # Arguments
    /// * `job_id` - The job id
    pub async fn delete_job(&self, job_id: JobId) -> Result<()> {
        let url = format!("{}/jobs/{}", self.base_url, job_id);
        let response = self.client.delete(&url).send().await?;

        self.handle_empty_response(response).await
    }
}
