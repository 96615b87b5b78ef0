//! Project and render endpoints

use crate::CoordinatorClient;
use crate::error::{ClientError, Result};
use framegrid_core::domain::job::JobId;

impl CoordinatorClient {
    /// List the project names available for rendering
    pub async fn list_projects(&self) -> Result<Vec<String>> {
        let url = format!("{}/projects", self.base_url);
        let response = self.client.get(&url).send().await?;

        self.handle_response(response).await
    }

    /// Download the project artifact staged under a job's render directory
    ///
    /// # Arguments
    /// * `job_id` - The job the artifact was staged for
    /// * `project` - The project name (fetched as `{project}.blend`)
    pub async fn download_artifact(&self, job_id: JobId, project: &str) -> Result<Vec<u8>> {
        let url = format!("{}/renders/{}/{}.blend", self.base_url, job_id, project);
        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        Ok(response.bytes().await?.to_vec())
    }

    /// Upload a rendered frame under a job's render directory
    pub async fn upload_render(&self, job_id: JobId, filename: &str, body: Vec<u8>) -> Result<()> {
        let url = format!("{}/renders/{}/{}", self.base_url, job_id, filename);
        let response = self.client.put(&url).body(body).send().await?;

        self.handle_empty_response(response).await
    }

    /// List job render directories, newest first
    pub async fn list_renders(&self) -> Result<Vec<String>> {
        let url = format!("{}/renders", self.base_url);
        let response = self.client.get(&url).send().await?;

        self.handle_response(response).await
    }

    /// List the rendered frame filenames for an active job
    pub async fn list_frames(&self, job_id: JobId) -> Result<Vec<String>> {
        let url = format!("{}/renders/{}", self.base_url, job_id);
        let response = self.client.get(&url).send().await?;

        self.handle_response(response).await
    }
}
