//! Render storage
//!
//! Filesystem layout under the coordinator base directory:
//! - `{base}/{project}.blend` — source project artifacts
//! - `{base}/renders/{job_id}/` — one directory per job: the staged
//!   artifact, uploaded frame images, and the `job.json` snapshot written at
//!   submission and again at retirement (never in between).

use std::io;
use std::path::{Path, PathBuf};

use framegrid_core::domain::job::{Job, JobId};

/// Project artifact extension
const PROJECT_EXT: &str = "blend";

/// Rendered frame extension
const FRAME_EXT: &str = "png";

/// Snapshot filename inside each job directory
const SNAPSHOT_FILE: &str = "job.json";

/// Filesystem access for projects, renders and job snapshots
#[derive(Debug, Clone)]
pub struct Storage {
    base_dir: PathBuf,
    render_dir: PathBuf,
}

impl Storage {
    /// Opens the storage rooted at `base_dir`, creating the render directory
    pub fn open(base_dir: impl Into<PathBuf>) -> io::Result<Self> {
        let base_dir = base_dir.into();
        let render_dir = base_dir.join("renders");
        std::fs::create_dir_all(&render_dir)?;
        Ok(Self {
            base_dir,
            render_dir,
        })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn job_dir(&self, id: JobId) -> PathBuf {
        self.render_dir.join(id.to_string())
    }

    fn project_path(&self, project: &str) -> PathBuf {
        self.base_dir.join(format!("{}.{}", project, PROJECT_EXT))
    }

    /// Names of the project artifacts available for rendering
    pub async fn list_projects(&self) -> io::Result<Vec<String>> {
        let names = self
            .file_names(&self.base_dir, Some(PROJECT_EXT))
            .await?
            .into_iter()
            .filter_map(|name| {
                name.strip_suffix(&format!(".{}", PROJECT_EXT))
                    .map(str::to_string)
            })
            .collect();
        Ok(names)
    }

    /// Reads a project artifact from the base directory
    pub async fn read_project(&self, project: &str) -> io::Result<Vec<u8>> {
        check_filename(project)?;
        tokio::fs::read(self.project_path(project)).await
    }

    /// Writes (or rewrites) the job's JSON snapshot
    pub async fn write_snapshot(&self, job: &Job) -> io::Result<()> {
        let dir = self.job_dir(job.id);
        tokio::fs::create_dir_all(&dir).await?;
        let body = serde_json::to_vec_pretty(job).map_err(io::Error::other)?;
        tokio::fs::write(dir.join(SNAPSHOT_FILE), body).await
    }

    /// Copies the job's project artifact into its render directory so
    /// workers can fetch it under the job namespace
    pub async fn stage_artifact(&self, job: &Job) -> io::Result<()> {
        let dir = self.job_dir(job.id);
        tokio::fs::create_dir_all(&dir).await?;
        let dest = dir.join(format!("{}.{}", job.project, PROJECT_EXT));
        tokio::fs::copy(self.project_path(&job.project), dest).await?;
        Ok(())
    }

    /// Job directory names, newest first
    pub async fn list_renders(&self) -> io::Result<Vec<String>> {
        let mut names = self.file_names(&self.render_dir, None).await?;
        names.sort_by(|a, b| b.cmp(a));
        Ok(names)
    }

    /// Rendered frame filenames for one job, sorted
    pub async fn list_frames(&self, id: JobId) -> io::Result<Vec<String>> {
        let mut names = self.file_names(&self.job_dir(id), Some(FRAME_EXT)).await?;
        names.sort();
        Ok(names)
    }

    /// Stores an uploaded file under the job's render directory
    pub async fn save_render(&self, id: JobId, filename: &str, body: &[u8]) -> io::Result<()> {
        check_filename(filename)?;
        let dir = self.job_dir(id);
        tokio::fs::create_dir_all(&dir).await?;
        tokio::fs::write(dir.join(filename), body).await
    }

    /// Reads a stored file from the job's render directory
    pub async fn read_render(&self, id: JobId, filename: &str) -> io::Result<Vec<u8>> {
        check_filename(filename)?;
        tokio::fs::read(self.job_dir(id).join(filename)).await
    }

    async fn file_names(&self, dir: &Path, ext: Option<&str>) -> io::Result<Vec<String>> {
        let mut entries = tokio::fs::read_dir(dir).await?;
        let mut names = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if let Some(ext) = ext {
                if path.extension().and_then(|e| e.to_str()) != Some(ext) {
                    continue;
                }
            }
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                names.push(name.to_string());
            }
        }

        Ok(names)
    }
}

/// Rejects names that could escape the directory they are stored under
fn check_filename(name: &str) -> io::Result<()> {
    if name.is_empty() || name.contains(['/', '\\']) || name.contains("..") {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("unsafe filename: {}", name),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use framegrid_core::dto::job::SubmitJob;

    use crate::queue::JobQueue;

    fn scratch_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("framegrid-test-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn sample_job(project: &str) -> Job {
        let mut queue = JobQueue::new();
        queue
            .submit(&SubmitJob {
                project: project.to_string(),
                start: 1,
                end: 3,
                priority: None,
            })
            .unwrap()
    }

    #[tokio::test]
    async fn test_snapshot_roundtrip() {
        let storage = Storage::open(scratch_dir()).unwrap();
        let job = sample_job("scene");

        storage.write_snapshot(&job).await.unwrap();

        let path = storage.job_dir(job.id).join(SNAPSHOT_FILE);
        let body = tokio::fs::read(path).await.unwrap();
        let restored: Job = serde_json::from_slice(&body).unwrap();
        assert_eq!(restored.id, job.id);
        assert_eq!(restored.project, "scene");
        assert_eq!(restored.queued, job.queued);
    }

    #[tokio::test]
    async fn test_project_listing_and_artifact_staging() {
        let dir = scratch_dir();
        std::fs::write(dir.join("scene.blend"), b"blend bytes").unwrap();
        std::fs::write(dir.join("notes.txt"), b"ignored").unwrap();

        let storage = Storage::open(&dir).unwrap();
        assert_eq!(storage.list_projects().await.unwrap(), vec!["scene"]);

        let job = sample_job("scene");
        storage.stage_artifact(&job).await.unwrap();

        let staged = storage
            .read_render(job.id, "scene.blend")
            .await
            .unwrap();
        assert_eq!(staged, b"blend bytes");
    }

    #[tokio::test]
    async fn test_frame_listing_filters_and_sorts() {
        let storage = Storage::open(scratch_dir()).unwrap();
        let job = sample_job("scene");

        storage
            .save_render(job.id, "output-00002.png", b"b")
            .await
            .unwrap();
        storage
            .save_render(job.id, "output-00001.png", b"a")
            .await
            .unwrap();
        storage.write_snapshot(&job).await.unwrap();

        assert_eq!(
            storage.list_frames(job.id).await.unwrap(),
            vec!["output-00001.png", "output-00002.png"]
        );
    }

    #[tokio::test]
    async fn test_unsafe_filenames_rejected() {
        let storage = Storage::open(scratch_dir()).unwrap();
        let job = sample_job("scene");

        let res = storage.save_render(job.id, "../escape.png", b"x").await;
        assert_eq!(res.unwrap_err().kind(), io::ErrorKind::InvalidInput);

        let res = storage.read_render(job.id, "a/b.png").await;
        assert_eq!(res.unwrap_err().kind(), io::ErrorKind::InvalidInput);
    }
}
