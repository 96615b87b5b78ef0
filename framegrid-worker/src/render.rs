//! External render tool invocation
//!
//! Runs the render tool (Blender-compatible CLI) once per task over the full
//! frame list, then validates that every expected output image exists. A
//! non-zero exit or a missing output is fatal for the task — there is no
//! partial success.

use std::path::Path;
use std::process::ExitStatus;

use thiserror::Error;
use tracing::{debug, info};

/// Output pattern handed to the render tool; `#####` expands per frame
const OUTPUT_PATTERN: &str = "output-#####.png";

/// Task-level error taxonomy
///
/// Every variant is fatal for the current task, and per the worker's
/// fail-fast policy, fatal for the process after the failure is reported.
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("task I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("render tool exited with status {0}")]
    RenderFailed(ExitStatus),

    #[error("frame {frame} missing expected output {filename}")]
    RenderIncomplete { frame: i32, filename: String },

    #[error("failed to fetch artifact {project}")]
    Artifact {
        project: String,
        #[source]
        source: framegrid_client::ClientError,
    },

    #[error("failed to upload {filename}")]
    Upload {
        filename: String,
        #[source]
        source: framegrid_client::ClientError,
    },
}

/// Expected output filename for one frame
pub fn frame_output_name(frame: i32) -> String {
    format!("output-{:05}.png", frame)
}

/// Frame list in the render tool's `-f` syntax
fn frame_list_arg(frames: &[i32]) -> String {
    frames
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// Wraps the external render tool binary
#[derive(Debug, Clone)]
pub struct Renderer {
    bin: String,
}

impl Renderer {
    pub fn new(bin: String) -> Self {
        Self { bin }
    }

    /// Checks that the render tool is installed and runnable
    pub fn check_available(&self) -> anyhow::Result<()> {
        use anyhow::Context;

        let output = std::process::Command::new(&self.bin)
            .arg("--version")
            .output()
            .with_context(|| {
                format!("Failed to execute '{} --version'. Is it installed?", self.bin)
            })?;

        if !output.status.success() {
            anyhow::bail!("Render tool '{}' is not working correctly", self.bin);
        }

        let version = String::from_utf8_lossy(&output.stdout);
        info!(
            "Render tool is available: {}",
            version.lines().next().unwrap_or("").trim()
        );

        Ok(())
    }

    /// Renders all frames of a task in one invocation
    ///
    /// Output images land in `workdir` named per [`frame_output_name`].
    pub async fn render(
        &self,
        blendfile: &Path,
        workdir: &Path,
        frames: &[i32],
    ) -> Result<(), TaskError> {
        let args = build_args(blendfile, workdir, frames);
        debug!("Running {} {:?}", self.bin, args);

        let status = tokio::process::Command::new(&self.bin)
            .args(&args)
            .status()
            .await?;

        if !status.success() {
            return Err(TaskError::RenderFailed(status));
        }

        Ok(())
    }
}

/// Argument list for one task invocation
fn build_args(blendfile: &Path, workdir: &Path, frames: &[i32]) -> Vec<String> {
    vec![
        "-b".to_string(),
        blendfile.display().to_string(),
        "-o".to_string(),
        workdir.join(OUTPUT_PATTERN).display().to_string(),
        "-f".to_string(),
        frame_list_arg(frames),
    ]
}

/// Confirms every frame produced its output file
///
/// A missing file fails the whole task; frames that did render are still
/// requeued with the rest when the failure is reported.
pub fn validate_outputs(workdir: &Path, frames: &[i32]) -> Result<(), TaskError> {
    for &frame in frames {
        let filename = frame_output_name(frame);
        if !workdir.join(&filename).is_file() {
            return Err(TaskError::RenderIncomplete { frame, filename });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn scratch_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("framegrid-render-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_frame_output_name_is_zero_padded() {
        assert_eq!(frame_output_name(1), "output-00001.png");
        assert_eq!(frame_output_name(12345), "output-12345.png");
    }

    #[test]
    fn test_build_args_shape() {
        let args = build_args(
            Path::new("/work/job/scene.blend"),
            Path::new("/work/job"),
            &[1, 2, 5],
        );
        assert_eq!(args[0], "-b");
        assert_eq!(args[1], "/work/job/scene.blend");
        assert_eq!(args[2], "-o");
        assert!(args[3].ends_with("output-#####.png"));
        assert_eq!(args[4], "-f");
        assert_eq!(args[5], "1,2,5");
    }

    #[test]
    fn test_validate_outputs_detects_missing_frame() {
        let dir = scratch_dir();
        std::fs::write(dir.join(frame_output_name(1)), b"png").unwrap();
        std::fs::write(dir.join(frame_output_name(3)), b"png").unwrap();

        assert!(validate_outputs(&dir, &[1, 3]).is_ok());

        match validate_outputs(&dir, &[1, 2, 3]) {
            Err(TaskError::RenderIncomplete { frame, .. }) => assert_eq!(frame, 2),
            other => panic!("expected RenderIncomplete, got {:?}", other),
        }
    }
}
