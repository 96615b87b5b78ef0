//! Task domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::job::JobId;

/// A checked-out chunk of a job's remaining frames, assigned to one worker
///
/// Created by allocation, destroyed by completion (moves into the job's
/// complete set) or failure (frames requeue at the back of the job's queue).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Derived from the chunk's first and last frame (`"{first}_{last}"`).
    /// Unique within a job because handed-out ranges never overlap.
    pub task_id: String,
    pub job_id: JobId,
    pub project: String,
    pub frames: Vec<i32>,
    /// Identity of the worker the task was issued to.
    pub worker: String,
    /// Issue timestamp, second resolution.
    pub issued_at: DateTime<Utc>,
    /// Wall-clock seconds from issue to completion, set on completion only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<i64>,
}

impl Task {
    /// Derives the task id for a non-empty frame chunk
    pub fn id_for(frames: &[i32]) -> String {
        // Allocation never builds an empty chunk.
        let first = frames.first().copied().unwrap_or(0);
        let last = frames.last().copied().unwrap_or(first);
        format!("{}_{}", first, last)
    }
}
