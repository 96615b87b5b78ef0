//! Task DTOs for coordinator API communication

use serde::{Deserialize, Serialize};

use crate::domain::job::JobId;

/// Worker report against a checked-out task
///
/// Sent to both `/tasks/complete` and `/tasks/failed`; `error` is only
/// meaningful for the latter and is logged by the coordinator, not retained.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskReport {
    pub job_id: JobId,
    pub task_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
