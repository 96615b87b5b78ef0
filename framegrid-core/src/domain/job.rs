//! Job domain types

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::task::Task;

/// Unique job identifier
///
/// Microseconds since the Unix epoch at submission time. The coordinator
/// forces strict monotonicity for submissions landing in the same
/// microsecond, so ids double as a stable chronological sort key. The decimal
/// value is also used as the job's render directory name.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct JobId(i64);

impl JobId {
    pub fn from_micros(micros: i64) -> Self {
        Self(micros)
    }

    pub fn as_micros(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for JobId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

/// Job lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Accepted,
    Processing,
    Complete,
}

/// A submitted render request spanning an inclusive frame range
///
/// Shared between coordinator (schedules and persists snapshots) and clients
/// (listing). Invariant: every frame in `[start, end]` lives in exactly one
/// of `queued`, an `assigned` task's frame list, or a `complete` task's frame
/// list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub project: String,
    pub start: i32,
    pub end: i32,
    pub total: i32,
    pub priority: i32,
    pub status: JobStatus,
    /// Frames not yet handed to any worker, in allocation order. Failed
    /// tasks requeue at the back, so this is not necessarily contiguous.
    pub queued: VecDeque<i32>,
    /// Tasks currently checked out to workers, keyed by task id.
    pub assigned: HashMap<String, Task>,
    /// Tasks finished successfully, keyed by task id.
    pub complete: HashMap<String, Task>,
}

impl Job {
    /// Creates a freshly accepted job covering `start..=end`
    ///
    /// The caller must have validated the range: `start <= end` and a span
    /// small enough that `total` fits an `i32` and the queue allocation is
    /// reasonable.
    pub fn new(id: JobId, project: String, start: i32, end: i32, priority: i32) -> Self {
        Self {
            id,
            project,
            start,
            end,
            total: end - start + 1,
            priority,
            status: JobStatus::Accepted,
            queued: (start..=end).collect(),
            assigned: HashMap::new(),
            complete: HashMap::new(),
        }
    }

    /// True once every frame has reached the complete set
    pub fn is_finished(&self) -> bool {
        self.queued.is_empty() && self.assigned.is_empty()
    }

    /// Scheduling sort key: lower priority first, ties broken by id (FIFO)
    pub fn sort_key(&self) -> (i32, JobId) {
        (self.priority, self.id)
    }
}
