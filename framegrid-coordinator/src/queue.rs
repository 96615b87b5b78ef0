//! Job queue
//!
//! The in-memory scheduling core: holds all active jobs sorted by
//! `(priority, id)` and implements task allocation, completion and failure
//! handling. All operations are plain synchronous structure edits; the HTTP
//! layer wraps the queue in a mutex so racing workers never interleave
//! read-modify-write sequences (two concurrent requests must never be handed
//! overlapping frames). Snapshot and file I/O happen outside the lock.

use std::fmt;

use chrono::{SubsecRound, Utc};

use framegrid_core::domain::job::{Job, JobId, JobStatus};
use framegrid_core::domain::task::Task;
use framegrid_core::dto::job::SubmitJob;

/// Queue error type
#[derive(Debug)]
pub enum QueueError {
    /// Malformed submission or request parameter
    Invalid(String),
    /// Unknown job or task id
    NotFound(String),
}

impl fmt::Display for QueueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueueError::Invalid(msg) => write!(f, "invalid request: {}", msg),
            QueueError::NotFound(msg) => write!(f, "not found: {}", msg),
        }
    }
}

impl std::error::Error for QueueError {}

/// Result of a successful completion report
pub enum TaskOutcome {
    /// The job still has queued or assigned frames.
    Pending,
    /// The completed task was the last one; the job has been retired from
    /// the active set and the caller owns its terminal snapshot.
    JobComplete(Job),
}

/// Upper bound on the frame span of a single job
pub const MAX_JOB_FRAMES: i64 = 1_000_000;

/// All active jobs, in scheduling order
pub struct JobQueue {
    jobs: Vec<Job>,
    last_id: i64,
}

impl JobQueue {
    pub fn new() -> Self {
        Self {
            jobs: Vec::new(),
            last_id: 0,
        }
    }

    /// Jobs in scheduling order (priority ascending, then id)
    ///
    /// This order is exactly the order `request_task` consults.
    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn contains(&self, id: JobId) -> bool {
        self.jobs.iter().any(|j| j.id == id)
    }

    /// Validates a submission and builds its job with a reserved id
    ///
    /// The job is NOT yet in the active set: the caller stages the project
    /// artifact and writes the initial snapshot first, then calls
    /// [`JobQueue::enqueue`]. Until then the allocator cannot hand out a task
    /// whose artifact does not exist, and an abandoned submission needs no
    /// rollback. The reserved id is burned either way, which keeps ids
    /// strictly monotonic.
    pub fn prepare(&mut self, req: &SubmitJob) -> Result<Job, QueueError> {
        if req.start > req.end {
            return Err(QueueError::Invalid(format!(
                "start frame {} is after end frame {}",
                req.start, req.end
            )));
        }

        // Widen before computing the width so extreme i32 bounds cannot
        // overflow, then cap it: a single submission should not pin
        // gigabytes of queued frames.
        let total = i64::from(req.end) - i64::from(req.start) + 1;
        if total > MAX_JOB_FRAMES {
            return Err(QueueError::Invalid(format!(
                "frame range spans {} frames, the maximum is {}",
                total, MAX_JOB_FRAMES
            )));
        }

        Ok(Job::new(
            self.next_id(),
            req.project.clone(),
            req.start,
            req.end,
            req.priority.unwrap_or(0),
        ))
    }

    /// Inserts a prepared job into the active set
    pub fn enqueue(&mut self, job: Job) {
        self.jobs.push(job);
        self.jobs.sort_by_key(|j| j.sort_key());
    }

    /// Validates, builds and enqueues a job in one step
    ///
    /// For callers with no staging to do between the two halves.
    pub fn submit(&mut self, req: &SubmitJob) -> Result<Job, QueueError> {
        let job = self.prepare(req)?;
        self.enqueue(job.clone());
        Ok(job)
    }

    /// Removes a job regardless of completion state
    ///
    /// Administrative override, not a lifecycle transition: outstanding
    /// assigned tasks are orphaned and later reports against them get
    /// `NotFound`.
    pub fn remove(&mut self, id: JobId) -> Result<Job, QueueError> {
        let idx = self.position(id)?;
        Ok(self.jobs.remove(idx))
    }

    /// Hands out the next chunk of work, if any
    ///
    /// Scans jobs in scheduling order and takes up to `frames` frames from
    /// the front of the first non-empty queue. Returns `Ok(None)` when no
    /// job has queued frames; that is the normal "poll again later" signal,
    /// not an error. A frame count of zero is rejected.
    pub fn request_task(
        &mut self,
        frames: usize,
        worker: &str,
    ) -> Result<Option<Task>, QueueError> {
        if frames == 0 {
            return Err(QueueError::Invalid(
                "frame count must be at least 1".to_string(),
            ));
        }

        for job in &mut self.jobs {
            if job.queued.is_empty() {
                continue;
            }

            job.status = JobStatus::Processing;

            let take = frames.min(job.queued.len());
            let chunk: Vec<i32> = job.queued.drain(..take).collect();

            let task = Task {
                task_id: Task::id_for(&chunk),
                job_id: job.id,
                project: job.project.clone(),
                frames: chunk,
                worker: worker.to_string(),
                issued_at: Utc::now().trunc_subsecs(0),
                duration_secs: None,
            };

            job.assigned.insert(task.task_id.clone(), task.clone());
            return Ok(Some(task));
        }

        Ok(None)
    }

    /// Records a successful task and retires the job if it was the last one
    pub fn complete_task(
        &mut self,
        job_id: JobId,
        task_id: &str,
    ) -> Result<TaskOutcome, QueueError> {
        let idx = self.position(job_id)?;
        let job = &mut self.jobs[idx];

        let mut task = job
            .assigned
            .remove(task_id)
            .ok_or_else(|| QueueError::NotFound(format!("no assigned task {}", task_id)))?;

        task.duration_secs = Some((Utc::now() - task.issued_at).num_seconds());
        job.complete.insert(task.task_id.clone(), task);

        if job.is_finished() {
            let mut job = self.jobs.remove(idx);
            job.status = JobStatus::Complete;
            return Ok(TaskOutcome::JobComplete(job));
        }

        Ok(TaskOutcome::Pending)
    }

    /// Requeues a failed task's frames at the back of the job's queue
    ///
    /// All-or-nothing: every frame of the task goes back, even if some
    /// rendered before the failure. The job is never retired on this path,
    /// since the requeue is non-empty by construction.
    pub fn fail_task(&mut self, job_id: JobId, task_id: &str) -> Result<Task, QueueError> {
        let idx = self.position(job_id)?;
        let job = &mut self.jobs[idx];

        let task = job
            .assigned
            .remove(task_id)
            .ok_or_else(|| QueueError::NotFound(format!("no assigned task {}", task_id)))?;

        job.queued.extend(task.frames.iter().copied());

        Ok(task)
    }

    fn position(&self, id: JobId) -> Result<usize, QueueError> {
        self.jobs
            .iter()
            .position(|j| j.id == id)
            .ok_or_else(|| QueueError::NotFound(format!("no job {}", id)))
    }

    /// Microsecond timestamp id, bumped past the previous one when two
    /// submissions land in the same microsecond.
    fn next_id(&mut self) -> JobId {
        let id = Utc::now().timestamp_micros().max(self.last_id + 1);
        self.last_id = id;
        JobId::from_micros(id)
    }
}

impl Default for JobQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::{Arc, Mutex};

    fn submit(queue: &mut JobQueue, project: &str, start: i32, end: i32, priority: i32) -> Job {
        queue
            .submit(&SubmitJob {
                project: project.to_string(),
                start,
                end,
                priority: Some(priority),
            })
            .unwrap()
    }

    /// Every frame of every job must be in exactly one of queued / assigned /
    /// complete at all times.
    fn assert_frames_conserved(job: &Job) {
        let mut seen: Vec<i32> = job.queued.iter().copied().collect();
        for task in job.assigned.values().chain(job.complete.values()) {
            seen.extend(task.frames.iter().copied());
        }
        seen.sort_unstable();
        let expected: Vec<i32> = (job.start..=job.end).collect();
        assert_eq!(seen, expected);
    }

    #[test]
    fn test_submit_rejects_inverted_range() {
        let mut queue = JobQueue::new();
        let res = queue.submit(&SubmitJob {
            project: "scene".to_string(),
            start: 5,
            end: 1,
            priority: None,
        });
        assert!(matches!(res, Err(QueueError::Invalid(_))));
        assert!(queue.jobs().is_empty());
    }

    #[test]
    fn test_submit_rejects_oversized_range() {
        let mut queue = JobQueue::new();
        let res = queue.submit(&SubmitJob {
            project: "scene".to_string(),
            start: i32::MIN,
            end: i32::MAX,
            priority: None,
        });
        assert!(matches!(res, Err(QueueError::Invalid(_))));
        assert!(queue.jobs().is_empty());

        // Extreme bounds are fine as long as the span itself is sane.
        let job = submit(&mut queue, "scene", i32::MIN, i32::MIN + 9, 0);
        assert_eq!(job.total, 10);
    }

    #[test]
    fn test_prepared_job_is_invisible_until_enqueued() {
        let mut queue = JobQueue::new();
        let job = queue
            .prepare(&SubmitJob {
                project: "scene".to_string(),
                start: 1,
                end: 3,
                priority: None,
            })
            .unwrap();

        // Mid-staging, the allocator must not see the job.
        assert!(!queue.contains(job.id));
        assert!(queue.request_task(3, "racer").unwrap().is_none());

        queue.enqueue(job.clone());
        let task = queue.request_task(3, "racer").unwrap().unwrap();
        assert_eq!(task.job_id, job.id);
        assert_eq!(task.frames, vec![1, 2, 3]);
    }

    #[test]
    fn test_abandoned_preparation_burns_its_id() {
        let mut queue = JobQueue::new();
        let dropped = queue
            .prepare(&SubmitJob {
                project: "missing".to_string(),
                start: 1,
                end: 1,
                priority: None,
            })
            .unwrap();

        // Staging failed, the job was never enqueued; the next submission
        // must still get a later id.
        let next = submit(&mut queue, "scene", 1, 1, 0);
        assert!(dropped.id < next.id);
    }

    #[test]
    fn test_submitted_ids_are_strictly_monotonic() {
        let mut queue = JobQueue::new();
        let a = submit(&mut queue, "scene", 1, 1, 0);
        let b = submit(&mut queue, "scene", 1, 1, 0);
        let c = submit(&mut queue, "scene", 1, 1, 0);
        assert!(a.id < b.id);
        assert!(b.id < c.id);
    }

    #[test]
    fn test_allocation_order_fifo_within_priority() {
        let mut queue = JobQueue::new();
        let first = submit(&mut queue, "a", 1, 1, 0);
        let _second = submit(&mut queue, "b", 1, 1, 0);

        let task = queue.request_task(1, "w").unwrap().unwrap();
        assert_eq!(task.job_id, first.id);
    }

    #[test]
    fn test_allocation_order_prefers_lower_priority_value() {
        let mut queue = JobQueue::new();
        let _low = submit(&mut queue, "background", 1, 10, 1);
        let urgent = submit(&mut queue, "urgent", 1, 10, 0);

        let task = queue.request_task(1, "w").unwrap().unwrap();
        assert_eq!(task.job_id, urgent.id);
        assert_eq!(task.project, "urgent");
    }

    #[test]
    fn test_jobs_with_empty_queue_are_skipped() {
        let mut queue = JobQueue::new();
        let first = submit(&mut queue, "a", 1, 2, 0);
        let second = submit(&mut queue, "b", 1, 2, 0);

        // Drain the first job entirely; it stays active (assigned tasks
        // outstanding) but must no longer receive allocations.
        queue.request_task(2, "w1").unwrap().unwrap();
        let task = queue.request_task(2, "w2").unwrap().unwrap();
        assert_eq!(task.job_id, second.id);
        assert!(queue.contains(first.id));
    }

    #[test]
    fn test_request_task_zero_frames_rejected() {
        let mut queue = JobQueue::new();
        submit(&mut queue, "scene", 1, 5, 0);
        assert!(matches!(
            queue.request_task(0, "w"),
            Err(QueueError::Invalid(_))
        ));
    }

    #[test]
    fn test_request_task_no_work_is_not_an_error() {
        let mut queue = JobQueue::new();
        assert!(queue.request_task(4, "w").unwrap().is_none());
    }

    #[test]
    fn test_allocation_caps_at_remaining_frames() {
        let mut queue = JobQueue::new();
        let job = submit(&mut queue, "scene", 1, 3, 0);

        let task = queue.request_task(10, "w").unwrap().unwrap();
        assert_eq!(task.frames, vec![1, 2, 3]);
        assert_eq!(task.task_id, "1_3");

        let job = queue.jobs().iter().find(|j| j.id == job.id).unwrap();
        assert_eq!(job.status, JobStatus::Processing);
        assert!(job.queued.is_empty());
        assert_frames_conserved(job);
    }

    #[test]
    fn test_complete_unknown_job_or_task() {
        let mut queue = JobQueue::new();
        let job = submit(&mut queue, "scene", 1, 5, 0);

        let res = queue.complete_task(JobId::from_micros(1), "1_1");
        assert!(matches!(res, Err(QueueError::NotFound(_))));

        let res = queue.complete_task(job.id, "1_1");
        assert!(matches!(res, Err(QueueError::NotFound(_))));
    }

    #[test]
    fn test_double_fail_is_not_found() {
        let mut queue = JobQueue::new();
        let job = submit(&mut queue, "scene", 1, 4, 0);
        let task = queue.request_task(2, "w").unwrap().unwrap();

        queue.fail_task(job.id, &task.task_id).unwrap();
        // The task left the assigned set on the first report.
        let res = queue.fail_task(job.id, &task.task_id);
        assert!(matches!(res, Err(QueueError::NotFound(_))));
    }

    #[test]
    fn test_fail_requeues_all_frames_at_back() {
        let mut queue = JobQueue::new();
        let job = submit(&mut queue, "scene", 1, 5, 0);

        let task = queue.request_task(2, "w").unwrap().unwrap();
        assert_eq!(task.frames, vec![1, 2]);

        queue.fail_task(job.id, &task.task_id).unwrap();
        let job = queue.jobs().iter().find(|j| j.id == job.id).unwrap();
        assert_eq!(Vec::from(job.queued.clone()), vec![3, 4, 5, 1, 2]);
        assert_frames_conserved(job);
    }

    #[test]
    fn test_round_trip_with_failure_and_retirement() {
        let mut queue = JobQueue::new();
        let job = submit(&mut queue, "scene", 1, 5, 0);

        let t1 = queue.request_task(2, "w").unwrap().unwrap();
        assert_eq!(t1.frames, vec![1, 2]);
        assert!(matches!(
            queue.complete_task(job.id, &t1.task_id).unwrap(),
            TaskOutcome::Pending
        ));

        let t2 = queue.request_task(2, "w").unwrap().unwrap();
        assert_eq!(t2.frames, vec![3, 4]);
        queue.fail_task(job.id, &t2.task_id).unwrap();

        // Tail requeue: 5 is still ahead of the failed 3 and 4.
        let t3 = queue.request_task(1, "w").unwrap().unwrap();
        assert_eq!(t3.frames, vec![5]);
        let t4 = queue.request_task(2, "w").unwrap().unwrap();
        assert_eq!(t4.frames, vec![3, 4]);

        assert!(matches!(
            queue.complete_task(job.id, &t3.task_id).unwrap(),
            TaskOutcome::Pending
        ));

        // Last outstanding task retires the job.
        match queue.complete_task(job.id, &t4.task_id).unwrap() {
            TaskOutcome::JobComplete(retired) => {
                assert_eq!(retired.status, JobStatus::Complete);
                assert!(retired.queued.is_empty());
                assert!(retired.assigned.is_empty());
                assert_eq!(retired.complete.len(), 3);
                assert_frames_conserved(&retired);
            }
            TaskOutcome::Pending => panic!("job should have retired"),
        }
        assert!(!queue.contains(job.id));
    }

    #[test]
    fn test_failure_never_retires_job() {
        let mut queue = JobQueue::new();
        let job = submit(&mut queue, "scene", 1, 2, 0);

        let task = queue.request_task(2, "w").unwrap().unwrap();
        queue.fail_task(job.id, &task.task_id).unwrap();

        // Last outstanding task failed, but the requeue is non-empty so the
        // job stays active.
        assert!(queue.contains(job.id));
    }

    #[test]
    fn test_remove_orphans_outstanding_tasks() {
        let mut queue = JobQueue::new();
        let job = submit(&mut queue, "scene", 1, 5, 0);
        let task = queue.request_task(2, "w").unwrap().unwrap();

        queue.remove(job.id).unwrap();

        let res = queue.complete_task(job.id, &task.task_id);
        assert!(matches!(res, Err(QueueError::NotFound(_))));
        let res = queue.remove(job.id);
        assert!(matches!(res, Err(QueueError::NotFound(_))));
    }

    #[test]
    fn test_concurrent_allocation_hands_out_disjoint_frames() {
        const WORKERS: usize = 8;

        let queue = Arc::new(Mutex::new(JobQueue::new()));
        queue
            .lock()
            .unwrap()
            .submit(&SubmitJob {
                project: "scene".to_string(),
                start: 1,
                end: WORKERS as i32,
                priority: None,
            })
            .unwrap();

        let handles: Vec<_> = (0..WORKERS)
            .map(|i| {
                let queue = Arc::clone(&queue);
                std::thread::spawn(move || {
                    let mut queue = queue.lock().unwrap();
                    queue
                        .request_task(1, &format!("worker-{}", i))
                        .unwrap()
                        .unwrap()
                })
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            let task = handle.join().unwrap();
            assert_eq!(task.frames.len(), 1);
            assert!(seen.insert(task.frames[0]), "frame handed out twice");
        }

        assert_eq!(seen.len(), WORKERS);
        let queue = queue.lock().unwrap();
        assert!(queue.jobs()[0].queued.is_empty());
    }
}
