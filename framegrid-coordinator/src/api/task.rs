//! Task API Handlers
//!
//! HTTP endpoints for the worker execution protocol: task allocation and
//! completion/failure reports.

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use framegrid_core::dto::task::TaskReport;

use crate::api::AppState;
use crate::api::error::ApiResult;
use crate::queue::TaskOutcome;

#[derive(Debug, Deserialize)]
pub struct RequestTaskQuery {
    pub frames: Option<usize>,
    pub worker: Option<String>,
}

/// GET /tasks/request?frames=N&worker=ID
/// Hand out the next chunk of queued frames
///
/// Responds 200 with the task, or 204 when no job has queued frames — the
/// "no work" signal is a normal outcome, not an error, and workers poll
/// again after their backoff interval. A frame count below 1 is a 400.
pub async fn request_task(
    State(state): State<AppState>,
    Query(params): Query<RequestTaskQuery>,
) -> ApiResult<Response> {
    let frames = params.frames.unwrap_or(1);
    let worker = params.worker.unwrap_or_else(|| "unknown".to_string());

    let task = state.queue.lock().unwrap().request_task(frames, &worker)?;

    match task {
        Some(task) => {
            tracing::info!(
                "Issued task {} of job {} to worker {}",
                task.task_id,
                task.job_id,
                task.worker
            );
            Ok((StatusCode::OK, Json(task)).into_response())
        }
        None => {
            tracing::debug!("No queued frames for worker {}", worker);
            Ok(StatusCode::NO_CONTENT.into_response())
        }
    }
}

/// PUT /tasks/complete
/// Record a successful task; retires the job once every frame is complete
pub async fn complete_task(
    State(state): State<AppState>,
    Json(report): Json<TaskReport>,
) -> ApiResult<StatusCode> {
    let outcome = state
        .queue
        .lock()
        .unwrap()
        .complete_task(report.job_id, &report.task_id)?;

    tracing::info!("Task {} of job {} complete", report.task_id, report.job_id);

    if let TaskOutcome::JobComplete(job) = outcome {
        tracing::info!("Job {} finished, writing terminal snapshot", job.id);
        state.storage.write_snapshot(&job).await?;
    }

    Ok(StatusCode::CREATED)
}

/// PUT /tasks/failed
/// Requeue a failed task's frames at the back of the job's queue
///
/// The error detail is logged but not retained; there is no failure audit
/// trail at this layer.
pub async fn fail_task(
    State(state): State<AppState>,
    Json(report): Json<TaskReport>,
) -> ApiResult<StatusCode> {
    let task = state
        .queue
        .lock()
        .unwrap()
        .fail_task(report.job_id, &report.task_id)?;

    tracing::warn!(
        "Task {} of job {} failed on worker {}: {}",
        task.task_id,
        task.job_id,
        task.worker,
        report.error.as_deref().unwrap_or("no error detail")
    );

    Ok(StatusCode::CREATED)
}
