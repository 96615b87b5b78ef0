//! Job API Handlers
//!
//! HTTP endpoints for job submission and lifecycle management.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use framegrid_core::domain::job::{Job, JobId};
use framegrid_core::dto::job::SubmitJob;

use crate::api::AppState;
use crate::api::error::{ApiError, ApiResult};

/// GET /jobs
/// List active jobs in scheduling order (priority, then id)
pub async fn list_jobs(State(state): State<AppState>) -> ApiResult<Json<Vec<Job>>> {
    tracing::debug!("Listing active jobs");

    let jobs = state.queue.lock().unwrap().jobs().to_vec();
    Ok(Json(jobs))
}

/// PUT /jobs
/// Submit a new render job
///
/// The body goes through a lenient decode step so any malformed submission
/// (missing fields, non-integer frames or priority) surfaces as a 400 rather
/// than a serde rejection status.
pub async fn submit_job(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> ApiResult<(StatusCode, Json<Job>)> {
    let req: SubmitJob = serde_json::from_value(body)
        .map_err(|e| ApiError::BadRequest(format!("malformed input: {}", e)))?;

    tracing::info!(
        "Submitting job for project {} frames {}..{}",
        req.project,
        req.start,
        req.end
    );

    let job = state.queue.lock().unwrap().prepare(&req)?;

    // Workers fetch the artifact from the job's render directory, so it is
    // staged (and the initial snapshot written) before the job enters the
    // active set. The allocator can never hand out a task whose artifact
    // does not exist, and a failed submission leaves nothing to withdraw.
    if let Err(e) = state.storage.stage_artifact(&job).await {
        return Err(ApiError::BadRequest(format!(
            "cannot stage project {}: {}",
            job.project, e
        )));
    }

    state.storage.write_snapshot(&job).await?;

    state.queue.lock().unwrap().enqueue(job.clone());

    tracing::info!("Job {} accepted ({} frames)", job.id, job.total);

    Ok((StatusCode::CREATED, Json(job)))
}

/// DELETE /jobs/{id}
/// Remove a job regardless of its completion state
pub async fn delete_job(
    State(state): State<AppState>,
    Path(id): Path<JobId>,
) -> ApiResult<StatusCode> {
    let job = state.queue.lock().unwrap().remove(id)?;

    if !job.assigned.is_empty() {
        tracing::warn!(
            "Deleted job {} with {} assigned task(s); their reports will get 404",
            job.id,
            job.assigned.len()
        );
    } else {
        tracing::info!("Deleted job {}", job.id);
    }

    Ok(StatusCode::NO_CONTENT)
}
