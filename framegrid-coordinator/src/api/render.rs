//! Render API Handlers
//!
//! HTTP endpoints for uploaded frame images and job render directories.

use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
};
use framegrid_core::domain::job::JobId;

use crate::api::AppState;
use crate::api::error::{ApiError, ApiResult};

/// GET /renders
/// List job render directories, newest first
pub async fn list_renders(State(state): State<AppState>) -> ApiResult<Json<Vec<String>>> {
    let names = state.storage.list_renders().await?;
    Ok(Json(names))
}

/// GET /renders/{id}
/// List the rendered frame filenames for an active job
pub async fn list_job_frames(
    State(state): State<AppState>,
    Path(id): Path<JobId>,
) -> ApiResult<Json<Vec<String>>> {
    ensure_active(&state, id)?;

    let frames = state.storage.list_frames(id).await?;
    Ok(Json(frames))
}

/// GET /renders/{id}/{filename}
/// Download a stored file (frame image or staged artifact)
///
/// Serves from disk without consulting the job queue, so frames of retired
/// jobs stay downloadable.
pub async fn download_render(
    State(state): State<AppState>,
    Path((id, filename)): Path<(JobId, String)>,
) -> ApiResult<Vec<u8>> {
    let body = state.storage.read_render(id, &filename).await?;
    Ok(body)
}

/// PUT /renders/{id}/{filename}
/// Store an uploaded frame image under the job's render directory
pub async fn upload_render(
    State(state): State<AppState>,
    Path((id, filename)): Path<(JobId, String)>,
    body: Bytes,
) -> ApiResult<StatusCode> {
    ensure_active(&state, id)?;

    state.storage.save_render(id, &filename, &body).await?;

    tracing::debug!("Stored render {} for job {}", filename, id);

    Ok(StatusCode::CREATED)
}

/// Uploads and listings only apply to jobs still in the active set
fn ensure_active(state: &AppState, id: JobId) -> Result<(), ApiError> {
    if state.queue.lock().unwrap().contains(id) {
        Ok(())
    } else {
        Err(ApiError::NotFound(format!("no job {}", id)))
    }
}
