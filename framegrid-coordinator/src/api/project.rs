//! Project API Handlers
//!
//! HTTP endpoints for the source project artifacts workers render from.

use axum::{
    Json,
    extract::{Path, State},
};

use crate::api::AppState;
use crate::api::error::ApiResult;

/// GET /projects
/// List the project names available for rendering
pub async fn list_projects(State(state): State<AppState>) -> ApiResult<Json<Vec<String>>> {
    let projects = state.storage.list_projects().await?;
    Ok(Json(projects))
}

/// GET /projects/{project}
/// Download a project artifact
pub async fn download_project(
    State(state): State<AppState>,
    Path(project): Path<String>,
) -> ApiResult<Vec<u8>> {
    let body = state.storage.read_project(&project).await?;
    Ok(body)
}
