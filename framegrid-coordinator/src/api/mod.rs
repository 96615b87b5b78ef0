//! API Module
//!
//! HTTP API layer for the coordinator.
//! Each submodule handles endpoints for a specific domain.

pub mod error;
pub mod health;
pub mod job;
pub mod project;
pub mod render;
pub mod task;

use std::sync::{Arc, Mutex};

use axum::{
    Router,
    routing::{delete, get, put},
};
use tower_http::trace::TraceLayer;

use crate::queue::JobQueue;
use crate::storage::Storage;

/// Shared coordinator state
///
/// The queue mutex is the single mutual-exclusion discipline for all
/// scheduling state; handlers never hold it across an await point.
#[derive(Clone)]
pub struct AppState {
    pub queue: Arc<Mutex<JobQueue>>,
    pub storage: Arc<Storage>,
}

impl AppState {
    pub fn new(storage: Storage) -> Self {
        Self {
            queue: Arc::new(Mutex::new(JobQueue::new())),
            storage: Arc::new(storage),
        }
    }
}

/// Create the main API router with all endpoints
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Project endpoints
        .route("/projects", get(project::list_projects))
        .route("/projects/{project}", get(project::download_project))
        // Job endpoints
        .route("/jobs", get(job::list_jobs))
        .route("/jobs", put(job::submit_job))
        .route("/jobs/{id}", delete(job::delete_job))
        // Task endpoints
        .route("/tasks/request", get(task::request_task))
        .route("/tasks/complete", put(task::complete_task))
        .route("/tasks/failed", put(task::fail_task))
        // Render endpoints
        .route("/renders", get(render::list_renders))
        .route("/renders/{id}", get(render::list_job_frames))
        .route("/renders/{id}/{filename}", get(render::download_render))
        .route("/renders/{id}/{filename}", put(render::upload_render))
        // Add state and middleware
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
