//! Route definitions for the Projects domain API

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::projects;
use super::middleware::ProjectsState;

/// Create all Projects domain API routes
pub fn routes() -> Router<ProjectsState> {
    Router::new()
        .route(
            "/v1/projects",
            get(projects::list_projects).post(projects::create_project),
        )
        .route("/v1/projects/{id}", get(projects::get_project))
        .route("/v1/projects/{id}/cover", post(projects::upload_cover))
}
