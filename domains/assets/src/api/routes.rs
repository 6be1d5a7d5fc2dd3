//! Route definitions for the Assets domain API

use axum::{routing::get, Router};

use super::handlers::assets;
use super::middleware::AssetsState;

/// Create all Assets domain API routes
pub fn routes() -> Router<AssetsState> {
    Router::new()
        .route("/v1/assets/{id}", get(assets::get_asset))
        .route(
            "/v1/projects/{project_id}/assets",
            get(assets::list_project_assets).post(assets::upload_assets),
        )
}
