//! Designbase application composition root
//!
//! Composes all domain routers into a single application.

use std::sync::Arc;

use axum::Router;
use sqlx::PgPool;

use designbase_assets::{AssetsRepositories, AssetsState};
use designbase_projects::{ProjectsRepositories, ProjectsState};
use designbase_storage::{ObjectStorage, StorageConfig, StorageFactory};

/// Create the main application router with all routes and middleware
pub async fn create_app(pool: PgPool) -> Result<Router, anyhow::Error> {
    // Create the object storage client from environment
    let storage_config = StorageConfig::from_env()?;
    let storage: Arc<dyn ObjectStorage> = Arc::from(StorageFactory::create(storage_config).await?);

    // Create domain states
    let projects_state = ProjectsState {
        repos: ProjectsRepositories::new(pool.clone()),
        storage: storage.clone(),
    };
    let assets_state = AssetsState {
        repos: AssetsRepositories::new(pool),
        storage,
    };

    // Build router — compose domain routers with shared infrastructure routes
    let app = Router::new()
        .route("/health", axum::routing::get(health_check))
        .route(
            "/",
            axum::routing::get(|| async { "Designbase API v0.0.1-SNAPSHOT" }),
        )
        .merge(designbase_projects::routes().with_state(projects_state))
        .merge(designbase_assets::routes().with_state(assets_state));

    Ok(app)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
