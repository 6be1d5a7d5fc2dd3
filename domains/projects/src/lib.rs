//! Projects domain: project records and cover images

pub mod api;
pub mod domain;
pub mod repository;

// Re-export domain types at the crate root for convenience
pub use domain::entities::{cover_storage_key, Project, MAX_TITLE_CHARS};

// Re-export repository types
pub use repository::{ProjectRepository, ProjectsRepositories};

// Re-export API types
pub use api::routes;
pub use api::ProjectsState;
