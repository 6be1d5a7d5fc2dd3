//! Projects domain state

use std::sync::Arc;

use designbase_storage::ObjectStorage;

use crate::ProjectsRepositories;

/// Application state for the Projects domain
#[derive(Clone)]
pub struct ProjectsState {
    pub repos: ProjectsRepositories,
    pub storage: Arc<dyn ObjectStorage>,
}
