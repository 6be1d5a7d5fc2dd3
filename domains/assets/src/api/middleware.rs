//! Assets domain state

use std::sync::Arc;

use designbase_storage::ObjectStorage;

use crate::AssetsRepositories;

/// Application state for the Assets domain
#[derive(Clone)]
pub struct AssetsState {
    pub repos: AssetsRepositories,
    pub storage: Arc<dyn ObjectStorage>,
}
