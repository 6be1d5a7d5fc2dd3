//! Assets domain: uploaded files and the batch upload workflow

pub mod api;
pub mod domain;
pub mod mock;
pub mod repository;

// Re-export domain types at the crate root for convenience
pub use domain::entities::{asset_storage_key, is_raster_image, Asset, MAX_FILE_NAME_CHARS};
pub use domain::session::{
    AssetSink, FileUpload, PendingFile, UploadSession, CANCELED_MESSAGE, NO_FILES_MESSAGE,
};
pub use domain::state::{SessionEvent, SessionState, SessionStateMachine};

// Re-export mock types
pub use mock::MockAssetSink;

// Re-export repository types
pub use repository::{AssetRepository, AssetsRepositories};

// Re-export API types
pub use api::routes;
pub use api::AssetsState;
