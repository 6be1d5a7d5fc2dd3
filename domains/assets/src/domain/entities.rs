//! Domain entities for the Assets domain
//!
//! An asset is one uploaded file: a metadata row referencing an object in
//! the storage bucket. Rows are created strictly after the object upload
//! succeeds and are never updated or deleted by this system.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use uuid::Uuid;

use designbase_common::{Error, Result};
use designbase_storage::keys::sanitize_file_name;

/// Regex for validating storage keys (compiled once). Keys are built from
/// sanitized segments joined by `/`, so nothing else may appear.
static STORAGE_KEY_REGEX: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"^[A-Za-z0-9._/-]+$").expect("storage key regex is valid")
});

/// Maximum file name length
pub const MAX_FILE_NAME_CHARS: usize = 255;

/// Raster image extensions that get a thumbnail URL
const RASTER_IMAGE_EXTENSIONS: &[&str] = &[".png", ".jpg", ".jpeg", ".webp", ".gif"];

/// Whether a file name's lowercase extension marks a raster image.
pub fn is_raster_image(file_name: &str) -> bool {
    let lower = file_name.to_lowercase();
    RASTER_IMAGE_EXTENSIONS
        .iter()
        .any(|ext| lower.ends_with(ext))
}

/// Storage key for one uploaded asset:
/// `{projectId}/{YYYY-MM-DD}_{token}_{sanitizedFileName}`.
///
/// The random token makes collisions astronomically unlikely; uploads still
/// run with no-overwrite semantics so a collision fails instead of
/// clobbering.
pub fn asset_storage_key(
    project_id: Uuid,
    date: NaiveDate,
    token: Uuid,
    file_name: &str,
) -> String {
    format!(
        "{}/{}_{}_{}",
        project_id,
        date.format("%Y-%m-%d"),
        token,
        sanitize_file_name(file_name)
    )
}

/// Asset entity — one uploaded file belonging to a project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Asset {
    pub id: Uuid,
    pub project_id: Uuid,
    pub file_name: String,
    pub storage_key: String,
    pub file_size: Option<i64>,
    pub notes: Option<String>,
    pub thumb_url: Option<String>,
    pub uploaded_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Asset {
    /// Create a new asset with validation. `file_name` is expected to be
    /// sanitized already; the upload timestamp is now.
    pub fn new(
        project_id: Uuid,
        file_name: String,
        storage_key: String,
        file_size: Option<i64>,
        thumb_url: Option<String>,
        notes: Option<String>,
    ) -> Result<Self> {
        let now = Utc::now();
        let asset = Asset {
            id: Uuid::new_v4(),
            project_id,
            file_name,
            storage_key,
            file_size,
            notes,
            thumb_url,
            uploaded_at: Some(now),
            created_at: now,
        };
        asset.validate()?;
        Ok(asset)
    }

    /// Validate invariants
    pub fn validate(&self) -> Result<()> {
        if self.file_name.is_empty() || self.file_name.chars().count() > MAX_FILE_NAME_CHARS {
            return Err(Error::Validation(
                "File name must be 1-255 characters".to_string(),
            ));
        }

        if !STORAGE_KEY_REGEX.is_match(&self.storage_key) {
            return Err(Error::Validation(format!(
                "Invalid storage key '{}'",
                self.storage_key
            )));
        }

        if let Some(size) = self.file_size {
            if size < 0 {
                return Err(Error::Validation(
                    "File size must not be negative".to_string(),
                ));
            }
        }

        Ok(())
    }
}
