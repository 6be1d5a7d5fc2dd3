//! Domain entities for the Projects domain
//!
//! A project owns a set of uploaded assets and may carry a cover image.
//! The project identifier is immutable once assigned; projects are never
//! deleted by this system.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use designbase_common::{Error, Result};
use designbase_storage::keys::sanitize_file_name;

/// Maximum project title length
pub const MAX_TITLE_CHARS: usize = 200;

/// Project entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Project {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub cover_image_url: Option<String>,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Project {
    /// Create a new project with validation. Title is required; description
    /// and location are trimmed and empty values stored as absent.
    pub fn new(
        title: String,
        description: Option<String>,
        location: Option<String>,
    ) -> Result<Self> {
        let title = title.trim().to_string();
        if title.is_empty() {
            return Err(Error::Validation("Title is required.".to_string()));
        }
        if title.chars().count() > MAX_TITLE_CHARS {
            return Err(Error::Validation(format!(
                "Project title must be ≤{} characters",
                MAX_TITLE_CHARS
            )));
        }

        Ok(Project {
            id: Uuid::new_v4(),
            title,
            description: normalize(description),
            cover_image_url: None,
            location: normalize(location),
            created_at: Utc::now(),
        })
    }

    /// Validate invariants
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(Error::Validation("Title is required.".to_string()));
        }
        if self.title.chars().count() > MAX_TITLE_CHARS {
            return Err(Error::Validation(format!(
                "Project title must be ≤{} characters",
                MAX_TITLE_CHARS
            )));
        }
        Ok(())
    }

    /// Attach a cover image URL after its upload step completed.
    pub fn attach_cover(&mut self, url: String) {
        self.cover_image_url = Some(url);
    }
}

fn normalize(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Storage key for a project cover image:
/// `projects/{projectId}/cover/{sanitizedFileName}`.
pub fn cover_storage_key(project_id: Uuid, file_name: &str) -> String {
    format!(
        "projects/{}/cover/{}",
        project_id,
        sanitize_file_name(file_name)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_creation() {
        let project = Project::new(
            "Harbor House".to_string(),
            Some("Coastal renovation".to_string()),
            Some("Oslo".to_string()),
        )
        .unwrap();

        assert_eq!(project.title, "Harbor House");
        assert_eq!(project.description.as_deref(), Some("Coastal renovation"));
        assert_eq!(project.location.as_deref(), Some("Oslo"));
        assert!(project.cover_image_url.is_none());
    }

    #[test]
    fn test_project_title_is_trimmed() {
        let project = Project::new("  Harbor House  ".to_string(), None, None).unwrap();
        assert_eq!(project.title, "Harbor House");
    }

    #[test]
    fn test_project_title_required() {
        let result = Project::new("   ".to_string(), None, None);
        assert!(result.is_err());
        assert_eq!(
            result.unwrap_err().to_string(),
            "Validation error: Title is required."
        );
    }

    #[test]
    fn test_project_title_length_boundary() {
        assert!(Project::new("a".repeat(200), None, None).is_ok());
        assert!(Project::new("a".repeat(201), None, None).is_err());
    }

    #[test]
    fn test_project_empty_description_stored_as_absent() {
        let project =
            Project::new("Harbor House".to_string(), Some("   ".to_string()), None).unwrap();
        assert!(project.description.is_none());
    }

    #[test]
    fn test_attach_cover() {
        let mut project = Project::new("Harbor House".to_string(), None, None).unwrap();
        project.attach_cover("https://cdn.example.com/cover.png".to_string());
        assert_eq!(
            project.cover_image_url.as_deref(),
            Some("https://cdn.example.com/cover.png")
        );
    }

    #[test]
    fn test_cover_storage_key_sanitizes_file_name() {
        let id = Uuid::new_v4();
        let key = cover_storage_key(id, "front elevation (final).png");
        assert_eq!(
            key,
            format!("projects/{}/cover/front_elevation_final_.png", id)
        );
    }
}
