//! Project management API handlers

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use designbase_common::{Error, Pagination, Result, ValidatedJson};
use designbase_storage::UploadOptions;

use crate::api::middleware::ProjectsState;
use crate::domain::entities::{cover_storage_key, Project};

/// Request for creating a project
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProjectRequest {
    /// Project title (required)
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    /// Optional description
    pub description: Option<String>,

    /// Optional location
    pub location: Option<String>,
}

/// Project response DTO
#[derive(Debug, Serialize)]
pub struct ProjectResponse {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub cover_image_url: Option<String>,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Project> for ProjectResponse {
    fn from(p: Project) -> Self {
        Self {
            id: p.id,
            title: p.title,
            description: p.description,
            cover_image_url: p.cover_image_url,
            location: p.location,
            created_at: p.created_at,
        }
    }
}

/// List projects, newest first
pub async fn list_projects(
    State(state): State<ProjectsState>,
    Query(pagination): Query<Pagination>,
) -> Result<Json<Vec<ProjectResponse>>> {
    let projects = state
        .repos
        .projects
        .list(pagination.limit(), pagination.offset())
        .await?;

    let responses: Vec<ProjectResponse> = projects.into_iter().map(Into::into).collect();
    Ok(Json(responses))
}

/// Get a single project by ID
pub async fn get_project(
    State(state): State<ProjectsState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProjectResponse>> {
    let project = state
        .repos
        .projects
        .find(id)
        .await?
        .ok_or_else(|| Error::NotFound("Project not found".to_string()))?;

    Ok(Json(project.into()))
}

/// Create a project
pub async fn create_project(
    State(state): State<ProjectsState>,
    ValidatedJson(req): ValidatedJson<CreateProjectRequest>,
) -> Result<(StatusCode, Json<ProjectResponse>)> {
    let project = Project::new(req.title, req.description, req.location)?;
    let created = state.repos.projects.create(&project).await?;

    tracing::info!(project_id = %created.id, "Project created");
    Ok((StatusCode::CREATED, Json(created.into())))
}

/// Upload a cover image and attach its public URL to the project.
///
/// The cover is uploaded to `projects/{id}/cover/{sanitizedFileName}` with
/// write-once semantics, then the resolved public URL is written back to
/// the project row. A failed row update leaves the uploaded object behind.
pub async fn upload_cover(
    State(state): State<ProjectsState>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<ProjectResponse>> {
    if state.repos.projects.find(id).await?.is_none() {
        return Err(Error::NotFound("Project not found".to_string()));
    }

    let field = multipart
        .next_field()
        .await
        .map_err(|e| Error::Validation(e.to_string()))?
        .ok_or_else(|| Error::Validation("No file provided.".to_string()))?;

    let file_name = field
        .file_name()
        .map(str::to_string)
        .ok_or_else(|| Error::Validation("No file provided.".to_string()))?;
    let bytes = field
        .bytes()
        .await
        .map_err(|e| Error::Validation(e.to_string()))?
        .to_vec();

    let key = cover_storage_key(id, &file_name);
    state
        .storage
        .upload(&key, bytes, &UploadOptions::default())
        .await
        .map_err(|e| Error::Storage(e.to_string()))?;

    let cover_url = state.storage.public_url(&key);
    let updated = state
        .repos
        .projects
        .update_cover_url(id, &cover_url)
        .await?
        .ok_or_else(|| Error::NotFound("Project not found".to_string()))?;

    tracing::info!(project_id = %id, key = %key, "Project cover attached");
    Ok(Json(updated.into()))
}
