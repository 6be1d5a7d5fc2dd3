//! Asset management API handlers

use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use designbase_common::{Error, Result};
use designbase_storage::ObjectStorage;

use crate::api::middleware::AssetsState;
use crate::domain::entities::Asset;
use crate::domain::session::{AssetSink, FileUpload, UploadSession};

/// Asset response DTO, including the resolved public file URL
#[derive(Debug, Serialize)]
pub struct AssetResponse {
    pub id: Uuid,
    pub project_id: Uuid,
    pub file_name: String,
    pub storage_key: String,
    pub file_size: Option<i64>,
    pub notes: Option<String>,
    pub thumb_url: Option<String>,
    pub file_url: String,
    pub uploaded_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl AssetResponse {
    fn from_asset(asset: Asset, storage: &dyn ObjectStorage) -> Self {
        let file_url = storage.public_url(&asset.storage_key);
        Self {
            id: asset.id,
            project_id: asset.project_id,
            file_name: asset.file_name,
            storage_key: asset.storage_key,
            file_size: asset.file_size,
            notes: asset.notes,
            thumb_url: asset.thumb_url,
            file_url,
            uploaded_at: asset.uploaded_at,
            created_at: asset.created_at,
        }
    }
}

/// List a project's assets, newest first
pub async fn list_project_assets(
    State(state): State<AssetsState>,
    Path(project_id): Path<Uuid>,
) -> Result<Json<Vec<AssetResponse>>> {
    let assets = state.repos.assets.list_by_project(project_id).await?;

    let responses: Vec<AssetResponse> = assets
        .into_iter()
        .map(|a| AssetResponse::from_asset(a, state.storage.as_ref()))
        .collect();
    Ok(Json(responses))
}

/// Get a single asset by ID
pub async fn get_asset(
    State(state): State<AssetsState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AssetResponse>> {
    let asset = state
        .repos
        .assets
        .find(id)
        .await?
        .ok_or_else(|| Error::NotFound("Asset not found".to_string()))?;

    Ok(Json(AssetResponse::from_asset(asset, state.storage.as_ref())))
}

/// Upload a batch of files as new assets for a project.
///
/// Every multipart file field is staged into an upload session, then the
/// batch is submitted: files upload one at a time and the first failure
/// aborts the request with nothing further processed.
pub async fn upload_assets(
    State(state): State<AssetsState>,
    Path(project_id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Vec<AssetResponse>>)> {
    let mut files = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::Validation(e.to_string()))?
    {
        let Some(name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let bytes = field
            .bytes()
            .await
            .map_err(|e| Error::Validation(e.to_string()))?
            .to_vec();
        files.push(FileUpload { name, bytes });
    }

    let sink: Arc<dyn AssetSink> = Arc::new(state.repos.assets.clone());
    let mut session = UploadSession::new(project_id, state.storage.clone(), sink);
    session.add_files(files);

    let assets = session.submit().await?;

    let responses: Vec<AssetResponse> = assets
        .into_iter()
        .map(|a| AssetResponse::from_asset(a, state.storage.as_ref()))
        .collect();
    Ok((StatusCode::CREATED, Json(responses)))
}
