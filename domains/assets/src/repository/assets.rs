//! Asset repository

use crate::domain::entities::Asset;
use crate::domain::session::AssetSink;
use designbase_common::Result;
use sqlx::PgPool;
use uuid::Uuid;

/// All columns in the assets table, used for SELECT and RETURNING clauses.
const ASSET_COLUMNS: &str = "\
    id, project_id, file_name, storage_key, \
    file_size, notes, thumb_url, \
    uploaded_at, created_at";

#[derive(Debug, Clone)]
pub struct AssetRepository {
    pool: PgPool,
}

impl AssetRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find asset by ID
    pub async fn find(&self, id: Uuid) -> Result<Option<Asset>> {
        let query = format!("SELECT {ASSET_COLUMNS} FROM assets WHERE id = $1");
        let asset = sqlx::query_as::<_, Asset>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(asset)
    }

    /// List assets by project ID, newest first
    pub async fn list_by_project(&self, project_id: Uuid) -> Result<Vec<Asset>> {
        let query = format!(
            "SELECT {ASSET_COLUMNS} FROM assets \
             WHERE project_id = $1 ORDER BY created_at DESC"
        );
        let assets = sqlx::query_as::<_, Asset>(&query)
            .bind(project_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(assets)
    }

    /// Create a new asset
    pub async fn create(&self, asset: &Asset) -> Result<Asset> {
        let query = format!(
            "INSERT INTO assets ({ASSET_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {ASSET_COLUMNS}"
        );
        let created = sqlx::query_as::<_, Asset>(&query)
            .bind(asset.id)
            .bind(asset.project_id)
            .bind(&asset.file_name)
            .bind(&asset.storage_key)
            .bind(asset.file_size)
            .bind(&asset.notes)
            .bind(&asset.thumb_url)
            .bind(asset.uploaded_at)
            .bind(asset.created_at)
            .fetch_one(&self.pool)
            .await?;

        Ok(created)
    }
}

#[async_trait::async_trait]
impl AssetSink for AssetRepository {
    async fn insert(&self, asset: &Asset) -> Result<Asset> {
        self.create(asset).await
    }
}
