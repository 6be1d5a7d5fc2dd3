//! Project repository

use crate::domain::entities::Project;
use designbase_common::Result;
use sqlx::PgPool;
use uuid::Uuid;

/// All columns in the projects table, used for SELECT and RETURNING clauses.
const PROJECT_COLUMNS: &str = "\
    id, title, description, cover_image_url, location, created_at";

#[derive(Clone)]
pub struct ProjectRepository {
    pool: PgPool,
}

impl ProjectRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find project by ID
    pub async fn find(&self, id: Uuid) -> Result<Option<Project>> {
        let query = format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1");
        let project = sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(project)
    }

    /// List projects, newest first
    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Project>> {
        let query = format!(
            "SELECT {PROJECT_COLUMNS} FROM projects \
             ORDER BY created_at DESC LIMIT $1 OFFSET $2"
        );
        let projects = sqlx::query_as::<_, Project>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok(projects)
    }

    /// Create a new project
    pub async fn create(&self, project: &Project) -> Result<Project> {
        let query = format!(
            "INSERT INTO projects ({PROJECT_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {PROJECT_COLUMNS}"
        );
        let created = sqlx::query_as::<_, Project>(&query)
            .bind(project.id)
            .bind(&project.title)
            .bind(&project.description)
            .bind(&project.cover_image_url)
            .bind(&project.location)
            .bind(project.created_at)
            .fetch_one(&self.pool)
            .await?;

        Ok(created)
    }

    /// Attach a cover image URL to an existing project
    pub async fn update_cover_url(&self, id: Uuid, cover_url: &str) -> Result<Option<Project>> {
        let query = format!(
            "UPDATE projects SET cover_image_url = $2 \
             WHERE id = $1 RETURNING {PROJECT_COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(cover_url)
            .fetch_optional(&self.pool)
            .await?;

        Ok(updated)
    }
}
