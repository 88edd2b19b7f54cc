//! Folder repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use inkwell_core::{
    new_v7, CreateFolderRequest, Error, Folder, FolderRepository, Result,
};

/// Default folder color when none is supplied.
pub const DEFAULT_FOLDER_COLOR: &str = "bg-gray-500";

/// PostgreSQL implementation of FolderRepository.
#[derive(Clone)]
pub struct PgFolderRepository {
    pool: Pool<Postgres>,
}

impl PgFolderRepository {
    /// Create a new PgFolderRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn map_folder_row(row: &sqlx::postgres::PgRow) -> Folder {
    Folder {
        id: row.get("id"),
        name: row.get("name"),
        color: row.get("color"),
        user_id: row.get("user_id"),
        created_at_utc: row.get("created_at_utc"),
        updated_at_utc: row.get("updated_at_utc"),
    }
}

#[async_trait]
impl FolderRepository for PgFolderRepository {
    async fn create(&self, req: CreateFolderRequest) -> Result<Folder> {
        let id = new_v7();
        let now = Utc::now();
        let color = req
            .color
            .unwrap_or_else(|| DEFAULT_FOLDER_COLOR.to_string());

        sqlx::query(
            "INSERT INTO folders (id, name, color, user_id, created_at_utc, updated_at_utc)
             VALUES ($1, $2, $3, $4, $5, $5)",
        )
        .bind(id)
        .bind(&req.name)
        .bind(&color)
        .bind(req.user_id)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(Folder {
            id,
            name: req.name,
            color,
            user_id: req.user_id,
            created_at_utc: now,
            updated_at_utc: now,
        })
    }

    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<Folder>> {
        let rows = sqlx::query(
            "SELECT id, name, color, user_id, created_at_utc, updated_at_utc
             FROM folders WHERE user_id = $1 ORDER BY name",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.iter().map(map_folder_row).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Folder>> {
        let row = sqlx::query(
            "SELECT id, name, color, user_id, created_at_utc, updated_at_utc
             FROM folders WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.map(|r| map_folder_row(&r)))
    }

    async fn update(&self, id: Uuid, name: &str, color: &str) -> Result<Folder> {
        let now = Utc::now();
        let result = sqlx::query(
            "UPDATE folders SET name = $1, color = $2, updated_at_utc = $3 WHERE id = $4",
        )
        .bind(name)
        .bind(color)
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("Folder {} not found", id)));
        }

        self.find_by_id(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Folder {} not found", id)))
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        // Notes referencing this folder keep existing; the FK nulls folder_id.
        let result = sqlx::query("DELETE FROM folders WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("Folder {} not found", id)));
        }
        Ok(())
    }
}
