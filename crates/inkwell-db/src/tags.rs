//! Tag repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Postgres, Row, Transaction};
use uuid::Uuid;

use inkwell_core::{new_v7, Error, Result, Tag, TagRepository, TagWithUsage};

/// Validate a tag name.
///
/// Rules:
/// - Non-empty after trimming
/// - At most 100 characters
///
/// Returns Ok(()) if valid, Err with message if invalid.
pub fn validate_tag_name(tag: &str) -> std::result::Result<(), String> {
    if tag.trim().is_empty() {
        return Err("Tag name cannot be empty".to_string());
    }
    if tag.len() > 100 {
        return Err("Tag name must be 100 characters or less".to_string());
    }
    Ok(())
}

/// PostgreSQL implementation of TagRepository.
#[derive(Clone)]
pub struct PgTagRepository {
    pool: Pool<Postgres>,
}

impl PgTagRepository {
    /// Create a new PgTagRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Upsert a tag inside an open transaction, returning its id.
    ///
    /// The DO UPDATE arm is a no-op rewrite of the name; it exists so
    /// RETURNING yields the surviving row whether it was inserted or
    /// already present. Concurrent duplicate creates converge on one row.
    pub(crate) async fn upsert_tx(
        tx: &mut Transaction<'_, Postgres>,
        user_id: Uuid,
        name: &str,
    ) -> Result<Uuid> {
        let row = sqlx::query(
            "INSERT INTO tags (id, name, user_id, created_at_utc) VALUES ($1, $2, $3, $4)
             ON CONFLICT (user_id, name) DO UPDATE SET name = excluded.name
             RETURNING id",
        )
        .bind(new_v7())
        .bind(name)
        .bind(user_id)
        .bind(Utc::now())
        .fetch_one(&mut **tx)
        .await
        .map_err(Error::Database)?;

        Ok(row.get("id"))
    }
}

fn map_tag_row(row: &sqlx::postgres::PgRow) -> Tag {
    Tag {
        id: row.get("id"),
        name: row.get("name"),
        user_id: row.get("user_id"),
        created_at_utc: row.get("created_at_utc"),
    }
}

#[async_trait]
impl TagRepository for PgTagRepository {
    async fn find_or_create(&self, user_id: Uuid, name: &str) -> Result<Tag> {
        validate_tag_name(name).map_err(Error::InvalidInput)?;

        let row = sqlx::query(
            "INSERT INTO tags (id, name, user_id, created_at_utc) VALUES ($1, $2, $3, $4)
             ON CONFLICT (user_id, name) DO UPDATE SET name = excluded.name
             RETURNING id, name, user_id, created_at_utc",
        )
        .bind(new_v7())
        .bind(name)
        .bind(user_id)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(map_tag_row(&row))
    }

    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<Tag>> {
        let rows = sqlx::query(
            "SELECT id, name, user_id, created_at_utc
             FROM tags WHERE user_id = $1 ORDER BY name",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.iter().map(map_tag_row).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Tag>> {
        let row = sqlx::query(
            "SELECT id, name, user_id, created_at_utc FROM tags WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.map(|r| map_tag_row(&r)))
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        sqlx::query("DELETE FROM note_tags WHERE tag_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;

        let result = sqlx::query("DELETE FROM tags WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("Tag {} not found", id)));
        }

        tx.commit().await.map_err(Error::Database)?;
        Ok(())
    }

    async fn popular(&self, user_id: Uuid, limit: i64) -> Result<Vec<TagWithUsage>> {
        let rows = sqlx::query(
            r#"
            SELECT t.id, t.name, t.user_id, t.created_at_utc,
                   COUNT(nt.note_id) AS usage_count
            FROM tags t
            LEFT JOIN note_tags nt ON t.id = nt.tag_id
            WHERE t.user_id = $1
            GROUP BY t.id
            ORDER BY usage_count DESC, t.name
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows
            .into_iter()
            .map(|r| TagWithUsage {
                id: r.get("id"),
                name: r.get("name"),
                user_id: r.get("user_id"),
                created_at_utc: r.get("created_at_utc"),
                usage_count: r.get("usage_count"),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_tag_name_empty() {
        assert!(validate_tag_name("").is_err());
        assert!(validate_tag_name("   ").is_err());
    }

    #[test]
    fn test_validate_tag_name_too_long() {
        assert!(validate_tag_name(&"x".repeat(101)).is_err());
        assert!(validate_tag_name(&"x".repeat(100)).is_ok());
    }

    #[test]
    fn test_validate_tag_name_ok() {
        assert!(validate_tag_name("reading list").is_ok());
        assert!(validate_tag_name("rust").is_ok());
    }
}
