//! Note repository implementation.
//!
//! Multi-table writes (create, update, delete) run inside a single
//! transaction; a failure anywhere rolls the whole write back.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Postgres, Row, Transaction};
use uuid::Uuid;

use inkwell_core::{
    new_v7, CreateNoteRequest, Error, NoteRepository, NoteWithMeta, Result, UpdateNoteRequest,
};

use crate::tags::PgTagRepository;

/// Shared SELECT for hydrated notes: folder name/color joined in, tag names
/// aggregated into one sorted comma-separated string.
const NOTE_SELECT: &str = r#"
    SELECT n.id, n.title, n.content, n.user_id, n.folder_id,
           f.name AS folder_name, f.color AS folder_color,
           n.pinned, n.archived, n.created_at_utc, n.updated_at_utc,
           COALESCE(string_agg(t.name, ',' ORDER BY t.name), '') AS tags
    FROM notes n
    LEFT JOIN folders f ON n.folder_id = f.id
    LEFT JOIN note_tags nt ON nt.note_id = n.id
    LEFT JOIN tags t ON t.id = nt.tag_id
"#;

/// Map a database row to a NoteWithMeta.
fn map_note_row(row: &sqlx::postgres::PgRow) -> NoteWithMeta {
    let tags_str: String = row.get("tags");
    let tags = if tags_str.is_empty() {
        Vec::new()
    } else {
        tags_str.split(',').map(String::from).collect()
    };

    NoteWithMeta {
        id: row.get("id"),
        title: row.get("title"),
        content: row.get("content"),
        user_id: row.get("user_id"),
        folder_id: row.get("folder_id"),
        folder_name: row.get("folder_name"),
        folder_color: row.get("folder_color"),
        pinned: row.get("pinned"),
        archived: row.get("archived"),
        created_at_utc: row.get("created_at_utc"),
        updated_at_utc: row.get("updated_at_utc"),
        tags,
    }
}

/// PostgreSQL implementation of NoteRepository.
#[derive(Clone)]
pub struct PgNoteRepository {
    pool: Pool<Postgres>,
}

impl PgNoteRepository {
    /// Create a new PgNoteRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Replace the full tag association set for a note inside an open
    /// transaction: delete all join rows, then upsert each tag scoped to the
    /// owner and relink. Not a diff.
    async fn set_tags_tx(
        tx: &mut Transaction<'_, Postgres>,
        note_id: Uuid,
        user_id: Uuid,
        tags: &[String],
    ) -> Result<()> {
        sqlx::query("DELETE FROM note_tags WHERE note_id = $1")
            .bind(note_id)
            .execute(&mut **tx)
            .await
            .map_err(Error::Database)?;

        for name in tags {
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            let tag_id = PgTagRepository::upsert_tx(tx, user_id, name).await?;

            sqlx::query(
                "INSERT INTO note_tags (note_id, tag_id) VALUES ($1, $2)
                 ON CONFLICT (note_id, tag_id) DO NOTHING",
            )
            .bind(note_id)
            .bind(tag_id)
            .execute(&mut **tx)
            .await
            .map_err(Error::Database)?;
        }

        Ok(())
    }

    /// Fetch the hydrated note after a write, failing loudly if it vanished.
    async fn fetch_after_write(&self, id: Uuid) -> Result<NoteWithMeta> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| Error::Internal(format!("Note {} missing after write", id)))
    }
}

#[async_trait]
impl NoteRepository for PgNoteRepository {
    async fn create(&self, req: CreateNoteRequest) -> Result<NoteWithMeta> {
        let id = new_v7();
        let now = Utc::now();

        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        sqlx::query(
            "INSERT INTO notes (id, title, content, user_id, folder_id, created_at_utc, updated_at_utc)
             VALUES ($1, $2, $3, $4, $5, $6, $6)",
        )
        .bind(id)
        .bind(&req.title)
        .bind(&req.content)
        .bind(req.user_id)
        .bind(req.folder_id)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(Error::Database)?;

        if !req.tags.is_empty() {
            Self::set_tags_tx(&mut tx, id, req.user_id, &req.tags).await?;
        }

        tx.commit().await.map_err(Error::Database)?;

        self.fetch_after_write(id).await
    }

    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<NoteWithMeta>> {
        let query = format!(
            "{NOTE_SELECT}
             WHERE n.user_id = $1
             GROUP BY n.id, f.name, f.color
             ORDER BY n.pinned DESC, n.updated_at_utc DESC"
        );

        let rows = sqlx::query(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(rows.iter().map(map_note_row).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<NoteWithMeta>> {
        let query = format!(
            "{NOTE_SELECT}
             WHERE n.id = $1
             GROUP BY n.id, f.name, f.color"
        );

        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(row.map(|r| map_note_row(&r)))
    }

    async fn update(&self, id: Uuid, req: UpdateNoteRequest) -> Result<NoteWithMeta> {
        let now = Utc::now();

        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        let result = sqlx::query(
            "UPDATE notes SET title = $1, content = $2, folder_id = $3, updated_at_utc = $4
             WHERE id = $5",
        )
        .bind(&req.title)
        .bind(&req.content)
        .bind(req.folder_id)
        .bind(now)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("Note {} not found", id)));
        }

        // A supplied tag list fully supersedes the prior association set;
        // omitting it leaves existing tags untouched.
        if let Some(tags) = &req.tags {
            let row = sqlx::query("SELECT user_id FROM notes WHERE id = $1")
                .bind(id)
                .fetch_one(&mut *tx)
                .await
                .map_err(Error::Database)?;
            let user_id: Uuid = row.get("user_id");

            Self::set_tags_tx(&mut tx, id, user_id, tags).await?;
        }

        tx.commit().await.map_err(Error::Database)?;

        self.fetch_after_write(id).await
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        sqlx::query("DELETE FROM note_tags WHERE note_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;

        let result = sqlx::query("DELETE FROM notes WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("Note {} not found", id)));
        }

        tx.commit().await.map_err(Error::Database)?;
        Ok(())
    }

    async fn toggle_pin(&self, id: Uuid) -> Result<NoteWithMeta> {
        let result = sqlx::query(
            "UPDATE notes SET pinned = NOT pinned, updated_at_utc = $1 WHERE id = $2",
        )
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("Note {} not found", id)));
        }

        self.fetch_after_write(id).await
    }

    async fn toggle_archive(&self, id: Uuid) -> Result<NoteWithMeta> {
        let result = sqlx::query(
            "UPDATE notes SET archived = NOT archived, updated_at_utc = $1 WHERE id = $2",
        )
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("Note {} not found", id)));
        }

        self.fetch_after_write(id).await
    }
}
