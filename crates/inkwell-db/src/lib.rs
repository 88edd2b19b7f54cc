//! # inkwell-db
//!
//! PostgreSQL storage layer for inkwell.
//!
//! This crate provides:
//! - Connection pool management
//! - Repository implementations for users, folders, tags, and notes
//! - Transactional multi-table writes (note create/update/delete, tag delete)
//!
//! ## Example
//!
//! ```rust,ignore
//! use inkwell_db::Database;
//! use inkwell_core::{CreateNoteRequest, NoteRepository};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/inkwell").await?;
//!
//!     let note = db.notes.create(CreateNoteRequest {
//!         title: "Hello".to_string(),
//!         content: "First note".to_string(),
//!         folder_id: None,
//!         tags: vec!["greeting".to_string()],
//!         user_id: some_user_id,
//!     }).await?;
//!
//!     println!("Created note: {}", note.id);
//!     Ok(())
//! }
//! ```

pub mod folders;
pub mod notes;
pub mod pool;
pub mod tags;
pub mod users;

// Test fixtures for integration tests
// Note: Always compiled so integration tests (in tests/) can use DEFAULT_TEST_DATABASE_URL
pub mod test_fixtures;

// Re-export core types
pub use inkwell_core::*;

// Re-export repository implementations
pub use folders::PgFolderRepository;
pub use notes::PgNoteRepository;
pub use pool::{create_pool, create_pool_with_config, log_pool_metrics, PoolConfig};
pub use tags::PgTagRepository;
pub use users::PgUserRepository;

/// Combined database context with all repositories.
///
/// Constructed once at process start and passed around explicitly; each
/// repository holds a clone of the same bounded pool.
#[derive(Clone)]
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    /// User repository.
    pub users: PgUserRepository,
    /// Folder repository.
    pub folders: PgFolderRepository,
    /// Tag repository.
    pub tags: PgTagRepository,
    /// Note repository.
    pub notes: PgNoteRepository,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            users: PgUserRepository::new(pool.clone()),
            folders: PgFolderRepository::new(pool.clone()),
            tags: PgTagRepository::new(pool.clone()),
            notes: PgNoteRepository::new(pool.clone()),
            pool,
        }
    }

    /// Create a new Database instance by connecting to the given URL.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = create_pool(url).await?;
        Ok(Self::new(pool))
    }

    /// Create with custom pool configuration.
    pub async fn connect_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(url, config).await?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.pool
    }
}
