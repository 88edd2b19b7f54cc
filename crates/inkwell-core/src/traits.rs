//! Repository traits for inkwell storage.
//!
//! These traits define the interfaces that concrete implementations
//! must satisfy, enabling pluggable backends and testability.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::*;

// =============================================================================
// USER REPOSITORY
// =============================================================================

/// Request for creating a new user. The password is already hashed by the
/// caller; this layer never sees plaintext credentials.
#[derive(Debug, Clone)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// Sparse profile update. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdateProfileRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub profile_pic: Option<String>,
}

impl UpdateProfileRequest {
    /// True when no field is supplied.
    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.email.is_none() && self.profile_pic.is_none()
    }
}

/// Repository for user rows.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user and return the public profile.
    async fn create(&self, req: CreateUserRequest) -> Result<User>;

    /// Look up a user by email, including the password hash (login path).
    async fn find_by_email(&self, email: &str) -> Result<Option<AuthUser>>;

    /// Look up a user's public profile by id.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>>;

    /// Apply a sparse profile update and return the updated profile.
    async fn update_profile(&self, id: Uuid, req: UpdateProfileRequest) -> Result<User>;
}

// =============================================================================
// FOLDER REPOSITORY
// =============================================================================

/// Request for creating a folder. Color falls back to the default when `None`.
#[derive(Debug, Clone)]
pub struct CreateFolderRequest {
    pub name: String,
    pub color: Option<String>,
    pub user_id: Uuid,
}

/// Repository for folder rows.
#[async_trait]
pub trait FolderRepository: Send + Sync {
    /// Insert a new folder.
    async fn create(&self, req: CreateFolderRequest) -> Result<Folder>;

    /// All folders owned by a user, ordered by name.
    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<Folder>>;

    /// Look up a folder by id.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Folder>>;

    /// Replace name and color, bumping the update timestamp.
    async fn update(&self, id: Uuid, name: &str, color: &str) -> Result<Folder>;

    /// Delete the folder row. Notes referencing it keep existing with a
    /// nulled folder reference (FK ON DELETE SET NULL).
    async fn delete(&self, id: Uuid) -> Result<()>;
}

// =============================================================================
// TAG REPOSITORY
// =============================================================================

/// Repository for tag rows and the note↔tag join.
#[async_trait]
pub trait TagRepository: Send + Sync {
    /// Return the tag named `name` owned by `user_id`, creating it if absent.
    ///
    /// Implemented as a single atomic upsert on (user_id, name) so concurrent
    /// duplicate creates converge on one row.
    async fn find_or_create(&self, user_id: Uuid, name: &str) -> Result<Tag>;

    /// All tags owned by a user, ordered by name.
    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<Tag>>;

    /// Look up a tag by id.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Tag>>;

    /// Delete the tag and its join rows atomically. Notes are untouched.
    async fn delete(&self, id: Uuid) -> Result<()>;

    /// Top `limit` tags by note usage, ties broken alphabetically.
    async fn popular(&self, user_id: Uuid, limit: i64) -> Result<Vec<TagWithUsage>>;
}

// =============================================================================
// NOTE REPOSITORY
// =============================================================================

/// Request for creating a note.
#[derive(Debug, Clone)]
pub struct CreateNoteRequest {
    pub title: String,
    pub content: String,
    pub folder_id: Option<Uuid>,
    pub tags: Vec<String>,
    pub user_id: Uuid,
}

/// Request for updating a note in place.
///
/// Title, content, and folder are a full replace. `tags: Some(_)` replaces
/// the entire association set; `None` leaves existing tags untouched.
#[derive(Debug, Clone)]
pub struct UpdateNoteRequest {
    pub title: String,
    pub content: String,
    pub folder_id: Option<Uuid>,
    pub tags: Option<Vec<String>>,
}

/// Repository for note rows and their tag associations.
#[async_trait]
pub trait NoteRepository: Send + Sync {
    /// Insert a note, resolve its tags, and link them — one transaction.
    async fn create(&self, req: CreateNoteRequest) -> Result<NoteWithMeta>;

    /// All notes owned by a user, pinned first, then most recently updated.
    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<NoteWithMeta>>;

    /// Look up a hydrated note by id.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<NoteWithMeta>>;

    /// Update the note row and, if requested, replace its tag set — one
    /// transaction.
    async fn update(&self, id: Uuid, req: UpdateNoteRequest) -> Result<NoteWithMeta>;

    /// Delete the note and its join rows atomically.
    async fn delete(&self, id: Uuid) -> Result<()>;

    /// Flip the pinned flag and return the updated note.
    async fn toggle_pin(&self, id: Uuid) -> Result<NoteWithMeta>;

    /// Flip the archived flag and return the updated note.
    async fn toggle_archive(&self, id: Uuid) -> Result<NoteWithMeta>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_profile_request_is_empty() {
        assert!(UpdateProfileRequest::default().is_empty());

        let req = UpdateProfileRequest {
            username: Some("ada".to_string()),
            ..Default::default()
        };
        assert!(!req.is_empty());
    }
}
