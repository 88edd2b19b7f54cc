//! Core data models for inkwell.
//!
//! These types are shared across all inkwell crates and represent
//! the core domain entities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// USER TYPES
// =============================================================================

/// Public user profile, safe to return in responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_pic: Option<String>,
    pub created_at_utc: DateTime<Utc>,
    pub updated_at_utc: DateTime<Utc>,
}

/// User row including the password hash. Never serialized into responses;
/// only the login path reads it.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: User,
    pub password_hash: String,
}

// =============================================================================
// FOLDER TYPES
// =============================================================================

/// A named, colored container for notes, owned by one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Folder {
    pub id: Uuid,
    pub name: String,
    pub color: String,
    pub user_id: Uuid,
    pub created_at_utc: DateTime<Utc>,
    pub updated_at_utc: DateTime<Utc>,
}

// =============================================================================
// TAG TYPES
// =============================================================================

/// A label unique per (owner, name), many-to-many with notes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
    pub user_id: Uuid,
    pub created_at_utc: DateTime<Utc>,
}

/// Tag annotated with how many notes currently carry it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagWithUsage {
    pub id: Uuid,
    pub name: String,
    pub user_id: Uuid,
    pub created_at_utc: DateTime<Utc>,
    pub usage_count: i64,
}

// =============================================================================
// NOTE TYPES
// =============================================================================

/// A note hydrated with its folder name/color and tag names.
///
/// `folder_name` and `folder_color` are derived from the folder reference and
/// are `None` when the note is not in a folder. `tags` is sorted by name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteWithMeta {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub user_id: Uuid,
    pub folder_id: Option<Uuid>,
    pub folder_name: Option<String>,
    pub folder_color: Option<String>,
    pub pinned: bool,
    pub archived: bool,
    pub created_at_utc: DateTime<Utc>,
    pub updated_at_utc: DateTime<Utc>,
    pub tags: Vec<String>,
}
