//! Note handlers.
//!
//! Every by-id operation follows the shared contract: look up (404 if
//! absent), compare owner to the authenticated identity (403 on mismatch,
//! logged — it is security-relevant), then operate.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{json_success, json_success_list, ApiError, AppState, CurrentUser};
use inkwell_core::{CreateNoteRequest, NoteRepository, NoteWithMeta, UpdateNoteRequest, User};

async fn load_owned_note(
    state: &AppState,
    id: Uuid,
    user: &User,
) -> Result<NoteWithMeta, ApiError> {
    let note = state
        .db
        .notes
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Note not found".to_string()))?;

    if note.user_id != user.id {
        tracing::warn!(
            subsystem = "api",
            component = "notes",
            user_id = %user.id,
            owner_id = %note.user_id,
            note_id = %id,
            "Ownership check failed"
        );
        return Err(ApiError::Forbidden(
            "You do not have permission to access this note".to_string(),
        ));
    }

    Ok(note)
}

/// GET /api/notes
pub async fn list_notes(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<impl IntoResponse, ApiError> {
    let notes = state.db.notes.find_by_user(user.id).await?;
    Ok(json_success_list(
        notes.len(),
        serde_json::json!({ "notes": notes }),
    ))
}

#[derive(Debug, Deserialize)]
pub struct CreateNoteBody {
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub folder_id: Option<Uuid>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// POST /api/notes
pub async fn create_note(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<CreateNoteBody>,
) -> Result<impl IntoResponse, ApiError> {
    if body.title.trim().is_empty() {
        return Err(ApiError::BadRequest("Title is required".to_string()));
    }

    let note = state
        .db
        .notes
        .create(CreateNoteRequest {
            title: body.title,
            content: body.content,
            folder_id: body.folder_id,
            tags: body.tags,
            user_id: user.id,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        json_success(serde_json::json!({ "note": note })),
    ))
}

/// GET /api/notes/:id
pub async fn get_note(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let note = load_owned_note(&state, id, &user).await?;
    Ok(json_success(serde_json::json!({ "note": note })))
}

#[derive(Debug, Deserialize)]
pub struct UpdateNoteBody {
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub folder_id: Option<Uuid>,
    /// `Some` replaces the full tag set; absent leaves tags untouched.
    pub tags: Option<Vec<String>>,
}

/// PATCH /api/notes/:id
pub async fn update_note(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateNoteBody>,
) -> Result<impl IntoResponse, ApiError> {
    load_owned_note(&state, id, &user).await?;

    if body.title.trim().is_empty() {
        return Err(ApiError::BadRequest("Title is required".to_string()));
    }

    let note = state
        .db
        .notes
        .update(
            id,
            UpdateNoteRequest {
                title: body.title,
                content: body.content,
                folder_id: body.folder_id,
                tags: body.tags,
            },
        )
        .await?;

    Ok(json_success(serde_json::json!({ "note": note })))
}

/// DELETE /api/notes/:id
pub async fn delete_note(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    load_owned_note(&state, id, &user).await?;
    state.db.notes.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /api/notes/:id/pin
pub async fn toggle_pin_note(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    load_owned_note(&state, id, &user).await?;
    let note = state.db.notes.toggle_pin(id).await?;
    Ok(json_success(serde_json::json!({ "note": note })))
}

/// PATCH /api/notes/:id/archive
pub async fn toggle_archive_note(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    load_owned_note(&state, id, &user).await?;
    let note = state.db.notes.toggle_archive(id).await?;
    Ok(json_success(serde_json::json!({ "note": note })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkwell_auth::TokenSigner;
    use inkwell_db::test_fixtures::TestDatabase;
    use std::sync::Arc;
    use std::time::Duration;

    fn state_for(test_db: &TestDatabase) -> AppState {
        AppState {
            db: test_db.db.clone(),
            signer: TokenSigner::new("test-secret"),
            token_ttl: Duration::from_secs(3600),
            dummy_hash: Arc::new("unused".to_string()),
            rate_limiter: None,
        }
    }

    #[tokio::test]
    #[ignore = "requires the test database"]
    async fn test_cross_user_access_is_forbidden_not_not_found() {
        let test_db = TestDatabase::new().await;
        let owner = test_db.create_user("owner").await;
        let intruder = test_db.create_user("intruder").await;
        let state = state_for(&test_db);

        let note = state
            .db
            .notes
            .create(CreateNoteRequest {
                title: "private".to_string(),
                content: "secret".to_string(),
                folder_id: None,
                tags: vec![],
                user_id: owner.id,
            })
            .await
            .expect("create note");

        // Owner passes the check; the intruder gets Forbidden, never data
        assert!(load_owned_note(&state, note.id, &owner).await.is_ok());
        assert!(matches!(
            load_owned_note(&state, note.id, &intruder).await,
            Err(ApiError::Forbidden(_))
        ));

        test_db.cleanup().await;
    }

    #[tokio::test]
    #[ignore = "requires the test database"]
    async fn test_absent_note_is_not_found() {
        let test_db = TestDatabase::new().await;
        let user = test_db.create_user("ada").await;
        let state = state_for(&test_db);

        assert!(matches!(
            load_owned_note(&state, Uuid::new_v4(), &user).await,
            Err(ApiError::NotFound(_))
        ));

        test_db.cleanup().await;
    }
}
