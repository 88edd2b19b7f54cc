//! Folder handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{json_success, json_success_list, ApiError, AppState, CurrentUser};
use inkwell_core::{CreateFolderRequest, Folder, FolderRepository, User};

async fn load_owned_folder(state: &AppState, id: Uuid, user: &User) -> Result<Folder, ApiError> {
    let folder = state
        .db
        .folders
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Folder not found".to_string()))?;

    if folder.user_id != user.id {
        tracing::warn!(
            subsystem = "api",
            component = "folders",
            user_id = %user.id,
            owner_id = %folder.user_id,
            folder_id = %id,
            "Ownership check failed"
        );
        return Err(ApiError::Forbidden(
            "You do not have permission to access this folder".to_string(),
        ));
    }

    Ok(folder)
}

/// GET /api/folders
pub async fn list_folders(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<impl IntoResponse, ApiError> {
    let folders = state.db.folders.find_by_user(user.id).await?;
    Ok(json_success_list(
        folders.len(),
        serde_json::json!({ "folders": folders }),
    ))
}

#[derive(Debug, Deserialize)]
pub struct CreateFolderBody {
    pub name: String,
    pub color: Option<String>,
}

/// POST /api/folders
pub async fn create_folder(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<CreateFolderBody>,
) -> Result<impl IntoResponse, ApiError> {
    if body.name.trim().is_empty() {
        return Err(ApiError::BadRequest("Folder name is required".to_string()));
    }

    let folder = state
        .db
        .folders
        .create(CreateFolderRequest {
            name: body.name,
            color: body.color,
            user_id: user.id,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        json_success(serde_json::json!({ "folder": folder })),
    ))
}

/// GET /api/folders/:id
pub async fn get_folder(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let folder = load_owned_folder(&state, id, &user).await?;
    Ok(json_success(serde_json::json!({ "folder": folder })))
}

#[derive(Debug, Deserialize)]
pub struct UpdateFolderBody {
    pub name: Option<String>,
    pub color: Option<String>,
}

/// PATCH /api/folders/:id
///
/// Omitted fields keep their current values.
pub async fn update_folder(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateFolderBody>,
) -> Result<impl IntoResponse, ApiError> {
    let existing = load_owned_folder(&state, id, &user).await?;

    let name = body.name.unwrap_or(existing.name);
    if name.trim().is_empty() {
        return Err(ApiError::BadRequest("Folder name is required".to_string()));
    }
    let color = body.color.unwrap_or(existing.color);

    let folder = state.db.folders.update(id, &name, &color).await?;

    Ok(json_success(serde_json::json!({ "folder": folder })))
}

/// DELETE /api/folders/:id
///
/// Notes in the folder survive with a nulled folder reference.
pub async fn delete_folder(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    load_owned_folder(&state, id, &user).await?;
    state.db.folders.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
