//! Tag handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{json_success, json_success_list, ApiError, AppState, CurrentUser};
use inkwell_core::{Tag, TagRepository, User};

/// Default number of popular tags returned when `limit` is omitted.
const DEFAULT_POPULAR_LIMIT: i64 = 10;

async fn load_owned_tag(state: &AppState, id: Uuid, user: &User) -> Result<Tag, ApiError> {
    let tag = state
        .db
        .tags
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Tag not found".to_string()))?;

    if tag.user_id != user.id {
        tracing::warn!(
            subsystem = "api",
            component = "tags",
            user_id = %user.id,
            owner_id = %tag.user_id,
            tag_id = %id,
            "Ownership check failed"
        );
        return Err(ApiError::Forbidden(
            "You do not have permission to access this tag".to_string(),
        ));
    }

    Ok(tag)
}

/// GET /api/tags
pub async fn list_tags(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<impl IntoResponse, ApiError> {
    let tags = state.db.tags.find_by_user(user.id).await?;
    Ok(json_success_list(
        tags.len(),
        serde_json::json!({ "tags": tags }),
    ))
}

#[derive(Debug, Deserialize)]
pub struct CreateTagBody {
    pub name: String,
}

/// POST /api/tags
///
/// Idempotent per (owner, name): creating an existing tag returns the
/// existing row with 201, never a duplicate.
pub async fn create_tag(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<CreateTagBody>,
) -> Result<impl IntoResponse, ApiError> {
    let name = body.name.trim();
    if name.is_empty() {
        return Err(ApiError::BadRequest("Tag name is required".to_string()));
    }

    let tag = state.db.tags.find_or_create(user.id, name).await?;

    Ok((
        StatusCode::CREATED,
        json_success(serde_json::json!({ "tag": tag })),
    ))
}

#[derive(Debug, Deserialize)]
pub struct PopularTagsQuery {
    pub limit: Option<i64>,
}

/// GET /api/tags/popular?limit=N
pub async fn popular_tags(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<PopularTagsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_POPULAR_LIMIT);
    if limit < 1 {
        return Err(ApiError::BadRequest("limit must be >= 1".to_string()));
    }

    let tags = state.db.tags.popular(user.id, limit).await?;
    Ok(json_success_list(
        tags.len(),
        serde_json::json!({ "tags": tags }),
    ))
}

/// GET /api/tags/:id
pub async fn get_tag(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let tag = load_owned_tag(&state, id, &user).await?;
    Ok(json_success(serde_json::json!({ "tag": tag })))
}

/// DELETE /api/tags/:id
///
/// Removes the tag from every note's tag list; the notes are untouched.
pub async fn delete_tag(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    load_owned_tag(&state, id, &user).await?;
    state.db.tags.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
