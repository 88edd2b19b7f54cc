//! Own-profile handlers.

use axum::{extract::State, response::IntoResponse, Json};
use serde::Deserialize;

use crate::{json_success, ApiError, AppState, CurrentUser};
use inkwell_core::{UpdateProfileRequest, UserRepository};

/// GET /api/users/me
pub async fn get_me(CurrentUser(user): CurrentUser) -> Result<impl IntoResponse, ApiError> {
    Ok(json_success(serde_json::json!({ "user": user })))
}

#[derive(Debug, Deserialize)]
pub struct UpdateMeBody {
    pub username: Option<String>,
    pub email: Option<String>,
    pub profile_pic: Option<String>,
}

/// PATCH /api/users/me
///
/// Sparse update: only the supplied fields are persisted.
pub async fn update_me(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<UpdateMeBody>,
) -> Result<impl IntoResponse, ApiError> {
    let req = UpdateProfileRequest {
        username: body.username,
        email: body.email,
        profile_pic: body.profile_pic,
    };

    if req.is_empty() {
        return Err(ApiError::BadRequest("No fields to update".to_string()));
    }

    let updated = state.db.users.update_profile(user.id, req).await?;

    Ok(json_success(serde_json::json!({ "user": updated })))
}
