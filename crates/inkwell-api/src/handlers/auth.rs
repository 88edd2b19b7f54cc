//! Registration and login handlers.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;

use crate::{ApiError, AppState};
use inkwell_auth::{hash_password, verify_password};
use inkwell_core::{CreateUserRequest, UserRepository};

#[derive(Debug, Deserialize)]
pub struct RegisterBody {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginBody {
    pub email: String,
    pub password: String,
}

/// POST /api/auth/register
///
/// Creates the user (password hashed before storage) and issues a session
/// token bound to the new identity.
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterBody>,
) -> Result<impl IntoResponse, ApiError> {
    if body.username.trim().is_empty() || body.email.trim().is_empty() || body.password.is_empty() {
        return Err(ApiError::BadRequest(
            "Username, email and password are required".to_string(),
        ));
    }

    // Argon2 is CPU-bound; keep it off the async worker threads
    let password = body.password;
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| ApiError::Storage(inkwell_core::Error::Internal(e.to_string())))??;

    let user = state
        .db
        .users
        .create(CreateUserRequest {
            username: body.username.trim().to_string(),
            email: body.email.trim().to_string(),
            password_hash,
        })
        .await?;

    let token = state.signer.sign(user.id, state.token_ttl)?;

    tracing::info!(
        subsystem = "api",
        component = "auth",
        op = "register",
        user_id = %user.id,
        "User registered"
    );

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "status": "success",
            "token": token,
            "data": { "user": user },
        })),
    ))
}

/// POST /api/auth/login
///
/// Unknown email and wrong password are indistinguishable to the caller;
/// both verify against a hash (a dummy one when the email is unknown) and
/// return the same 401.
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginBody>,
) -> Result<impl IntoResponse, ApiError> {
    let auth_user = state.db.users.find_by_email(body.email.trim()).await?;

    let stored_hash = auth_user
        .as_ref()
        .map(|u| u.password_hash.clone())
        .unwrap_or_else(|| state.dummy_hash.as_ref().clone());

    let password = body.password;
    let verified = tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash))
        .await
        .map_err(|e| ApiError::Storage(inkwell_core::Error::Internal(e.to_string())))?
        .unwrap_or(false);

    let user = match auth_user {
        Some(u) if verified => u.user,
        _ => {
            return Err(ApiError::Unauthorized(
                "Incorrect email or password".to_string(),
            ))
        }
    };

    let token = state.signer.sign(user.id, state.token_ttl)?;

    tracing::info!(
        subsystem = "api",
        component = "auth",
        op = "login",
        user_id = %user.id,
        "User logged in"
    );

    Ok((
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "success",
            "token": token,
            "data": { "user": user },
        })),
    ))
}
