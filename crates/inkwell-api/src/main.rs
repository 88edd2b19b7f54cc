//! inkwell-api - HTTP API server for inkwell

mod handlers;

use std::net::SocketAddr;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{FromRequestParts, State},
    http::{header, request::Parts, HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::{get, patch, post},
    Json, Router,
};
use governor::{Quota, RateLimiter};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use inkwell_auth::{hash_password, AuthError, TokenSigner};
use inkwell_auth::token::DEFAULT_TOKEN_TTL_SECS;
use inkwell_core::{User, UserRepository};
use inkwell_db::Database;

use handlers::{
    auth::{login, register},
    folders::{create_folder, delete_folder, get_folder, list_folders, update_folder},
    notes::{
        create_note, delete_note, get_note, list_notes, toggle_archive_note, toggle_pin_note,
        update_note,
    },
    tags::{create_tag, delete_tag, get_tag, list_tags, popular_tags},
    users::{get_me, update_me},
};

// =============================================================================
// REQUEST ID (UUIDv7)
// =============================================================================

/// Generates time-ordered UUIDv7 request correlation IDs.
///
/// UUIDv7 embeds a Unix timestamp, so IDs sort chronologically — useful for
/// log correlation and debugging.
#[derive(Clone, Default)]
struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

/// Global rate limiter type (direct quota, no keyed bucketing for a personal
/// server).
type GlobalRateLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    /// Session token signer/verifier.
    pub signer: TokenSigner,
    /// Lifetime of newly issued session tokens.
    pub token_ttl: Duration,
    /// Pre-computed hash verified when login hits an unknown email, so both
    /// 401 paths do comparable work.
    pub dummy_hash: Arc<String>,
    /// Global rate limiter (None if rate limiting is disabled).
    pub rate_limiter: Option<Arc<GlobalRateLimiter>>,
}

// =============================================================================
// RESPONSE ENVELOPE
// =============================================================================

/// Success envelope: `{"status":"success","data":{...}}`.
pub fn json_success(data: serde_json::Value) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "success",
        "data": data,
    }))
}

/// Success envelope for list endpoints, with a `results` count.
pub fn json_success_list(results: usize, data: serde_json::Value) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "success",
        "results": results,
        "data": data,
    }))
}

// =============================================================================
// ERROR HANDLING
// =============================================================================

#[derive(Debug)]
pub enum ApiError {
    /// Unexpected backend failure; logged, surfaced as a generic 500.
    Storage(inkwell_core::Error),
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    BadRequest(String),
}

impl From<inkwell_core::Error> for ApiError {
    fn from(err: inkwell_core::Error) -> Self {
        match &err {
            inkwell_core::Error::NotFound(msg) => ApiError::NotFound(msg.clone()),
            inkwell_core::Error::InvalidInput(msg) => ApiError::BadRequest(msg.clone()),
            inkwell_core::Error::Unauthorized(msg) => ApiError::Unauthorized(msg.clone()),
            inkwell_core::Error::Forbidden(msg) => ApiError::Forbidden(msg.clone()),
            inkwell_core::Error::Database(sqlx_err) => {
                // Provide a user-friendly message for the known unique
                // constraint instead of a 500
                let msg = sqlx_err.to_string();
                if msg.contains("duplicate key") || msg.contains("unique constraint") {
                    if msg.contains("users_email_key") || msg.contains("email") {
                        return ApiError::BadRequest(
                            "An account with this email already exists".to_string(),
                        );
                    }
                    return ApiError::BadRequest(msg);
                }
                ApiError::Storage(err)
            }
            _ => ApiError::Storage(err),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Malformed(_) | AuthError::BadSignature | AuthError::Expired => {
                ApiError::Unauthorized(err.to_string())
            }
            AuthError::Hash(msg) => ApiError::Storage(inkwell_core::Error::Internal(msg)),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ApiError::Storage(err) => {
                tracing::error!(subsystem = "api", error = %err, "Storage failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
        };

        // 4xx are the client's fault ("fail"), 5xx are ours ("error")
        let status_word = if status.is_server_error() {
            "error"
        } else {
            "fail"
        };

        let body = Json(serde_json::json!({
            "status": status_word,
            "message": message,
        }));

        (status, body).into_response()
    }
}

// =============================================================================
// AUTH GATE
// =============================================================================

/// Extractor for the authenticated user on protected routes.
///
/// Verifies the bearer token's shape, signature, and embedded expiry, then
/// resolves the subject to a live user row. Every failure is Unauthorized
/// before any handler logic runs.
///
/// Usage:
/// ```ignore
/// async fn my_handler(user: CurrentUser) -> impl IntoResponse {
///     // user.0 is the authenticated User
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

#[axum::async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok());

        let token = match auth_header {
            Some(header) if header.starts_with("Bearer ") => {
                header.trim_start_matches("Bearer ").trim()
            }
            _ => {
                return Err(ApiError::Unauthorized(
                    "Please log in to access".to_string(),
                ))
            }
        };

        let claims = state.signer.verify(token)?;

        let user = state
            .db
            .users
            .find_by_id(claims.sub)
            .await
            .map_err(ApiError::from)?
            .ok_or_else(|| ApiError::Unauthorized("User no longer exists".to_string()))?;

        Ok(CurrentUser(user))
    }
}

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

/// Parse allowed origins from a comma-separated environment variable.
///
/// `ALLOWED_ORIGINS` - comma-separated list of allowed origins; defaults to
/// the local dev frontend when unset or empty.
fn parse_allowed_origins() -> Vec<HeaderValue> {
    let origins_str =
        std::env::var("ALLOWED_ORIGINS").unwrap_or_else(|_| "http://localhost:5173".to_string());

    if origins_str.trim().is_empty() {
        return vec![HeaderValue::from_static("http://localhost:5173")];
    }

    origins_str
        .split(',')
        .filter_map(|s| {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            match trimmed.parse::<HeaderValue>() {
                Ok(v) => Some(v),
                Err(e) => {
                    tracing::warn!("Invalid CORS origin '{}': {}", trimmed, e);
                    None
                }
            }
        })
        .collect()
}

// =============================================================================
// MIDDLEWARE
// =============================================================================

async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: axum::extract::Request,
    next: axum::middleware::Next,
) -> Result<impl IntoResponse, (StatusCode, Json<serde_json::Value>)> {
    if let Some(limiter) = &state.rate_limiter {
        if limiter.check().is_err() {
            tracing::warn!("Rate limit exceeded");
            return Err((
                StatusCode::TOO_MANY_REQUESTS,
                Json(serde_json::json!({
                    "status": "fail",
                    "message": "Too many requests. Please wait before retrying."
                })),
            ));
        }
    }
    Ok(next.run(request).await)
}

// =============================================================================
// HEALTH CHECK
// =============================================================================

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "success",
        "message": "Server is running",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with configurable output
    //
    // Environment variables:
    //   LOG_FORMAT  - "json" or "text" (default: "text")
    //   LOG_FILE    - path to log file (optional, enables file logging)
    //   LOG_ANSI    - "true"/"false" override ANSI colors (auto-detected by default)
    //   RUST_LOG    - standard env filter (default: "inkwell_api=debug,tower_http=debug")
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let log_file = std::env::var("LOG_FILE").ok();
    let log_ansi = std::env::var("LOG_ANSI")
        .ok()
        .map(|v| v == "true" || v == "1");

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "inkwell_api=debug,tower_http=debug".into());

    let registry = tracing_subscriber::registry().with(env_filter);

    let _file_guard = if let Some(ref path) = log_file {
        let file_dir = std::path::Path::new(path)
            .parent()
            .unwrap_or(std::path::Path::new("."));
        let file_name = std::path::Path::new(path)
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or("inkwell-api.log");
        let file_appender = tracing_appender::rolling::daily(file_dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        if log_format == "json" {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(non_blocking),
                )
                .init();
        } else {
            let mut layer = tracing_subscriber::fmt::layer().with_writer(non_blocking);
            if let Some(ansi) = log_ansi {
                layer = layer.with_ansi(ansi);
            } else {
                layer = layer.with_ansi(false); // no ANSI in files
            }
            registry.with(layer).init();
        }
        Some(guard)
    } else {
        // Console-only output
        if log_format == "json" {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        } else {
            let mut layer = tracing_subscriber::fmt::layer();
            if let Some(ansi) = log_ansi {
                layer = layer.with_ansi(ansi);
            }
            registry.with(layer).init();
        }
        None
    };

    info!(
        log_format = %log_format,
        log_file = log_file.as_deref().unwrap_or("(stdout)"),
        "Logging initialized"
    );

    // Get configuration from environment
    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "postgres://localhost/inkwell".to_string());
    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "3000".to_string())
        .parse()
        .unwrap_or(3000);

    // Session tokens are worthless without a real secret; refuse to start
    // with a guessable default.
    let token_secret = std::env::var("TOKEN_SECRET")
        .map_err(|_| anyhow::anyhow!("TOKEN_SECRET must be set"))?;
    let token_ttl_secs: u64 = std::env::var("TOKEN_TTL_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_TOKEN_TTL_SECS);

    // Rate limiting configuration (generous for a personal server)
    // RATE_LIMIT_REQUESTS: requests per period (default: 100)
    // RATE_LIMIT_PERIOD_SECS: period in seconds (default: 60)
    let rate_limit_requests: u64 = std::env::var("RATE_LIMIT_REQUESTS")
        .unwrap_or_else(|_| "100".to_string())
        .parse()
        .unwrap_or(100);
    let rate_limit_period_secs: u64 = std::env::var("RATE_LIMIT_PERIOD_SECS")
        .unwrap_or_else(|_| "60".to_string())
        .parse()
        .unwrap_or(60);
    let rate_limit_enabled: bool = std::env::var("RATE_LIMIT_ENABLED")
        .map(|v| v == "true" || v == "1")
        .unwrap_or(true);

    info!(
        "Rate limiting: {} ({} requests per {} seconds)",
        if rate_limit_enabled {
            "enabled"
        } else {
            "disabled"
        },
        rate_limit_requests,
        rate_limit_period_secs
    );

    // Connect to database
    info!("Connecting to database...");
    let db = Database::connect(&database_url).await?;
    info!("Database connected");

    // Run pending database migrations on startup
    info!("Running database migrations...");
    db.migrate().await?;
    info!("Database migrations complete");

    // Create rate limiter if enabled
    let rate_limiter = if rate_limit_enabled {
        let quota = Quota::with_period(Duration::from_secs(rate_limit_period_secs))
            .expect("Rate limit period must be non-zero")
            .allow_burst(
                NonZeroU32::new(rate_limit_requests as u32).expect("Rate limit must be non-zero"),
            );
        Some(Arc::new(RateLimiter::direct(quota)))
    } else {
        None
    };

    // Create app state
    let dummy_hash = hash_password("invalid-password-placeholder")
        .map_err(|e| anyhow::anyhow!("Failed to prepare login dummy hash: {}", e))?;
    let state = AppState {
        db,
        signer: TokenSigner::new(&token_secret),
        token_ttl: Duration::from_secs(token_ttl_secs),
        dummy_hash: Arc::new(dummy_hash),
        rate_limiter,
    };

    // Build router
    let app = Router::new()
        // Health check
        .route("/health", get(health_check))
        // Auth
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        // Own profile
        .route("/api/users/me", get(get_me).patch(update_me))
        // Notes CRUD
        .route("/api/notes", get(list_notes).post(create_note))
        .route(
            "/api/notes/:id",
            get(get_note).patch(update_note).delete(delete_note),
        )
        .route("/api/notes/:id/pin", patch(toggle_pin_note))
        .route("/api/notes/:id/archive", patch(toggle_archive_note))
        // Folders
        .route("/api/folders", get(list_folders).post(create_folder))
        .route(
            "/api/folders/:id",
            get(get_folder).patch(update_folder).delete(delete_folder),
        )
        // Tags
        .route("/api/tags", get(list_tags).post(create_tag))
        .route("/api/tags/popular", get(popular_tags))
        .route("/api/tags/:id", get(get_tag).delete(delete_tag))
        // Middleware
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer({
            let allowed_origins = parse_allowed_origins();

            CorsLayer::new()
                .allow_origin(AllowOrigin::list(allowed_origins))
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PATCH,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
                .allow_credentials(true)
                .max_age(Duration::from_secs(3600))
        })
        .layer(RequestBodyLimitLayer::new(10 * 1024 * 1024)) // 10 MB
        .with_state(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
