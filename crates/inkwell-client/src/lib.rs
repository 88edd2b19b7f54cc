//! # inkwell-client
//!
//! Typed HTTP client for the inkwell API.
//!
//! The client owns the session token: it attaches it to every request,
//! checks the token's embedded expiry before each call and on a periodic
//! watcher task, and clears the session (forcing re-authentication) on
//! expiry or on any server-reported 401.
//!
//! ## Example
//!
//! ```rust,ignore
//! use inkwell_client::Client;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::new("http://localhost:3000");
//!     client.register("ada", "ada@example.com", "secret1").await?;
//!     let note = client
//!         .create_note(inkwell_client::NoteDraft {
//!             title: "T".into(),
//!             content: "C".into(),
//!             folder_id: None,
//!             tags: vec!["x".into()],
//!         })
//!         .await?;
//!     println!("created {}", note.id);
//!     Ok(())
//! }
//! ```

pub mod error;

use std::sync::{Arc, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use inkwell_auth::TokenClaims;
use inkwell_core::{Folder, NoteWithMeta, Tag, TagWithUsage, User};

pub use error::{ClientError, ClientResult};

/// Default request timeout.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// An authenticated session: the bearer token plus its embedded expiry.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Whether the embedded expiry has passed.
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

// =============================================================================
// REQUEST BODIES
// =============================================================================

/// Fields for creating a note.
#[derive(Debug, Clone, Serialize)]
pub struct NoteDraft {
    pub title: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<Uuid>,
    pub tags: Vec<String>,
}

/// Fields for updating a note. `tags: Some(_)` replaces the full tag set;
/// `None` leaves it untouched.
#[derive(Debug, Clone, Serialize)]
pub struct NoteUpdate {
    pub title: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

/// Sparse profile update; omitted fields are left untouched.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_pic: Option<String>,
}

// =============================================================================
// RESPONSE ENVELOPE
// =============================================================================

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[allow(dead_code)]
    status: String,
    message: Option<String>,
    token: Option<String>,
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct UserData {
    user: User,
}

#[derive(Debug, Deserialize)]
struct NoteData {
    note: NoteWithMeta,
}

#[derive(Debug, Deserialize)]
struct NotesData {
    notes: Vec<NoteWithMeta>,
}

#[derive(Debug, Deserialize)]
struct FolderData {
    folder: Folder,
}

#[derive(Debug, Deserialize)]
struct FoldersData {
    folders: Vec<Folder>,
}

#[derive(Debug, Deserialize)]
struct TagData {
    tag: Tag,
}

#[derive(Debug, Deserialize)]
struct TagsData {
    tags: Vec<Tag>,
}

#[derive(Debug, Deserialize)]
struct PopularTagsData {
    tags: Vec<TagWithUsage>,
}

// =============================================================================
// CLIENT
// =============================================================================

/// Typed client for the inkwell REST API.
///
/// Cheap to clone; clones share the same session store.
#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: String,
    session: Arc<RwLock<Option<Session>>>,
}

impl Client {
    /// Create a client for the given base URL (e.g. `http://localhost:3000`).
    pub fn new(base_url: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("reqwest client construction cannot fail with static config");
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session: Arc::new(RwLock::new(None)),
        }
    }

    // ─── Session management ────────────────────────────────────────────────

    /// The current session, if any.
    pub fn session(&self) -> Option<Session> {
        self.session.read().expect("session lock poisoned").clone()
    }

    /// Whether a session with an unexpired token is stored.
    pub fn is_authenticated(&self) -> bool {
        self.session().map(|s| !s.is_expired()).unwrap_or(false)
    }

    /// Drop the stored session.
    pub fn logout(&self) {
        self.clear_session();
    }

    /// Adopt a previously issued token (e.g. restored from disk).
    ///
    /// The token is stored even if already expired; the next request or
    /// watcher tick will invalidate it and force re-authentication.
    pub fn restore_session(&self, token: &str) -> ClientResult<()> {
        let claims =
            TokenClaims::decode_unverified(token).map_err(|e| ClientError::Decode(e.to_string()))?;
        self.store_session(token.to_string(), &claims);
        Ok(())
    }

    /// Spawn a background task that checks the stored token's embedded
    /// expiry every `interval`, clearing the session and invoking
    /// `on_expired` when it lapses.
    ///
    /// The task runs until aborted via the returned handle.
    pub fn spawn_expiry_watch<F>(
        &self,
        interval: Duration,
        on_expired: F,
    ) -> tokio::task::JoinHandle<()>
    where
        F: Fn() + Send + Sync + 'static,
    {
        let client = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let expired = client.session().map(|s| s.is_expired()).unwrap_or(false);
                if expired {
                    tracing::debug!(
                        subsystem = "client",
                        component = "session",
                        "Session token expired; clearing"
                    );
                    client.clear_session();
                    on_expired();
                }
            }
        })
    }

    fn store_session(&self, token: String, claims: &TokenClaims) {
        let session = Session {
            token,
            expires_at: claims.expires_at(),
        };
        *self.session.write().expect("session lock poisoned") = Some(session);
    }

    fn clear_session(&self) {
        *self.session.write().expect("session lock poisoned") = None;
    }

    /// Pre-request check: a stored-but-expired token clears the session and
    /// fails with `SessionExpired` without touching the network.
    fn preflight_token(&self) -> ClientResult<Option<String>> {
        match self.session() {
            Some(s) if s.is_expired() => {
                self.clear_session();
                Err(ClientError::SessionExpired)
            }
            Some(s) => Ok(Some(s.token)),
            None => Ok(None),
        }
    }

    // ─── Request plumbing ──────────────────────────────────────────────────

    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> ClientResult<Envelope<T>> {
        let token = self.preflight_token()?;
        let sent_token = token.is_some();

        let url = format!("{}{}", self.base_url, path);
        let mut req = self.http.request(method, &url);
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        if let Some(body) = body {
            req = req.json(&body);
        }

        let response = req.send().await?;
        let status = response.status();

        // A 401 against our token means the server no longer honors it;
        // a 401 on an anonymous call (bad login) is an ordinary API error.
        if status == reqwest::StatusCode::UNAUTHORIZED && sent_token {
            self.clear_session();
            return Err(ClientError::SessionExpired);
        }

        if status == reqwest::StatusCode::NO_CONTENT {
            return Ok(Envelope {
                status: "success".to_string(),
                message: None,
                token: None,
                data: None,
            });
        }

        let bytes = response.bytes().await?;
        let envelope: Envelope<T> = serde_json::from_slice(&bytes)
            .map_err(|e| ClientError::Decode(format!("{} (HTTP {})", e, status.as_u16())))?;

        if !status.is_success() {
            return Err(ClientError::Api {
                status: status.as_u16(),
                message: envelope
                    .message
                    .unwrap_or_else(|| format!("HTTP {}", status.as_u16())),
            });
        }

        Ok(envelope)
    }

    async fn request_data<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> ClientResult<T> {
        let envelope = self.request::<T>(method, path, body).await?;
        envelope
            .data
            .ok_or_else(|| ClientError::Decode("missing data field".to_string()))
    }

    fn to_body<B: Serialize>(body: &B) -> ClientResult<serde_json::Value> {
        serde_json::to_value(body).map_err(|e| ClientError::Decode(e.to_string()))
    }

    // ─── Auth ──────────────────────────────────────────────────────────────

    /// Register a new account and adopt the returned session.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> ClientResult<User> {
        let body = serde_json::json!({
            "username": username,
            "email": email,
            "password": password,
        });
        self.authenticate("/api/auth/register", body).await
    }

    /// Log in and adopt the returned session.
    pub async fn login(&self, email: &str, password: &str) -> ClientResult<User> {
        let body = serde_json::json!({
            "email": email,
            "password": password,
        });
        self.authenticate("/api/auth/login", body).await
    }

    async fn authenticate(&self, path: &str, body: serde_json::Value) -> ClientResult<User> {
        let envelope = self
            .request::<UserData>(Method::POST, path, Some(body))
            .await?;

        let token = envelope
            .token
            .ok_or_else(|| ClientError::Decode("missing token field".to_string()))?;
        let claims =
            TokenClaims::decode_unverified(&token).map_err(|e| ClientError::Decode(e.to_string()))?;
        self.store_session(token, &claims);

        envelope
            .data
            .map(|d| d.user)
            .ok_or_else(|| ClientError::Decode("missing data field".to_string()))
    }

    // ─── Profile ───────────────────────────────────────────────────────────

    /// Fetch the authenticated user's profile.
    pub async fn me(&self) -> ClientResult<User> {
        Ok(self
            .request_data::<UserData>(Method::GET, "/api/users/me", None)
            .await?
            .user)
    }

    /// Apply a sparse profile update.
    pub async fn update_me(&self, update: ProfileUpdate) -> ClientResult<User> {
        let body = Self::to_body(&update)?;
        Ok(self
            .request_data::<UserData>(Method::PATCH, "/api/users/me", Some(body))
            .await?
            .user)
    }

    // ─── Notes ─────────────────────────────────────────────────────────────

    /// All notes, pinned first, then most recently updated.
    pub async fn list_notes(&self) -> ClientResult<Vec<NoteWithMeta>> {
        Ok(self
            .request_data::<NotesData>(Method::GET, "/api/notes", None)
            .await?
            .notes)
    }

    /// Create a note.
    pub async fn create_note(&self, draft: NoteDraft) -> ClientResult<NoteWithMeta> {
        let body = Self::to_body(&draft)?;
        Ok(self
            .request_data::<NoteData>(Method::POST, "/api/notes", Some(body))
            .await?
            .note)
    }

    /// Fetch one note.
    pub async fn get_note(&self, id: Uuid) -> ClientResult<NoteWithMeta> {
        Ok(self
            .request_data::<NoteData>(Method::GET, &format!("/api/notes/{}", id), None)
            .await?
            .note)
    }

    /// Update a note in place.
    pub async fn update_note(&self, id: Uuid, update: NoteUpdate) -> ClientResult<NoteWithMeta> {
        let body = Self::to_body(&update)?;
        Ok(self
            .request_data::<NoteData>(Method::PATCH, &format!("/api/notes/{}", id), Some(body))
            .await?
            .note)
    }

    /// Delete a note.
    pub async fn delete_note(&self, id: Uuid) -> ClientResult<()> {
        self.request::<serde_json::Value>(Method::DELETE, &format!("/api/notes/{}", id), None)
            .await?;
        Ok(())
    }

    /// Toggle the pinned flag.
    pub async fn toggle_pin(&self, id: Uuid) -> ClientResult<NoteWithMeta> {
        Ok(self
            .request_data::<NoteData>(Method::PATCH, &format!("/api/notes/{}/pin", id), None)
            .await?
            .note)
    }

    /// Toggle the archived flag.
    pub async fn toggle_archive(&self, id: Uuid) -> ClientResult<NoteWithMeta> {
        Ok(self
            .request_data::<NoteData>(Method::PATCH, &format!("/api/notes/{}/archive", id), None)
            .await?
            .note)
    }

    // ─── Folders ───────────────────────────────────────────────────────────

    /// All folders, ordered by name.
    pub async fn list_folders(&self) -> ClientResult<Vec<Folder>> {
        Ok(self
            .request_data::<FoldersData>(Method::GET, "/api/folders", None)
            .await?
            .folders)
    }

    /// Create a folder; the server defaults the color when `None`.
    pub async fn create_folder(&self, name: &str, color: Option<&str>) -> ClientResult<Folder> {
        let body = serde_json::json!({ "name": name, "color": color });
        Ok(self
            .request_data::<FolderData>(Method::POST, "/api/folders", Some(body))
            .await?
            .folder)
    }

    /// Fetch one folder.
    pub async fn get_folder(&self, id: Uuid) -> ClientResult<Folder> {
        Ok(self
            .request_data::<FolderData>(Method::GET, &format!("/api/folders/{}", id), None)
            .await?
            .folder)
    }

    /// Update a folder's name and/or color.
    pub async fn update_folder(
        &self,
        id: Uuid,
        name: Option<&str>,
        color: Option<&str>,
    ) -> ClientResult<Folder> {
        let body = serde_json::json!({ "name": name, "color": color });
        Ok(self
            .request_data::<FolderData>(Method::PATCH, &format!("/api/folders/{}", id), Some(body))
            .await?
            .folder)
    }

    /// Delete a folder; its notes survive with a nulled folder reference.
    pub async fn delete_folder(&self, id: Uuid) -> ClientResult<()> {
        self.request::<serde_json::Value>(Method::DELETE, &format!("/api/folders/{}", id), None)
            .await?;
        Ok(())
    }

    // ─── Tags ──────────────────────────────────────────────────────────────

    /// All tags, ordered by name.
    pub async fn list_tags(&self) -> ClientResult<Vec<Tag>> {
        Ok(self
            .request_data::<TagsData>(Method::GET, "/api/tags", None)
            .await?
            .tags)
    }

    /// Create (or return the existing) tag with this name.
    pub async fn create_tag(&self, name: &str) -> ClientResult<Tag> {
        let body = serde_json::json!({ "name": name });
        Ok(self
            .request_data::<TagData>(Method::POST, "/api/tags", Some(body))
            .await?
            .tag)
    }

    /// Top tags by usage count, ties broken alphabetically.
    pub async fn popular_tags(&self, limit: Option<i64>) -> ClientResult<Vec<TagWithUsage>> {
        let path = match limit {
            Some(n) => format!("/api/tags/popular?limit={}", n),
            None => "/api/tags/popular".to_string(),
        };
        Ok(self
            .request_data::<PopularTagsData>(Method::GET, &path, None)
            .await?
            .tags)
    }

    /// Fetch one tag.
    pub async fn get_tag(&self, id: Uuid) -> ClientResult<Tag> {
        Ok(self
            .request_data::<TagData>(Method::GET, &format!("/api/tags/{}", id), None)
            .await?
            .tag)
    }

    /// Delete a tag, detaching it from every note.
    pub async fn delete_tag(&self, id: Uuid) -> ClientResult<()> {
        self.request::<serde_json::Value>(Method::DELETE, &format!("/api/tags/{}", id), None)
            .await?;
        Ok(())
    }

    // ─── System ────────────────────────────────────────────────────────────

    /// Liveness probe; does not require authentication.
    pub async fn health(&self) -> ClientResult<()> {
        let response = self
            .http
            .get(format!("{}/health", self.base_url))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(ClientError::Api {
                status: response.status().as_u16(),
                message: "health check failed".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkwell_auth::TokenSigner;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn token_with_ttl(secs: u64) -> String {
        TokenSigner::new("client-test-secret")
            .sign(Uuid::new_v4(), Duration::from_secs(secs))
            .unwrap()
    }

    #[test]
    fn test_restore_session_reads_embedded_expiry() {
        let client = Client::new("http://localhost:3000");
        client.restore_session(&token_with_ttl(3600)).unwrap();

        let session = client.session().unwrap();
        assert!(!session.is_expired());
        assert!(client.is_authenticated());
    }

    #[test]
    fn test_restore_session_rejects_garbage() {
        let client = Client::new("http://localhost:3000");
        assert!(matches!(
            client.restore_session("garbage"),
            Err(ClientError::Decode(_))
        ));
        assert!(client.session().is_none());
    }

    #[test]
    fn test_preflight_clears_expired_session() {
        let client = Client::new("http://localhost:3000");
        client.restore_session(&token_with_ttl(0)).unwrap();
        assert!(client.session().is_some());
        assert!(!client.is_authenticated());

        // Proactive invalidation: no network involved
        assert!(matches!(
            client.preflight_token(),
            Err(ClientError::SessionExpired)
        ));
        assert!(client.session().is_none());
    }

    #[test]
    fn test_preflight_passes_live_token_through() {
        let client = Client::new("http://localhost:3000");
        client.restore_session(&token_with_ttl(3600)).unwrap();
        let token = client.preflight_token().unwrap();
        assert!(token.is_some());
    }

    #[test]
    fn test_preflight_without_session_is_anonymous() {
        let client = Client::new("http://localhost:3000");
        assert!(client.preflight_token().unwrap().is_none());
    }

    #[test]
    fn test_logout_clears_session() {
        let client = Client::new("http://localhost:3000");
        client.restore_session(&token_with_ttl(3600)).unwrap();
        client.logout();
        assert!(client.session().is_none());
    }

    #[tokio::test]
    async fn test_expiry_watch_fires_callback_and_clears_session() {
        let client = Client::new("http://localhost:3000");
        client.restore_session(&token_with_ttl(0)).unwrap();

        let fired = Arc::new(AtomicBool::new(false));
        let fired_clone = fired.clone();
        let handle = client.spawn_expiry_watch(Duration::from_millis(20), move || {
            fired_clone.store(true, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_millis(120)).await;
        handle.abort();

        assert!(fired.load(Ordering::SeqCst), "watcher must fire on expiry");
        assert!(client.session().is_none());
    }

    #[tokio::test]
    async fn test_expiry_watch_leaves_live_session_alone() {
        let client = Client::new("http://localhost:3000");
        client.restore_session(&token_with_ttl(3600)).unwrap();

        let fired = Arc::new(AtomicBool::new(false));
        let fired_clone = fired.clone();
        let handle = client.spawn_expiry_watch(Duration::from_millis(20), move || {
            fired_clone.store(true, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_millis(120)).await;
        handle.abort();

        assert!(!fired.load(Ordering::SeqCst));
        assert!(client.session().is_some());
    }

    #[test]
    fn test_envelope_parses_failure_shape() {
        let json = r#"{"status":"fail","message":"Title is required"}"#;
        let envelope: Envelope<serde_json::Value> = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.message.as_deref(), Some("Title is required"));
        assert!(envelope.data.is_none());
    }

    #[test]
    fn test_envelope_parses_success_shape() {
        let json = r#"{"status":"success","results":1,"data":{"notes":[]}}"#;
        let envelope: Envelope<NotesData> = serde_json::from_str(json).unwrap();
        assert!(envelope.data.unwrap().notes.is_empty());
    }
}
