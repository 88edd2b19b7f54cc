//! Error types for the inkwell client.

use thiserror::Error;

/// Result type alias for client operations.
pub type ClientResult<T> = std::result::Result<T, ClientError>;

/// Client-side errors.
#[derive(Error, Debug)]
pub enum ClientError {
    /// The stored session token has expired, or the server answered 401.
    /// The session is cleared; the caller must re-authenticate.
    #[error("Session expired. Please log in again.")]
    SessionExpired,

    /// The server rejected the request; `message` is surfaced verbatim
    /// from the response envelope.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Network-level failure.
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body did not match the expected envelope.
    #[error("Unexpected response: {0}")]
    Decode(String),
}
