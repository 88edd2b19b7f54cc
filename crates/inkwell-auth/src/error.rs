//! Error types for authentication primitives.

use thiserror::Error;

/// Result type alias for authentication operations.
pub type AuthResult<T> = std::result::Result<T, AuthError>;

/// Authentication primitive errors.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Token is not in the expected `payload.signature` shape.
    #[error("Malformed token: {0}")]
    Malformed(String),

    /// Token signature does not verify - data may be tampered.
    #[error("Invalid token signature")]
    BadSignature,

    /// Token's embedded expiry has passed.
    #[error("Token expired")]
    Expired,

    /// Password hashing or verification failed.
    #[error("Password hash error: {0}")]
    Hash(String),
}
