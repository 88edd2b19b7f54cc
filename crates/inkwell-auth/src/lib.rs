//! # inkwell-auth
//!
//! Authentication primitives for inkwell: argon2 password hashing and
//! HMAC-SHA256 signed session tokens.
//!
//! A session token is `base64url(payload).base64url(signature)` where the
//! payload is JSON claims `{sub, iat, exp}`. The payload is readable without
//! the signing key — clients rely on that to check the embedded expiry
//! locally — while the signature keeps it tamper-proof.

pub mod error;
pub mod password;
pub mod token;

pub use error::{AuthError, AuthResult};
pub use password::{hash_password, verify_password};
pub use token::{TokenClaims, TokenSigner};
