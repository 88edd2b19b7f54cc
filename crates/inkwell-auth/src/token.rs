//! HMAC-SHA256 signed session tokens.
//!
//! Token format: `base64url(claims_json).base64url(hmac_sha256(claims_json))`.
//! Claims carry the subject user id, issue time, and expiry as Unix seconds.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, TimeZone, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use uuid::Uuid;

use crate::error::{AuthError, AuthResult};

type HmacSha256 = Hmac<Sha256>;

/// Default session lifetime: 7 days.
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 7 * 24 * 60 * 60;

/// Claims embedded in a session token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenClaims {
    /// Subject: the authenticated user's id.
    pub sub: Uuid,
    /// Issued-at, Unix seconds.
    pub iat: i64,
    /// Expiry, Unix seconds. A token is invalid from this instant on.
    pub exp: i64,
}

impl TokenClaims {
    /// Expiry as a UTC timestamp.
    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// Whether the embedded expiry has passed.
    pub fn is_expired(&self) -> bool {
        self.exp <= Utc::now().timestamp()
    }

    /// Decode claims WITHOUT verifying the signature.
    ///
    /// For client-side expiry checks only. Server-side validation must go
    /// through [`TokenSigner::verify`].
    pub fn decode_unverified(token: &str) -> AuthResult<Self> {
        let payload_b64 = token
            .split('.')
            .next()
            .ok_or_else(|| AuthError::Malformed("empty token".to_string()))?;
        let payload = URL_SAFE_NO_PAD
            .decode(payload_b64)
            .map_err(|e| AuthError::Malformed(e.to_string()))?;
        serde_json::from_slice(&payload).map_err(|e| AuthError::Malformed(e.to_string()))
    }
}

/// Signs and verifies session tokens with a shared secret.
#[derive(Clone)]
pub struct TokenSigner {
    key: Vec<u8>,
}

impl TokenSigner {
    /// Create a signer from the configured secret.
    pub fn new(secret: &str) -> Self {
        Self {
            key: secret.as_bytes().to_vec(),
        }
    }

    /// Issue a token for `user_id` valid for `ttl`.
    pub fn sign(&self, user_id: Uuid, ttl: std::time::Duration) -> AuthResult<String> {
        let now = Utc::now().timestamp();
        let claims = TokenClaims {
            sub: user_id,
            iat: now,
            exp: now + ttl.as_secs() as i64,
        };
        let payload = serde_json::to_vec(&claims).map_err(|e| AuthError::Hash(e.to_string()))?;
        let sig = self.mac(&payload);
        Ok(format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(&payload),
            URL_SAFE_NO_PAD.encode(sig)
        ))
    }

    /// Verify a token's shape, signature, and expiry, returning its claims.
    pub fn verify(&self, token: &str) -> AuthResult<TokenClaims> {
        let (payload_b64, sig_b64) = token
            .split_once('.')
            .ok_or_else(|| AuthError::Malformed("missing signature segment".to_string()))?;

        let payload = URL_SAFE_NO_PAD
            .decode(payload_b64)
            .map_err(|e| AuthError::Malformed(e.to_string()))?;
        let sig = URL_SAFE_NO_PAD
            .decode(sig_b64)
            .map_err(|e| AuthError::Malformed(e.to_string()))?;

        // verify_slice is constant-time
        let mut mac = HmacSha256::new_from_slice(&self.key).expect("HMAC accepts any key length");
        mac.update(&payload);
        mac.verify_slice(&sig).map_err(|_| AuthError::BadSignature)?;

        let claims: TokenClaims =
            serde_json::from_slice(&payload).map_err(|e| AuthError::Malformed(e.to_string()))?;
        if claims.is_expired() {
            return Err(AuthError::Expired);
        }
        Ok(claims)
    }

    fn mac(&self, payload: &[u8]) -> Vec<u8> {
        let mut mac = HmacSha256::new_from_slice(&self.key).expect("HMAC accepts any key length");
        mac.update(payload);
        mac.finalize().into_bytes().to_vec()
    }
}

impl std::fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSigner")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn signer() -> TokenSigner {
        TokenSigner::new("test-secret")
    }

    #[test]
    fn test_sign_verify_round_trip() {
        let user_id = Uuid::new_v4();
        let token = signer().sign(user_id, Duration::from_secs(3600)).unwrap();
        let claims = signer().verify(&token).unwrap();
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.exp, claims.iat + 3600);
    }

    #[test]
    fn test_expired_token_rejected() {
        let token = signer()
            .sign(Uuid::new_v4(), Duration::from_secs(0))
            .unwrap();
        assert!(matches!(signer().verify(&token), Err(AuthError::Expired)));
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let user_id = Uuid::new_v4();
        let token = signer().sign(user_id, Duration::from_secs(3600)).unwrap();

        // Re-encode claims for a different subject over the original signature
        let sig = token.split('.').nth(1).unwrap();
        let forged_claims = TokenClaims {
            sub: Uuid::new_v4(),
            iat: Utc::now().timestamp(),
            exp: Utc::now().timestamp() + 3600,
        };
        let forged_payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&forged_claims).unwrap());
        let forged = format!("{}.{}", forged_payload, sig);

        assert!(matches!(
            signer().verify(&forged),
            Err(AuthError::BadSignature)
        ));
    }

    #[test]
    fn test_wrong_key_rejected() {
        let token = signer()
            .sign(Uuid::new_v4(), Duration::from_secs(3600))
            .unwrap();
        let other = TokenSigner::new("different-secret");
        assert!(matches!(other.verify(&token), Err(AuthError::BadSignature)));
    }

    #[test]
    fn test_malformed_token_rejected() {
        assert!(matches!(
            signer().verify("no-dot-separator"),
            Err(AuthError::Malformed(_))
        ));
        assert!(matches!(
            signer().verify("!!!.???"),
            Err(AuthError::Malformed(_))
        ));
    }

    #[test]
    fn test_decode_unverified_reads_expiry() {
        let user_id = Uuid::new_v4();
        let token = signer().sign(user_id, Duration::from_secs(60)).unwrap();
        let claims = TokenClaims::decode_unverified(&token).unwrap();
        assert_eq!(claims.sub, user_id);
        assert!(!claims.is_expired());
    }
}
