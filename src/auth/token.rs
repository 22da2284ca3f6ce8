//! Signed access tokens (HMAC-SHA256 JWT).
//!
//! A token is a stateless claim set `{sub, exp}`. Verification checks the
//! signature before any claim is interpreted; a forged token is rejected
//! without its claims ever being read.

use jsonwebtoken::{
    decode, encode, errors::ErrorKind, get_current_timestamp, Algorithm, DecodingKey, EncodingKey,
    Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TokenError {
    #[error("invalid token signature")]
    InvalidSignature,

    #[error("token expired")]
    Expired,

    #[error("failed to sign token: {0}")]
    Signing(String),
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    exp: i64,
}

/// Signs and verifies access tokens with a process-wide shared secret.
///
/// The secret is loaded once at startup; there is no per-request key
/// material.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    default_ttl_seconds: i64,
}

impl TokenCodec {
    #[must_use]
    pub fn new(secret: &str, default_ttl_seconds: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            default_ttl_seconds,
        }
    }

    /// Issue a token for `subject` expiring `ttl_seconds` from now.
    ///
    /// # Errors
    /// Returns `TokenError::Signing` if serialization or signing fails.
    pub fn issue(&self, subject: &str, ttl_seconds: i64) -> Result<String, TokenError> {
        let claims = Claims {
            sub: subject.to_string(),
            exp: get_current_timestamp() as i64 + ttl_seconds,
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Issue a token with the configured default TTL.
    ///
    /// # Errors
    /// Returns `TokenError::Signing` if serialization or signing fails.
    pub fn issue_default(&self, subject: &str) -> Result<String, TokenError> {
        self.issue(subject, self.default_ttl_seconds)
    }

    /// Verify a presented token and return its subject.
    ///
    /// Signature integrity is checked first and unconditionally; only a
    /// well-signed token can fail with `Expired`. Expiry is evaluated with
    /// zero leeway so an already-expired token is rejected immediately.
    ///
    /// # Errors
    /// Returns `TokenError::InvalidSignature` for forged, malformed or
    /// wrongly-signed tokens, `TokenError::Expired` for stale ones.
    pub fn verify(&self, token: &str) -> Result<String, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        let data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::InvalidSignature,
            }
        })?;

        Ok(data.claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> TokenCodec {
        TokenCodec::new("test-secret", 7200)
    }

    #[test]
    fn issue_then_verify_returns_subject() {
        let codec = codec();
        let token = codec.issue("alice", 60).unwrap();
        assert_eq!(codec.verify(&token).unwrap(), "alice");
    }

    #[test]
    fn issue_default_uses_configured_ttl() {
        let codec = codec();
        let token = codec.issue_default("alice").unwrap();
        assert_eq!(codec.verify(&token).unwrap(), "alice");
    }

    #[test]
    fn expired_token_is_expired_not_forged() {
        let codec = codec();
        let token = codec.issue("alice", -1).unwrap();
        assert_eq!(codec.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn flipped_signature_byte_is_rejected() {
        let codec = codec();
        let token = codec.issue("alice", 60).unwrap();

        // Token layout is header.payload.signature; corrupt the first
        // signature byte (the trailing byte only carries padding bits).
        let dot = token.rfind('.').unwrap();
        let mut bytes = token.into_bytes();
        bytes[dot + 1] = if bytes[dot + 1] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(bytes).unwrap();

        assert_eq!(codec.verify(&tampered), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn token_from_other_secret_is_rejected() {
        let other = TokenCodec::new("other-secret", 7200);
        let token = other.issue("alice", 60).unwrap();
        assert_eq!(codec().verify(&token), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn garbage_is_rejected_as_invalid_signature() {
        assert_eq!(
            codec().verify("not-a-token"),
            Err(TokenError::InvalidSignature)
        );
    }
}
