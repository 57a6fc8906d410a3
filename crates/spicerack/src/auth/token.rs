//! Session token issuing and verification (HS256 JWT).

use std::fmt;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;
use tracing::debug;

use super::claims::Claims;
use crate::user::UserId;

/// Why a token was rejected.
///
/// Checks run in declaration order; the first failing check wins.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum VerificationError {
    #[error("token is malformed")]
    Malformed,

    #[error("token signature is invalid")]
    InvalidSignature,

    #[error("token has expired")]
    Expired,
}

/// Mints signed, time-bounded tokens.
#[derive(Clone)]
pub struct TokenIssuer {
    key: Arc<EncodingKey>,
    ttl: Duration,
}

impl TokenIssuer {
    /// Create an issuer signing with `secret`; every token lives for `ttl`.
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            key: Arc::new(EncodingKey::from_secret(secret)),
            ttl,
        }
    }

    /// Token lifetime.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token for `user_id`, valid from now.
    pub fn issue(&self, user_id: &UserId) -> Result<String> {
        self.issue_at(user_id, Utc::now())
    }

    /// Issue a token for `user_id` as if the current time were `now`.
    pub fn issue_at(&self, user_id: &UserId, now: DateTime<Utc>) -> Result<String> {
        let claims = Claims::new(user_id, now, self.ttl);
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.key)
            .context("Failed to encode token")
    }
}

impl fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("key", &"<redacted>")
            .field("ttl", &self.ttl)
            .finish()
    }
}

/// Validates token signature and expiry.
#[derive(Clone)]
pub struct TokenVerifier {
    key: Arc<DecodingKey>,
    validation: Arc<Validation>,
}

impl TokenVerifier {
    /// Create a verifier for tokens signed with `secret`.
    pub fn new(secret: &[u8]) -> Self {
        // Only the signature is checked by the library; expiry is checked
        // here against an explicit clock.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.leeway = 0;
        validation.required_spec_claims.clear();

        Self {
            key: Arc::new(DecodingKey::from_secret(secret)),
            validation: Arc::new(validation),
        }
    }

    /// Verify a token against the current time.
    pub fn verify(&self, token: &str) -> Result<UserId, VerificationError> {
        self.verify_at(token, Utc::now())
    }

    /// Verify a token as if the current time were `now`.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<UserId, VerificationError> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.key, &self.validation)
            .map_err(classify)?;

        let claims = data.claims;
        if claims.sub.is_empty() {
            return Err(VerificationError::Malformed);
        }
        if claims.is_expired_at(now) {
            return Err(VerificationError::Expired);
        }

        Ok(claims.user_id())
    }
}

impl fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("key", &"<redacted>")
            .finish()
    }
}

fn classify(err: jsonwebtoken::errors::Error) -> VerificationError {
    let reason = match err.kind() {
        ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
            VerificationError::InvalidSignature
        }
        _ => VerificationError::Malformed,
    };
    debug!(error = %err, ?reason, "Token rejected");
    reason
}
