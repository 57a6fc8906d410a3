//! JWT claims.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::user::UserId;

/// JWT claims structure.
///
/// The claim set is fixed: subject, issued-at and expiry. Nothing else is
/// read from or written to a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID).
    pub sub: String,

    /// Issued at (as Unix timestamp).
    pub iat: i64,

    /// Expiration time (as Unix timestamp).
    pub exp: i64,
}

impl Claims {
    /// Build the claims for `user_id`, valid from `now` for `ttl`.
    pub fn new(user_id: &UserId, now: DateTime<Utc>, ttl: Duration) -> Self {
        let iat = now.timestamp();
        Self {
            sub: user_id.to_string(),
            iat,
            exp: iat.saturating_add(ttl.num_seconds()),
        }
    }

    /// Whether the token has expired at `now`. Expiry is exclusive: a token
    /// is dead at the exact `exp` second.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }

    /// The subject as a typed user ID.
    pub fn user_id(&self) -> UserId {
        UserId::from(self.sub.clone())
    }
}
