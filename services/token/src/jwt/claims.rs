//! Claims embedded in issued tokens.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Lifetime of every issued token. Fixed policy, not configurable per call.
pub const TOKEN_LIFETIME: Duration = Duration::from_secs(24 * 60 * 60);

/// Claims signed into every token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Caller-supplied payload.
    pub payload: String,
    /// Issued-at, unix seconds.
    pub iat: i64,
    /// Expires-at, unix seconds.
    pub exp: i64,
}

impl Claims {
    /// Builds claims issued at `issued_at` that expire [`TOKEN_LIFETIME`] later.
    ///
    /// Returns `None` if the expiry does not fit in an `i64`.
    pub fn new(payload: impl Into<String>, issued_at: i64) -> Option<Self> {
        let lifetime = i64::try_from(TOKEN_LIFETIME.as_secs()).ok()?;
        Some(Claims {
            payload: payload.into(),
            iat: issued_at,
            exp: issued_at.checked_add(lifetime)?,
        })
    }

    /// Builds claims with explicit timestamps.
    pub fn with_times(payload: impl Into<String>, iat: i64, exp: i64) -> Self {
        Claims {
            payload: payload.into(),
            iat,
            exp,
        }
    }

    /// Claims carrying raw payload bytes, lossily converted to UTF-8.
    pub fn from_payload_bytes(payload: &[u8], issued_at: i64) -> Option<Self> {
        Self::new(String::from_utf8_lossy(payload), issued_at)
    }

    /// True once `now` is past the expiry. A token is still valid at `now == exp`.
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.exp < now
    }
}
