//! Token types

use crate::error::{Error, Result};
use chrono::{DateTime, Datelike, Duration, Utc};

/// Seconds before its real expiry that a cached token stops being handed out
pub const EXPIRY_SAFETY_MARGIN_SECS: i64 = 28 * 60;

/// Last year a `TIMESTAMP` column accepts in `YYYY-MM-DD` form
const MAX_EXPIRY_YEAR: i32 = 9999;

/// [`EXPIRY_SAFETY_MARGIN_SECS`] as a duration
pub fn expiry_safety_margin() -> Duration {
    Duration::seconds(EXPIRY_SAFETY_MARGIN_SECS)
}

/// A token as returned by the auth endpoint
#[derive(Clone, PartialEq, Eq)]
pub struct IssuedToken {
    /// Bearer token
    pub token: String,
    /// Lifetime in seconds, counted from the moment of issue
    pub ttl_seconds: i64,
}

impl IssuedToken {
    /// Create an issued token
    pub fn new(token: impl Into<String>, ttl_seconds: i64) -> Self {
        Self {
            token: token.into(),
            ttl_seconds,
        }
    }
}

impl std::fmt::Debug for IssuedToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IssuedToken")
            .field("token", &"****")
            .field("ttl_seconds", &self.ttl_seconds)
            .finish()
    }
}

/// Cached token with absolute expiration
#[derive(Clone, PartialEq, Eq)]
pub struct CachedToken {
    /// The bearer token
    pub token: String,
    /// When the token expires on the server
    pub expires_at: DateTime<Utc>,
}

impl CachedToken {
    /// Create a new cached token
    pub fn new(token: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            token: token.into(),
            expires_at,
        }
    }

    /// Anchor an issued token's lifetime at `now`
    ///
    /// Fails when the expiry falls outside what the token table can store.
    pub fn from_issued(issued: IssuedToken, now: DateTime<Utc>) -> Result<Self> {
        let expires_at = Duration::try_seconds(issued.ttl_seconds)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .filter(|at| at.year() <= MAX_EXPIRY_YEAR)
            .ok_or_else(|| {
                Error::token_refresh(format!(
                    "lifetime out of range: {}s",
                    issued.ttl_seconds
                ))
            })?;

        Ok(Self {
            token: issued.token,
            expires_at,
        })
    }

    /// Check if the token may still be used at `now`, keeping `margin` in reserve
    pub fn is_usable(&self, now: DateTime<Utc>, margin: Duration) -> bool {
        now < self.expires_at - margin
    }
}

impl std::fmt::Debug for CachedToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedToken")
            .field("token", &"****")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
