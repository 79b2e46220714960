//! Token cache implementation
//!
//! Hands out the cached token while it is outside the expiry safety margin
//! and refreshes it through a [`TokenProvider`] otherwise.

use super::store::TokenStore;
use super::types::{expiry_safety_margin, CachedToken};
use crate::clock::{Clock, SystemClock};
use crate::config::AppCredentials;
use crate::connector::TokenProvider;
use crate::error::{Error, Result};
use crate::store::LocalStore;
use chrono::Duration;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Persistent, self-refreshing tenant access token
pub struct TokenCache {
    /// Persistence for the singleton token row
    store: TokenStore,
    /// Auth endpoint
    provider: Arc<dyn TokenProvider>,
    /// App id / secret sent to the auth endpoint
    credentials: AppCredentials,
    /// Time source for expiry checks
    clock: Arc<dyn Clock>,
    /// Reserve kept before the server-side expiry
    margin: Duration,
    /// Serializes refreshes so concurrent callers do not race on the row
    refresh_lock: Mutex<()>,
}

impl TokenCache {
    /// Create a token cache backed by the local store
    pub fn new(
        store: LocalStore,
        provider: Arc<dyn TokenProvider>,
        credentials: AppCredentials,
    ) -> Self {
        Self {
            store: TokenStore::new(store),
            provider,
            credentials,
            clock: Arc::new(SystemClock),
            margin: expiry_safety_margin(),
            refresh_lock: Mutex::new(()),
        }
    }

    /// Use a custom clock
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Override the expiry safety margin
    #[must_use]
    pub fn with_safety_margin(mut self, margin: Duration) -> Self {
        self.margin = margin;
        self
    }

    /// Get a valid token, refreshing if necessary
    pub async fn get_valid_token(&self) -> Result<String> {
        if let Some(token) = self.usable_cached()? {
            tracing::debug!("Token fetched from cache, expires at {}", token.expires_at);
            return Ok(token.token);
        }

        let _guard = self.refresh_lock.lock().await;

        // Another caller may have refreshed while we waited
        if let Some(token) = self.usable_cached()? {
            return Ok(token.token);
        }

        let token = self.refresh().await?;
        Ok(token.token)
    }

    /// Fetch a new token from the auth endpoint and persist it
    pub async fn refresh(&self) -> Result<CachedToken> {
        tracing::info!("Requesting new tenant access token");
        let issued = self
            .provider
            .fetch_tenant_token(&self.credentials.id, &self.credentials.secret)
            .await?;

        if issued.token.is_empty() {
            return Err(Error::token_refresh("auth endpoint returned an empty token"));
        }
        if issued.ttl_seconds <= 0 {
            return Err(Error::token_refresh(format!(
                "auth endpoint returned a non-positive lifetime: {}s",
                issued.ttl_seconds
            )));
        }

        let token = CachedToken::from_issued(issued, self.clock.now())?;
        self.store.save(&token)?;
        tracing::info!("Tenant access token refreshed, expires at {}", token.expires_at);

        Ok(token)
    }

    /// The cached token as stored, usable or not
    pub fn cached(&self) -> Result<Option<CachedToken>> {
        self.store.load()
    }

    /// The cached token if it is still outside the safety margin
    fn usable_cached(&self) -> Result<Option<CachedToken>> {
        let now = self.clock.now();
        Ok(self
            .store
            .load()?
            .filter(|token| token.is_usable(now, self.margin)))
    }
}

impl std::fmt::Debug for TokenCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCache")
            .field("app_id", &self.credentials.id)
            .field("margin", &self.margin)
            .finish_non_exhaustive()
    }
}
