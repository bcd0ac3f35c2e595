//! Single-flight bearer token source
//!
//! Access tokens are cached in memory; the refresh credential lives in a
//! [`SecretStore`]. One async mutex guards the cache and is held across the
//! whole refresh, so concurrent callers on a cold cache trigger exactly one
//! exchange and all observe its result.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::error::AuthError;
use super::traits::{SecretStore, TokenExchanger};
use super::types::AccessToken;
use crate::resilience::{Clock, SystemClock};

/// Upper bound on one refresh-token exchange
pub const DEFAULT_REFRESH_TIMEOUT: Duration = Duration::from_secs(30);

/// Bearer token provider for one `(client, identity)` pair
pub struct TokenSource<X: TokenExchanger, S: SecretStore> {
    client: String,
    identity: String,
    exchanger: Arc<X>,
    store: Arc<S>,
    cache: Mutex<Option<AccessToken>>,
    refresh_timeout: Duration,
    clock: Arc<dyn Clock>,
}

impl<X: TokenExchanger, S: SecretStore> std::fmt::Debug for TokenSource<X, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSource")
            .field("client", &self.client)
            .field("identity", &self.identity)
            .field("refresh_timeout", &self.refresh_timeout)
            .finish_non_exhaustive()
    }
}

impl<X: TokenExchanger, S: SecretStore> TokenSource<X, S> {
    pub fn new(
        client: impl Into<String>,
        identity: impl Into<String>,
        exchanger: Arc<X>,
        store: Arc<S>,
    ) -> Self {
        Self {
            client: client.into(),
            identity: identity.into(),
            exchanger,
            store,
            cache: Mutex::new(None),
            refresh_timeout: DEFAULT_REFRESH_TIMEOUT,
            clock: Arc::new(SystemClock),
        }
    }

    #[must_use]
    pub fn with_refresh_timeout(mut self, timeout: Duration) -> Self {
        self.refresh_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn client(&self) -> &str {
        &self.client
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Return a valid bearer token, refreshing it when the cache is cold.
    ///
    /// # Errors
    /// - [`AuthError::NotAuthenticated`] / [`AuthError::RefreshFailed`] when
    ///   no usable credential exists or the exchange fails
    /// - [`AuthError::Cancelled`] when `cancel` fires first
    pub async fn token(&self, cancel: &CancellationToken) -> Result<AccessToken, AuthError> {
        let mut cache = tokio::select! {
            guard = self.cache.lock() => guard,
            () = cancel.cancelled() => return Err(AuthError::Cancelled),
        };

        if let Some(token) = cache.as_ref().filter(|t| t.is_valid_at(self.clock.system_time())) {
            return Ok(token.clone());
        }

        let token = self.refresh(cancel).await?;
        *cache = Some(token.clone());
        Ok(token)
    }

    /// Drop the cached access token so the next [`Self::token`] refreshes.
    pub async fn invalidate(&self) {
        *self.cache.lock().await = None;
        debug!(client = %self.client, "Access token invalidated");
    }

    /// Whether a still-valid token is cached
    pub async fn has_cached_token(&self) -> bool {
        self.cache.lock().await.as_ref().is_some_and(|t| t.is_valid_at(self.clock.system_time()))
    }

    /// Runs with the cache lock held by the caller.
    async fn refresh(&self, cancel: &CancellationToken) -> Result<AccessToken, AuthError> {
        let credential = self
            .store
            .get_credential(&self.client, &self.identity)
            .await
            .map_err(|e| AuthError::refresh("read credential", e))?;
        if credential.refresh_token.is_empty() {
            return Err(AuthError::NotAuthenticated);
        }

        let issued_at = self.clock.system_time();
        let exchange = tokio::time::timeout(
            self.refresh_timeout,
            self.exchanger.refresh_access_token(&credential.refresh_token),
        );
        let tokens = tokio::select! {
            result = exchange => match result {
                Ok(Ok(tokens)) => tokens,
                Ok(Err(e)) => return Err(e.into()),
                Err(elapsed) => return Err(AuthError::refresh("token refresh timed out", elapsed)),
            },
            () = cancel.cancelled() => return Err(AuthError::Cancelled),
        };

        let token = AccessToken { bearer: tokens.access_token.clone(), expires_at: tokens.expires_at(issued_at) };
        info!(client = %self.client, expires_in = ?tokens.expires_in, "Access token refreshed");

        if let Some(rotated) = tokens.refresh_token.filter(|r| *r != credential.refresh_token) {
            let mut updated = credential;
            updated.refresh_token = rotated;
            if let Err(e) = self.store.set_credential(&self.client, &self.identity, &updated).await {
                warn!(client = %self.client, error = %e, "Failed to persist rotated refresh token");
            }
        }

        Ok(token)
    }
}
