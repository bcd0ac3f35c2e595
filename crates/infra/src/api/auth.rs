//! Bearer-token plumbing for the API client
//!
//! The client only needs "give me a token" and "that token was rejected";
//! [`AccessTokenProvider`] is that seam, implemented for the common
//! [`TokenSource`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use frontcli_common::auth::{
    AuthError, ClientCredentials, KeyringStore, OAuthClient, SecretStore, TokenExchanger, TokenSource,
};
use frontcli_domain::Config;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::errors::ApiError;

/// Trait for providing access tokens
///
/// This trait allows dependency injection and testing with mock providers.
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    /// Get a valid bearer token, refreshing it if needed.
    async fn access_token(&self, cancel: &CancellationToken) -> Result<String, AuthError>;

    /// Forget the cached token after the server rejected it.
    async fn invalidate(&self);
}

#[async_trait]
impl<X, S> AccessTokenProvider for TokenSource<X, S>
where
    X: TokenExchanger + 'static,
    S: SecretStore + 'static,
{
    async fn access_token(&self, cancel: &CancellationToken) -> Result<String, AuthError> {
        self.token(cancel).await.map(|token| token.bearer)
    }

    async fn invalidate(&self) {
        TokenSource::invalidate(self).await;
    }
}

/// Token source for the configured client and account, backed by the keyring.
///
/// # Errors
///
/// Returns [`ApiError::Config`] when no account is configured or the OAuth
/// HTTP client cannot be built.
pub fn keyring_token_source(
    config: &Config,
    credentials: ClientCredentials,
) -> Result<TokenSource<OAuthClient, KeyringStore>, ApiError> {
    let account = config
        .auth
        .account
        .as_deref()
        .filter(|a| !a.trim().is_empty())
        .ok_or_else(|| ApiError::Config("no account configured; set FRONTCLI_ACCOUNT".to_string()))?;

    let refresh_timeout = Duration::from_secs(config.auth.refresh_timeout_secs);
    let exchanger = OAuthClient::with_token_url(credentials, &config.auth.token_url, refresh_timeout)
        .map_err(|e| ApiError::Config(format!("Failed to build OAuth client: {e}")))?;

    debug!(client = %config.auth.client, account = %account, "Using keyring token source");
    Ok(TokenSource::new(&config.auth.client, account, Arc::new(exchanger), Arc::new(KeyringStore::default()))
        .with_refresh_timeout(refresh_timeout))
}
