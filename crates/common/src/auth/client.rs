//! OAuth 2.0 refresh-token client
//!
//! Posts `grant_type=refresh_token` to the token endpoint with the client's
//! id and secret as form parameters.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tracing::debug;

use super::traits::TokenExchanger;
use super::types::{ClientCredentials, OAuthErrorBody, TokenResponse, TokenSet};

/// Front's OAuth token endpoint
pub const FRONT_TOKEN_URL: &str = "https://app.frontapp.com/oauth/token";

/// Error type for OAuth client operations
#[derive(Debug, Error)]
pub enum OAuthClientError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("OAuth error ({status}): {body}")]
    OAuthError { status: u16, body: String },

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("No refresh token available")]
    NoRefreshToken,

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Refresh-token client for one registered OAuth application
#[derive(Debug, Clone)]
pub struct OAuthClient {
    credentials: ClientCredentials,
    token_url: String,
    http: Client,
}

impl OAuthClient {
    /// Client against Front's token endpoint with a 30 second timeout.
    ///
    /// # Errors
    /// Returns [`OAuthClientError::ConfigError`] if the HTTP client cannot be built.
    pub fn new(credentials: ClientCredentials) -> Result<Self, OAuthClientError> {
        Self::with_token_url(credentials, FRONT_TOKEN_URL, Duration::from_secs(30))
    }

    /// # Errors
    /// Returns [`OAuthClientError::ConfigError`] if the HTTP client cannot be built.
    pub fn with_token_url(
        credentials: ClientCredentials,
        token_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, OAuthClientError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| OAuthClientError::ConfigError(e.to_string()))?;
        Ok(Self { credentials, token_url: token_url.into(), http })
    }

    pub fn token_url(&self) -> &str {
        &self.token_url
    }

    /// Exchange `refresh_token` for a new access token.
    ///
    /// # Errors
    /// Returns an error for an empty token, transport failures, non-2xx
    /// responses and unparseable bodies.
    pub async fn refresh_access_token(&self, refresh_token: &str) -> Result<TokenSet, OAuthClientError> {
        if refresh_token.is_empty() {
            return Err(OAuthClientError::NoRefreshToken);
        }
        if self.credentials.client_id.is_empty() {
            return Err(OAuthClientError::ConfigError("missing client_id".to_string()));
        }

        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
        ];

        debug!(token_url = %self.token_url, "Refreshing OAuth access token");
        let response = self.http.post(&self.token_url).form(&params).send().await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let body = serde_json::from_str::<OAuthErrorBody>(&text).map_or(text, |e| e.to_string());
            return Err(OAuthClientError::OAuthError { status: status.as_u16(), body });
        }

        let token: TokenResponse =
            response.json().await.map_err(|e| OAuthClientError::ParseError(e.to_string()))?;
        if token.access_token.is_empty() {
            return Err(OAuthClientError::ParseError("empty access_token".to_string()));
        }
        Ok(token.into())
    }
}

#[async_trait]
impl TokenExchanger for OAuthClient {
    async fn refresh_access_token(&self, refresh_token: &str) -> Result<TokenSet, OAuthClientError> {
        OAuthClient::refresh_access_token(self, refresh_token).await
    }
}
