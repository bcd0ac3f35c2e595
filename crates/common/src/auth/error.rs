//! Authentication error types

use thiserror::Error;

use super::client::OAuthClientError;

/// Boxed cause carried by refresh failures
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Secret store failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SecretStoreError {
    #[error("no stored credential for {key}")]
    NotFound { key: String },

    #[error("missing account identity")]
    MissingIdentity,

    #[error("missing refresh token")]
    MissingRefreshToken,

    #[error("invalid client name {0:?}")]
    InvalidClientName(String),

    #[error("stored credential is malformed: {0}")]
    Malformed(String),

    #[error("secret store unavailable: {0}")]
    Backend(String),
}

/// Failures obtaining a bearer token.
///
/// Every refresh failure is terminal for the current request; the API client
/// never retries authentication beyond a single re-auth after a 401.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No usable refresh credential is stored
    #[error("not authenticated")]
    NotAuthenticated,

    /// Reading, exchanging or parsing the refresh credential failed
    #[error("not authenticated: {stage}: {source}")]
    RefreshFailed {
        stage: &'static str,
        #[source]
        source: BoxError,
    },

    /// The caller cancelled while a refresh was pending
    #[error("token refresh cancelled")]
    Cancelled,
}

impl AuthError {
    pub(crate) fn refresh(stage: &'static str, source: impl Into<BoxError>) -> Self {
        Self::RefreshFailed { stage, source: source.into() }
    }

    /// Whether the user has to log in again to recover.
    pub fn is_not_authenticated(&self) -> bool {
        matches!(self, Self::NotAuthenticated | Self::RefreshFailed { .. })
    }
}

impl From<OAuthClientError> for AuthError {
    fn from(err: OAuthClientError) -> Self {
        Self::refresh("refresh token", err)
    }
}
