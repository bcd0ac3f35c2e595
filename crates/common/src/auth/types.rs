//! OAuth credential and token types
//!
//! Access tokens live in memory only. The long-lived refresh credential is
//! what the secret store persists.

use std::fmt;
use std::time::{Duration, SystemTime};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::SecretStoreError;

pub use frontcli_domain::constants::DEFAULT_CLIENT_NAME;

/// Longest lifetime honoured from a token response's `expires_in`
pub const MAX_TOKEN_LIFETIME: Duration = Duration::from_secs(10 * 365 * 24 * 60 * 60);

/// Durable refresh credential for one `(client, identity)` pair.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub client: String,
    pub identity: String,
    pub refresh_token: String,
    pub scopes: Vec<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Credential {
    pub fn new(client: impl Into<String>, identity: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            client: client.into(),
            identity: identity.into(),
            refresh_token: refresh_token.into(),
            scopes: Vec::new(),
            created_at: None,
        }
    }

    #[must_use]
    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("client", &self.client)
            .field("identity", &self.identity)
            .field("refresh_token", &"<redacted>")
            .field("scopes", &self.scopes)
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// JSON payload persisted in the secret store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCredential {
    pub refresh_token: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scopes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl From<&Credential> for StoredCredential {
    fn from(credential: &Credential) -> Self {
        Self {
            refresh_token: credential.refresh_token.clone(),
            scopes: credential.scopes.clone(),
            created_at: credential.created_at,
        }
    }
}

impl StoredCredential {
    pub fn into_credential(self, client: &str, identity: &str) -> Credential {
        Credential {
            client: client.to_string(),
            identity: identity.to_string(),
            refresh_token: self.refresh_token,
            scopes: self.scopes,
            created_at: self.created_at,
        }
    }
}

/// Cached bearer token and its expiry
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub bearer: String,
    pub expires_at: SystemTime,
}

impl AccessToken {
    /// Usable iff non-empty and `now` is strictly before expiry.
    pub fn is_valid_at(&self, now: SystemTime) -> bool {
        !self.bearer.is_empty() && now < self.expires_at
    }

    /// `Authorization` header value
    pub fn header_value(&self) -> String {
        format!("Bearer {}", self.bearer)
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("bearer", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Result of a refresh-token exchange
#[derive(Clone, PartialEq, Eq)]
pub struct TokenSet {
    pub access_token: String,
    /// Rotated refresh token, if the server issued one
    pub refresh_token: Option<String>,
    pub expires_in: Option<u64>,
    pub scope: Option<String>,
}

impl TokenSet {
    /// Absolute expiry relative to `issued_at`.
    ///
    /// A missing lifetime yields `issued_at` itself, so the token is never
    /// served from cache. Lifetimes are capped at [`MAX_TOKEN_LIFETIME`].
    pub fn expires_at(&self, issued_at: SystemTime) -> SystemTime {
        let lifetime = Duration::from_secs(self.expires_in.unwrap_or(0)).min(MAX_TOKEN_LIFETIME);
        issued_at.checked_add(lifetime).unwrap_or(issued_at)
    }
}

impl fmt::Debug for TokenSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenSet")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .field("expires_in", &self.expires_in)
            .field("scope", &self.scope)
            .finish()
    }
}

/// OAuth token endpoint response (RFC 6749 section 5.1)
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub scope: Option<String>,
}

impl From<TokenResponse> for TokenSet {
    fn from(response: TokenResponse) -> Self {
        Self {
            access_token: response.access_token,
            refresh_token: response.refresh_token.filter(|t| !t.is_empty()),
            expires_in: response.expires_in,
            scope: response.scope,
        }
    }
}

/// OAuth error body (`{"error": "...", "error_description": "..."}`)
#[derive(Debug, Clone, Deserialize)]
pub struct OAuthErrorBody {
    pub error: String,
    #[serde(default)]
    pub error_description: Option<String>,
}

impl fmt::Display for OAuthErrorBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.error_description {
            Some(desc) => write!(f, "{}: {desc}", self.error),
            None => write!(f, "{}", self.error),
        }
    }
}

/// OAuth application credentials registered with Front
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_uri: Option<String>,
}

impl fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("redirect_uri", &self.redirect_uri)
            .finish()
    }
}

/// Lowercase and validate a client name; blank names map to `default`.
///
/// # Errors
/// Returns [`SecretStoreError::InvalidClientName`] for characters outside
/// `[a-z0-9._-]`.
pub fn normalize_client_name(raw: &str) -> Result<String, SecretStoreError> {
    let name = raw.trim().to_lowercase();
    if name.is_empty() {
        return Ok(DEFAULT_CLIENT_NAME.to_string());
    }

    let valid = name.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '-' | '_' | '.'));
    if !valid {
        return Err(SecretStoreError::InvalidClientName(raw.to_string()));
    }
    Ok(name)
}

/// Trim and lowercase an account identity (email address).
pub fn normalize_identity(raw: &str) -> String {
    raw.trim().to_lowercase()
}
