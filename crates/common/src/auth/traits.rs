//! Seams for the token source's external collaborators
//!
//! Both the secret backend and the OAuth server are abstracted so the token
//! source can be driven entirely by in-memory mocks in tests.

use async_trait::async_trait;

use super::client::OAuthClientError;
use super::error::SecretStoreError;
use super::types::{Credential, TokenSet};

/// Persistent storage for refresh credentials
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Load the credential for `(client, identity)`.
    ///
    /// # Errors
    /// Returns [`SecretStoreError::NotFound`] when nothing is stored.
    async fn get_credential(&self, client: &str, identity: &str) -> Result<Credential, SecretStoreError>;

    /// Persist `credential` under `(client, identity)`, replacing any previous value.
    ///
    /// # Errors
    /// Returns an error if the identity or refresh token is missing or the
    /// backend rejects the write.
    async fn set_credential(
        &self,
        client: &str,
        identity: &str,
        credential: &Credential,
    ) -> Result<(), SecretStoreError>;

    /// Remove the credential; deleting a missing entry is not an error.
    ///
    /// # Errors
    /// Returns an error if the backend rejects the delete.
    async fn delete_credential(&self, client: &str, identity: &str) -> Result<(), SecretStoreError>;
}

/// Exchanges a refresh token for a fresh access token
#[async_trait]
pub trait TokenExchanger: Send + Sync {
    /// # Errors
    /// Returns an error if the request fails or the server rejects the token.
    async fn refresh_access_token(&self, refresh_token: &str) -> Result<TokenSet, OAuthClientError>;
}
