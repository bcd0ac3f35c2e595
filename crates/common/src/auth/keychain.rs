//! Refresh-credential storage in the platform keychain
//!
//! Each credential is one keyring entry under the `frontcli` service. The
//! entry's user key is `token:<client>:<identity>` and its secret is a small
//! JSON document (`refresh_token`, `scopes`, `created_at`).

use async_trait::async_trait;
use chrono::Utc;
use keyring::Entry;
use tracing::debug;

use super::error::SecretStoreError;
use super::traits::SecretStore;
use super::types::{
    normalize_client_name, normalize_identity, Credential, StoredCredential, DEFAULT_CLIENT_NAME,
};

pub use frontcli_domain::constants::KEYRING_SERVICE as DEFAULT_SERVICE;

const TOKEN_KEY_PREFIX: &str = "token:";

/// Keyring key for a normalised client and identity
pub fn token_key(client: &str, identity: &str) -> String {
    format!("{TOKEN_KEY_PREFIX}{client}:{identity}")
}

/// Split a keyring key back into `(client, identity)`.
///
/// Legacy keys without a client segment belong to the default client.
pub fn parse_token_key(key: &str) -> Option<(String, String)> {
    let rest = key.strip_prefix(TOKEN_KEY_PREFIX)?;
    if rest.trim().is_empty() {
        return None;
    }

    match rest.split_once(':') {
        None => Some((DEFAULT_CLIENT_NAME.to_string(), rest.to_string())),
        Some((client, identity)) if !client.trim().is_empty() && !identity.trim().is_empty() => {
            Some((client.to_string(), identity.to_string()))
        }
        Some(_) => None,
    }
}

/// Resolve the normalised key for a lookup, rejecting blank identities.
fn resolve_key(client: &str, identity: &str) -> Result<(String, String, String), SecretStoreError> {
    let identity = normalize_identity(identity);
    if identity.is_empty() {
        return Err(SecretStoreError::MissingIdentity);
    }
    let client = normalize_client_name(client)?;
    let key = token_key(&client, &identity);
    Ok((client, identity, key))
}

/// [`SecretStore`] backed by the `keyring` crate
#[derive(Debug, Clone)]
pub struct KeyringStore {
    service: String,
}

impl Default for KeyringStore {
    fn default() -> Self {
        Self::new(DEFAULT_SERVICE)
    }
}

impl KeyringStore {
    pub fn new(service: impl Into<String>) -> Self {
        Self { service: service.into() }
    }

    /// Run one keyring operation on the blocking pool.
    ///
    /// Platform keychains may block on IPC or an unlock prompt.
    async fn with_entry<T, F>(&self, key: &str, op: F) -> Result<keyring::Result<T>, SecretStoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Entry) -> keyring::Result<T> + Send + 'static,
    {
        let entry = Entry::new(&self.service, key).map_err(|e| SecretStoreError::Backend(e.to_string()))?;
        run_blocking(move || op(&entry)).await
    }
}

async fn run_blocking<T, F>(op: F) -> Result<T, SecretStoreError>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    tokio::task::spawn_blocking(op)
        .await
        .map_err(|e| SecretStoreError::Backend(format!("keyring task failed: {e}")))
}

#[async_trait]
impl SecretStore for KeyringStore {
    async fn get_credential(&self, client: &str, identity: &str) -> Result<Credential, SecretStoreError> {
        let (client, identity, key) = resolve_key(client, identity)?;
        debug!(service = %self.service, key = %key, "Reading credential from keyring");

        let secret = self.with_entry(&key, Entry::get_password).await?.map_err(|e| match e {
            keyring::Error::NoEntry => SecretStoreError::NotFound { key: key.clone() },
            other => SecretStoreError::Backend(other.to_string()),
        })?;

        let stored: StoredCredential =
            serde_json::from_str(&secret).map_err(|e| SecretStoreError::Malformed(e.to_string()))?;
        Ok(stored.into_credential(&client, &identity))
    }

    async fn set_credential(
        &self,
        client: &str,
        identity: &str,
        credential: &Credential,
    ) -> Result<(), SecretStoreError> {
        let (_, _, key) = resolve_key(client, identity)?;
        if credential.refresh_token.is_empty() {
            return Err(SecretStoreError::MissingRefreshToken);
        }

        let mut stored = StoredCredential::from(credential);
        stored.created_at.get_or_insert_with(Utc::now);
        let payload = serde_json::to_string(&stored).map_err(|e| SecretStoreError::Malformed(e.to_string()))?;

        debug!(service = %self.service, key = %key, "Writing credential to keyring");
        self.with_entry(&key, move |entry| entry.set_password(&payload))
            .await?
            .map_err(|e| SecretStoreError::Backend(e.to_string()))
    }

    async fn delete_credential(&self, client: &str, identity: &str) -> Result<(), SecretStoreError> {
        let (_, _, key) = resolve_key(client, identity)?;
        match self.with_entry(&key, Entry::delete_credential).await? {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(SecretStoreError::Backend(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_key_format() {
        assert_eq!(token_key("default", "a@example.com"), "token:default:a@example.com");
    }

    #[test]
    fn test_parse_token_key() {
        assert_eq!(
            parse_token_key("token:work:a@example.com"),
            Some(("work".to_string(), "a@example.com".to_string()))
        );
        assert_eq!(
            parse_token_key("token:a@example.com"),
            Some(("default".to_string(), "a@example.com".to_string()))
        );
        assert_eq!(parse_token_key("token:"), None);
        assert_eq!(parse_token_key("token::a@example.com"), None);
        assert_eq!(parse_token_key("other:work:a"), None);
    }

    #[test]
    fn test_resolve_key_normalises_inputs() {
        let (client, identity, key) = resolve_key(" Work ", " A@Example.com ").unwrap();
        assert_eq!(client, "work");
        assert_eq!(identity, "a@example.com");
        assert_eq!(key, "token:work:a@example.com");

        assert_eq!(resolve_key("", "  "), Err(SecretStoreError::MissingIdentity));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_keyring_work_runs_off_the_runtime_thread() {
        let runtime_thread = std::thread::current().id();
        let worker_thread = run_blocking(|| std::thread::current().id()).await.unwrap();
        assert_ne!(worker_thread, runtime_thread);
    }

    #[tokio::test]
    async fn test_write_rejects_empty_refresh_token() {
        let store = KeyringStore::default();
        let credential = Credential::new("default", "a@example.com", "");
        let err = store.set_credential("default", "a@example.com", &credential).await.unwrap_err();
        assert_eq!(err, SecretStoreError::MissingRefreshToken);
    }
}
