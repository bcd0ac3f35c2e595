//! Mock implementations of the auth seams
//!
//! Both mocks keep their state behind `Arc`s so clones observe the same calls.

#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::auth::{
    token_key, Credential, OAuthClientError, SecretStore, SecretStoreError, TokenExchanger,
    TokenSet,
};

/// In-memory [`SecretStore`]
///
/// # Examples
///
/// ```
/// use frontcli_common::auth::Credential;
/// use frontcli_common::testing::mocks::MockSecretStore;
///
/// let store = MockSecretStore::new();
/// store.insert(Credential::new("default", "a@example.com", "r1"));
/// assert!(store.get("default", "a@example.com").is_some());
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockSecretStore {
    credentials: Arc<Mutex<HashMap<String, Credential>>>,
    fail_writes: Arc<AtomicBool>,
    writes: Arc<AtomicUsize>,
}

impl MockSecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a credential under its own client and identity.
    pub fn insert(&self, credential: Credential) {
        let key = token_key(&credential.client, &credential.identity);
        self.credentials.lock().insert(key, credential);
    }

    #[must_use]
    pub fn get(&self, client: &str, identity: &str) -> Option<Credential> {
        self.credentials.lock().get(&token_key(client, identity)).cloned()
    }

    /// Make every subsequent write fail with a backend error.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful writes
    #[must_use]
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SecretStore for MockSecretStore {
    async fn get_credential(&self, client: &str, identity: &str) -> Result<Credential, SecretStoreError> {
        let key = token_key(client, identity);
        self.credentials.lock().get(&key).cloned().ok_or(SecretStoreError::NotFound { key })
    }

    async fn set_credential(
        &self,
        client: &str,
        identity: &str,
        credential: &Credential,
    ) -> Result<(), SecretStoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(SecretStoreError::Backend("mock write failure".to_string()));
        }
        if credential.refresh_token.is_empty() {
            return Err(SecretStoreError::MissingRefreshToken);
        }
        self.credentials.lock().insert(token_key(client, identity), credential.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn delete_credential(&self, client: &str, identity: &str) -> Result<(), SecretStoreError> {
        self.credentials.lock().remove(&token_key(client, identity));
        Ok(())
    }
}

type Outcome = Result<TokenSet, String>;

/// Scripted [`TokenExchanger`] that counts calls
///
/// Queued outcomes are consumed first; afterwards the fallback outcome is
/// returned on every call.
#[derive(Debug, Clone)]
pub struct MockTokenExchanger {
    queued: Arc<Mutex<VecDeque<Outcome>>>,
    fallback: Outcome,
    delay: Option<Duration>,
    calls: Arc<AtomicUsize>,
    seen: Arc<Mutex<Vec<String>>>,
}

impl MockTokenExchanger {
    fn with_fallback(fallback: Outcome) -> Self {
        Self {
            queued: Arc::new(Mutex::new(VecDeque::new())),
            fallback,
            delay: None,
            calls: Arc::new(AtomicUsize::new(0)),
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Always succeed with `tokens`.
    pub fn returning(tokens: TokenSet) -> Self {
        Self::with_fallback(Ok(tokens))
    }

    /// Always fail as if the server rejected the grant with `error`.
    pub fn failing(error: impl Into<String>) -> Self {
        Self::with_fallback(Err(error.into()))
    }

    /// Sleep before answering; honours tokio's paused clock.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Queue a one-off outcome ahead of the fallback.
    pub fn push(&self, outcome: Result<TokenSet, String>) {
        self.queued.lock().push_back(outcome);
    }

    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Refresh tokens passed in, in call order
    #[must_use]
    pub fn seen_refresh_tokens(&self) -> Vec<String> {
        self.seen.lock().clone()
    }
}

#[async_trait]
impl TokenExchanger for MockTokenExchanger {
    async fn refresh_access_token(&self, refresh_token: &str) -> Result<TokenSet, OAuthClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().push(refresh_token.to_string());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let outcome = self.queued.lock().pop_front().unwrap_or_else(|| self.fallback.clone());
        outcome.map_err(|body| OAuthClientError::OAuthError { status: 400, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(access: &str) -> TokenSet {
        TokenSet { access_token: access.to_string(), refresh_token: None, expires_in: Some(60), scope: None }
    }

    #[tokio::test]
    async fn test_secret_store_round_trip_and_write_failures() {
        let store = MockSecretStore::new();
        let credential = Credential::new("default", "a@example.com", "r1");

        store.set_credential("default", "a@example.com", &credential).await.unwrap();
        assert_eq!(store.get_credential("default", "a@example.com").await.unwrap().refresh_token, "r1");
        assert_eq!(store.writes(), 1);

        store.fail_writes(true);
        assert!(store.set_credential("default", "a@example.com", &credential).await.is_err());
        assert_eq!(store.writes(), 1);

        store.delete_credential("default", "a@example.com").await.unwrap();
        assert!(matches!(
            store.get_credential("default", "a@example.com").await,
            Err(SecretStoreError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_exchanger_consumes_queue_before_fallback() {
        let exchanger = MockTokenExchanger::returning(tokens("fallback"));
        exchanger.push(Err("invalid_grant".to_string()));
        exchanger.push(Ok(tokens("queued")));

        assert!(exchanger.refresh_access_token("r1").await.is_err());
        assert_eq!(exchanger.refresh_access_token("r1").await.unwrap().access_token, "queued");
        assert_eq!(exchanger.refresh_access_token("r1").await.unwrap().access_token, "fallback");
        assert_eq!(exchanger.calls(), 3);
    }
}
