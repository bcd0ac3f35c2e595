//! OAuth refresh-token authentication for the Front API
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │   TokenSource   │  Cached bearer token, single-flight refresh
//! └────────┬────────┘
//!          │
//!          ├──► TokenExchanger  (OAuthClient: refresh_token grant)
//!          │
//!          └──► SecretStore     (KeyringStore: refresh credentials)
//! ```
//!
//! # Usage Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use frontcli_common::auth::{ClientCredentials, KeyringStore, OAuthClient, TokenSource};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let credentials = ClientCredentials {
//!         client_id: "client_id".to_string(),
//!         client_secret: "client_secret".to_string(),
//!         redirect_uri: None,
//!     };
//!     let exchanger = Arc::new(OAuthClient::new(credentials)?);
//!     let store = Arc::new(KeyringStore::default());
//!
//!     let source = TokenSource::new("default", "agent@example.com", exchanger, store);
//!     let token = source.token(&CancellationToken::new()).await?;
//!     println!("Authorization: {}", token.header_value());
//!     Ok(())
//! }
//! ```
//!
//! # Module Organization
//!
//! - **[`types`]**: credentials, access tokens and token responses
//! - **[`client`]**: OAuth HTTP client for the refresh-token grant
//! - **[`keychain`]**: platform keychain storage for refresh credentials
//! - **[`token_source`]**: in-memory cache with single-flight refresh

pub mod client;
pub mod error;
pub mod keychain;
pub mod token_source;
pub mod traits;
pub mod types;

pub use client::{OAuthClient, OAuthClientError, FRONT_TOKEN_URL};
pub use error::{AuthError, BoxError, SecretStoreError};
pub use keychain::{parse_token_key, token_key, KeyringStore, DEFAULT_SERVICE};
pub use token_source::{TokenSource, DEFAULT_REFRESH_TIMEOUT};
pub use traits::{SecretStore, TokenExchanger};
pub use types::{
    normalize_client_name, normalize_identity, AccessToken, ClientCredentials, Credential,
    TokenSet, DEFAULT_CLIENT_NAME, MAX_TOKEN_LIFETIME,
};
