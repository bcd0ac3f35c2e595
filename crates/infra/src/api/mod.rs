//! Front API access
//!
//! # Architecture
//!
//! - [`client::ApiClient`] is the facade: pacing, bearer auth, status mapping
//! - [`transport::RetryTransport`] sits below it: circuit breaker plus
//!   429/5xx retries with a replayed body
//! - [`resources`] adds typed operations per Front resource
//! - [`auth::AccessTokenProvider`] decouples the client from token storage

pub mod auth;
pub mod client;
pub mod errors;
pub mod resources;
pub mod transport;

pub use auth::{keyring_token_source, AccessTokenProvider};
pub use client::{validate_path, ApiClient, ApiClientBuilder, ApiClientConfig};
pub use errors::{ApiError, ApiErrorCategory, HttpStatusError};
pub use transport::{HttpSend, RetryTransport, TransportError};
