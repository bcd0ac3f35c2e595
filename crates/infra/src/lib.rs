//! # frontcli Infrastructure
//!
//! Impure plumbing between the domain types and the Front API.
//!
//! This crate contains:
//! - The retrying HTTP transport and the API client facade
//! - Typed operations for each Front resource
//! - Configuration and client-credential loading
//! - Tracing subscriber initialisation
//!
//! ## Architecture
//! - Builds on `frontcli-common` for the token source, rate limiter and
//!   circuit breaker
//! - Uses `frontcli-domain` for resource types, IDs and configuration
//! - Contains all "impure" code (HTTP, filesystem, environment)
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use frontcli_infra::api::{keyring_token_source, ApiClient, ApiClientConfig};
//! use frontcli_infra::config;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = config::load()?;
//! let credentials = config::read_client_credentials(&config.auth.client)?;
//! let tokens = keyring_token_source(&config, credentials)?;
//! let client = ApiClient::new(ApiClientConfig::from(&config), Arc::new(tokens))?;
//!
//! let me = client.me().await?;
//! println!("{}", me.email);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod observability;

// Re-export commonly used items
pub use api::{ApiClient, ApiClientConfig, ApiError, ApiErrorCategory};
pub use observability::init_tracing;
