//! Test doubles for the auth and resilience layers
//!
//! - **[`mocks`]**: in-memory [`SecretStore`](crate::auth::SecretStore) and
//!   scripted [`TokenExchanger`](crate::auth::TokenExchanger)
//!
//! Deterministic time comes from [`MockClock`], re-exported here so tests
//! only need one import path.

pub mod mocks;

pub use mocks::{MockSecretStore, MockTokenExchanger};

pub use crate::resilience::{Clock, MockClock, SystemClock};
