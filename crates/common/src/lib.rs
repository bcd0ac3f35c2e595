//! Shared infrastructure for the frontcli crates.
//!
//! # Feature Tiers
//!
//! Enable cargo features to opt into the tiers you need:
//! - `runtime`: async resilience primitives (circuit breaker, rate limiter,
//!   backoff)
//! - `platform`: OAuth refresh and keychain credential storage
//! - `observability`: tracing (pulled in by `runtime`)
//! - `test-utils`: mocks for the auth seams

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

// Runtime tier
// --------------------------------------------------------------------
#[cfg(feature = "runtime")]
pub mod resilience;

// Platform tier
// -------------------------------------------------------------------
#[cfg(feature = "platform")]
pub mod auth;

// Testing utilities
// ---------------------------------------------------------------
#[cfg(any(feature = "test-utils", all(test, feature = "platform")))]
pub mod testing;

// Re-export commonly used types and traits for convenience
// ------------------------
#[cfg(feature = "platform")]
pub use auth::{AccessToken, AuthError, KeyringStore, OAuthClient, SecretStore, TokenSource};
#[cfg(feature = "runtime")]
pub use resilience::{
    CircuitBreaker, CircuitBreakerConfig, CircuitBreakerConfigBuilder, CircuitBreakerMetrics,
    CircuitState, Clock, MockClock, RateLimitSnapshot, RateLimiter, ResilienceError,
    ResilienceResult, RetryConfig, RetryConfigBuilder, SystemClock,
};
