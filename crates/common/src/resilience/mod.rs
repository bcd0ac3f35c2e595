//! Resilience primitives for talking to a rate-limited HTTP API
//!
//! - **Circuit Breaker**: fails fast after repeated server errors and closes
//!   lazily once a cooldown has passed
//! - **Rate Limiter**: paces requests from the server's `x-ratelimit-*`
//!   headers
//! - **Backoff**: retry budgets, `Retry-After` parsing, jittered exponential
//!   delays and cancellable sleeps
//!
//! Time is injected through [`Clock`] so every primitive can be tested with
//! [`MockClock`] instead of real delays.

pub mod backoff;
pub mod circuit_breaker;
pub mod clock;
pub mod error;
pub mod rate_limiter;

pub use backoff::{
    exponential_delay, parse_http_date, parse_retry_after, sleep_cancellable, with_jitter,
    RetryConfig, RetryConfigBuilder,
};
pub use circuit_breaker::{
    CircuitBreaker, CircuitBreakerConfig, CircuitBreakerConfigBuilder, CircuitBreakerMetrics,
    CircuitState,
};
pub use clock::{Clock, MockClock, SystemClock};
pub use error::{ResilienceError, ResilienceResult};
pub use rate_limiter::{RateLimitSnapshot, RateLimiter};
