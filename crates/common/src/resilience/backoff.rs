//! Retry budgets, backoff arithmetic and cancellable sleeps
//!
//! The retrying transport owns the loop; this module only answers "how long
//! should the next wait be" and performs the wait itself.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use rand::Rng;
use tokio_util::sync::CancellationToken;

use super::error::{ResilienceError, ResilienceResult};

/// Retry budgets for one logical request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Retries allowed after a 429
    pub max_rate_limit_retries: u32,
    /// Retries allowed after a 5xx
    pub max_server_error_retries: u32,
    /// First 429 backoff when the server sends no `Retry-After`
    pub base_delay: Duration,
    /// Fixed wait before retrying a 5xx
    pub server_error_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_rate_limit_retries: 3,
            max_server_error_retries: 1,
            base_delay: Duration::from_secs(1),
            server_error_delay: Duration::from_secs(2),
        }
    }
}

impl RetryConfig {
    pub fn builder() -> RetryConfigBuilder {
        RetryConfigBuilder::default()
    }

    /// Backoff before rate-limit retry number `attempt` (zero based).
    ///
    /// A `Retry-After` value wins when present and parseable; otherwise the
    /// delay doubles per attempt with up to 50% random jitter on top.
    pub fn rate_limit_delay(&self, attempt: u32, retry_after: Option<&str>) -> Duration {
        if let Some(delay) = retry_after.and_then(|v| parse_retry_after(v, SystemTime::now())) {
            return delay;
        }
        with_jitter(exponential_delay(self.base_delay, attempt))
    }
}

/// Builder for [`RetryConfig`]
#[derive(Debug, Default)]
pub struct RetryConfigBuilder {
    config: RetryConfig,
}

impl RetryConfigBuilder {
    pub fn max_rate_limit_retries(mut self, retries: u32) -> Self {
        self.config.max_rate_limit_retries = retries;
        self
    }

    pub fn max_server_error_retries(mut self, retries: u32) -> Self {
        self.config.max_server_error_retries = retries;
        self
    }

    pub fn base_delay(mut self, delay: Duration) -> Self {
        self.config.base_delay = delay;
        self
    }

    pub fn server_error_delay(mut self, delay: Duration) -> Self {
        self.config.server_error_delay = delay;
        self
    }

    pub fn build(self) -> RetryConfig {
        self.config
    }
}

/// `base * 2^attempt`, saturating instead of overflowing.
pub fn exponential_delay(base: Duration, attempt: u32) -> Duration {
    let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
    base.saturating_mul(factor)
}

/// Add a uniformly random extra of `[0, delay / 2)`.
pub fn with_jitter(delay: Duration) -> Duration {
    let range = delay / 2;
    if range.is_zero() {
        return delay;
    }
    let nanos = u64::try_from(range.as_nanos()).unwrap_or(u64::MAX);
    delay + Duration::from_nanos(rand::thread_rng().gen_range(0..nanos))
}

/// Parse a `Retry-After` header value relative to `now`.
///
/// Accepts delta-seconds or an HTTP-date. Negative deltas and dates in the
/// past both collapse to zero.
pub fn parse_retry_after(value: &str, now: SystemTime) -> Option<Duration> {
    let value = value.trim();
    if let Ok(seconds) = value.parse::<i64>() {
        return Some(Duration::from_secs(u64::try_from(seconds).unwrap_or(0)));
    }

    let at = parse_http_date(value)?;
    Some(at.duration_since(now).unwrap_or(Duration::ZERO))
}

/// Parse an IMF-fixdate (`Sun, 06 Nov 1994 08:49:37 GMT`) into wall time.
pub fn parse_http_date(value: &str) -> Option<SystemTime> {
    let parsed = chrono::DateTime::parse_from_rfc2822(value.trim()).ok()?;
    let secs = u64::try_from(parsed.timestamp()).ok()?;
    Some(UNIX_EPOCH + Duration::from_secs(secs))
}

/// Sleep for `duration` unless `cancel` fires first.
///
/// Zero durations return immediately without consulting the token.
///
/// # Errors
/// Returns [`ResilienceError::Cancelled`] if the token is cancelled before
/// the sleep completes.
pub async fn sleep_cancellable(duration: Duration, cancel: &CancellationToken) -> ResilienceResult<()> {
    if duration.is_zero() {
        return Ok(());
    }

    tokio::select! {
        () = tokio::time::sleep(duration) => Ok(()),
        () = cancel.cancelled() => Err(ResilienceError::Cancelled),
    }
}
