//! Header-driven request pacing
//!
//! Front reports its quota on every response through `x-ratelimit-*`
//! headers. [`RateLimiter`] caches the latest values and, before each
//! request, spreads the remaining quota evenly across the time left until
//! the window resets instead of bursting and then stalling.
//!
//! Burst quota is a bonus: at most half the steady-state limit may be
//! borrowed from it.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;
use reqwest::header::HeaderMap;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::backoff::{parse_http_date, sleep_cancellable};
use super::clock::{Clock, SystemClock};
use super::error::ResilienceResult;

pub const HEADER_LIMIT: &str = "x-ratelimit-limit";
pub const HEADER_REMAINING: &str = "x-ratelimit-remaining";
pub const HEADER_BURST_LIMIT: &str = "x-ratelimit-burst-limit";
pub const HEADER_BURST_REMAINING: &str = "x-ratelimit-burst-remaining";
pub const HEADER_RESET: &str = "x-ratelimit-reset";

/// Cached quota as last reported by the server
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RateLimitSnapshot {
    pub limit: i64,
    pub remaining: i64,
    pub burst_limit: i64,
    pub burst_remaining: i64,
    pub reset_at: Option<SystemTime>,
}

impl RateLimitSnapshot {
    /// Requests that may still go out in this window, burst bonus included.
    ///
    /// Saturates rather than overflowing on extreme header values.
    pub fn effective_remaining(&self) -> i64 {
        let extra = if self.burst_remaining > 0 { self.burst_remaining.min(self.limit / 2) } else { 0 };
        self.remaining.saturating_add(extra)
    }

    /// How long the next request should wait, given the current wall time.
    ///
    /// `None` means the limiter has not been primed by a response yet.
    pub fn pacing_delay(&self, now: SystemTime) -> Option<Duration> {
        let reset_at = self.reset_at?;
        if self.limit <= 0 {
            return None;
        }

        let until_reset = reset_at.duration_since(now).unwrap_or(Duration::ZERO);
        let effective = self.effective_remaining();
        if effective <= 1 {
            return Some(until_reset);
        }

        let divisor = u32::try_from(effective).unwrap_or(u32::MAX);
        Some(until_reset / divisor)
    }
}

/// Shared pacing state for one API client.
///
/// Cloning is cheap; clones share the cached quota.
#[derive(Debug, Clone)]
pub struct RateLimiter<C: Clock = SystemClock> {
    state: Arc<Mutex<RateLimitSnapshot>>,
    clock: Arc<C>,
}

impl Default for RateLimiter<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl RateLimiter<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl<C: Clock> RateLimiter<C> {
    pub fn with_clock(clock: C) -> Self {
        Self { state: Arc::new(Mutex::new(RateLimitSnapshot::default())), clock: Arc::new(clock) }
    }

    /// Refresh the cached quota from response headers.
    ///
    /// Absent or unparsable numeric headers keep their previous value. The
    /// reset header accepts epoch seconds or an HTTP-date.
    pub fn update_from_headers(&self, headers: &HeaderMap) {
        let mut state = self.state.lock();
        state.limit = header_int(headers, HEADER_LIMIT).unwrap_or(state.limit);
        state.remaining = header_int(headers, HEADER_REMAINING).unwrap_or(state.remaining);
        state.burst_limit = header_int(headers, HEADER_BURST_LIMIT).unwrap_or(state.burst_limit);
        state.burst_remaining =
            header_int(headers, HEADER_BURST_REMAINING).unwrap_or(state.burst_remaining);

        if let Some(reset) = header_str(headers, HEADER_RESET).and_then(parse_reset) {
            state.reset_at = Some(reset);
        }
    }

    /// Wait long enough to stay within the server's quota.
    ///
    /// Returns immediately until a response has primed the limiter.
    ///
    /// # Errors
    /// Returns [`super::ResilienceError::Cancelled`] if `cancel` fires while
    /// waiting.
    pub async fn wait(&self, cancel: &CancellationToken) -> ResilienceResult<()> {
        let snapshot = *self.state.lock();
        let Some(delay) = snapshot.pacing_delay(self.clock.system_time()) else {
            return Ok(());
        };

        if !delay.is_zero() {
            debug!(
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                remaining = snapshot.remaining,
                burst_remaining = snapshot.burst_remaining,
                "Pacing request to respect rate limit"
            );
        }
        sleep_cancellable(delay, cancel).await
    }

    pub fn snapshot(&self) -> RateLimitSnapshot {
        *self.state.lock()
    }

    /// Forget everything learned from headers
    pub fn reset(&self) {
        *self.state.lock() = RateLimitSnapshot::default();
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok()).map(str::trim).filter(|v| !v.is_empty())
}

fn header_int(headers: &HeaderMap, name: &str) -> Option<i64> {
    header_str(headers, name).and_then(|v| v.parse().ok())
}

fn parse_reset(value: &str) -> Option<SystemTime> {
    if let Ok(epoch) = value.parse::<i64>() {
        let secs = u64::try_from(epoch).unwrap_or(0);
        return Some(UNIX_EPOCH + Duration::from_secs(secs));
    }
    parse_http_date(value)
}
