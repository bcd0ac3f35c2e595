//! Two-state circuit breaker with lazy cooldown
//!
//! The breaker is either closed (calls flow) or open (calls fail fast). It
//! opens once the consecutive failure count reaches the threshold. There is no
//! half-open probe: the cooldown is evaluated when [`CircuitBreaker::is_open`]
//! is queried, and once it has elapsed since the last failure the breaker
//! closes and forgets its failure count.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use super::clock::{Clock, SystemClock};
use super::error::{ResilienceError, ResilienceResult};

/// Circuit breaker states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    Open,
}

impl fmt::Display for CircuitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CircuitState::Closed => write!(f, "CLOSED"),
            CircuitState::Open => write!(f, "OPEN"),
        }
    }
}

/// Configuration for circuit breaker behavior
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures before the circuit opens
    pub failure_threshold: u64,
    /// Time since the last failure after which an open circuit closes
    pub cooldown: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self { failure_threshold: 5, cooldown: Duration::from_secs(30) }
    }
}

impl CircuitBreakerConfig {
    pub fn builder() -> CircuitBreakerConfigBuilder {
        CircuitBreakerConfigBuilder::new()
    }

    /// Validate the configuration
    ///
    /// # Errors
    /// Returns [`ResilienceError::InvalidConfiguration`] for a zero threshold.
    pub fn validate(&self) -> ResilienceResult<()> {
        if self.failure_threshold == 0 {
            return Err(ResilienceError::InvalidConfiguration {
                message: "failure_threshold must be greater than 0".to_string(),
            });
        }
        Ok(())
    }
}

/// Builder for [`CircuitBreakerConfig`]
#[derive(Debug, Default)]
pub struct CircuitBreakerConfigBuilder {
    config: CircuitBreakerConfig,
}

impl CircuitBreakerConfigBuilder {
    pub fn new() -> Self {
        Self { config: CircuitBreakerConfig::default() }
    }

    pub fn failure_threshold(mut self, threshold: u64) -> Self {
        self.config.failure_threshold = threshold;
        self
    }

    pub fn cooldown(mut self, cooldown: Duration) -> Self {
        self.config.cooldown = cooldown;
        self
    }

    /// Build a breaker directly with a custom clock (tests)
    ///
    /// # Errors
    /// Returns an error when the configuration is invalid.
    pub fn build_with_clock<C: Clock>(self, clock: C) -> ResilienceResult<CircuitBreaker<C>> {
        CircuitBreaker::with_clock(self.config, clock)
    }

    /// # Errors
    /// Returns an error when the configuration is invalid.
    pub fn build(self) -> ResilienceResult<CircuitBreakerConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Point-in-time view of the breaker for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CircuitBreakerMetrics {
    pub state: CircuitState,
    pub failure_count: u64,
    pub last_failure_time: Option<Instant>,
}

#[derive(Debug)]
struct BreakerState {
    failures: u64,
    last_failure: Option<Instant>,
    open: bool,
}

/// Circuit breaker shared by every request of one API client.
///
/// Cloning is cheap and clones observe the same state.
pub struct CircuitBreaker<C: Clock = SystemClock> {
    config: CircuitBreakerConfig,
    state: Arc<Mutex<BreakerState>>,
    clock: Arc<C>,
}

impl<C: Clock> fmt::Debug for CircuitBreaker<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("CircuitBreaker")
            .field("config", &self.config)
            .field("open", &state.open)
            .field("failures", &state.failures)
            .finish()
    }
}

impl<C: Clock> Clone for CircuitBreaker<C> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            state: Arc::clone(&self.state),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl CircuitBreaker<SystemClock> {
    /// # Errors
    /// Returns an error when the configuration is invalid.
    pub fn new(config: CircuitBreakerConfig) -> ResilienceResult<Self> {
        Self::with_clock(config, SystemClock)
    }

    pub fn builder() -> CircuitBreakerConfigBuilder {
        CircuitBreakerConfigBuilder::new()
    }
}

impl Default for CircuitBreaker<SystemClock> {
    fn default() -> Self {
        Self {
            config: CircuitBreakerConfig::default(),
            state: Arc::new(Mutex::new(BreakerState { failures: 0, last_failure: None, open: false })),
            clock: Arc::new(SystemClock),
        }
    }
}

impl<C: Clock> CircuitBreaker<C> {
    /// # Errors
    /// Returns an error when the configuration is invalid.
    pub fn with_clock(config: CircuitBreakerConfig, clock: C) -> ResilienceResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            state: Arc::new(Mutex::new(BreakerState { failures: 0, last_failure: None, open: false })),
            clock: Arc::new(clock),
        })
    }

    pub fn config(&self) -> &CircuitBreakerConfig {
        &self.config
    }

    /// Reset the failure count and close the circuit, from any state.
    pub fn record_success(&self) {
        let mut state = self.state.lock();
        if state.open {
            info!("Circuit breaker closed after successful response");
        }
        state.failures = 0;
        state.open = false;
    }

    /// Count a failure; returns `true` only when this call opened the circuit.
    pub fn record_failure(&self) -> bool {
        let mut state = self.state.lock();
        state.failures += 1;
        state.last_failure = Some(self.clock.now());

        let just_opened = !state.open && state.failures >= self.config.failure_threshold;
        if just_opened {
            state.open = true;
        }
        debug!(failures = state.failures, open = state.open, "Circuit breaker recorded failure");
        just_opened
    }

    /// Whether calls should fail fast right now.
    ///
    /// Closes the circuit (and clears the failure count) when the cooldown
    /// has elapsed since the last failure.
    pub fn is_open(&self) -> bool {
        let mut state = self.state.lock();
        if !state.open {
            return false;
        }

        let cooled_down = state
            .last_failure
            .map_or(true, |last| self.clock.now().saturating_duration_since(last) >= self.config.cooldown);
        if cooled_down {
            state.open = false;
            state.failures = 0;
            info!(cooldown = ?self.config.cooldown, "Circuit breaker cooldown elapsed, closing");
            return false;
        }
        true
    }

    /// Fail with [`ResilienceError::CircuitOpen`] while the circuit is open.
    ///
    /// # Errors
    /// Returns [`ResilienceError::CircuitOpen`] when calls must not proceed.
    pub fn check(&self) -> ResilienceResult<()> {
        if self.is_open() {
            warn!("Circuit breaker open, rejecting call");
            return Err(ResilienceError::CircuitOpen);
        }
        Ok(())
    }

    /// Snapshot without triggering the lazy cooldown transition.
    pub fn metrics(&self) -> CircuitBreakerMetrics {
        let state = self.state.lock();
        CircuitBreakerMetrics {
            state: if state.open { CircuitState::Open } else { CircuitState::Closed },
            failure_count: state.failures,
            last_failure_time: state.last_failure,
        }
    }

    /// Force the breaker back to its initial state
    pub fn reset(&self) {
        let mut state = self.state.lock();
        state.failures = 0;
        state.last_failure = None;
        state.open = false;
    }
}
