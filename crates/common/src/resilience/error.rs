use thiserror::Error;

/// Errors raised by the resilience primitives themselves.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResilienceError {
    /// A pacing or backoff wait was interrupted by the caller.
    #[error("wait interrupted: operation cancelled")]
    Cancelled,

    /// Circuit breaker is open, rejecting calls
    #[error("circuit breaker is open; the API is failing, try again shortly")]
    CircuitOpen,

    #[error("Invalid configuration: {message}")]
    InvalidConfiguration { message: String },
}

/// Result type for resilience operations
pub type ResilienceResult<T> = Result<T, ResilienceError>;
