//! API-specific error types
//!
//! Every failure a resource operation can produce has its own variant so the
//! command layer can dispatch on kind; [`ApiError::exit_code`] implements the
//! fixed status-to-exit-code table.

use std::fmt;

use frontcli_common::auth::AuthError;
use frontcli_common::resilience::ResilienceError;
use frontcli_domain::constants::{EXIT_AUTH, EXIT_ERROR, EXIT_NOT_FOUND, EXIT_RATE_LIMIT};
use frontcli_domain::{ConfigError, IdError, ResourceKind};
use thiserror::Error;

use super::transport::TransportError;

/// Categories of API errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorCategory {
    /// Refresh failures and 401/403 responses
    Authentication,
    /// 404 responses
    NotFound,
    /// 429 after the transport exhausted its retries
    RateLimit,
    /// 5xx responses, open circuit, undecodable responses
    Server,
    /// Remaining 4xx responses and local request-building failures
    Client,
    /// Connection-level failures
    Network,
    /// Resource IDs or paths rejected before any network call
    Validation,
    /// The caller cancelled a wait
    Cancelled,
    /// Configuration errors - non-retryable
    Config,
}

/// Non-2xx response surfaced to the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpStatusError {
    pub status: u16,
    /// Reason phrase or short summary
    pub message: String,
    /// Raw response body, or a hint for the user
    pub details: String,
    /// ID the failing operation asked for, when there was one
    pub requested_id: Option<String>,
    pub expected_resource: Option<ResourceKind>,
}

impl HttpStatusError {
    pub fn new(status: u16, message: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            details: details.into(),
            requested_id: None,
            expected_resource: None,
        }
    }

    /// Second 401 in a row: the refreshed token was rejected too.
    pub fn unauthorized() -> Self {
        Self::new(401, "unauthorized", "token may be expired; try logging in again")
    }
}

impl fmt::Display for HttpStatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let (Some(kind), Some(id), 404) = (self.expected_resource, &self.requested_id, self.status) {
            return write!(f, "{kind} '{id}' not found");
        }
        f.write_str(&self.message)?;
        if !self.details.is_empty() {
            write!(f, ": {}", self.details)?;
        }
        Ok(())
    }
}

/// API operation errors
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("{0}")]
    Status(HttpStatusError),

    #[error("{0}")]
    NotFound(HttpStatusError),

    #[error("rate limit exceeded{}", .retry_after_secs.map(|s| format!(", retry after {s} seconds")).unwrap_or_default())]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("circuit breaker is open: too many consecutive failures")]
    CircuitOpen,

    #[error("'{id}' is a {actual} ID, but a {expected} ID was expected")]
    WrongResourceType { expected: ResourceKind, actual: ResourceKind, id: String },

    #[error("invalid resource ID {id:?}")]
    InvalidId { id: String },

    #[error("unsafe API path {path:?}: {reason}")]
    UnsafePath { path: String, reason: &'static str },

    #[error("operation cancelled")]
    Cancelled,

    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("decode response: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("expected a JSON body but the server sent an empty {status} response")]
    EmptyResponse { status: u16 },

    #[error("encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// Get the error category for this error
    pub fn category(&self) -> ApiErrorCategory {
        match self {
            Self::Auth(_) => ApiErrorCategory::Authentication,
            Self::Status(e) if e.status == 401 || e.status == 403 => ApiErrorCategory::Authentication,
            Self::Status(e) if e.status >= 500 => ApiErrorCategory::Server,
            Self::Status(_) | Self::Encode(_) | Self::Io(_) => ApiErrorCategory::Client,
            Self::NotFound(_) => ApiErrorCategory::NotFound,
            Self::RateLimited { .. } => ApiErrorCategory::RateLimit,
            Self::CircuitOpen | Self::Decode(_) | Self::EmptyResponse { .. } => ApiErrorCategory::Server,
            Self::WrongResourceType { .. } | Self::InvalidId { .. } | Self::UnsafePath { .. } => {
                ApiErrorCategory::Validation
            }
            Self::Cancelled => ApiErrorCategory::Cancelled,
            Self::Network(_) => ApiErrorCategory::Network,
            Self::Config(_) => ApiErrorCategory::Config,
        }
    }

    /// Process exit code for the command layer
    pub fn exit_code(&self) -> i32 {
        match self.category() {
            ApiErrorCategory::Authentication => EXIT_AUTH,
            ApiErrorCategory::NotFound => EXIT_NOT_FOUND,
            ApiErrorCategory::RateLimit => EXIT_RATE_LIMIT,
            _ => EXIT_ERROR,
        }
    }

    /// HTTP status behind this error, if a response was received
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status(e) | Self::NotFound(e) => Some(e.status),
            Self::RateLimited { .. } => Some(429),
            Self::EmptyResponse { status } => Some(*status),
            _ => None,
        }
    }

    /// Attach the requested ID and expected resource kind to status errors.
    #[must_use]
    pub fn with_resource(mut self, id: &str, kind: ResourceKind) -> Self {
        if let Self::Status(e) | Self::NotFound(e) = &mut self {
            e.requested_id = Some(id.to_string());
            e.expected_resource = Some(kind);
        }
        self
    }
}

impl From<IdError> for ApiError {
    fn from(err: IdError) -> Self {
        match err {
            IdError::Invalid { id } => Self::InvalidId { id },
            IdError::WrongResourceType { expected, actual, id } => {
                Self::WrongResourceType { expected, actual, id }
            }
        }
    }
}

impl From<TransportError> for ApiError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::CircuitOpen => Self::CircuitOpen,
            TransportError::Cancelled => Self::Cancelled,
            TransportError::Network(e) | TransportError::Body(e) => Self::Network(e),
        }
    }
}

impl From<ResilienceError> for ApiError {
    fn from(err: ResilienceError) -> Self {
        match err {
            ResilienceError::Cancelled => Self::Cancelled,
            ResilienceError::CircuitOpen => Self::CircuitOpen,
            ResilienceError::InvalidConfiguration { message } => Self::Config(message),
        }
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}
