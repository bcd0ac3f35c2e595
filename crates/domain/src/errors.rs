//! Error types owned by the domain layer

use thiserror::Error;

use crate::ids::ResourceKind;

/// Resource-ID validation failures, raised before any network call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdError {
    /// The ID is empty or contains characters unsafe for a URL path.
    #[error("invalid resource ID {id:?}")]
    Invalid { id: String },

    /// The ID carries a recognised prefix belonging to another resource kind.
    #[error("'{id}' is a {actual} ID, but a {expected} ID was expected")]
    WrongResourceType { expected: ResourceKind, actual: ResourceKind, id: String },
}

/// Configuration errors raised while assembling [`crate::config::Config`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Invalid(String),

    #[error("Configuration file not found: {0}")]
    NotFound(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
