//! Tracing subscriber setup
//!
//! Library code only emits `tracing` events; the binary calls
//! [`init_tracing`] once at startup to decide where they go. Output goes to
//! stderr so command output on stdout stays machine-readable.

use frontcli_domain::LoggingConfig;
use tracing_subscriber::EnvFilter;

/// Observability setup errors
#[derive(Debug, thiserror::Error)]
pub enum ObservabilityError {
    /// The filter directive could not be parsed
    #[error("invalid log filter {filter:?}: {source}")]
    InvalidFilter {
        filter: String,
        #[source]
        source: tracing_subscriber::filter::ParseError,
    },
}

/// Build the `EnvFilter` for `config`.
///
/// # Errors
/// Returns [`ObservabilityError::InvalidFilter`] for malformed directives.
pub fn build_filter(config: &LoggingConfig) -> Result<EnvFilter, ObservabilityError> {
    EnvFilter::try_new(&config.filter)
        .map_err(|source| ObservabilityError::InvalidFilter { filter: config.filter.clone(), source })
}

/// Install the global fmt subscriber (text or JSON).
///
/// Returns `false` when a global subscriber was already installed; calling
/// this twice is harmless.
///
/// # Errors
/// Returns [`ObservabilityError::InvalidFilter`] for malformed directives.
pub fn init_tracing(config: &LoggingConfig) -> Result<bool, ObservabilityError> {
    let filter = build_filter(config)?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).with_target(false);

    let installed = if config.json { builder.json().try_init().is_ok() } else { builder.try_init().is_ok() };
    if installed {
        tracing::debug!(filter = %config.filter, json = config.json, "Tracing initialised");
    }
    Ok(installed)
}
