//! Configuration structures
//!
//! Every section has a `Default` so a partial file (or no file at all)
//! still produces a usable configuration.

use serde::{Deserialize, Serialize};

use crate::constants::{
    BULK_FETCH_CONCURRENCY, CIRCUIT_BREAKER_COOLDOWN_SECS, CIRCUIT_BREAKER_THRESHOLD,
    DEFAULT_BASE_URL, DEFAULT_CLIENT_NAME, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_TOKEN_URL,
    MAX_RATE_LIMIT_RETRIES, MAX_SERVER_ERROR_RETRIES, RATE_LIMIT_BASE_DELAY_MS,
    SERVER_ERROR_RETRY_DELAY_MS, TOKEN_REFRESH_TIMEOUT_SECS, USER_AGENT,
};
use crate::errors::{ConfigError, ConfigResult};

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiSettings,
    pub auth: AuthSettings,
    pub resilience: ResilienceSettings,
    pub logging: LoggingConfig,
}

impl Config {
    /// Reject values the client cannot work with.
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] naming the offending field.
    pub fn validate(&self) -> ConfigResult<()> {
        url::Url::parse(&self.api.base_url)
            .map_err(|e| ConfigError::Invalid(format!("api.base_url: {e}")))?;
        url::Url::parse(&self.auth.token_url)
            .map_err(|e| ConfigError::Invalid(format!("auth.token_url: {e}")))?;

        if self.api.timeout_secs == 0 {
            return Err(ConfigError::Invalid("api.timeout_secs must be positive".into()));
        }
        if self.resilience.failure_threshold == 0 {
            return Err(ConfigError::Invalid("resilience.failure_threshold must be positive".into()));
        }
        if self.resilience.bulk_concurrency == 0 {
            return Err(ConfigError::Invalid("resilience.bulk_concurrency must be positive".into()));
        }
        Ok(())
    }
}

/// HTTP endpoint settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    pub base_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: USER_AGENT.to_string(),
            timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

/// Which OAuth client and account to authenticate as
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    pub client: String,
    pub account: Option<String>,
    pub token_url: String,
    pub refresh_timeout_secs: u64,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            client: DEFAULT_CLIENT_NAME.to_string(),
            account: None,
            token_url: DEFAULT_TOKEN_URL.to_string(),
            refresh_timeout_secs: TOKEN_REFRESH_TIMEOUT_SECS,
        }
    }
}

/// Retry, circuit breaker and fan-out limits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResilienceSettings {
    pub max_rate_limit_retries: u32,
    pub max_server_error_retries: u32,
    pub rate_limit_base_delay_ms: u64,
    pub server_error_delay_ms: u64,
    pub failure_threshold: u64,
    pub cooldown_secs: u64,
    pub bulk_concurrency: usize,
}

impl Default for ResilienceSettings {
    fn default() -> Self {
        Self {
            max_rate_limit_retries: MAX_RATE_LIMIT_RETRIES,
            max_server_error_retries: MAX_SERVER_ERROR_RETRIES,
            rate_limit_base_delay_ms: RATE_LIMIT_BASE_DELAY_MS,
            server_error_delay_ms: SERVER_ERROR_RETRY_DELAY_MS,
            failure_threshold: CIRCUIT_BREAKER_THRESHOLD,
            cooldown_secs: CIRCUIT_BREAKER_COOLDOWN_SECS,
            bulk_concurrency: BULK_FETCH_CONCURRENCY,
        }
    }
}

/// Tracing subscriber settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `frontcli_infra=debug`.
    pub filter: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { filter: "warn".to_string(), json: false }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_front_endpoints() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "https://api2.frontapp.com");
        assert_eq!(config.api.user_agent, "frontcli/0.1.0");
        assert_eq!(config.auth.client, "default");
        assert_eq!(config.resilience.failure_threshold, 5);
        assert_eq!(config.resilience.bulk_concurrency, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"api": {"timeout_secs": 5}, "logging": {"json": true}}"#).unwrap();
        assert_eq!(config.api.timeout_secs, 5);
        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
        assert!(config.logging.json);
        assert_eq!(config.logging.filter, "warn");
    }

    #[test]
    fn validate_rejects_zero_timeout_and_bad_url() {
        let mut config = Config::default();
        config.api.timeout_secs = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = Config::default();
        config.api.base_url = "not a url".into();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(msg)) if msg.contains("base_url")));
    }
}
