//! Configuration loader
//!
//! Loads [`Config`] from an optional file and applies environment overrides.
//!
//! ## Loading Strategy
//! 1. Start from the first config file found by [`probe_config_paths`], or
//!    from defaults when there is none
//! 2. Apply `FRONTCLI_*` environment overrides on top
//! 3. Validate the result
//!
//! ## Environment Variables
//! - `FRONTCLI_CONFIG`: Explicit config file path
//! - `FRONTCLI_CONFIG_DIR`: Config directory (default `~/.config/frontcli`)
//! - `FRONTCLI_BASE_URL`: API base URL
//! - `FRONTCLI_TIMEOUT_SECS`: Request timeout in seconds
//! - `FRONTCLI_CLIENT`: OAuth client name
//! - `FRONTCLI_ACCOUNT`: Account email to authenticate as
//! - `FRONTCLI_LOG`: Tracing filter directive
//! - `FRONTCLI_LOG_JSON`: Emit JSON logs (true/false)
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `$FRONTCLI_CONFIG`
//! 2. `./frontcli.toml` or `./frontcli.json` (current working directory)
//! 3. `config.toml` or `config.json` in the config directory

use std::path::{Path, PathBuf};

use frontcli_domain::{Config, ConfigError, ConfigResult};

const ENV_CONFIG: &str = "FRONTCLI_CONFIG";
const ENV_CONFIG_DIR: &str = "FRONTCLI_CONFIG_DIR";
const ENV_BASE_URL: &str = "FRONTCLI_BASE_URL";
const ENV_TIMEOUT_SECS: &str = "FRONTCLI_TIMEOUT_SECS";
const ENV_CLIENT: &str = "FRONTCLI_CLIENT";
const ENV_ACCOUNT: &str = "FRONTCLI_ACCOUNT";
const ENV_LOG: &str = "FRONTCLI_LOG";
const ENV_LOG_JSON: &str = "FRONTCLI_LOG_JSON";

/// Load configuration: file (if any), then environment overrides
///
/// # Errors
/// Returns `ConfigError` if a config file exists but cannot be parsed, an
/// environment override is malformed, or the result fails validation.
pub fn load() -> ConfigResult<Config> {
    let mut config = match probe_config_paths() {
        Some(path) => load_from_file(&path)?,
        None => {
            tracing::debug!("No config file found, using defaults");
            Config::default()
        }
    };
    apply_env_overrides(&mut config)?;
    config.validate()?;
    Ok(config)
}

/// Load configuration from defaults plus environment variables only
///
/// # Errors
/// Returns `ConfigError` if a variable has an invalid value.
pub fn load_from_env() -> ConfigResult<Config> {
    let mut config = Config::default();
    apply_env_overrides(&mut config)?;
    config.validate()?;
    Ok(config)
}

/// Load configuration from a file
///
/// Supports both JSON and TOML formats (detected by file extension).
/// Missing sections fall back to their defaults.
///
/// # Errors
/// Returns `ConfigError` if:
/// - File not found
/// - File format is invalid or unsupported
pub fn load_from_file(path: &Path) -> ConfigResult<Config> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.display().to_string()));
    }

    tracing::info!(path = %path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::Parse(format!("Failed to read {}: {e}", path.display())))?;

    parse_config(&contents, path)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> ConfigResult<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match extension {
        "toml" => toml::from_str(contents).map_err(|e| ConfigError::Parse(format!("Invalid TOML format: {e}"))),
        "json" => {
            serde_json::from_str(contents).map_err(|e| ConfigError::Parse(format!("Invalid JSON format: {e}")))
        }
        _ => Err(ConfigError::Parse(format!("Unsupported config format: {extension}"))),
    }
}

/// Directory holding the config file and `clients/*.json`
///
/// `$FRONTCLI_CONFIG_DIR`, else `$XDG_CONFIG_HOME/frontcli`, else
/// `$HOME/.config/frontcli`.
pub fn config_dir() -> Option<PathBuf> {
    if let Some(dir) = non_empty_env(ENV_CONFIG_DIR) {
        return Some(PathBuf::from(dir));
    }
    if let Some(xdg) = non_empty_env("XDG_CONFIG_HOME") {
        return Some(PathBuf::from(xdg).join("frontcli"));
    }
    non_empty_env("HOME").map(|home| PathBuf::from(home).join(".config").join("frontcli"))
}

/// Probe multiple paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Some(explicit) = non_empty_env(ENV_CONFIG) {
        candidates.push(PathBuf::from(explicit));
    }

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend([cwd.join("frontcli.toml"), cwd.join("frontcli.json")]);
    }

    if let Some(dir) = config_dir() {
        candidates.extend([dir.join("config.toml"), dir.join("config.json")]);
    }

    candidates.into_iter().find(|path| path.exists())
}

fn apply_env_overrides(config: &mut Config) -> ConfigResult<()> {
    if let Some(base_url) = non_empty_env(ENV_BASE_URL) {
        config.api.base_url = base_url.trim_end_matches('/').to_string();
    }
    if let Some(timeout) = non_empty_env(ENV_TIMEOUT_SECS) {
        config.api.timeout_secs = timeout
            .trim()
            .parse::<u64>()
            .map_err(|e| ConfigError::Invalid(format!("Invalid {ENV_TIMEOUT_SECS}: {e}")))?;
    }
    if let Some(client) = non_empty_env(ENV_CLIENT) {
        config.auth.client = client;
    }
    if let Some(account) = non_empty_env(ENV_ACCOUNT) {
        config.auth.account = Some(account);
    }
    if let Some(filter) = non_empty_env(ENV_LOG) {
        config.logging.filter = filter;
    }
    config.logging.json = env_bool(ENV_LOG_JSON, config.logging.json);
    Ok(())
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const ALL_VARS: [&str; 8] =
        [ENV_CONFIG, ENV_CONFIG_DIR, ENV_BASE_URL, ENV_TIMEOUT_SECS, ENV_CLIENT, ENV_ACCOUNT, ENV_LOG, ENV_LOG_JSON];

    fn clear_env() {
        for key in ALL_VARS {
            std::env::remove_var(key);
        }
    }

    #[test]
    fn test_env_bool_parsing() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());

        std::env::set_var("FRONTCLI_TEST_BOOL_YES", "YES");
        std::env::set_var("FRONTCLI_TEST_BOOL_OFF", "off");
        std::env::remove_var("FRONTCLI_TEST_BOOL_MISSING");

        assert!(env_bool("FRONTCLI_TEST_BOOL_YES", false));
        assert!(!env_bool("FRONTCLI_TEST_BOOL_OFF", true));
        assert!(env_bool("FRONTCLI_TEST_BOOL_MISSING", true));

        std::env::remove_var("FRONTCLI_TEST_BOOL_YES");
        std::env::remove_var("FRONTCLI_TEST_BOOL_OFF");
    }

    #[test]
    fn test_load_from_env_overrides_defaults() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();

        std::env::set_var(ENV_BASE_URL, "http://localhost:8080/");
        std::env::set_var(ENV_TIMEOUT_SECS, "5");
        std::env::set_var(ENV_ACCOUNT, "me@example.com");
        std::env::set_var(ENV_LOG, "debug");
        std::env::set_var(ENV_LOG_JSON, "true");

        let config = load_from_env().unwrap();
        assert_eq!(config.api.base_url, "http://localhost:8080");
        assert_eq!(config.api.timeout_secs, 5);
        assert_eq!(config.auth.account.as_deref(), Some("me@example.com"));
        assert_eq!(config.auth.client, "default");
        assert_eq!(config.logging.filter, "debug");
        assert!(config.logging.json);

        clear_env();
    }

    #[test]
    fn test_load_from_env_invalid_number() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();

        std::env::set_var(ENV_TIMEOUT_SECS, "soon");
        assert!(matches!(load_from_env(), Err(ConfigError::Invalid(_))));

        std::env::set_var(ENV_TIMEOUT_SECS, "0");
        assert!(matches!(load_from_env(), Err(ConfigError::Invalid(_))));

        clear_env();
    }

    #[test]
    fn test_load_from_file_not_found() {
        let result = load_from_file(Path::new("/nonexistent/frontcli.toml"));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_parse_config_partial_toml_keeps_defaults() {
        let toml_content = r#"
[api]
base_url = "https://example.test"

[resilience]
failure_threshold = 3
"#;

        let config = parse_config(toml_content, Path::new("frontcli.toml")).unwrap();
        assert_eq!(config.api.base_url, "https://example.test");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.resilience.failure_threshold, 3);
        assert_eq!(config.resilience.cooldown_secs, 30);
    }

    #[test]
    fn test_parse_config_json() {
        let json_content = r#"{ "auth": { "client": "work", "account": "a@example.com" } }"#;

        let config = parse_config(json_content, Path::new("config.json")).unwrap();
        assert_eq!(config.auth.client, "work");
        assert_eq!(config.auth.account.as_deref(), Some("a@example.com"));
    }

    #[test]
    fn test_parse_config_errors() {
        assert!(matches!(parse_config("{ nope", Path::new("c.json")), Err(ConfigError::Parse(_))));
        assert!(matches!(parse_config("[api", Path::new("c.toml")), Err(ConfigError::Parse(_))));
        assert!(matches!(parse_config("a: b", Path::new("c.yaml")), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_config_dir_prefers_explicit_override() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();

        std::env::set_var(ENV_CONFIG_DIR, "/tmp/frontcli-test-config");
        assert_eq!(config_dir(), Some(PathBuf::from("/tmp/frontcli-test-config")));

        clear_env();
    }
}
