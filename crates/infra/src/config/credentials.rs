//! OAuth client credential files
//!
//! Each registered OAuth app lives in `<config dir>/clients/<name>.json`
//! holding `client_id`, `client_secret` and an optional `redirect_uri`.

use std::path::{Path, PathBuf};

use frontcli_common::auth::{normalize_client_name, ClientCredentials};
use frontcli_domain::{ConfigError, ConfigResult};

use super::loader::config_dir;

/// Path of the credential file for `client` under `dir`.
///
/// # Errors
/// Returns [`ConfigError::Invalid`] for client names outside `[a-z0-9._-]`.
pub fn credentials_path(dir: &Path, client: &str) -> ConfigResult<PathBuf> {
    let name = normalize_client_name(client).map_err(|e| ConfigError::Invalid(e.to_string()))?;
    Ok(dir.join("clients").join(format!("{name}.json")))
}

/// Read the credentials for `client` from `dir`.
///
/// # Errors
/// Returns [`ConfigError::NotFound`] when the file is missing and
/// [`ConfigError::Parse`] when it is malformed or incomplete.
pub fn read_client_credentials_from(dir: &Path, client: &str) -> ConfigResult<ClientCredentials> {
    let path = credentials_path(dir, client)?;
    if !path.exists() {
        return Err(ConfigError::NotFound(path.display().to_string()));
    }

    let contents = std::fs::read_to_string(&path)
        .map_err(|e| ConfigError::Parse(format!("Failed to read {}: {e}", path.display())))?;
    let credentials: ClientCredentials = serde_json::from_str(&contents)
        .map_err(|e| ConfigError::Parse(format!("Invalid client credentials in {}: {e}", path.display())))?;

    if credentials.client_id.trim().is_empty() || credentials.client_secret.trim().is_empty() {
        return Err(ConfigError::Parse(format!("{} is missing client_id or client_secret", path.display())));
    }

    tracing::debug!(path = %path.display(), "Loaded client credentials");
    Ok(credentials)
}

/// Read the credentials for `client` from the default config directory.
///
/// # Errors
/// As [`read_client_credentials_from`]; also fails when no config directory
/// can be determined.
pub fn read_client_credentials(client: &str) -> ConfigResult<ClientCredentials> {
    let dir = config_dir()
        .ok_or_else(|| ConfigError::Invalid("cannot determine config directory; set FRONTCLI_CONFIG_DIR".into()))?;
    read_client_credentials_from(&dir, client)
}
