//! Configuration loading and management
//!
//! This module provides utilities for loading application configuration
//! from environment variables and files, plus the per-client OAuth
//! credential files.

pub mod credentials;
pub mod loader;

// Re-export commonly used items
pub use credentials::{credentials_path, read_client_credentials, read_client_credentials_from};
pub use loader::{config_dir, load, load_from_env, load_from_file, probe_config_paths};
