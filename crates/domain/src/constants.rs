//! Front API and process-level constants
//!
//! Centralised so the infra layer, config defaults and tests agree on the
//! same values.

// API endpoints
pub const DEFAULT_BASE_URL: &str = "https://api2.frontapp.com";
pub const DEFAULT_TOKEN_URL: &str = "https://app.frontapp.com/oauth/token";
pub const USER_AGENT: &str = "frontcli/0.1.0";
pub const CONTENT_TYPE_JSON: &str = "application/json";

// Credential lookup
pub const DEFAULT_CLIENT_NAME: &str = "default";
/// Keyring service every stored credential lives under
pub const KEYRING_SERVICE: &str = "frontcli";

// Timeouts
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const TOKEN_REFRESH_TIMEOUT_SECS: u64 = 30;

// Retry budgets
pub const MAX_RATE_LIMIT_RETRIES: u32 = 3;
pub const MAX_SERVER_ERROR_RETRIES: u32 = 1;
pub const RATE_LIMIT_BASE_DELAY_MS: u64 = 1_000;
pub const SERVER_ERROR_RETRY_DELAY_MS: u64 = 2_000;
/// One extra attempt after a 401 so the token can be refreshed once.
pub const MAX_AUTH_ATTEMPTS: u32 = 2;

// Circuit breaker
pub const CIRCUIT_BREAKER_THRESHOLD: u64 = 5;
pub const CIRCUIT_BREAKER_COOLDOWN_SECS: u64 = 30;

// Bulk fetches
pub const BULK_FETCH_CONCURRENCY: usize = 5;

// Drained response bodies are read up to this many bytes before dropping.
pub const DRAIN_LIMIT_BYTES: usize = 1 << 20;

// Process exit codes the command layer maps errors onto
pub const EXIT_ERROR: i32 = 1;
pub const EXIT_AUTH: i32 = 3;
pub const EXIT_NOT_FOUND: i32 = 4;
pub const EXIT_RATE_LIMIT: i32 = 5;
