//! Front API client with pacing, retries and re-authentication
//!
//! Every request goes through one dispatch path: path validation, rate
//! limiter wait, bearer token, retrying transport, rate limiter update, and
//! finally status mapping. A 401 invalidates the token and is retried exactly
//! once with a fresh one.

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use frontcli_common::auth::AuthError;
use frontcli_common::resilience::{
    parse_retry_after, CircuitBreaker, CircuitBreakerConfig, RateLimiter, RetryConfig,
};
use frontcli_domain::constants::{CONTENT_TYPE_JSON, MAX_AUTH_ATTEMPTS};
use frontcli_domain::{Config, ListResponse};
use reqwest::header::{HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE, RETRY_AFTER, USER_AGENT};
use reqwest::{Body, Method, Request, Response, StatusCode};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::Serialize;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};
use url::Url;

use super::auth::AccessTokenProvider;
use super::errors::{ApiError, HttpStatusError};
use super::transport::{drain, RetryTransport};

/// Configuration for API client
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    /// Base URL for API (e.g., "https://api2.frontapp.com")
    pub base_url: String,
    pub user_agent: String,
    /// Timeout for a single HTTP exchange
    pub timeout: Duration,
    pub retry: RetryConfig,
    pub circuit_breaker: CircuitBreakerConfig,
    /// Simultaneous requests allowed in bulk fetches
    pub bulk_concurrency: usize,
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for ApiClientConfig {
    fn from(config: &Config) -> Self {
        let resilience = &config.resilience;
        Self {
            base_url: config.api.base_url.clone(),
            user_agent: config.api.user_agent.clone(),
            timeout: Duration::from_secs(config.api.timeout_secs),
            retry: RetryConfig::builder()
                .max_rate_limit_retries(resilience.max_rate_limit_retries)
                .max_server_error_retries(resilience.max_server_error_retries)
                .base_delay(Duration::from_millis(resilience.rate_limit_base_delay_ms))
                .server_error_delay(Duration::from_millis(resilience.server_error_delay_ms))
                .build(),
            circuit_breaker: CircuitBreakerConfig {
                failure_threshold: resilience.failure_threshold,
                cooldown: Duration::from_secs(resilience.cooldown_secs),
            },
            bulk_concurrency: resilience.bulk_concurrency,
        }
    }
}

/// Front API client
///
/// Rate limiter and circuit breaker live as long as the client and are
/// shared by every request it sends.
pub struct ApiClient {
    config: ApiClientConfig,
    auth: Arc<dyn AccessTokenProvider>,
    limiter: RateLimiter,
    transport: RetryTransport,
    cancel: CancellationToken,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("config", &self.config)
            .field("limiter", &self.limiter)
            .field("transport", &self.transport)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a new API client
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client or circuit breaker cannot be created
    pub fn new(config: ApiClientConfig, auth: Arc<dyn AccessTokenProvider>) -> Result<Self, ApiError> {
        Self::with_cancellation(config, auth, CancellationToken::new())
    }

    fn with_cancellation(
        config: ApiClientConfig,
        auth: Arc<dyn AccessTokenProvider>,
        cancel: CancellationToken,
    ) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ApiError::Config(format!("Failed to build HTTP client: {e}")))?;
        let breaker = CircuitBreaker::new(config.circuit_breaker.clone())?;
        let transport = RetryTransport::with_parts(http, breaker, config.retry.clone());

        Ok(Self { config, auth, limiter: RateLimiter::new(), transport, cancel })
    }

    /// Create a builder for fluent configuration
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    pub fn config(&self) -> &ApiClientConfig {
        &self.config
    }

    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    pub fn circuit_breaker(&self) -> &CircuitBreaker {
        self.transport.breaker()
    }

    /// Token that aborts every pending wait of this client
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Send one request and decode its JSON response into `T`.
    ///
    /// 204 and empty bodies decode as JSON `null`, so `()` and `Option<_>`
    /// targets accept them. Any other target gets
    /// [`ApiError::EmptyResponse`].
    ///
    /// # Errors
    ///
    /// Returns the mapped [`ApiError`] for unsafe paths, auth failures,
    /// non-2xx responses and undecodable bodies.
    #[instrument(skip_all, fields(method = %method, path = %path))]
    pub async fn execute<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> Result<T, ApiError> {
        let response = self.dispatch(method, path, body, true).await?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(ApiError::Network)?;

        if status == StatusCode::NO_CONTENT || bytes.is_empty() {
            return serde_json::from_value(serde_json::Value::Null)
                .map_err(|_| ApiError::EmptyResponse { status: status.as_u16() });
        }
        serde_json::from_slice(&bytes).map_err(ApiError::Decode)
    }

    /// Execute a GET request
    ///
    /// # Errors
    ///
    /// Returns error if request fails or response cannot be deserialized
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.execute(Method::GET, path, None).await
    }

    /// Execute a POST request with a JSON body
    ///
    /// # Errors
    ///
    /// Returns error if request fails or response cannot be deserialized
    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.execute(Method::POST, path, Some(encode(body)?)).await
    }

    /// Execute a PATCH request with a JSON body
    ///
    /// # Errors
    ///
    /// Returns error if request fails or response cannot be deserialized
    pub async fn patch<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.execute(Method::PATCH, path, Some(encode(body)?)).await
    }

    /// Execute a DELETE request, ignoring any response body
    ///
    /// # Errors
    ///
    /// Returns error if request fails
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.execute::<IgnoredAny>(Method::DELETE, path, None).await.map(|_| ())
    }

    /// Stream a GET response body into `writer`; returns the bytes written.
    ///
    /// # Errors
    ///
    /// Returns error if request fails or writing fails
    #[instrument(skip_all, fields(path = %path))]
    pub async fn download<W>(&self, path: &str, writer: &mut W) -> Result<u64, ApiError>
    where
        W: AsyncWrite + Unpin + Send + ?Sized,
    {
        let mut response = self.dispatch(Method::GET, path, None, false).await?;
        let mut written = 0u64;
        while let Some(chunk) = response.chunk().await.map_err(ApiError::Network)? {
            writer.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        writer.flush().await?;
        debug!(bytes = written, "Download complete");
        Ok(written)
    }

    /// Fetch an absolute pagination cursor (`_pagination.next`) as-is.
    ///
    /// Only the path and query are used; the host always comes from the
    /// configured base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Config`] for an unparseable cursor, otherwise as
    /// [`Self::get`].
    pub async fn get_page<T: DeserializeOwned>(&self, page_url: &str) -> Result<ListResponse<T>, ApiError> {
        let parsed = Url::parse(page_url).map_err(|e| ApiError::Config(format!("parse page URL: {e}")))?;
        let mut path = parsed.path().to_string();
        if let Some(query) = parsed.query().filter(|q| !q.is_empty()) {
            path.push('?');
            path.push_str(query);
        }
        self.get(&path).await
    }

    /// Shared request loop; returns only responses with status < 400.
    async fn dispatch(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
        accept_json: bool,
    ) -> Result<Response, ApiError> {
        validate_path(path)?;
        let url = self.url_for(path)?;

        let mut attempt = 1;
        loop {
            self.limiter.wait(&self.cancel).await?;
            let token = self.auth.access_token(&self.cancel).await.map_err(|e| match e {
                AuthError::Cancelled => ApiError::Cancelled,
                other => ApiError::Auth(other),
            })?;

            let request = self.build_request(method.clone(), url.clone(), &token, body.as_deref(), accept_json)?;
            let response = self.transport.send(request, &self.cancel).await?;
            self.limiter.update_from_headers(response.headers());

            let status = response.status();
            debug!(status = status.as_u16(), attempt, "API response");

            if status == StatusCode::UNAUTHORIZED {
                self.auth.invalidate().await;
                drain(response).await;
                if attempt < MAX_AUTH_ATTEMPTS {
                    debug!("Access token rejected, retrying with a fresh token");
                    attempt += 1;
                    continue;
                }
                return Err(ApiError::Status(HttpStatusError::unauthorized()));
            }

            return match status {
                StatusCode::NOT_FOUND => {
                    drain(response).await;
                    Err(ApiError::NotFound(HttpStatusError::new(404, "not found", "")))
                }
                StatusCode::TOO_MANY_REQUESTS => {
                    let retry_after_secs = response
                        .headers()
                        .get(RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|v| parse_retry_after(v, SystemTime::now()))
                        .map(|d| d.as_secs());
                    drain(response).await;
                    Err(ApiError::RateLimited { retry_after_secs })
                }
                s if s.is_client_error() || s.is_server_error() => {
                    let message = s.canonical_reason().unwrap_or("HTTP error").to_string();
                    let details = error_details(s, response.text().await);
                    Err(ApiError::Status(HttpStatusError::new(s.as_u16(), message, details)))
                }
                _ => Ok(response),
            };
        }
    }

    fn url_for(&self, path: &str) -> Result<Url, ApiError> {
        let raw = format!("{}{}", self.config.base_url.trim_end_matches('/'), path);
        Url::parse(&raw).map_err(|e| ApiError::Config(format!("invalid request URL {raw:?}: {e}")))
    }

    fn build_request(
        &self,
        method: Method,
        url: Url,
        token: &str,
        body: Option<&[u8]>,
        accept_json: bool,
    ) -> Result<Request, ApiError> {
        let mut bearer = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| ApiError::Config("access token is not a valid header value".to_string()))?;
        bearer.set_sensitive(true);
        let user_agent = HeaderValue::from_str(&self.config.user_agent)
            .map_err(|_| ApiError::Config(format!("invalid user agent {:?}", self.config.user_agent)))?;

        let mut request = Request::new(method, url);
        let headers = request.headers_mut();
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(USER_AGENT, user_agent);
        if accept_json {
            headers.insert(ACCEPT, HeaderValue::from_static(CONTENT_TYPE_JSON));
        }
        if let Some(body) = body {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(CONTENT_TYPE_JSON));
            *request.body_mut() = Some(Body::from(body.to_vec()));
        }
        Ok(request)
    }
}

/// Reject traversal sequences and control characters in request paths.
///
/// # Errors
/// Returns [`ApiError::UnsafePath`] naming the problem.
pub fn validate_path(path: &str) -> Result<(), ApiError> {
    let reason = if path.contains("..") {
        "path contains traversal sequence"
    } else if path.chars().any(|c| c < ' ' || c == '\u{7f}') {
        "path contains invalid characters"
    } else {
        return Ok(());
    };
    Err(ApiError::UnsafePath { path: path.to_string(), reason })
}

/// Error body text for a failed response; empty if the body itself failed.
fn error_details(status: StatusCode, body: Result<String, reqwest::Error>) -> String {
    match body {
        Ok(text) => text,
        Err(e) => {
            warn!(status = status.as_u16(), error = %e, "Failed to read error response body");
            String::new()
        }
    }
}

fn encode<B: Serialize + ?Sized>(body: &B) -> Result<Vec<u8>, ApiError> {
    serde_json::to_vec(body).map_err(ApiError::Encode)
}

/// Builder for API client
#[derive(Default)]
pub struct ApiClientBuilder {
    config: Option<ApiClientConfig>,
    auth: Option<Arc<dyn AccessTokenProvider>>,
    base_url: Option<String>,
    cancel: Option<CancellationToken>,
}

impl ApiClientBuilder {
    /// Set the API configuration
    #[must_use]
    pub fn config(mut self, config: ApiClientConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the authentication provider
    #[must_use]
    pub fn auth(mut self, auth: Arc<dyn AccessTokenProvider>) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Override the configured base URL
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Share a cancellation token with the caller
    #[must_use]
    pub fn cancellation_token(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Build the API client
    ///
    /// # Errors
    ///
    /// Returns error if required fields are missing or client creation fails
    pub fn build(self) -> Result<ApiClient, ApiError> {
        let mut config = self.config.unwrap_or_default();
        if let Some(base_url) = self.base_url.filter(|u| !u.trim().is_empty()) {
            config.base_url = base_url.trim_end_matches('/').to_string();
        }
        let auth = self.auth.ok_or_else(|| ApiError::Config("Auth provider not set".to_string()))?;

        ApiClient::with_cancellation(config, auth, self.cancel.unwrap_or_default())
    }
}
