//! Retrying HTTP transport
//!
//! Sits between the API client and the raw HTTP client. Each call checks the
//! circuit breaker, buffers the request body once so it can be resent, and
//! retries 429 and 5xx responses within fixed budgets. Exhausted retries hand
//! the last response back unchanged so the caller can map its status.

use std::time::Duration;

use async_trait::async_trait;
use frontcli_common::resilience::{sleep_cancellable, CircuitBreaker, Clock, RetryConfig, SystemClock};
use frontcli_domain::constants::DRAIN_LIMIT_BYTES;
use http_body_util::BodyExt;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Body, Method, Request, Response, StatusCode, Url};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Failures that prevent the transport from producing a response
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("circuit breaker is open")]
    CircuitOpen,

    #[error("request cancelled")]
    Cancelled,

    #[error("failed to buffer request body: {0}")]
    Body(#[source] reqwest::Error),

    #[error(transparent)]
    Network(#[from] reqwest::Error),
}

/// Send one request, get one response
#[async_trait]
pub trait HttpSend: Send + Sync {
    /// # Errors
    /// Returns the underlying client's error for connection-level failures.
    async fn send(&self, request: Request) -> Result<Response, reqwest::Error>;
}

#[async_trait]
impl HttpSend for reqwest::Client {
    async fn send(&self, request: Request) -> Result<Response, reqwest::Error> {
        self.execute(request).await
    }
}

/// A request whose body has been read into memory once.
struct ReplayableRequest {
    method: Method,
    url: Url,
    headers: HeaderMap,
    timeout: Option<Duration>,
    body: Option<Vec<u8>>,
}

impl ReplayableRequest {
    /// Streaming bodies are collected in full before the first send.
    async fn capture(mut request: Request) -> Result<Self, TransportError> {
        let body = match request.body_mut().take() {
            None => None,
            Some(body) => Some(buffer_body(body).await?),
        };
        Ok(Self {
            method: request.method().clone(),
            url: request.url().clone(),
            headers: request.headers().clone(),
            timeout: request.timeout().copied(),
            body,
        })
    }

    fn build(&self) -> Request {
        let mut request = Request::new(self.method.clone(), self.url.clone());
        *request.headers_mut() = self.headers.clone();
        *request.timeout_mut() = self.timeout;
        *request.body_mut() = self.body.clone().map(Body::from);
        request
    }
}

async fn buffer_body(body: Body) -> Result<Vec<u8>, TransportError> {
    if let Some(bytes) = body.as_bytes() {
        return Ok(bytes.to_vec());
    }

    let collected = body.collect().await.map_err(TransportError::Body)?.to_bytes();
    debug!(bytes = collected.len(), "Buffered streaming request body for replay");
    Ok(collected.to_vec())
}

/// Retry counters for one call; discarded when the call resolves.
#[derive(Debug, Default)]
struct Attempts {
    rate_limited: u32,
    server_errors: u32,
}

impl Attempts {
    fn total(&self) -> u32 {
        self.rate_limited + self.server_errors
    }
}

/// HTTP transport with circuit breaking and 429/5xx retries
#[derive(Debug, Clone)]
pub struct RetryTransport<S: HttpSend = reqwest::Client, C: Clock = SystemClock> {
    inner: S,
    breaker: CircuitBreaker<C>,
    retry: RetryConfig,
}

impl<S: HttpSend> RetryTransport<S, SystemClock> {
    /// Transport with the default breaker (5 failures, 30 s cooldown) and budgets.
    pub fn new(inner: S) -> Self {
        Self::with_parts(inner, CircuitBreaker::default(), RetryConfig::default())
    }
}

impl<S: HttpSend, C: Clock> RetryTransport<S, C> {
    pub fn with_parts(inner: S, breaker: CircuitBreaker<C>, retry: RetryConfig) -> Self {
        Self { inner, breaker, retry }
    }

    pub fn breaker(&self) -> &CircuitBreaker<C> {
        &self.breaker
    }

    pub fn retry_config(&self) -> &RetryConfig {
        &self.retry
    }

    /// Send `request`, retrying rate-limit and server-error responses.
    ///
    /// # Errors
    /// - [`TransportError::CircuitOpen`] without touching the network while
    ///   the breaker is open
    /// - [`TransportError::Body`] if a streaming body fails while buffering
    /// - [`TransportError::Network`] on the first connection-level failure
    /// - [`TransportError::Cancelled`] if `cancel` fires during a send or a
    ///   backoff sleep
    pub async fn send(&self, request: Request, cancel: &CancellationToken) -> Result<Response, TransportError> {
        if self.breaker.is_open() {
            warn!(url = %request.url(), "Circuit breaker open, failing fast");
            return Err(TransportError::CircuitOpen);
        }

        let replay = tokio::select! {
            result = ReplayableRequest::capture(request) => result?,
            () = cancel.cancelled() => return Err(TransportError::Cancelled),
        };
        let mut attempts = Attempts::default();

        loop {
            debug!(
                attempt = attempts.total() + 1,
                method = %replay.method,
                url = %replay.url,
                "Sending HTTP request"
            );

            let response = tokio::select! {
                result = self.inner.send(replay.build()) => result?,
                () = cancel.cancelled() => return Err(TransportError::Cancelled),
            };
            let status = response.status();
            debug!(status = status.as_u16(), url = %replay.url, "Received HTTP response");

            if status.as_u16() < 400 {
                self.breaker.record_success();
                return Ok(response);
            }

            if status == StatusCode::TOO_MANY_REQUESTS {
                if attempts.rate_limited >= self.retry.max_rate_limit_retries {
                    return Ok(response);
                }
                let retry_after = response
                    .headers()
                    .get(RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_owned);
                let delay = self.retry.rate_limit_delay(attempts.rate_limited, retry_after.as_deref());
                warn!(
                    retry = attempts.rate_limited + 1,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    "Rate limited, backing off"
                );

                drain(response).await;
                self.pause(delay, cancel).await?;
                attempts.rate_limited += 1;
                continue;
            }

            if status.is_server_error() {
                if self.breaker.record_failure() {
                    warn!(
                        threshold = self.breaker.config().failure_threshold,
                        "Circuit breaker opened after consecutive server errors"
                    );
                }
                if attempts.server_errors >= self.retry.max_server_error_retries {
                    return Ok(response);
                }
                warn!(status = status.as_u16(), retry = attempts.server_errors + 1, "Server error, retrying");

                drain(response).await;
                self.pause(self.retry.server_error_delay, cancel).await?;
                attempts.server_errors += 1;
                continue;
            }

            return Ok(response);
        }
    }

    async fn pause(&self, delay: Duration, cancel: &CancellationToken) -> Result<(), TransportError> {
        sleep_cancellable(delay, cancel).await.map_err(|_| TransportError::Cancelled)
    }
}

/// Read and discard up to [`DRAIN_LIMIT_BYTES`] so the connection can be reused.
pub(crate) async fn drain(mut response: Response) {
    let mut read = 0usize;
    while read < DRAIN_LIMIT_BYTES {
        match response.chunk().await {
            Ok(Some(chunk)) => read += chunk.len(),
            Ok(None) | Err(_) => break,
        }
    }
}
