//! HTTP fetcher — the only component that performs network I/O
//!
//! Every logical request goes through [`Fetcher::fetch_json`], which:
//! - acquires the process-wide concurrency permit before touching the network
//! - applies a fixed polite delay so requests don't burst inside the gate
//! - interprets status codes and rate-limit headers
//! - sleeps and retries exactly once when the quota is exhausted
//!
//! The permit is held for the whole attempt, including any rate-limit sleep:
//! letting other workers start requests against a known-exhausted quota
//! would only extend the lockout.

use crate::github::rate_limit::{RateLimitSignals, RateLimiter};
use chrono::Utc;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Semaphore;

/// Errors surfaced by a single logical fetch
///
/// 404s and non-JSON bodies are not errors — absence and malformed payloads
/// are expected and reported as `Ok(None)`.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Quota was still zero after the one permitted sleep-and-retry
    #[error("Rate limit still exhausted after retry for {url}")]
    RateLimitExhausted { url: String },

    /// 403 without a zero-quota signal: auth or permission problem
    #[error("Forbidden (403) for {url}")]
    Forbidden { url: String },

    #[error("Server error {status} for {url}")]
    ServerError { url: String, status: u16 },

    #[error("Unexpected status {status} for {url}")]
    UnexpectedStatus { url: String, status: u16 },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Connection error for {url}: {message}")]
    Connection { url: String, message: String },

    #[error("Invalid request URL: {message}")]
    InvalidUrl { message: String },

    #[error("Concurrency gate closed")]
    GateClosed,
}

/// Builds the HTTP client shared by the whole crawl
///
/// The bearer token and the v3 Accept header ride on every request as
/// default headers; timeouts and compression follow the usual shape.
pub fn build_http_client(token: &str) -> crate::Result<Client> {
    let mut headers = HeaderMap::new();
    let auth = HeaderValue::from_str(&format!("token {}", token))
        .map_err(|_| crate::QuarryError::InvalidToken)?;
    headers.insert(AUTHORIZATION, auth);
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("application/vnd.github.v3+json"),
    );

    let client = Client::builder()
        .user_agent(concat!("quarry/", env!("CARGO_PKG_VERSION")))
        .default_headers(headers)
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()?;

    Ok(client)
}

/// Performs rate-limit-aware JSON GETs behind the concurrency gate
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    gate: Arc<Semaphore>,
    limiter: RateLimiter,
    request_delay: Duration,
}

impl Fetcher {
    /// Creates a fetcher with its own concurrency gate
    ///
    /// There is one gate per crawl run; clones of the fetcher share it.
    pub fn new(
        client: Client,
        max_concurrent: usize,
        limiter: RateLimiter,
        request_delay: Duration,
    ) -> Self {
        Self {
            client,
            gate: Arc::new(Semaphore::new(max_concurrent)),
            limiter,
            request_delay,
        }
    }

    /// Fetches a URL and returns its JSON body
    ///
    /// # Returns
    ///
    /// * `Ok(Some(value))` - 200 with a JSON body
    /// * `Ok(None)` - 404, or a success response that wasn't decodable JSON
    /// * `Err(FetchError)` - everything else; only the zero-quota case is
    ///   retried, exactly once, after the computed sleep
    pub async fn fetch_json(&self, url: &str) -> Result<Option<serde_json::Value>, FetchError> {
        let _permit = self
            .gate
            .acquire()
            .await
            .map_err(|_| FetchError::GateClosed)?;

        let mut slept_for_quota = false;

        loop {
            // Polite delay inside the permit, before each attempt
            tokio::time::sleep(self.request_delay).await;

            tracing::trace!("Requesting URL: {}", url);
            let response = match self.client.get(url).send().await {
                Ok(response) => response,
                Err(e) if e.is_timeout() => {
                    return Err(FetchError::Timeout {
                        url: url.to_string(),
                    })
                }
                Err(e) => {
                    return Err(FetchError::Connection {
                        url: url.to_string(),
                        message: e.to_string(),
                    })
                }
            };

            let signals = RateLimitSignals::from_headers(response.headers());
            if let Some(remaining) = signals.remaining {
                tracing::trace!("Rate limit remaining: {}", remaining);
            }

            // Checked on every response, 403s included (secondary limiter).
            if let Some(wait) = self.limiter.required_sleep(&signals, Utc::now()) {
                if slept_for_quota {
                    return Err(FetchError::RateLimitExhausted {
                        url: url.to_string(),
                    });
                }
                slept_for_quota = true;
                tracing::warn!(
                    "Rate limit exhausted; sleeping {:.1}s before retrying {}",
                    wait.as_secs_f64(),
                    url
                );
                tokio::time::sleep(wait).await;
                continue;
            }

            let status = response.status();

            if status == StatusCode::NOT_FOUND {
                tracing::debug!("Resource not found (404): {}", url);
                return Ok(None);
            }

            if status == StatusCode::FORBIDDEN {
                return Err(FetchError::Forbidden {
                    url: url.to_string(),
                });
            }

            if status.is_server_error() {
                return Err(FetchError::ServerError {
                    url: url.to_string(),
                    status: status.as_u16(),
                });
            }

            if !status.is_success() {
                return Err(FetchError::UnexpectedStatus {
                    url: url.to_string(),
                    status: status.as_u16(),
                });
            }

            let content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("")
                .to_string();

            if !content_type.contains("application/json") {
                tracing::warn!(
                    "Non-JSON response from {} (Content-Type: {})",
                    url,
                    content_type
                );
                return Ok(None);
            }

            return match response.json::<serde_json::Value>().await {
                Ok(value) => Ok(Some(value)),
                Err(e) => {
                    tracing::warn!("Undecodable JSON body from {}: {}", url, e);
                    Ok(None)
                }
            };
        }
    }

    /// Number of permits currently available on the gate
    pub fn available_permits(&self) -> usize {
        self.gate.available_permits()
    }
}
