//! HTTP fetch unit: GET with bounded retry, decoded into a typed payload.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use crate::http_client::{HttpClient, HttpErrorKind, HttpRequest};
use crate::retry::RetryConfig;

/// Browser-like agent; the upstream rejects unknown clients with 403.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:122.0) Gecko/20100101 Firefox/122.0";

/// Failure kinds of a single fetch.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("network error ({kind}) for {url}: {message}")]
    NetworkError {
        url: String,
        kind: HttpErrorKind,
        message: String,
    },

    #[error("still rate limited after {attempts} attempts: {url}")]
    RateLimitExhausted { url: String, attempts: u32 },

    #[error("unexpected status {status} for {url}")]
    UnexpectedStatus { url: String, status: u16 },

    #[error("failed to decode response from {url}: {message}")]
    DecodeError { url: String, message: String },
}

impl FetchError {
    pub fn url(&self) -> &str {
        match self {
            Self::NetworkError { url, .. }
            | Self::RateLimitExhausted { url, .. }
            | Self::UnexpectedStatus { url, .. }
            | Self::DecodeError { url, .. } => url,
        }
    }

    /// True when the transport gave up waiting for the upstream.
    pub const fn is_timeout(&self) -> bool {
        matches!(
            self,
            Self::NetworkError {
                kind: HttpErrorKind::Timeout,
                ..
            }
        )
    }

    pub(crate) fn decode(url: &str, message: impl Into<String>) -> Self {
        Self::DecodeError {
            url: url.to_string(),
            message: message.into(),
        }
    }
}

/// Transport settings shared by every request.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchConfig {
    pub timeout_ms: u64,
    pub user_agent: String,
    pub retry: RetryConfig,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 10_000,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            retry: RetryConfig::default(),
        }
    }
}

/// Immutable fetcher; clones share the transport and config.
#[derive(Clone)]
pub struct Fetcher {
    client: Arc<dyn HttpClient>,
    config: Arc<FetchConfig>,
}

impl Fetcher {
    pub fn new(client: Arc<dyn HttpClient>, config: FetchConfig) -> Self {
        Self {
            client,
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Fetches `url` and decodes the body as JSON into `T`.
    pub async fn fetch_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        let body = self.fetch_text(url).await?;
        serde_json::from_str(&body).map_err(|e| FetchError::decode(url, e.to_string()))
    }

    /// Fetches `url`, retrying only on the configured statuses.
    pub async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        let retry = &self.config.retry;
        let attempts = retry.attempts();
        let mut attempt = 0;

        loop {
            attempt += 1;
            let request = HttpRequest::get(url)
                .with_header("user-agent", self.config.user_agent.as_str())
                .with_header("accept", "application/json")
                .with_timeout_ms(self.config.timeout_ms);

            let response =
                self.client
                    .execute(request)
                    .await
                    .map_err(|error| FetchError::NetworkError {
                        url: url.to_string(),
                        kind: error.kind(),
                        message: error.message().to_string(),
                    })?;

            if response.is_success() {
                return Ok(response.body);
            }

            if !retry.should_retry_status(response.status) {
                return Err(FetchError::UnexpectedStatus {
                    url: url.to_string(),
                    status: response.status,
                });
            }

            if attempt >= attempts {
                return Err(FetchError::RateLimitExhausted {
                    url: url.to_string(),
                    attempts: attempt,
                });
            }

            let delay = retry.delay_for_retry(attempt - 1);
            debug!(
                url,
                status = response.status,
                attempt,
                delay_ms = delay.as_millis() as u64,
                "retrying rate limited request"
            );
            tokio::time::sleep(delay).await;
        }
    }
}

impl std::fmt::Debug for Fetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fetcher")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
