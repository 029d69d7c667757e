//! HTTP retrieval with a single, shared retry policy.
//!
//! Every network call in the pipeline goes through [`Fetcher`], which wraps a
//! browser-like [`HttpClient`] in the [`RetryFetch`] decorator.
//!
//! # Architecture
//!
//! - [`FetchText`]: Core trait for "GET this URL as text"
//! - [`HttpClient`]: `reqwest` implementation with timeout and browser headers
//! - [`RetryFetch`]: Decorator that adds retry logic to any `FetchText` implementation
//! - [`Fetcher`]: The infallible boundary used by the site adapters
//!
//! # Retry Strategy
//!
//! - HTTP 429, 5xx, connection errors and timeouts are retried
//! - Anything else (404, invalid URL, ...) aborts immediately
//! - Exponential backoff `base * 2^(attempt-1)` capped at `max_delay`
//! - Random jitter added on top of each delay

use rand::{Rng, rng};
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue};
use std::fmt;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, error, instrument, warn};

use crate::models::RawEntry;
use crate::scrapers::rss;
use crate::utils::truncate_for_log;

/// Identify as a mainstream desktop browser; several publishers block obvious bots.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Why a single GET failed.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        retryable: bool,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl FetchError {
    fn transport(url: &str, source: reqwest::Error) -> Self {
        FetchError::Transport {
            url: url.to_string(),
            retryable: source.is_timeout() || source.is_connect(),
            source,
        }
    }

    /// Whether another attempt could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Status { status, .. } => *status == 429 || (500..=599).contains(status),
            FetchError::Transport { retryable, .. } => *retryable,
            FetchError::Client(_) => false,
        }
    }
}

/// Backoff schedule shared by every fetch path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    /// Upper bound of the random delay added to each backoff.
    pub jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            jitter: Duration::from_millis(250),
        }
    }
}

impl RetryPolicy {
    /// Delay before the attempt following failed attempt number `attempt` (1-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(16);
        self.base_delay.saturating_mul(1u32 << exp).min(self.max_delay)
    }

    fn jittered(&self, attempt: u32) -> Duration {
        let jitter_ms = self.jitter.as_millis() as u64;
        let extra = if jitter_ms == 0 {
            0
        } else {
            rng().random_range(0..=jitter_ms)
        };
        self.backoff(attempt) + Duration::from_millis(extra)
    }
}

/// Anything that can GET a URL and hand back its body as text.
pub trait FetchText {
    async fn get_text(&self, url: &str) -> Result<String, FetchError>;
}

/// `reqwest` client configured with a timeout and browser-like headers.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,application/rss+xml,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

        let client = reqwest::Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self { client })
    }
}

impl FetchText for HttpClient {
    #[instrument(level = "debug", skip(self))]
    async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::transport(url, e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        resp.text().await.map_err(|e| FetchError::transport(url, e))
    }
}

/// Wrapper that adds exponential backoff retry logic to any [`FetchText`] implementation.
pub struct RetryFetch<T> {
    inner: T,
    policy: RetryPolicy,
}

impl<T> RetryFetch<T> {
    pub fn new(inner: T, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

impl<T> fmt::Debug for RetryFetch<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryFetch")
            .field("policy", &self.policy)
            .finish()
    }
}

impl<T> FetchText for RetryFetch<T>
where
    T: FetchText,
{
    #[instrument(level = "debug", skip(self))]
    async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        let total_t0 = Instant::now();
        let mut attempt = 0u32;

        loop {
            match self.inner.get_text(url).await {
                Ok(body) => return Ok(body),
                Err(e) => {
                    attempt += 1;
                    let elapsed_ms_total = total_t0.elapsed().as_millis();

                    if !e.is_retryable() {
                        warn!(attempt, elapsed_ms_total, error = %e, "non-retryable fetch failure");
                        return Err(e);
                    }
                    if attempt >= self.policy.max_attempts {
                        error!(
                            attempt,
                            max = self.policy.max_attempts,
                            elapsed_ms_total,
                            error = %e,
                            "fetch exhausted retries"
                        );
                        return Err(e);
                    }

                    let delay = self.policy.jittered(attempt);
                    warn!(
                        attempt,
                        max = self.policy.max_attempts,
                        elapsed_ms_total,
                        ?delay,
                        error = %e,
                        "fetch attempt failed; backing off"
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}

/// The fetch boundary used by the pipeline. Nothing past this point raises:
/// failures are logged and turn into empty results.
#[derive(Debug)]
pub struct Fetcher {
    inner: RetryFetch<HttpClient>,
    max_entries: usize,
}

impl Fetcher {
    /// * `timeout` - Per-request timeout
    /// * `policy` - Retry schedule applied to every request
    /// * `max_entries` - Cap on entries kept per feed
    pub fn new(
        timeout: Duration,
        policy: RetryPolicy,
        max_entries: usize,
    ) -> Result<Self, FetchError> {
        Ok(Self {
            inner: RetryFetch::new(HttpClient::new(timeout)?, policy),
            max_entries,
        })
    }

    /// Download a feed and parse its entries.
    ///
    /// Returns an empty vector when the feed cannot be downloaded after
    /// retries or is not well-formed XML.
    #[instrument(level = "info", skip(self))]
    pub async fn fetch_feed(&self, url: &str) -> Vec<RawEntry> {
        let body = match self.inner.get_text(url).await {
            Ok(body) => body,
            Err(e) => {
                warn!(error = %e, "feed fetch failed; skipping");
                return Vec::new();
            }
        };

        match rss::parse_feed(&body) {
            Ok(mut entries) => {
                entries.truncate(self.max_entries);
                debug!(count = entries.len(), "parsed feed entries");
                entries
            }
            Err(e) => {
                warn!(
                    error = %e,
                    body_preview = %truncate_for_log(&body, 200),
                    "malformed feed; skipping"
                );
                Vec::new()
            }
        }
    }

    /// Download a page as markup. An empty string means the fetch failed.
    #[instrument(level = "info", skip(self))]
    pub async fn fetch_page(&self, url: &str) -> String {
        match self.inner.get_text(url).await {
            Ok(body) => body,
            Err(e) => {
                warn!(error = %e, "page fetch failed");
                String::new()
            }
        }
    }
}
