//! Runtime settings shared by every component.
//!
//! [`Settings`] is built once from the command line (see [`crate::cli`]) and
//! is immutable afterwards.

use chrono::TimeDelta;
use std::path::PathBuf;
use std::time::Duration;

use crate::fetch::RetryPolicy;

#[derive(Debug, Clone)]
pub struct Settings {
    /// Where the snapshot is written.
    pub output: PathBuf,
    pub max_articles: usize,
    /// Maximum article age relative to run start.
    pub recency_window: TimeDelta,
    pub max_entries_per_source: usize,
    pub max_description_chars: usize,
    /// Consecutive failed sources tolerated before a run stops fetching.
    pub error_budget: usize,
    /// Sources (and article pages) fetched at the same time.
    pub concurrency: usize,
    pub enrich_images: bool,
    pub request_timeout: Duration,
    pub retry: RetryPolicy,
    pub interval: Duration,
    pub tick: Duration,
    pub error_backoff: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            output: PathBuf::from("ai_news.json"),
            max_articles: 50,
            recency_window: TimeDelta::hours(24),
            max_entries_per_source: 10,
            max_description_chars: 500,
            error_budget: 5,
            concurrency: 4,
            enrich_images: true,
            request_timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
            interval: Duration::from_secs(6 * 60 * 60),
            tick: Duration::from_secs(60),
            error_backoff: Duration::from_secs(5 * 60),
        }
    }
}
