//! Command-line interface definitions for the AI news feed.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! All arguments can be provided via command-line flags or environment variables.

use chrono::TimeDelta;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::Settings;
use crate::fetch::RetryPolicy;

/// Command-line arguments for the AI news feed aggregator.
///
/// # Examples
///
/// ```sh
/// # Long-running poller with the built-in sources
/// ai_news_feed --output ./site/ai_news.json
///
/// # Single pass from cron with a custom registry
/// ai_news_feed --once --sources ./sources.yaml --output ./site/ai_news.json
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path of the JSON snapshot the website reads
    #[arg(short, long, env = "AI_NEWS_OUTPUT", default_value = "ai_news.json")]
    pub output: PathBuf,

    /// YAML source registry; the built-in registry is used when omitted
    #[arg(short, long, env = "AI_NEWS_SOURCES")]
    pub sources: Option<PathBuf>,

    /// Run the pipeline once and exit (for cron)
    #[arg(long)]
    pub once: bool,

    /// Maximum number of articles in the snapshot
    #[arg(long, env = "AI_NEWS_MAX_ARTICLES", default_value_t = 50,
          value_parser = clap::value_parser!(u32).range(1..))]
    pub max_articles: u32,

    /// Maximum article age in hours
    #[arg(long, env = "AI_NEWS_RECENCY_HOURS", default_value_t = 24,
          value_parser = clap::value_parser!(u32).range(1..))]
    pub recency_hours: u32,

    /// Hours between pipeline runs
    #[arg(long, env = "AI_NEWS_INTERVAL_HOURS", default_value_t = 6,
          value_parser = clap::value_parser!(u32).range(1..))]
    pub interval_hours: u32,

    /// Seconds the scheduler sleeps between elapsed-time checks
    #[arg(long, env = "AI_NEWS_TICK_SECS", default_value_t = 60)]
    pub tick_secs: u64,

    /// Seconds to back off after a failed run
    #[arg(long, env = "AI_NEWS_ERROR_BACKOFF_SECS", default_value_t = 300)]
    pub error_backoff_secs: u64,

    /// Per-request timeout in seconds
    #[arg(long, env = "AI_NEWS_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,

    /// Attempts per request, including the first
    #[arg(long, env = "AI_NEWS_RETRY_ATTEMPTS", default_value_t = 3,
          value_parser = clap::value_parser!(u32).range(1..))]
    pub retry_attempts: u32,

    /// First retry delay in milliseconds; doubles on each further attempt
    #[arg(long, env = "AI_NEWS_RETRY_BASE_MS", default_value_t = 1000)]
    pub retry_base_ms: u64,

    /// Consecutive failed sources before a run stops fetching
    #[arg(long, env = "AI_NEWS_ERROR_BUDGET", default_value_t = 5)]
    pub error_budget: usize,

    /// Sources fetched concurrently (1 = strictly sequential)
    #[arg(long, env = "AI_NEWS_CONCURRENCY", default_value_t = 4,
          value_parser = clap::value_parser!(u32).range(1..))]
    pub concurrency: u32,

    /// Entries kept from each feed or page
    #[arg(long, env = "AI_NEWS_MAX_ENTRIES", default_value_t = 10)]
    pub max_entries_per_source: usize,

    /// Description length limit in characters
    #[arg(long, env = "AI_NEWS_MAX_DESCRIPTION_CHARS", default_value_t = 500)]
    pub max_description_chars: usize,

    /// Skip fetching article pages to look for preview images
    #[arg(long, env = "AI_NEWS_NO_IMAGES")]
    pub no_images: bool,
}

impl Cli {
    /// Resolve the parsed arguments into runtime [`Settings`].
    pub fn settings(&self) -> Settings {
        let defaults = Settings::default();
        Settings {
            output: self.output.clone(),
            max_articles: self.max_articles as usize,
            recency_window: TimeDelta::hours(i64::from(self.recency_hours)),
            max_entries_per_source: self.max_entries_per_source,
            max_description_chars: self.max_description_chars,
            error_budget: self.error_budget,
            concurrency: self.concurrency as usize,
            enrich_images: !self.no_images,
            request_timeout: Duration::from_secs(self.timeout_secs),
            retry: RetryPolicy {
                max_attempts: self.retry_attempts,
                base_delay: Duration::from_millis(self.retry_base_ms),
                ..defaults.retry
            },
            interval: Duration::from_secs(u64::from(self.interval_hours) * 60 * 60),
            tick: Duration::from_secs(self.tick_secs),
            error_backoff: Duration::from_secs(self.error_backoff_secs),
        }
    }
}
