//! # AI News Feed
//!
//! Aggregates recent artificial-intelligence news from RSS/Atom feeds and
//! scraped listing pages into one JSON snapshot that a website polls.
//!
//! ## Usage
//!
//! ```sh
//! ai_news_feed --output ./site/ai_news.json
//! ai_news_feed --once --sources ./sources.yaml
//! ```
//!
//! ## Architecture
//!
//! Every run follows the same pipeline:
//! 1. **Fetching**: each registry source through its site adapter, with retries and a fallback URL
//! 2. **Normalization**: markup stripping, date parsing, reading time
//! 3. **Curation**: validity and recency gates, first-source-wins dedup, newest first, capped
//! 4. **Enrichment**: preview images from article pages
//! 5. **Output**: an atomic write of the snapshot file
//!
//! Without `--once` the scheduler repeats the run every `--interval-hours`.

use clap::Parser;
use std::error::Error;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod curate;
mod error;
mod fetch;
mod models;
mod normalize;
mod outputs;
mod pipeline;
mod registry;
mod scheduler;
mod scrapers;
#[cfg(test)]
mod test_support;
mod utils;

use cli::Cli;
use outputs::json::read_snapshot;
use pipeline::Pipeline;
use registry::Registry;
use scheduler::Scheduler;
use utils::ensure_writable_dir;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "ai_news_feed starting up");

    let args = Cli::parse();
    let settings = args.settings();
    debug!(?args, "Parsed CLI arguments");

    let registry = match &args.sources {
        Some(path) => Registry::load(path)?,
        None => Registry::builtin()?,
    };
    info!(
        sources = registry.sources().len(),
        categories = ?registry.categories(),
        "Source registry ready"
    );

    // Early check: a bad output directory is reported now, but the run still
    // proceeds and surfaces it as a persistence error.
    if let Some(dir) = settings.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = ensure_writable_dir(dir).await {
            warn!(
                path = %dir.display(),
                error = %e,
                "Output directory is not writable (fix perms or choose a different path)"
            );
        }
    }

    match read_snapshot(&settings.output).await {
        Some(previous) => info!(
            last_updated = %previous.last_updated,
            articles = previous.total_articles,
            status = ?previous.status,
            "Found previous snapshot"
        ),
        None => info!(path = %settings.output.display(), "No previous snapshot"),
    }

    let scheduler = Scheduler::from(&settings);
    let pipeline = Arc::new(Pipeline::new(registry, settings)?);

    if args.once {
        let report = pipeline.run().await?;
        info!(?report, "Single run complete");
        return Ok(());
    }

    let runs = scheduler
        .run(
            move || {
                let pipeline = Arc::clone(&pipeline);
                async move { pipeline.run().await }
            },
            shutdown_signal(),
        )
        .await;
    info!(runs, "ai_news_feed stopped");
    Ok(())
}

/// Resolves on Ctrl-C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl-C"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
