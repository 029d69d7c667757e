//! One end-to-end aggregation run.
//!
//! Sources are fetched through an ordered bounded pool and merged back in
//! registry order, so the registry order is also the deduplication
//! priority. After normalization and curation the surviving articles are
//! optionally enriched with preview images and the snapshot is written.

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use std::pin::pin;
use tracing::{debug, info, instrument, warn};

use crate::config::Settings;
use crate::curate;
use crate::error::Result;
use crate::fetch::Fetcher;
use crate::models::{Article, FeedSource, RawEntry, Snapshot, SnapshotStatus};
use crate::normalize::{article_from_entry, image::find_preview_image};
use crate::outputs::json::write_snapshot;
use crate::registry::Registry;

/// Summary of a finished run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub sources_attempted: usize,
    pub sources_ok: usize,
    pub sources_failed: usize,
    /// The error budget stopped the run before every source was tried.
    pub halted_early: bool,
    pub articles: usize,
    pub status: SnapshotStatus,
}

pub struct Pipeline {
    registry: Registry,
    settings: Settings,
    fetcher: Fetcher,
}

impl Pipeline {
    /// Build the pipeline and its HTTP client.
    pub fn new(registry: Registry, settings: Settings) -> Result<Self> {
        let fetcher = Fetcher::new(
            settings.request_timeout,
            settings.retry,
            settings.max_entries_per_source,
        )?;
        Ok(Self {
            registry,
            settings,
            fetcher,
        })
    }

    /// Fetch every source, curate, and write the snapshot.
    ///
    /// Individual source failures never fail the run. The only error is a
    /// snapshot that could not be persisted.
    #[instrument(level = "info", skip(self), fields(output = %self.settings.output.display()))]
    pub async fn run(&self) -> Result<RunReport> {
        let run_start = Utc::now();
        let (articles, mut report) = self.collect(run_start).await;

        let selected = curate::select(articles, run_start, self.settings.recency_window);
        let mut ranked = curate::rank_and_cap(selected, self.settings.max_articles);
        if self.settings.enrich_images {
            self.enrich_images(&mut ranked).await;
        }

        let snapshot = Snapshot::from_articles(ranked, self.registry.categories(), Utc::now());
        write_snapshot(&snapshot, &self.settings.output).await?;

        report.articles = snapshot.total_articles;
        report.status = snapshot.status;
        info!(
            attempted = report.sources_attempted,
            ok = report.sources_ok,
            failed = report.sources_failed,
            halted_early = report.halted_early,
            articles = report.articles,
            status = ?report.status,
            "run finished"
        );
        Ok(report)
    }

    /// Fetch sources in registry order and normalize their entries.
    ///
    /// Results are evaluated in order against the error budget. Once it is
    /// spent nothing new is queued, though up to `concurrency` sources that
    /// were already in flight may have sent their requests.
    async fn collect(&self, run_start: DateTime<Utc>) -> (Vec<Article>, RunReport) {
        let mut report = RunReport {
            sources_attempted: 0,
            sources_ok: 0,
            sources_failed: 0,
            halted_early: false,
            articles: 0,
            status: SnapshotStatus::Error,
        };
        let mut articles = Vec::new();
        let mut consecutive_failures = 0;

        let sources = self.registry.sources();
        let mut results = pin!(
            stream::iter(0..sources.len())
                .map(|i| {
                    let source = &sources[i];
                    async move { (source, self.fetch_source(source).await) }
                })
                .buffered(self.settings.concurrency.max(1))
        );

        while let Some((source, entries)) = results.next().await {
            report.sources_attempted += 1;
            if entries.is_empty() {
                report.sources_failed += 1;
                consecutive_failures += 1;
                warn!(
                    source = %source.name,
                    consecutive_failures,
                    "source produced no entries"
                );
                let budget = self.settings.error_budget;
                if budget > 0 && consecutive_failures >= budget {
                    warn!(
                        budget,
                        remaining = sources.len() - report.sources_attempted,
                        "error budget exhausted; skipping remaining sources"
                    );
                    report.halted_early = report.sources_attempted < sources.len();
                    break;
                }
                continue;
            }

            report.sources_ok += 1;
            consecutive_failures = 0;
            let before = articles.len();
            articles.extend(entries.iter().filter_map(|entry| {
                article_from_entry(entry, source, run_start, self.settings.max_description_chars)
            }));
            info!(
                source = %source.name,
                entries = entries.len(),
                articles = articles.len() - before,
                "processed source"
            );
        }

        (articles, report)
    }

    /// Primary URL first, then the fallback URL if the primary gave nothing.
    async fn fetch_source(&self, source: &FeedSource) -> Vec<RawEntry> {
        let adapter = self.registry.adapter_for(source);
        let limit = self.settings.max_entries_per_source;

        let mut entries = adapter.fetch(&self.fetcher, &source.url).await;
        if entries.is_empty() {
            if let Some(fallback) = source.fallback_url.as_deref() {
                info!(
                    source = %source.name,
                    %fallback,
                    "primary URL gave nothing; trying fallback"
                );
                entries = adapter.fetch(&self.fetcher, fallback).await;
            }
        }
        entries.truncate(limit);
        debug!(
            source = %source.name,
            adapter = adapter.name(),
            count = entries.len(),
            "fetched source"
        );
        entries
    }

    /// Look up preview images for articles whose entry carried none.
    async fn enrich_images(&self, articles: &mut [Article]) {
        let missing: Vec<(usize, String)> = articles
            .iter()
            .enumerate()
            .filter(|(_, a)| a.image.is_none())
            .map(|(i, a)| (i, a.url.clone()))
            .collect();
        if missing.is_empty() {
            return;
        }

        let found: Vec<(usize, Option<String>)> = stream::iter(missing)
            .map(|(i, url)| async move {
                let html = self.fetcher.fetch_page(&url).await;
                let image = if html.is_empty() {
                    None
                } else {
                    find_preview_image(&html, &url)
                };
                (i, image)
            })
            .buffered(self.settings.concurrency.max(1))
            .collect()
            .await;

        let mut enriched = 0;
        for (i, image) in found {
            if image.is_some() {
                enriched += 1;
            }
            articles[i].image = image;
        }
        info!(enriched, "added preview images");
    }
}
