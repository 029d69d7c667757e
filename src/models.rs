//! Data models for sources, articles and the persisted snapshot.
//!
//! This module defines the core data structures used throughout the application:
//! - [`FeedSource`]: One registry entry (feed or page) to pull articles from
//! - [`RawEntry`]: Source-specific fields as extracted by a site adapter
//! - [`Article`]: A cleaned, normalized article ready for the snapshot
//! - [`Snapshot`]: The JSON document consumed by the static site
//!
//! Serialized names use camelCase to match the JSON the website reads, and the
//! struct field order is the on-disk field order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How a source is retrieved and parsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// RSS 2.0, RSS 1.0 (RDF) or Atom feed.
    #[default]
    Rss,
    /// HTML listing page scraped with selector strategies.
    Page,
}

/// CSS selectors describing how one markup variant of a listing page is laid out.
///
/// `item` selects each article card; the remaining selectors are evaluated
/// inside the card. `link` falls back to `title` when the title element is
/// itself the anchor.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SelectorStrategy {
    pub item: String,
    pub title: String,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

/// A single source declared in the registry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FeedSource {
    /// Display name written to [`Article::source`].
    pub name: String,
    pub url: String,
    pub category: String,
    /// Tried when `url` yields nothing.
    #[serde(default)]
    pub fallback_url: Option<String>,
    #[serde(default)]
    pub kind: SourceKind,
    /// Built-in site adapter for `page` sources (e.g. `"techcrunch"`).
    #[serde(default)]
    pub site: Option<String>,
    /// Custom selector strategies for `page` sources, tried in order.
    #[serde(default)]
    pub selectors: Vec<SelectorStrategy>,
}

/// Fields pulled out of a feed entry or an HTML card before any cleaning.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawEntry {
    pub title: Option<String>,
    pub link: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub guid: Option<String>,
    pub published: Option<String>,
    pub updated: Option<String>,
    pub created: Option<String>,
    pub image: Option<String>,
}

impl RawEntry {
    /// First populated date field, in published / updated / created order.
    pub fn date(&self) -> Option<&str> {
        [&self.published, &self.updated, &self.created]
            .into_iter()
            .flatten()
            .map(|s| s.trim())
            .find(|s| !s.is_empty())
    }

    /// The entry link, or the guid when it is itself an http(s) URL.
    pub fn url(&self) -> Option<&str> {
        let link = self.link.as_deref().map(str::trim).filter(|s| !s.is_empty());
        link.or_else(|| {
            self.guid
                .as_deref()
                .map(str::trim)
                .filter(|g| g.starts_with("http://") || g.starts_with("https://"))
        })
    }
}

/// A normalized article as written to the snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub title: String,
    pub description: String,
    pub url: String,
    pub source: String,
    pub category: Option<String>,
    pub published_at: DateTime<Utc>,
    pub image: Option<String>,
    /// Estimated minutes to read the description.
    pub reading_time: u32,
}

impl Article {
    /// The article written when a run produced nothing at all.
    pub fn unavailable(now: DateTime<Utc>) -> Self {
        Self {
            title: "AI news is temporarily unavailable".to_string(),
            description: "We could not reach any of our news sources right now. \
                          The feed will refresh automatically, please check back later."
                .to_string(),
            url: "#".to_string(),
            source: "AI News Feed".to_string(),
            category: None,
            published_at: now,
            image: None,
            reading_time: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotStatus {
    Success,
    Error,
}

/// The JSON document the website polls.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub articles: Vec<Article>,
    pub last_updated: DateTime<Utc>,
    pub total_articles: usize,
    pub categories: Vec<String>,
    pub status: SnapshotStatus,
}

impl Snapshot {
    /// Build the snapshot for a run. An empty article list turns into the
    /// single placeholder article with `status = "error"`.
    pub fn from_articles(
        articles: Vec<Article>,
        categories: Vec<String>,
        now: DateTime<Utc>,
    ) -> Self {
        let (articles, status) = if articles.is_empty() {
            (vec![Article::unavailable(now)], SnapshotStatus::Error)
        } else {
            (articles, SnapshotStatus::Success)
        };
        Self {
            total_articles: articles.len(),
            articles,
            last_updated: now,
            categories,
            status,
        }
    }
}
