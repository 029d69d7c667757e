//! Turning raw entries into clean [`Article`]s.
//!
//! - [`text`]: markup stripping, character filtering, truncation, reading time
//! - [`dates`]: ordered date-format parsing with a current-time fallback
//! - [`image`]: preview-image discovery on an article page

use chrono::{DateTime, Utc};
use html_escape::decode_html_entities;
use tracing::debug;

use crate::models::{Article, FeedSource, RawEntry};

pub mod dates;
pub mod image;
pub mod text;

/// Build an article from a raw entry.
///
/// Returns `None` when the entry has no URL, or when its title or
/// description is empty once cleaned. The description falls back to the
/// entry's content when the feed carries no summary.
pub fn article_from_entry(
    entry: &RawEntry,
    source: &FeedSource,
    now: DateTime<Utc>,
    max_description_chars: usize,
) -> Option<Article> {
    let Some(url) = entry.url().map(|u| decode_html_entities(u).trim().to_string()) else {
        debug!(source = %source.name, title = ?entry.title, "entry without a link; dropping");
        return None;
    };

    let title = text::clean_text(entry.title.as_deref().unwrap_or_default());
    if title.is_empty() {
        debug!(source = %source.name, %url, "empty title after cleaning; dropping");
        return None;
    }

    let description = [&entry.description, &entry.content]
        .into_iter()
        .flatten()
        .map(|raw| text::clean_text(raw))
        .find(|cleaned| !cleaned.is_empty())
        .map(|cleaned| text::truncate_chars(&cleaned, max_description_chars))
        .unwrap_or_default();
    if description.is_empty() {
        debug!(source = %source.name, %url, "empty description after cleaning; dropping");
        return None;
    }

    let image = entry
        .image
        .as_deref()
        .map(|i| decode_html_entities(i).trim().to_string())
        .filter(|i| !i.is_empty());

    Some(Article {
        reading_time: text::reading_time(&description),
        title,
        description,
        url,
        source: source.name.clone(),
        category: Some(source.category.clone()),
        published_at: dates::normalize_date(entry.date(), now),
        image,
    })
}
