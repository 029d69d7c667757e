//! Deduplication, recency filtering, ranking and capping.
//!
//! The input is every article of the run in source registry order; the
//! output is what goes into the snapshot.

use chrono::{DateTime, TimeDelta, Utc};
use itertools::Itertools;
use tracing::{debug, info};

use crate::models::Article;

/// Keep valid, recent articles, first occurrence of each URL only.
///
/// An article is valid when its title and url are non-empty. It is recent
/// when `published_at >= run_start - window`. Duplicates are resolved after
/// both gates, so a stale copy never hides a fresh one, and the earliest
/// surviving occurrence wins.
pub fn select(
    articles: Vec<Article>,
    run_start: DateTime<Utc>,
    window: TimeDelta,
) -> Vec<Article> {
    let cutoff = run_start - window;
    let total = articles.len();

    let valid: Vec<Article> = articles
        .into_iter()
        .filter(|a| !a.title.trim().is_empty() && !a.url.trim().is_empty())
        .collect();
    let invalid = total - valid.len();

    let recent: Vec<Article> = valid
        .into_iter()
        .filter(|a| {
            let keep = a.published_at >= cutoff;
            if !keep {
                debug!(url = %a.url, published_at = %a.published_at, "older than recency window");
            }
            keep
        })
        .collect();
    let stale = total - invalid - recent.len();

    let unique: Vec<Article> = recent.into_iter().unique_by(|a| a.url.clone()).collect();
    let duplicates = total - invalid - stale - unique.len();

    info!(
        total,
        invalid,
        stale,
        duplicates,
        kept = unique.len(),
        %cutoff,
        "selected articles"
    );
    unique
}

/// Sort newest first by parsed timestamp and keep at most `max_articles`.
///
/// The sort is stable: equal timestamps keep source order.
pub fn rank_and_cap(mut articles: Vec<Article>, max_articles: usize) -> Vec<Article> {
    articles.sort_by(|a, b| b.published_at.cmp(&a.published_at));
    if articles.len() > max_articles {
        debug!(dropped = articles.len() - max_articles, max_articles, "capping articles");
        articles.truncate(max_articles);
    }
    articles
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::collections::HashSet;

    fn run_start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 6, 18, 0, 0).unwrap()
    }

    fn article(url: &str, source: &str, hours_ago: i64) -> Article {
        Article {
            title: format!("Title for {url}"),
            description: "Description".to_string(),
            url: url.to_string(),
            source: source.to_string(),
            category: Some("research".to_string()),
            published_at: run_start() - TimeDelta::hours(hours_ago),
            image: None,
            reading_time: 1,
        }
    }

    #[test]
    fn test_entry_older_than_window_is_excluded() {
        let kept = select(
            vec![article("https://a.com/old", "A", 30), article("https://a.com/new", "A", 2)],
            run_start(),
            TimeDelta::hours(24),
        );
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].url, "https://a.com/new");
    }

    #[test]
    fn test_first_source_wins_on_duplicate_url() {
        let kept = select(
            vec![
                article("https://same.com/x", "First", 5),
                article("https://other.com/y", "First", 4),
                article("https://same.com/x", "Second", 1),
            ],
            run_start(),
            TimeDelta::hours(24),
        );
        assert_eq!(kept.len(), 2);
        let same = kept.iter().find(|a| a.url == "https://same.com/x").unwrap();
        assert_eq!(same.source, "First");
    }

    #[test]
    fn test_stale_duplicate_does_not_shadow_fresh_copy() {
        let kept = select(
            vec![
                article("https://same.com/x", "First", 48),
                article("https://same.com/x", "Second", 1),
            ],
            run_start(),
            TimeDelta::hours(24),
        );
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].source, "Second");
    }

    #[test]
    fn test_invalid_articles_are_rejected() {
        let mut no_title = article("https://a.com/1", "A", 1);
        no_title.title = "  ".to_string();
        let no_url = article("", "A", 1);
        let kept = select(vec![no_title, no_url], run_start(), TimeDelta::hours(24));
        assert!(kept.is_empty());
    }

    #[test]
    fn test_rank_sorts_by_timestamp_and_caps() {
        let articles: Vec<Article> = (0..40)
            .map(|i| article(&format!("https://a.com/{i}"), "A", (i * 7) % 23))
            .collect();
        let ranked = rank_and_cap(articles, 30);

        assert_eq!(ranked.len(), 30);
        assert!(ranked.windows(2).all(|w| w[0].published_at >= w[1].published_at));
        let urls: HashSet<&str> = ranked.iter().map(|a| a.url.as_str()).collect();
        assert_eq!(urls.len(), 30);
    }

    #[test]
    fn test_rank_uses_timestamps_not_strings() {
        // "9" sorts after "10" as a string but is older as a time
        let mut older = article("https://a.com/old", "A", 0);
        older.published_at = Utc.with_ymd_and_hms(2025, 5, 6, 9, 0, 0).unwrap();
        let mut newer = article("https://a.com/new", "A", 0);
        newer.published_at = Utc.with_ymd_and_hms(2025, 5, 6, 10, 0, 0).unwrap();

        let ranked = rank_and_cap(vec![older, newer], 50);
        assert_eq!(ranked[0].url, "https://a.com/new");
    }
}
