//! Publish-date normalization.
//!
//! Upstream dates arrive in whatever format the publisher's CMS emits. Each
//! known format is tried in order; naive values are taken as UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use tracing::debug;

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%d %b %Y %H:%M:%S",
    "%a, %d %b %Y %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%B %d, %Y", "%b %d, %Y", "%d %B %Y", "%d %b %Y", "%Y-%m-%d"];

/// Parse a date string in any known format.
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    // offsets without a colon, e.g. 2025-05-06T10:00:00+0000
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z") {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, fmt) {
            return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
        }
    }
    None
}

/// Parse `raw`, substituting `now` when it is missing or unparseable.
///
/// The substitution is lossy: an undated entry looks freshly published and
/// always passes the recency filter.
pub fn normalize_date(raw: Option<&str>, now: DateTime<Utc>) -> DateTime<Utc> {
    match raw.and_then(parse_date) {
        Some(dt) => dt,
        None => {
            debug!(raw = ?raw, "unparseable publish date; using current time");
            now
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    #[test]
    fn test_rfc2822_with_named_and_numeric_zones() {
        assert_eq!(
            parse_date("Tue, 06 May 2025 14:30:00 GMT"),
            Some(utc(2025, 5, 6, 14, 30, 0))
        );
        assert_eq!(
            parse_date("Tue, 06 May 2025 10:30:00 -0400"),
            Some(utc(2025, 5, 6, 14, 30, 0))
        );
    }

    #[test]
    fn test_rfc3339_is_converted_to_utc() {
        assert_eq!(
            parse_date("2025-05-06T10:00:00-04:00"),
            Some(utc(2025, 5, 6, 14, 0, 0))
        );
        assert_eq!(
            parse_date("2025-05-06T10:00:00+0000"),
            Some(utc(2025, 5, 6, 10, 0, 0))
        );
    }

    #[test]
    fn test_naive_formats_are_utc() {
        assert_eq!(parse_date("2025-05-06 14:30:00"), Some(utc(2025, 5, 6, 14, 30, 0)));
        let with_millis = utc(2025, 5, 6, 14, 30, 0) + chrono::Duration::milliseconds(250);
        assert_eq!(parse_date("2025-05-06T14:30:00.250"), Some(with_millis));
        assert_eq!(parse_date("May 6, 2025"), Some(utc(2025, 5, 6, 0, 0, 0)));
        assert_eq!(parse_date("2025-05-06"), Some(utc(2025, 5, 6, 0, 0, 0)));
    }

    #[test]
    fn test_garbage_is_none() {
        assert_eq!(parse_date("2 hours ago"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn test_normalize_date_falls_back_to_now() {
        let now = utc(2025, 5, 6, 18, 0, 0);
        assert_eq!(normalize_date(Some("yesterday-ish"), now), now);
        assert_eq!(normalize_date(None, now), now);
        assert_eq!(
            normalize_date(Some("2025-05-06 12:00:00"), now),
            utc(2025, 5, 6, 12, 0, 0)
        );
    }
}
