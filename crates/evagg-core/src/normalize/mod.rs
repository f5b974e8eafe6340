//! Record normalization: raw scraper output to canonical [`Event`]s.

pub mod datetime;
pub mod patterns;

pub use datetime::{parse_date, parse_datetime, parse_time, validate_date, validate_time, ALL_DAY};

use chrono::Utc;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, info, warn};

use crate::models::{Event, RawRecord};

/// Normalize a single raw record into a canonical event.
///
/// Trims every recognized text field (absent fields become empty strings;
/// unrecognized fields are dropped), canonicalizes `when_date` and
/// `when_time`, and stamps `scraped_at` when the source did not. Returns
/// `None` when the record has no title after trimming; a missing date is
/// logged but kept.
pub fn normalize_event(record: &RawRecord) -> Option<Event> {
    let mut event = Event {
        title: record.get("title").trim().to_string(),
        description: record.get("description").trim().to_string(),
        location: record.get("location").trim().to_string(),
        registration_url: record.get("registration_url").trim().to_string(),
        event_url: record.get("event_url").trim().to_string(),
        image_url: record.get("image_url").trim().to_string(),
        target_age: record.get("target_age").trim().to_string(),
        source_organization: record.get("source_organization").trim().to_string(),
        scraped_at: record.get("scraped_at").trim().to_string(),
        ..Default::default()
    };

    let raw_date = record.get("when_date").trim();
    if !raw_date.is_empty() {
        event.when_date = parse_date(raw_date);
    }

    let raw_time = record.get("when_time").trim();
    if !raw_time.is_empty() {
        event.when_time = parse_time(raw_time);
    }

    if event.scraped_at.is_empty() {
        event.scraped_at = Utc::now().to_rfc3339();
    }

    if event.title.is_empty() {
        warn!("dropping event without a title");
        return None;
    }

    if event.when_date.is_empty() {
        debug!(title = %event.title, "event has no parseable date");
    }

    Some(event)
}

/// Normalize a batch of records, keeping order and discarding rejections.
///
/// The discard count is observable as `records.len() - result.len()`.
pub fn normalize_events(records: &[RawRecord]) -> Vec<Event> {
    let normalized: Vec<Event> = records.iter().filter_map(normalize_event).collect();
    info!(
        "normalized {} out of {} events",
        normalized.len(),
        records.len()
    );
    normalized
}

/// Strict validation: both `title` and `when_date` must be non-empty.
///
/// Stricter than the rule the pipeline applies: `normalize_event` keeps
/// date-less events and only logs them. Callers that need completeness
/// gating (e.g. a curated export) can apply this instead; the default run
/// path does not.
pub fn validate_event(event: &Event) -> bool {
    event.is_complete()
}

lazy_static! {
    static ref HTML_TAG: Regex = Regex::new(r"<[^>]+>").unwrap();
    static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();
}

/// Strip HTML tags and entities from text and collapse whitespace.
pub fn clean_html_text(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let stripped = HTML_TAG.replace_all(text, "");
    // `&amp;` goes last so "&amp;lt;" stays a literal "&lt;".
    let unescaped = stripped
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&");
    WHITESPACE_RUN.replace_all(&unescaped, " ").trim().to_string()
}

/// Truncate text to `max_length`, appending an ellipsis when cut.
pub fn truncate_text(text: &str, max_length: usize) -> String {
    if text.chars().count() <= max_length {
        return text.to_string();
    }
    let keep = max_length.saturating_sub(3);
    let truncated: String = text.chars().take(keep).collect();
    format!("{truncated}...")
}

/// Resolve a possibly-relative URL against a base page URL.
///
/// Absolute URLs pass through, protocol-relative URLs get an https scheme,
/// and relative paths are joined against `base_url` when one is given.
pub fn normalize_url(url: &str, base_url: &str) -> String {
    let url = url.trim();
    if url.is_empty() {
        return String::new();
    }

    if url.starts_with("http://") || url.starts_with("https://") {
        return url.to_string();
    }

    if let Some(rest) = url.strip_prefix("//") {
        return format!("https://{rest}");
    }

    if !base_url.is_empty() {
        if let Ok(base) = reqwest::Url::parse(base_url) {
            if let Ok(joined) = base.join(url) {
                return joined.to_string();
            }
        }
    }

    url.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(title: &str, date: &str) -> RawRecord {
        let mut r = RawRecord::new();
        r.set("title", title);
        r.set("when_date", date);
        r
    }

    #[test]
    fn normalizes_fields_and_stamps_timestamp() {
        let mut r = RawRecord::new();
        r.set("title", "  Story Time  ");
        r.set("description", " Weekly reading circle ");
        r.set("when_date", "July 15, 2025");
        r.set("when_time", "2:30pm");
        r.set("location", "Main Library");

        let event = normalize_event(&r).unwrap();
        assert_eq!(event.title, "Story Time");
        assert_eq!(event.description, "Weekly reading circle");
        assert_eq!(event.when_date, "2025-07-15");
        assert_eq!(event.when_time, "02:30 PM");
        assert!(!event.scraped_at.is_empty());
    }

    #[test]
    fn rejects_titleless_records() {
        assert!(normalize_event(&record("", "2025-07-15")).is_none());
        assert!(normalize_event(&record("   ", "2025-07-15")).is_none());
    }

    #[test]
    fn keeps_dateless_records() {
        let event = normalize_event(&record("Open Mic", "sometime soon")).unwrap();
        assert_eq!(event.when_date, "");
    }

    #[test]
    fn unrecognized_fields_are_dropped() {
        let mut r = record("Concert", "2025-07-15");
        r.set("internal_id", "xyz-123");
        let event = normalize_event(&r).unwrap();
        let json = serde_json::to_string(&event).unwrap();
        assert!(!json.contains("internal_id"));
    }

    #[test]
    fn preexisting_timestamp_survives() {
        let mut r = record("Concert", "2025-07-15");
        r.set("scraped_at", "2025-07-01T08:00:00+00:00");
        let event = normalize_event(&r).unwrap();
        assert_eq!(event.scraped_at, "2025-07-01T08:00:00+00:00");
    }

    #[test]
    fn batch_discard_count_is_observable() {
        let records = vec![
            record("A", "2025-01-01"),
            record("", "2025-01-02"),
            record("B", ""),
            record(" ", "2025-01-03"),
        ];
        let events = normalize_events(&records);
        assert_eq!(events.len(), 2);
        assert_eq!(records.len() - events.len(), 2);
        assert_eq!(events[0].title, "A");
        assert_eq!(events[1].title, "B");
    }

    #[test]
    fn strict_validation_requires_date() {
        let with_date = normalize_event(&record("A", "2025-01-01")).unwrap();
        let without_date = normalize_event(&record("B", "")).unwrap();
        assert!(validate_event(&with_date));
        assert!(!validate_event(&without_date));
    }

    #[test]
    fn cleans_html_text() {
        assert_eq!(
            clean_html_text("<p>Crafts &amp; games</p>\n  <b>for kids</b>"),
            "Crafts & games for kids"
        );
        assert_eq!(clean_html_text(""), "");
    }

    #[test]
    fn truncates_long_text() {
        assert_eq!(truncate_text("short", 10), "short");
        assert_eq!(truncate_text("abcdefghij", 8), "abcde...");
    }

    #[test]
    fn resolves_urls() {
        assert_eq!(
            normalize_url("https://a.example/x", "https://b.example"),
            "https://a.example/x"
        );
        assert_eq!(
            normalize_url("//cdn.example/img.png", ""),
            "https://cdn.example/img.png"
        );
        assert_eq!(
            normalize_url("/events/5", "https://a.example/list"),
            "https://a.example/events/5"
        );
        assert_eq!(normalize_url("", "https://a.example"), "");
    }
}
