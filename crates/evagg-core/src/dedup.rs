//! Event identity and deduplication.
//!
//! Two events are the same real-world event when their lowercased, trimmed
//! `(title, when_date, location)` triples match. Fingerprint identity is
//! the sole dedup key; no fuzzy clustering happens in the default path.

use std::collections::HashSet;

use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::models::Event;

/// Content fingerprint of an event's identity fields.
///
/// Deterministic: field-equal inputs always produce the same digest.
pub fn fingerprint(event: &Event) -> String {
    let title = event.title.trim().to_lowercase();
    let date = event.when_date.trim().to_lowercase();
    let location = event.location.trim().to_lowercase();

    let mut hasher = Sha256::new();
    hasher.update(format!("{title}|{date}|{location}"));
    hex::encode(hasher.finalize())
}

/// Remove duplicate events, keeping the first occurrence of each fingerprint.
///
/// Single pass, input order preserved. First-seen-wins even when a later
/// duplicate carries more complete data; callers wanting union-of-fields
/// semantics can apply [`merge_events`] themselves.
pub fn deduplicate(events: Vec<Event>) -> Vec<Event> {
    let total = events.len();
    let mut seen: HashSet<String> = HashSet::with_capacity(total);
    let mut unique: Vec<Event> = Vec::with_capacity(total);
    let mut duplicates = 0usize;

    for event in events {
        let hash = fingerprint(&event);
        if seen.insert(hash) {
            unique.push(event);
        } else {
            duplicates += 1;
            debug!(title = %event.title, date = %event.when_date, "duplicate event");
        }
    }

    if duplicates > 0 {
        info!("removed {duplicates} duplicate events");
    }
    info!("kept {} unique events out of {total} total", unique.len());

    unique
}

/// Remove duplicates by `event_url`; events without a URL are always kept.
///
/// Useful when the same event appears on multiple listing pages but shares
/// one detail page.
pub fn deduplicate_by_url(events: Vec<Event>) -> Vec<Event> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut unique: Vec<Event> = Vec::with_capacity(events.len());
    let mut duplicates = 0usize;

    for event in events {
        let url = event.event_url.trim().to_string();
        if url.is_empty() || seen.insert(url) {
            unique.push(event);
        } else {
            duplicates += 1;
            debug!(url = %event.event_url, "duplicate event URL");
        }
    }

    if duplicates > 0 {
        info!("removed {duplicates} duplicate events by URL");
    }

    unique
}

/// Merge two events field-wise, preferring `first`'s non-empty values.
///
/// Not applied by the default pipeline path, which keeps the first-seen
/// event untouched.
pub fn merge_events(first: &Event, second: &Event) -> Event {
    let pick = |a: &str, b: &str| {
        if a.is_empty() { b.to_string() } else { a.to_string() }
    };

    Event {
        title: pick(&first.title, &second.title),
        description: pick(&first.description, &second.description),
        when_date: pick(&first.when_date, &second.when_date),
        when_time: pick(&first.when_time, &second.when_time),
        location: pick(&first.location, &second.location),
        registration_url: pick(&first.registration_url, &second.registration_url),
        event_url: pick(&first.event_url, &second.event_url),
        image_url: pick(&first.image_url, &second.image_url),
        target_age: pick(&first.target_age, &second.target_age),
        source_organization: pick(&first.source_organization, &second.source_organization),
        scraped_at: pick(&first.scraped_at, &second.scraped_at),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(title: &str, date: &str, location: &str) -> Event {
        Event {
            title: title.to_string(),
            when_date: date.to_string(),
            location: location.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn fingerprint_is_deterministic() {
        let a = event("Story Time", "2025-01-01", "Hall");
        assert_eq!(fingerprint(&a), fingerprint(&a.clone()));
        assert_eq!(fingerprint(&a).len(), 64);
    }

    #[test]
    fn fingerprint_ignores_case_and_whitespace() {
        let a = event("Story Time", "2025-01-01", "Hall");
        let b = event("  STORY TIME ", " 2025-01-01", " hall ");
        assert_eq!(fingerprint(&a), fingerprint(&b));
    }

    #[test]
    fn fingerprint_distinguishes_fields() {
        let a = event("Story Time", "2025-01-01", "Hall");
        let b = event("Story Time", "2025-01-02", "Hall");
        assert_ne!(fingerprint(&a), fingerprint(&b));
    }

    #[test]
    fn first_seen_wins() {
        let mut a = event("X", "2025-01-01", "Hall");
        a.description = "short".to_string();
        let mut b = event("x", "2025-01-01", "hall");
        b.description = "long, detailed".to_string();

        let unique = deduplicate(vec![a.clone(), b]);
        assert_eq!(unique, vec![a]);
    }

    #[test]
    fn dedup_is_idempotent() {
        let events = vec![
            event("A", "2025-01-01", "Hall"),
            event("A", "2025-01-01", "Hall"),
            event("B", "2025-01-02", "Park"),
        ];
        let once = deduplicate(events);
        let twice = deduplicate(once.clone());
        assert_eq!(once, twice);
        assert_eq!(once.len(), 2);
    }

    #[test]
    fn dedup_preserves_input_order() {
        let events = vec![
            event("C", "2025-01-03", ""),
            event("A", "2025-01-01", ""),
            event("B", "2025-01-02", ""),
        ];
        let titles: Vec<String> = deduplicate(events).into_iter().map(|e| e.title).collect();
        assert_eq!(titles, vec!["C", "A", "B"]);
    }

    #[test]
    fn url_dedup_keeps_urlless_events() {
        let mut a = event("A", "2025-01-01", "");
        a.event_url = "https://x.example/e/1".to_string();
        let mut b = event("B", "2025-01-02", "");
        b.event_url = "https://x.example/e/1".to_string();
        let c = event("C", "2025-01-03", "");
        let d = event("D", "2025-01-04", "");

        let unique = deduplicate_by_url(vec![a, b, c, d]);
        let titles: Vec<String> = unique.into_iter().map(|e| e.title).collect();
        assert_eq!(titles, vec!["A", "C", "D"]);
    }

    #[test]
    fn merge_prefers_first_nonempty() {
        let mut a = event("A", "", "Hall");
        a.description = "short".to_string();
        let mut b = event("ignored", "2025-01-01", "other");
        b.description = "long".to_string();
        b.image_url = "https://x.example/i.png".to_string();

        let merged = merge_events(&a, &b);
        assert_eq!(merged.title, "A");
        assert_eq!(merged.description, "short");
        assert_eq!(merged.when_date, "2025-01-01");
        assert_eq!(merged.image_url, "https://x.example/i.png");
    }
}
