//! Event data models.

use std::collections::BTreeMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Unvalidated field mapping produced by one extraction strategy.
///
/// Any field may be missing, empty, or malformed; the normalizer is the
/// only component that turns these into [`Event`]s.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    fields: BTreeMap<String, String>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a record with the standard field set, trimming each value.
    ///
    /// `source` and a fresh `scraped_at` timestamp are filled in here so
    /// individual strategies never have to.
    #[allow(clippy::too_many_arguments)]
    pub fn from_fields(
        source: &str,
        title: &str,
        description: &str,
        when_date: &str,
        when_time: &str,
        location: &str,
        registration_url: &str,
        image_url: &str,
        target_age: &str,
        event_url: &str,
    ) -> Self {
        let mut record = Self::new();
        record.set("title", title.trim());
        record.set("description", description.trim());
        record.set("when_date", when_date.trim());
        record.set("when_time", when_time.trim());
        record.set("location", location.trim());
        record.set("registration_url", registration_url.trim());
        record.set("image_url", image_url.trim());
        record.set("target_age", target_age.trim());
        record.set("event_url", event_url.trim());
        record.set("source_organization", source);
        record.set("scraped_at", &Utc::now().to_rfc3339());
        record
    }

    pub fn set(&mut self, key: &str, value: &str) {
        self.fields.insert(key.to_string(), value.to_string());
    }

    /// Field value, or empty string when absent.
    pub fn get(&self, key: &str) -> &str {
        self.fields.get(key).map(String::as_str).unwrap_or("")
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Canonical, validated event record ready for deduplication and export.
///
/// All fields are strings; `when_date` is `YYYY-MM-DD` or empty, `when_time`
/// is `HH:MM AM/PM`, the `All Day` sentinel, the original unparsed text, or
/// empty. An event is valid only if `title` is non-empty after trimming.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub title: String,
    pub description: String,
    pub when_date: String,
    pub when_time: String,
    pub location: String,
    pub registration_url: String,
    pub event_url: String,
    pub image_url: String,
    pub target_age: String,
    /// Name of the source that produced the record; set by the pipeline.
    pub source_organization: String,
    /// RFC 3339 timestamp of normalization.
    pub scraped_at: String,
}

impl Event {
    /// Strict completeness check: both `title` and `when_date` present.
    ///
    /// The default pipeline path keeps (and logs) events without a date;
    /// this helper exists for callers that want the stricter gate. See
    /// `normalize::validate_event`.
    pub fn is_complete(&self) -> bool {
        !self.title.trim().is_empty() && !self.when_date.trim().is_empty()
    }
}
