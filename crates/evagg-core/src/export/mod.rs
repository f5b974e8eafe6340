//! Export sinks for the final event list.

pub mod csv;

pub use csv::CsvSink;

use crate::error::ExportError;
use crate::models::{Event, RunStats};

/// Column order every sink must use for event rows.
pub const COLUMNS: &[&str] = &[
    "Title",
    "Description",
    "Date",
    "Time",
    "Location",
    "Registration URL",
    "Image URL",
    "Target Age",
    "Event URL",
    "Source Organization",
    "Scraped At",
];

/// External store for the deduplicated event list.
///
/// `export_events` replaces the event rows; `export_summary` feeds a
/// secondary report surface. Sink failures are reported by the pipeline
/// but never roll it back.
pub trait Sink {
    fn export_events(&mut self, events: &[Event]) -> Result<(), ExportError>;

    fn export_summary(&mut self, stats: &RunStats) -> Result<(), ExportError>;
}

/// One event rendered in the fixed column order.
pub fn event_row(event: &Event) -> Vec<&str> {
    vec![
        &event.title,
        &event.description,
        &event.when_date,
        &event.when_time,
        &event.location,
        &event.registration_url,
        &event.image_url,
        &event.target_age,
        &event.event_url,
        &event.source_organization,
        &event.scraped_at,
    ]
}
