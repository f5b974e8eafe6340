//! Core library for community event aggregation.
//!
//! This crate provides:
//! - Extraction strategies for heterogeneous sources (iCal feeds, JSON
//!   APIs, static HTML, rendered pages, vision-interpreted flyers)
//! - Free-text date/time canonicalization
//! - Record normalization into one canonical event shape
//! - Fingerprint-based deduplication
//! - A sequential pipeline coordinator with run statistics and reporting

pub mod dedup;
pub mod error;
pub mod export;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod scrape;

pub use dedup::{deduplicate, deduplicate_by_url, fingerprint, merge_events};
pub use error::{EvaggError, ExportError, Result, ScrapeError};
pub use export::{CsvSink, Sink};
pub use models::{Event, PipelineSettings, RawRecord, RunStats, SourceConfig, SourcesConfig};
pub use normalize::{normalize_event, normalize_events, parse_date, parse_time};
pub use pipeline::{Pipeline, RunOutcome};
pub use scrape::{Scraper, RetryPolicy};
