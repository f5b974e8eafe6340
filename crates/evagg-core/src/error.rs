//! Error types for the evagg-core library.

use thiserror::Error;

/// Main error type for the evagg library.
#[derive(Error, Debug)]
pub enum EvaggError {
    /// Scraping error from a source strategy.
    #[error("scrape error: {0}")]
    Scrape(#[from] ScrapeError),

    /// Export error from a sink.
    #[error("export error: {0}")]
    Export(#[from] ExportError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors raised by extraction strategies.
#[derive(Error, Debug)]
pub enum ScrapeError {
    /// HTTP fetch failed (network, status, timeout).
    #[error("fetch failed: {0}")]
    Fetch(#[from] reqwest::Error),

    /// No scraper is registered for the configured method.
    #[error("unknown scraping method: {0}")]
    UnknownMethod(String),

    /// The fetched payload could not be parsed.
    #[error("failed to parse {format}: {reason}")]
    Parse { format: String, reason: String },

    /// The external rendering service failed or timed out.
    #[error("render service error: {0}")]
    Render(String),

    /// The external vision endpoint failed or returned no usable answer.
    #[error("vision endpoint error: {0}")]
    Vision(String),

    /// The source configuration is missing a key this strategy requires.
    #[error("missing source option: {0}")]
    MissingOption(String),
}

/// Errors raised by export sinks.
#[derive(Error, Debug)]
pub enum ExportError {
    /// CSV serialization failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// I/O error while writing export artifacts.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The external tabular store rejected the write.
    #[error("sink rejected write: {0}")]
    Rejected(String),
}

/// Result type for the evagg library.
pub type Result<T> = std::result::Result<T, EvaggError>;
