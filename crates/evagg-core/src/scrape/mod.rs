//! Extraction strategies: turning remote sources into raw event records.
//!
//! Each strategy implements [`Scraper`] and is selected by the `method`
//! field of its source configuration. Strategies skip individual items
//! they cannot parse and raise only for unrecoverable fetch failures,
//! which the coordinator treats as retryable.

pub mod http;
pub mod ical;
pub mod html;
pub mod json;
pub mod rendered;
pub mod vision;

use std::thread;
use std::time::Duration;

use tracing::{error, info, warn};

use crate::error::ScrapeError;
use crate::models::{PipelineSettings, RawRecord, SourceConfig};

/// One source-type-specific extraction strategy.
pub trait Scraper {
    /// Display name of the source this scraper serves.
    fn name(&self) -> &str;

    /// Fetch and extract raw records from the source.
    fn scrape(&self) -> Result<Vec<RawRecord>, ScrapeError>;
}

/// Bounded retry policy for one source.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Additional attempts after the first failure.
    pub max_retries: u32,
    /// Blocking delay between attempts.
    pub retry_delay: Duration,
}

impl RetryPolicy {
    pub fn from_settings(settings: &PipelineSettings) -> Self {
        Self {
            max_retries: settings.max_retries,
            retry_delay: Duration::from_secs(settings.retry_delay_secs),
        }
    }
}

/// Build the scraper for a source by its configured method identifier.
///
/// An unknown method is a per-source failure, not a fatal one; the
/// coordinator records it and moves on.
pub fn for_source(
    config: &SourceConfig,
    settings: &PipelineSettings,
) -> Result<Box<dyn Scraper>, ScrapeError> {
    let client = http::build_client(settings.http_timeout_secs)?;
    match config.method.as_str() {
        "ical" => Ok(Box::new(ical::IcalScraper::new(config.clone(), client))),
        "json" => Ok(Box::new(json::JsonScraper::new(config.clone(), client))),
        "html" => Ok(Box::new(html::HtmlScraper::new(config.clone(), client))),
        "rendered" => Ok(Box::new(rendered::RenderedScraper::new(config.clone(), client))),
        "vision" => Ok(Box::new(vision::VisionScraper::new(config.clone(), client))),
        other => Err(ScrapeError::UnknownMethod(other.to_string())),
    }
}

/// Run one scraper with bounded retries and a blocking inter-attempt delay.
///
/// Returns the records from the first successful attempt, or an empty vec
/// once retries are exhausted. Failures never escape this function.
pub fn scrape_with_retry(scraper: &dyn Scraper, policy: &RetryPolicy) -> Vec<RawRecord> {
    let attempts = policy.max_retries + 1;

    for attempt in 1..=attempts {
        info!(
            "scraping {} (attempt {attempt}/{attempts})",
            scraper.name()
        );
        match scraper.scrape() {
            Ok(records) => {
                info!("scraped {} records from {}", records.len(), scraper.name());
                return records;
            }
            Err(e) => {
                error!("error scraping {}: {e}", scraper.name());
                if attempt < attempts {
                    info!("retrying in {:?}", policy.retry_delay);
                    thread::sleep(policy.retry_delay);
                } else {
                    warn!("giving up on {} after {attempts} attempts", scraper.name());
                }
            }
        }
    }

    Vec::new()
}
