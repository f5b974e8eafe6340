//! Rendered-page strategy for JavaScript-heavy sites.
//!
//! Delegates page rendering to an external headless-browser service: the
//! service loads the target URL, waits for the configured selector and
//! settle time, and returns the final DOM as HTML. Extraction then uses
//! the same selector configuration as the static HTML strategy.

use serde_json::{json, Value};
use tracing::info;

use super::html::parse_events_from_html;
use super::Scraper;
use crate::error::ScrapeError;
use crate::models::{RawRecord, SourceConfig};

pub struct RenderedScraper {
    config: SourceConfig,
    client: reqwest::blocking::Client,
}

impl RenderedScraper {
    pub fn new(config: SourceConfig, client: reqwest::blocking::Client) -> Self {
        Self { config, client }
    }

    fn render_page(&self) -> Result<String, ScrapeError> {
        let service_url = self
            .config
            .render
            .service_url
            .as_deref()
            .ok_or_else(|| ScrapeError::MissingOption("render.service_url".to_string()))?;

        let request = json!({
            "url": self.config.url,
            "wait_selector": self.config.render.wait_selector,
            "additional_wait_ms": self.config.render.additional_wait_ms,
            "timeout_ms": self.config.render.timeout_ms,
        });

        info!("rendering {} via {service_url}", self.config.url);
        let response: Value = self
            .client
            .post(service_url)
            .json(&request)
            .send()?
            .error_for_status()?
            .json()?;

        response
            .get("html")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| ScrapeError::Render("response missing html field".to_string()))
    }
}

impl Scraper for RenderedScraper {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn scrape(&self) -> Result<Vec<RawRecord>, ScrapeError> {
        let body = self.render_page()?;
        let records = parse_events_from_html(&body, &self.config)?;
        info!("parsed {} events from rendered page", records.len());
        Ok(records)
    }
}
