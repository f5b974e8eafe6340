//! Static HTML strategy.
//!
//! Fetches a page and extracts events with the CSS selectors from the
//! source configuration. Elements that fail to parse are skipped.

use reqwest::header::USER_AGENT;
use scraper::{ElementRef, Html, Selector};
use tracing::{info, warn};

use super::http::random_user_agent;
use super::Scraper;
use crate::error::ScrapeError;
use crate::models::{RawRecord, SourceConfig};
use crate::normalize::{clean_html_text, normalize_url};

pub struct HtmlScraper {
    config: SourceConfig,
    client: reqwest::blocking::Client,
}

impl HtmlScraper {
    pub fn new(config: SourceConfig, client: reqwest::blocking::Client) -> Self {
        Self { config, client }
    }
}

impl Scraper for HtmlScraper {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn scrape(&self) -> Result<Vec<RawRecord>, ScrapeError> {
        info!("fetching HTML from {}", self.config.url);
        let body = self
            .client
            .get(&self.config.url)
            .header(USER_AGENT, random_user_agent())
            .send()?
            .error_for_status()?
            .text()?;

        let records = parse_events_from_html(&body, &self.config)?;
        info!("parsed {} events from HTML", records.len());
        Ok(records)
    }
}

/// Extract raw records from an HTML document per the configured selectors.
///
/// Shared by the static and rendered strategies, which differ only in how
/// they obtain the document.
pub fn parse_events_from_html(
    body: &str,
    config: &SourceConfig,
) -> Result<Vec<RawRecord>, ScrapeError> {
    let document = Html::parse_document(body);
    let container = parse_selector(&config.selectors.container)?;

    let elements: Vec<ElementRef> = document.select(&container).collect();
    info!("found {} event elements", elements.len());

    let records = elements
        .iter()
        .filter_map(|element| parse_event_element(*element, config))
        .collect();
    Ok(records)
}

fn parse_event_element(element: ElementRef, config: &SourceConfig) -> Option<RawRecord> {
    let selectors = &config.selectors;

    let title = select_text(element, &selectors.title);
    // Title-less containers are navigation chrome, not events.
    if title.is_empty() {
        return None;
    }

    let description = select_text(element, &selectors.description);
    let when_date = select_text(element, &selectors.date);
    let when_time = select_text(element, &selectors.time);
    let location = select_text(element, &selectors.location);
    let target_age = select_text(element, &selectors.age);

    let event_url = normalize_url(&select_attr(element, &selectors.url, "href"), &config.url);
    let mut registration_url = normalize_url(
        &select_attr(element, &selectors.registration_url, "href"),
        &config.url,
    );
    let image_url = normalize_url(&select_attr(element, &selectors.image, "src"), &config.url);

    if registration_url.is_empty() {
        registration_url = event_url.clone();
    }

    Some(RawRecord::from_fields(
        &config.name,
        &title,
        &description,
        &when_date,
        &when_time,
        &location,
        &registration_url,
        &image_url,
        &target_age,
        &event_url,
    ))
}

fn parse_selector(selector: &str) -> Result<Selector, ScrapeError> {
    Selector::parse(selector).map_err(|e| ScrapeError::Parse {
        format: "css selector".to_string(),
        reason: format!("{selector:?}: {e:?}"),
    })
}

/// Text content of the first element matching `selector`, cleaned.
fn select_text(element: ElementRef, selector: &str) -> String {
    let Ok(selector) = Selector::parse(selector) else {
        warn!("invalid selector {selector:?}");
        return String::new();
    };
    element
        .select(&selector)
        .next()
        .map(|found| clean_html_text(&found.text().collect::<String>()))
        .unwrap_or_default()
}

/// Attribute value of the first element matching `selector`.
fn select_attr(element: ElementRef, selector: &str, attr: &str) -> String {
    let Ok(selector) = Selector::parse(selector) else {
        warn!("invalid selector {selector:?}");
        return String::new();
    };
    element
        .select(&selector)
        .next()
        .and_then(|found| found.value().attr(attr))
        .unwrap_or_default()
        .to_string()
}
