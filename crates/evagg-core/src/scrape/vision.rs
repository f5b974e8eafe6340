//! Vision-model strategy for image and PDF flyer sources.
//!
//! Some venues only publish events as flyer images or PDF posters. This
//! strategy submits each flyer URL to an external vision inference
//! endpoint with a fixed extraction prompt and parses the JSON array the
//! model answers with. Per-image failures are skipped; only a total fetch
//! failure is raised to the coordinator.

use lazy_static::lazy_static;
use regex::Regex;
use reqwest::header::USER_AGENT;
use scraper::{Html, Selector};
use serde_json::{json, Value};
use tracing::{error, info, warn};

use super::http::random_user_agent;
use super::Scraper;
use crate::error::ScrapeError;
use crate::models::{RawRecord, SourceConfig};
use crate::normalize::normalize_url;

const EXTRACTION_PROMPT: &str = "\
Analyze this image and extract every event you can find.

For each event, extract:
- title: event title/name
- description: event description or details
- when_date: event date in YYYY-MM-DD format
- when_time: event time (e.g. \"2:00 PM\" or \"14:00\")
- location: event location/venue
- registration_url: registration or event URL if visible
- target_age: target age group if specified

Return the data as a JSON array of events. If there are no events in the
image, return an empty array: []. If a date or time is unclear, leave it
empty. Extract ALL events, not just the first one.";

lazy_static! {
    static ref FENCED_JSON: Regex =
        Regex::new(r"(?s)```(?:json)?\s*(\[.*?\])\s*```").unwrap();
    static ref BARE_JSON_ARRAY: Regex = Regex::new(r"(?s)\[.*\]").unwrap();
}

pub struct VisionScraper {
    config: SourceConfig,
    client: reqwest::blocking::Client,
}

impl VisionScraper {
    pub fn new(config: SourceConfig, client: reqwest::blocking::Client) -> Self {
        Self { config, client }
    }

    /// Discover flyer image URLs from the source page.
    fn discover_image_urls(&self) -> Result<Vec<String>, ScrapeError> {
        let body = self
            .client
            .get(&self.config.url)
            .header(USER_AGENT, random_user_agent())
            .send()?
            .error_for_status()?
            .text()?;

        let document = Html::parse_document(&body);
        let selector =
            Selector::parse(&self.config.vision.image_selector).map_err(|e| ScrapeError::Parse {
                format: "css selector".to_string(),
                reason: format!("{e:?}"),
            })?;

        let urls: Vec<String> = document
            .select(&selector)
            .filter_map(|img| img.value().attr("src"))
            .filter(|src| !src.is_empty())
            .map(|src| normalize_url(src, &self.config.url))
            .collect();

        info!("discovered {} image URLs", urls.len());
        Ok(urls)
    }

    /// Submit one image to the vision endpoint and parse its answer.
    fn process_image(&self, endpoint: &str, image_url: &str) -> Result<Vec<RawRecord>, ScrapeError> {
        let request = json!({
            "model": self.config.vision.model,
            "max_tokens": self.config.vision.max_tokens,
            "image_url": image_url,
            "prompt": EXTRACTION_PROMPT,
        });

        let response: Value = self
            .client
            .post(endpoint)
            .json(&request)
            .send()?
            .error_for_status()?
            .json()?;

        let answer = response
            .get("content")
            .and_then(Value::as_str)
            .ok_or_else(|| ScrapeError::Vision("response missing content field".to_string()))?;

        Ok(parse_model_answer(answer, &self.config.name))
    }
}

impl Scraper for VisionScraper {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn scrape(&self) -> Result<Vec<RawRecord>, ScrapeError> {
        let endpoint = self
            .config
            .vision
            .endpoint
            .clone()
            .ok_or_else(|| ScrapeError::MissingOption("vision.endpoint".to_string()))?;

        let image_urls = if self.config.vision.image_urls.is_empty() {
            self.discover_image_urls()?
        } else {
            self.config.vision.image_urls.clone()
        };

        info!("processing {} images", image_urls.len());
        let mut records = Vec::new();

        for image_url in &image_urls {
            match self.process_image(&endpoint, image_url) {
                Ok(mut extracted) => {
                    info!("extracted {} events from {image_url}", extracted.len());
                    records.append(&mut extracted);
                }
                Err(e) => {
                    error!("error processing image {image_url}: {e}");
                }
            }
        }

        Ok(records)
    }
}

/// Parse a model answer into raw records.
///
/// Accepts a fenced ```json block, falling back to the first bare JSON
/// array in the text. An answer without parseable JSON yields no records.
pub fn parse_model_answer(answer: &str, source: &str) -> Vec<RawRecord> {
    let json_str = FENCED_JSON
        .captures(answer)
        .map(|caps| caps[1].to_string())
        .or_else(|| BARE_JSON_ARRAY.find(answer).map(|m| m.as_str().to_string()));

    let Some(json_str) = json_str else {
        warn!("no JSON found in vision answer");
        return Vec::new();
    };

    let parsed: Vec<Value> = match serde_json::from_str(&json_str) {
        Ok(items) => items,
        Err(e) => {
            warn!("failed to parse JSON from vision answer: {e}");
            return Vec::new();
        }
    };

    parsed
        .iter()
        .map(|item| {
            let field = |key: &str| {
                item.get(key)
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string()
            };
            let registration_url = field("registration_url");
            RawRecord::from_fields(
                source,
                &field("title"),
                &field("description"),
                &field("when_date"),
                &field("when_time"),
                &field("location"),
                &registration_url,
                &field("image_url"),
                &field("target_age"),
                &registration_url,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_fenced_json_answer() {
        let answer = r#"Here are the events I found:
```json
[
  {"title": "Summer Reading Kickoff", "when_date": "2025-07-15", "when_time": "10:00 AM", "location": "Main Library"}
]
```
Let me know if you need anything else."#;

        let records = parse_model_answer(answer, "Flyer Board");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("title"), "Summer Reading Kickoff");
        assert_eq!(records[0].get("when_date"), "2025-07-15");
        assert_eq!(records[0].get("source_organization"), "Flyer Board");
    }

    #[test]
    fn parses_bare_json_array() {
        let answer = r#"[{"title": "Art Walk", "location": "Downtown"}]"#;
        let records = parse_model_answer(answer, "Flyer Board");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("location"), "Downtown");
    }

    #[test]
    fn empty_array_means_no_events() {
        assert!(parse_model_answer("```json\n[]\n```", "x").is_empty());
    }

    #[test]
    fn garbage_answer_yields_nothing() {
        assert!(parse_model_answer("I could not read the flyer.", "x").is_empty());
        assert!(parse_model_answer("[not json at all", "x").is_empty());
    }
}
