//! JSON API strategy.
//!
//! Fetches a JSON endpoint and maps each item to a raw record using the
//! configured field map. Nested fields are addressed with dot notation.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, USER_AGENT};
use serde_json::Value;
use tracing::{info, warn};

use super::http::random_user_agent;
use super::Scraper;
use crate::error::ScrapeError;
use crate::models::{RawRecord, SourceConfig};

pub struct JsonScraper {
    config: SourceConfig,
    client: reqwest::blocking::Client,
}

impl JsonScraper {
    pub fn new(config: SourceConfig, client: reqwest::blocking::Client) -> Self {
        Self { config, client }
    }

    fn request_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        for (key, value) in &self.config.headers {
            let name = match HeaderName::from_bytes(key.as_bytes()) {
                Ok(name) => name,
                Err(_) => {
                    warn!("ignoring invalid header name {key:?}");
                    continue;
                }
            };
            match HeaderValue::from_str(value) {
                Ok(value) => {
                    headers.insert(name, value);
                }
                Err(_) => warn!("ignoring invalid header value for {key:?}"),
            }
        }
        headers
    }
}

impl Scraper for JsonScraper {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn scrape(&self) -> Result<Vec<RawRecord>, ScrapeError> {
        let api_url = self.config.api_url.as_deref().unwrap_or(&self.config.url);

        info!("fetching JSON from {api_url}");
        let data: Value = self
            .client
            .get(api_url)
            .header(USER_AGENT, random_user_agent())
            .headers(self.request_headers())
            .send()?
            .error_for_status()?
            .json()?;

        let records = parse_json_events(&data, &self.config);
        info!("parsed {} events from JSON endpoint", records.len());
        Ok(records)
    }
}

/// Extract raw records from a JSON payload per the source configuration.
pub fn parse_json_events(data: &Value, config: &SourceConfig) -> Vec<RawRecord> {
    let mut data = data;

    // Walk down to the events array; a missing path segment keeps the
    // current value, matching lenient feeds that sometimes omit wrappers.
    if let Some(path) = &config.events_path {
        for key in path.split('.') {
            if let Some(next) = data.get(key) {
                data = next;
            }
        }
    }

    let items: Vec<&Value> = match data {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    };

    items
        .into_iter()
        .filter_map(|item| parse_json_event(item, config))
        .collect()
}

fn parse_json_event(item: &Value, config: &SourceConfig) -> Option<RawRecord> {
    if !item.is_object() {
        warn!("skipping non-object JSON item");
        return None;
    }

    let field = |event_field: &str, default_path: &str| {
        let path = config
            .field_map
            .get(event_field)
            .map(String::as_str)
            .unwrap_or(default_path);
        nested_field(item, path)
    };

    let title = field("title", "title");
    let description = field("description", "description");
    let when_date = field("when_date", "date");
    let when_time = field("when_time", "time");
    let location = field("location", "location");
    let event_url = field("event_url", "url");
    let mut registration_url = field("registration_url", "registration_url");
    let image_url = field("image_url", "image");
    let target_age = field("target_age", "age");

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

/// Fetch a nested field by dot-separated path, rendered as a string.
fn nested_field(item: &Value, path: &str) -> String {
    let mut value = item;
    for key in path.split('.') {
        match value.get(key) {
            Some(next) => value = next,
            None => return String::new(),
        }
    }

    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => String::new(),
    }
}
