//! iCalendar feed strategy.
//!
//! Fetches an `.ics` feed and maps each VEVENT to a raw record. Suitable
//! for sites that publish an iCalendar export of their event listings.

use std::io::BufReader;

use ical::parser::ical::component::IcalEvent;
use reqwest::header::USER_AGENT;
use tracing::{info, warn};

use super::http::random_user_agent;
use super::Scraper;
use crate::error::ScrapeError;
use crate::models::{RawRecord, SourceConfig};

pub struct IcalScraper {
    config: SourceConfig,
    client: reqwest::blocking::Client,
}

impl IcalScraper {
    pub fn new(config: SourceConfig, client: reqwest::blocking::Client) -> Self {
        Self { config, client }
    }
}

impl Scraper for IcalScraper {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn scrape(&self) -> Result<Vec<RawRecord>, ScrapeError> {
        let feed_url = self.config.ical_url.as_deref().unwrap_or(&self.config.url);

        info!("fetching iCal feed from {feed_url}");
        let body = self
            .client
            .get(feed_url)
            .header(USER_AGENT, random_user_agent())
            .send()?
            .error_for_status()?
            .text()?;

        parse_ical_feed(&body, &self.config.name)
    }
}

/// Parse iCalendar text into raw records, one per VEVENT.
pub fn parse_ical_feed(body: &str, source: &str) -> Result<Vec<RawRecord>, ScrapeError> {
    let reader = ical::IcalParser::new(BufReader::new(body.as_bytes()));
    let mut records = Vec::new();

    for calendar in reader {
        let calendar = calendar.map_err(|e| ScrapeError::Parse {
            format: "ical".to_string(),
            reason: e.to_string(),
        })?;

        for event in &calendar.events {
            match parse_vevent(event, source) {
                Some(record) => records.push(record),
                None => warn!("skipping VEVENT without usable fields"),
            }
        }
    }

    info!("parsed {} events from iCal feed", records.len());
    Ok(records)
}

fn parse_vevent(event: &IcalEvent, source: &str) -> Option<RawRecord> {
    let mut title = String::new();
    let mut description = String::new();
    let mut location = String::new();
    let mut url = String::new();
    let mut dtstart = String::new();

    for property in &event.properties {
        let value = property.value.clone().unwrap_or_default();
        match property.name.as_str() {
            "SUMMARY" => title = value,
            "DESCRIPTION" => description = value,
            "LOCATION" => location = value,
            "URL" => url = value,
            "DTSTART" => dtstart = value,
            _ => {}
        }
    }

    if title.is_empty() && dtstart.is_empty() {
        return None;
    }

    let (when_date, when_time) = split_dtstart(&dtstart);

    Some(RawRecord::from_fields(
        source,
        &title,
        &description,
        &when_date,
        &when_time,
        &location,
        // Registration goes through the same URL when the feed has one.
        &url,
        "",
        "",
        &url,
    ))
}

/// Split a DTSTART value into date and time strings.
///
/// `20250715T143000Z` carries a clock time; a bare `20250715` is an
/// all-day event.
fn split_dtstart(dtstart: &str) -> (String, String) {
    let dtstart = dtstart.trim();
    if dtstart.len() < 8 || !dtstart[..8].chars().all(|c| c.is_ascii_digit()) {
        return (String::new(), String::new());
    }

    let date = format!("{}-{}-{}", &dtstart[..4], &dtstart[4..6], &dtstart[6..8]);

    match dtstart.as_bytes().get(8) {
        Some(b'T') if dtstart.len() >= 13 => {
            let time = format!("{}:{}", &dtstart[9..11], &dtstart[11..13]);
            (date, time)
        }
        _ => (date, "All Day".to_string()),
    }
}
