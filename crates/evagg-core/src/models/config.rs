//! Configuration structures for the aggregation pipeline.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{EvaggError, Result};

/// Source registry: the list of sites the pipeline scrapes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourcesConfig {
    #[serde(default)]
    pub sites: Vec<SourceConfig>,
}

impl SourcesConfig {
    /// Load the registry from a YAML file. Failure here is fatal to the run.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            EvaggError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        serde_yaml::from_str(&content).map_err(|e| {
            EvaggError::Config(format!("cannot parse {}: {e}", path.display()))
        })
    }

    /// Sources that are enabled, in registry order.
    pub fn enabled_sources(&self) -> Vec<&SourceConfig> {
        self.sites.iter().filter(|s| s.enabled).collect()
    }
}

/// One configured event source.
///
/// `method` stays a plain string so a typo'd or unsupported value is a
/// per-source failure at scraper construction time, not a registry parse
/// error that would abort the whole run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Display/report key for this source.
    pub name: String,

    /// Target page or endpoint.
    pub url: String,

    /// Extraction strategy identifier: ical, json, html, rendered, vision.
    pub method: String,

    /// Disabled sources are excluded before the run starts.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// iCal feed URL when it differs from `url`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ical_url: Option<String>,

    /// API endpoint when it differs from `url`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    /// Extra request headers for JSON endpoints.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,

    /// Dot-separated path to the events array inside a JSON payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub events_path: Option<String>,

    /// Event-field -> JSON-path mapping (dot notation for nesting).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub field_map: BTreeMap<String, String>,

    /// CSS selectors for HTML-based strategies.
    #[serde(default)]
    pub selectors: SelectorConfig,

    /// Rendering-service options for the `rendered` strategy.
    #[serde(default)]
    pub render: RenderConfig,

    /// Vision-endpoint options for the `vision` strategy.
    #[serde(default)]
    pub vision: VisionConfig,
}

fn default_true() -> bool {
    true
}

/// CSS selectors used by the html and rendered strategies.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// Selector for one event item.
    pub container: String,
    pub title: String,
    pub description: String,
    pub date: String,
    pub time: String,
    pub location: String,
    /// Anchor whose href is the event detail URL.
    pub url: String,
    /// Anchor whose href is the registration URL.
    pub registration_url: String,
    /// Image whose src is the event image.
    pub image: String,
    pub age: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            container: "div.event".to_string(),
            title: ".title".to_string(),
            description: ".description".to_string(),
            date: ".date".to_string(),
            time: ".time".to_string(),
            location: ".location".to_string(),
            url: "a.event-link".to_string(),
            registration_url: "a.register".to_string(),
            image: "img".to_string(),
            age: ".age".to_string(),
        }
    }
}

/// Options for the external page-rendering service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Rendering service endpoint. Required by the `rendered` strategy.
    pub service_url: Option<String>,

    /// Selector the service should wait for before returning the page.
    pub wait_selector: Option<String>,

    /// Extra settle time after load, in milliseconds.
    pub additional_wait_ms: u64,

    /// Per-page render timeout, in milliseconds.
    pub timeout_ms: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            service_url: None,
            wait_selector: None,
            additional_wait_ms: 2000,
            timeout_ms: 30_000,
        }
    }
}

/// Options for the external vision-model endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VisionConfig {
    /// Inference endpoint. Required by the `vision` strategy.
    pub endpoint: Option<String>,

    /// Model identifier passed to the endpoint.
    pub model: String,

    /// Explicit image/PDF URLs to interpret. When empty, images are
    /// discovered from `url` via `image_selector`.
    pub image_urls: Vec<String>,

    /// Selector for discovering flyer images on the source page.
    pub image_selector: String,

    /// Maximum response tokens requested from the endpoint.
    pub max_tokens: u32,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            model: "default".to_string(),
            image_urls: Vec::new(),
            image_selector: "img".to_string(),
            max_tokens: 4096,
        }
    }
}

/// Pipeline-wide settings, separate from the source registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    /// Additional attempts after the first failure.
    pub max_retries: u32,

    /// Blocking delay between attempts, in seconds.
    pub retry_delay_secs: u64,

    /// HTTP request timeout, in seconds.
    pub http_timeout_secs: u64,

    /// Directory for run reports.
    pub report_dir: String,

    /// Directory for sink output (CSV files).
    pub out_dir: String,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            max_retries: 1,
            retry_delay_secs: 30,
            http_timeout_secs: 30,
            report_dir: "reports".to_string(),
            out_dir: "out".to_string(),
        }
    }
}

impl PipelineSettings {
    /// Load settings from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            EvaggError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        serde_json::from_str(&content).map_err(|e| {
            EvaggError::Config(format!("cannot parse {}: {e}", path.display()))
        })
    }

    /// Save settings to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| EvaggError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REGISTRY: &str = r#"
sites:
  - name: City Library
    url: https://library.example.org/events
    method: html
    selectors:
      container: div.event-card
      title: h3.event-title
  - name: Parks Feed
    url: https://parks.example.org/calendar.ics
    method: ical
    enabled: false
  - name: Museum API
    url: https://museum.example.org
    api_url: https://museum.example.org/api/v2/events
    method: json
    events_path: data.events
    field_map:
      title: name
      when_date: schedule.start_date
"#;

    #[test]
    fn parses_registry_yaml() {
        let config: SourcesConfig = serde_yaml::from_str(REGISTRY).unwrap();
        assert_eq!(config.sites.len(), 3);
        assert_eq!(config.sites[0].name, "City Library");
        assert_eq!(config.sites[0].selectors.container, "div.event-card");
        // Unspecified selectors keep their defaults.
        assert_eq!(config.sites[0].selectors.date, ".date");
        assert_eq!(
            config.sites[2].field_map.get("when_date").unwrap(),
            "schedule.start_date"
        );
    }

    #[test]
    fn disabled_sources_filtered() {
        let config: SourcesConfig = serde_yaml::from_str(REGISTRY).unwrap();
        let enabled = config.enabled_sources();
        assert_eq!(enabled.len(), 2);
        assert!(enabled.iter().all(|s| s.name != "Parks Feed"));
    }

    #[test]
    fn settings_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let settings = PipelineSettings {
            max_retries: 3,
            ..Default::default()
        };
        settings.save(&path).unwrap();

        let loaded = PipelineSettings::from_file(&path).unwrap();
        assert_eq!(loaded.max_retries, 3);
        assert_eq!(loaded.retry_delay_secs, 30);
    }

    #[test]
    fn missing_settings_file_is_config_error() {
        let err = PipelineSettings::from_file(Path::new("/nonexistent/settings.json"))
            .unwrap_err();
        assert!(matches!(err, EvaggError::Config(_)));
    }
}
