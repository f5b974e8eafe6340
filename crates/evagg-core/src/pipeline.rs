//! Pipeline coordinator: scrape, normalize, deduplicate, export, report.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::Utc;
use tracing::{error, info, warn};

use crate::dedup::deduplicate;
use crate::error::{Result, ScrapeError};
use crate::export::Sink;
use crate::models::{Event, PipelineSettings, RawRecord, RunStats, SourceConfig, SourcesConfig};
use crate::normalize::normalize_events;
use crate::scrape::{self, RetryPolicy, Scraper};

/// Builds a scraper for one source; injectable for tests.
pub type ScraperFactory<'a> =
    dyn Fn(&SourceConfig, &PipelineSettings) -> std::result::Result<Box<dyn Scraper>, ScrapeError>
        + 'a;

/// What one pipeline run produced.
#[derive(Debug)]
pub struct RunOutcome {
    /// Aggregate counters for the run.
    pub stats: RunStats,
    /// Final deduplicated event list, as handed to the sink.
    pub events: Vec<Event>,
    /// Whether the sink accepted both exports.
    pub export_ok: bool,
    /// Path of the textual run report.
    pub report_path: Option<PathBuf>,
}

/// Drives all enabled sources to completion and runs the processing stages
/// in strict order over the pooled batch.
#[derive(Debug)]
pub struct Pipeline {
    sources: Vec<SourceConfig>,
    settings: PipelineSettings,
}

impl Pipeline {
    /// Build a pipeline over the enabled sources of a registry.
    pub fn new(sources: &SourcesConfig, settings: PipelineSettings) -> Self {
        let enabled: Vec<SourceConfig> =
            sources.enabled_sources().into_iter().cloned().collect();
        info!("loaded configuration for {} sources", enabled.len());
        Self {
            sources: enabled,
            settings,
        }
    }

    /// Load the registry (fatal on failure) and optional settings file.
    pub fn from_files(sources_path: &Path, settings_path: Option<&Path>) -> Result<Self> {
        let sources = SourcesConfig::from_file(sources_path)?;
        let settings = match settings_path {
            Some(path) => PipelineSettings::from_file(path)?,
            None => PipelineSettings::default(),
        };
        Ok(Self::new(&sources, settings))
    }

    pub fn sources(&self) -> &[SourceConfig] {
        &self.sources
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Run the full pipeline with the default scraper factory.
    pub fn run(&self, sink: &mut dyn Sink) -> Result<RunOutcome> {
        self.run_with(&scrape::for_source, sink)
    }

    /// Run the full pipeline, building per-source scrapers with `factory`.
    ///
    /// Stage order is strict: every source completes (or fails) before
    /// normalization starts, and each later stage consumes the whole
    /// output of the stage before it.
    pub fn run_with(&self, factory: &ScraperFactory, sink: &mut dyn Sink) -> Result<RunOutcome> {
        let start = Instant::now();
        let mut stats = RunStats::new();

        info!("starting event aggregation run");
        let raw_events = self.scrape_all(factory, &mut stats);

        info!("normalizing {} events", raw_events.len());
        let normalized = normalize_events(&raw_events);
        let normalized_count = normalized.len();

        info!("removing duplicates");
        let events = deduplicate(normalized);
        stats.unique_events = events.len();
        stats.duplicates_removed = normalized_count - events.len();

        let mut export_ok = true;
        if let Err(e) = sink.export_events(&events) {
            error!("export failed: {e}");
            export_ok = false;
        } else if let Err(e) = sink.export_summary(&stats) {
            error!("summary export failed: {e}");
            export_ok = false;
        }

        let report_path = match self.write_report(&stats) {
            Ok(path) => {
                info!("report saved to {}", path.display());
                Some(path)
            }
            Err(e) => {
                error!("failed to write report: {e}");
                None
            }
        };

        info!(
            "run completed in {:.1}s: {} unique events, {} sources ok, {} failed",
            start.elapsed().as_secs_f64(),
            stats.unique_events,
            stats.successful_sources,
            stats.failed_sources
        );

        Ok(RunOutcome {
            stats,
            events,
            export_ok,
            report_path,
        })
    }

    /// Scrape every source sequentially, accumulating raw records.
    ///
    /// A source failure never aborts the run; it is recorded and the next
    /// source starts. A source that succeeds with zero records counts as
    /// failed, so silently-broken sources surface in the report.
    fn scrape_all(&self, factory: &ScraperFactory, stats: &mut RunStats) -> Vec<RawRecord> {
        let policy = RetryPolicy::from_settings(&self.settings);
        let mut pool = Vec::new();

        for (i, source) in self.sources.iter().enumerate() {
            info!(
                "[{}/{}] scraping {} (method: {})",
                i + 1,
                self.sources.len(),
                source.name,
                source.method
            );

            let scraper = match factory(source, &self.settings) {
                Ok(scraper) => scraper,
                Err(e) => {
                    error!("cannot scrape {}: {e}", source.name);
                    stats.record_failure();
                    continue;
                }
            };

            let mut records = scrape::scrape_with_retry(scraper.as_ref(), &policy);
            if records.is_empty() {
                warn!("no events found for {}", source.name);
                stats.record_failure();
                continue;
            }

            // The pipeline owns source attribution, not the strategies.
            for record in &mut records {
                record.set("source_organization", &source.name);
            }

            stats.record_success(&source.name, records.len());
            pool.extend(records);
        }

        pool
    }

    /// Write the textual run report; always attempted, even on partial
    /// failure.
    fn write_report(&self, stats: &RunStats) -> Result<PathBuf> {
        fs::create_dir_all(&self.settings.report_dir)?;
        let path = Path::new(&self.settings.report_dir)
            .join(format!("report_{}.txt", Utc::now().format("%Y%m%d_%H%M%S")));

        let mut report = String::new();
        report.push_str(&format!("{}\n", "=".repeat(80)));
        report.push_str("EVENT AGGREGATION REPORT\n");
        report.push_str(&format!("{}\n\n", "=".repeat(80)));
        report.push_str(&format!(
            "Timestamp: {}\n\n",
            Utc::now().format("%Y-%m-%d %H:%M:%S")
        ));

        report.push_str("SUMMARY\n");
        report.push_str(&format!("{}\n", "-".repeat(80)));
        report.push_str(&format!("Total events scraped: {}\n", stats.total_events));
        report.push_str(&format!("Unique events: {}\n", stats.unique_events));
        report.push_str(&format!("Duplicates removed: {}\n", stats.duplicates_removed));
        report.push_str(&format!("Successful sources: {}\n", stats.successful_sources));
        report.push_str(&format!("Failed sources: {}\n\n", stats.failed_sources));

        report.push_str("EVENTS BY SOURCE\n");
        report.push_str(&format!("{}\n", "-".repeat(80)));
        for (source, count) in stats.sources_by_count() {
            report.push_str(&format!("{source:.<50} {count:>5} events\n"));
        }
        report.push_str(&format!("\n{}\n", "=".repeat(80)));

        fs::write(&path, report)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExportError;

    struct StaticScraper {
        name: String,
        records: Vec<RawRecord>,
    }

    impl Scraper for StaticScraper {
        fn name(&self) -> &str {
            &self.name
        }

        fn scrape(&self) -> std::result::Result<Vec<RawRecord>, ScrapeError> {
            Ok(self.records.clone())
        }
    }

    struct FailScraper {
        name: String,
    }

    impl Scraper for FailScraper {
        fn name(&self) -> &str {
            &self.name
        }

        fn scrape(&self) -> std::result::Result<Vec<RawRecord>, ScrapeError> {
            Err(ScrapeError::Render("browser crashed".to_string()))
        }
    }

    #[derive(Default)]
    struct MemorySink {
        events: Vec<Event>,
        summaries: usize,
    }

    impl Sink for MemorySink {
        fn export_events(&mut self, events: &[Event]) -> std::result::Result<(), ExportError> {
            self.events = events.to_vec();
            Ok(())
        }

        fn export_summary(&mut self, _stats: &RunStats) -> std::result::Result<(), ExportError> {
            self.summaries += 1;
            Ok(())
        }
    }

    struct RejectingSink;

    impl Sink for RejectingSink {
        fn export_events(&mut self, _events: &[Event]) -> std::result::Result<(), ExportError> {
            Err(ExportError::Rejected("quota exceeded".to_string()))
        }

        fn export_summary(&mut self, _stats: &RunStats) -> std::result::Result<(), ExportError> {
            Ok(())
        }
    }

    fn record(title: &str, date: &str, location: &str) -> RawRecord {
        let mut r = RawRecord::new();
        r.set("title", title);
        r.set("when_date", date);
        r.set("location", location);
        r
    }

    fn registry(names: &[&str]) -> SourcesConfig {
        let sites = names
            .iter()
            .map(|name| {
                serde_yaml::from_str::<SourceConfig>(&format!(
                    "{{name: {name}, url: 'https://{name}.example', method: html}}"
                ))
                .unwrap()
            })
            .collect();
        SourcesConfig { sites }
    }

    fn fast_settings(report_dir: &Path) -> PipelineSettings {
        PipelineSettings {
            max_retries: 0,
            retry_delay_secs: 0,
            report_dir: report_dir.to_string_lossy().to_string(),
            ..Default::default()
        }
    }

    fn test_factory(
        source: &SourceConfig,
        _settings: &PipelineSettings,
    ) -> std::result::Result<Box<dyn Scraper>, ScrapeError> {
        match source.name.as_str() {
            "alpha" => Ok(Box::new(StaticScraper {
                name: source.name.clone(),
                records: vec![
                    record("Story Time", "2025-07-15", "Main Library"),
                    record("Craft Hour", "2025-07-16", "Annex"),
                ],
            })),
            "beta" => Ok(Box::new(StaticScraper {
                name: source.name.clone(),
                // Duplicate of alpha's first event, differing only in case.
                records: vec![record("STORY TIME", "2025-07-15", "main library")],
            })),
            "broken" => Ok(Box::new(FailScraper {
                name: source.name.clone(),
            })),
            "empty" => Ok(Box::new(StaticScraper {
                name: source.name.clone(),
                records: vec![],
            })),
            other => Err(ScrapeError::UnknownMethod(other.to_string())),
        }
    }

    #[test]
    fn source_failure_does_not_abort_run() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = Pipeline::new(
            &registry(&["alpha", "broken", "beta"]),
            fast_settings(dir.path()),
        );
        let mut sink = MemorySink::default();

        let outcome = pipeline.run_with(&test_factory, &mut sink).unwrap();

        assert_eq!(outcome.stats.successful_sources, 2);
        assert_eq!(outcome.stats.failed_sources, 1);
        assert!(!outcome.events.is_empty());
        assert_eq!(sink.events, outcome.events);
        assert_eq!(sink.summaries, 1);
    }

    #[test]
    fn cross_source_duplicates_are_removed() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = Pipeline::new(&registry(&["alpha", "beta"]), fast_settings(dir.path()));
        let mut sink = MemorySink::default();

        let outcome = pipeline.run_with(&test_factory, &mut sink).unwrap();

        assert_eq!(outcome.stats.total_events, 3);
        assert_eq!(outcome.stats.unique_events, 2);
        assert_eq!(outcome.stats.duplicates_removed, 1);
        // First-seen wins: the surviving copy is alpha's.
        assert_eq!(outcome.events[0].source_organization, "alpha");
    }

    #[test]
    fn report_arithmetic_holds() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = Pipeline::new(
            &registry(&["alpha", "beta", "broken", "empty"]),
            fast_settings(dir.path()),
        );
        let mut sink = MemorySink::default();

        let outcome = pipeline.run_with(&test_factory, &mut sink).unwrap();
        let stats = &outcome.stats;

        assert_eq!(stats.total_events, stats.sources.values().sum::<usize>());
        assert_eq!(
            stats.unique_events + stats.duplicates_removed,
            3 // records surviving normalization
        );
    }

    #[test]
    fn empty_source_counts_as_failed() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = Pipeline::new(&registry(&["empty"]), fast_settings(dir.path()));
        let mut sink = MemorySink::default();

        let outcome = pipeline.run_with(&test_factory, &mut sink).unwrap();
        assert_eq!(outcome.stats.successful_sources, 0);
        assert_eq!(outcome.stats.failed_sources, 1);
    }

    #[test]
    fn unknown_method_is_source_failure() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = Pipeline::new(
            &registry(&["alpha", "mystery"]),
            fast_settings(dir.path()),
        );
        let mut sink = MemorySink::default();

        let outcome = pipeline.run_with(&test_factory, &mut sink).unwrap();
        assert_eq!(outcome.stats.successful_sources, 1);
        assert_eq!(outcome.stats.failed_sources, 1);
    }

    #[test]
    fn pipeline_owns_source_attribution() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = Pipeline::new(&registry(&["alpha"]), fast_settings(dir.path()));
        let mut sink = MemorySink::default();

        let outcome = pipeline.run_with(&test_factory, &mut sink).unwrap();
        assert!(outcome
            .events
            .iter()
            .all(|e| e.source_organization == "alpha"));
    }

    #[test]
    fn report_written_even_when_sink_rejects() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = Pipeline::new(&registry(&["alpha"]), fast_settings(dir.path()));
        let mut sink = RejectingSink;

        let outcome = pipeline.run_with(&test_factory, &mut sink).unwrap();
        assert!(!outcome.export_ok);

        let report_path = outcome.report_path.unwrap();
        let report = fs::read_to_string(report_path).unwrap();
        assert!(report.contains("Total events scraped: 2"));
        assert!(report.contains("alpha"));
    }

    #[test]
    fn disabled_sources_are_excluded() {
        let mut sources = registry(&["alpha", "beta"]);
        sources.sites[1].enabled = false;
        let dir = tempfile::tempdir().unwrap();
        let pipeline = Pipeline::new(&sources, fast_settings(dir.path()));

        assert_eq!(pipeline.sources().len(), 1);
        assert_eq!(pipeline.sources()[0].name, "alpha");
    }

    #[test]
    fn missing_registry_file_is_fatal() {
        let err =
            Pipeline::from_files(Path::new("/nonexistent/sites.yaml"), None).unwrap_err();
        assert!(matches!(err, crate::error::EvaggError::Config(_)));
    }
}
