//! CSV sink: events and run summary as files in an output directory.

use std::fs;
use std::path::PathBuf;

use chrono::Utc;
use tracing::info;

use super::{event_row, Sink, COLUMNS};
use crate::error::ExportError;
use crate::models::{Event, RunStats};

/// Writes `events.csv` and `summary.csv` under an output directory,
/// replacing previous contents.
pub struct CsvSink {
    out_dir: PathBuf,
}

impl CsvSink {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
        }
    }

    pub fn events_path(&self) -> PathBuf {
        self.out_dir.join("events.csv")
    }

    pub fn summary_path(&self) -> PathBuf {
        self.out_dir.join("summary.csv")
    }
}

impl Sink for CsvSink {
    fn export_events(&mut self, events: &[Event]) -> Result<(), ExportError> {
        fs::create_dir_all(&self.out_dir)?;

        let path = self.events_path();
        let mut wtr = csv::Writer::from_path(&path)?;

        wtr.write_record(COLUMNS)?;
        for event in events {
            wtr.write_record(event_row(event))?;
        }
        wtr.flush()?;

        info!("wrote {} events to {}", events.len(), path.display());
        Ok(())
    }

    fn export_summary(&mut self, stats: &RunStats) -> Result<(), ExportError> {
        fs::create_dir_all(&self.out_dir)?;

        let path = self.summary_path();
        let mut wtr = csv::Writer::from_path(&path)?;

        let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S").to_string();
        wtr.write_record(["Last Run", &timestamp])?;
        wtr.write_record(["Total Events Scraped", &stats.total_events.to_string()])?;
        wtr.write_record(["Unique Events", &stats.unique_events.to_string()])?;
        wtr.write_record(["Duplicates Removed", &stats.duplicates_removed.to_string()])?;
        wtr.write_record(["Sources Succeeded", &stats.successful_sources.to_string()])?;
        wtr.write_record(["Sources Failed", &stats.failed_sources.to_string()])?;

        for (source, count) in stats.sources_by_count() {
            wtr.write_record([source, &count.to_string()])?;
        }
        wtr.flush()?;

        info!("wrote run summary to {}", path.display());
        Ok(())
    }
}
