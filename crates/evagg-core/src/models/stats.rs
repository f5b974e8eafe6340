//! Aggregate counters for one pipeline run.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Counters describing one pipeline execution.
///
/// Created at run start, mutated throughout, read once at run end. Not
/// persisted beyond the run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunStats {
    /// Raw events accumulated across all sources before normalization.
    pub total_events: usize,

    /// Events surviving normalization and deduplication.
    pub unique_events: usize,

    /// Events dropped by the deduplicator.
    pub duplicates_removed: usize,

    /// Sources that yielded at least one record.
    pub successful_sources: usize,

    /// Sources that failed, were unknown, or yielded nothing.
    pub failed_sources: usize,

    /// Raw event count per source name.
    pub sources: BTreeMap<String, usize>,
}

impl RunStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a source that produced `count` raw events.
    pub fn record_success(&mut self, name: &str, count: usize) {
        self.successful_sources += 1;
        self.total_events += count;
        self.sources.insert(name.to_string(), count);
    }

    /// Record a source that failed or yielded nothing.
    pub fn record_failure(&mut self) {
        self.failed_sources += 1;
    }

    /// Per-source breakdown sorted by descending event count.
    pub fn sources_by_count(&self) -> Vec<(&str, usize)> {
        let mut breakdown: Vec<(&str, usize)> =
            self.sources.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        breakdown.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        breakdown
    }
}
