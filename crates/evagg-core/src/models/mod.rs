//! Data models for the aggregation pipeline.

pub mod config;
pub mod event;
pub mod stats;

pub use config::{PipelineSettings, SourceConfig, SourcesConfig};
pub use event::{Event, RawRecord};
pub use stats::RunStats;
