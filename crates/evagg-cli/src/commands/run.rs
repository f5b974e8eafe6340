//! Run command - execute the full aggregation pipeline.

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use evagg_core::export::CsvSink;
use evagg_core::models::{PipelineSettings, RunStats, SourceConfig, SourcesConfig};
use evagg_core::pipeline::{Pipeline, RunOutcome};
use evagg_core::scrape;
use evagg_core::{Event, ExportError, Sink};

/// Arguments for the run command.
#[derive(Args)]
pub struct RunArgs {
    /// Source registry file
    #[arg(long, default_value = "sources.yaml")]
    sources: PathBuf,

    /// Output directory for the CSV sink (overrides settings)
    #[arg(short, long)]
    out_dir: Option<PathBuf>,

    /// Report directory (overrides settings)
    #[arg(long)]
    report_dir: Option<PathBuf>,

    /// Scrape and process without exporting
    #[arg(long)]
    dry_run: bool,
}

pub fn run(args: RunArgs, settings_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    // Configuration load failure is fatal before any scraping begins.
    let mut settings = match settings_path {
        Some(path) => PipelineSettings::from_file(Path::new(path))?,
        None => PipelineSettings::default(),
    };
    if let Some(out_dir) = &args.out_dir {
        settings.out_dir = out_dir.to_string_lossy().to_string();
    }
    if let Some(report_dir) = &args.report_dir {
        settings.report_dir = report_dir.to_string_lossy().to_string();
    }

    let sources = SourcesConfig::from_file(&args.sources)?;
    let pipeline = Pipeline::new(&sources, settings);

    if pipeline.sources().is_empty() {
        anyhow::bail!("no enabled sources in {}", args.sources.display());
    }

    println!(
        "{} Scraping {} sources",
        style("ℹ").blue(),
        pipeline.sources().len()
    );

    let pb = ProgressBar::new(pipeline.sources().len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} sources {msg}")
            .unwrap()
            .progress_chars("=>-"),
    );

    let outcome = if args.dry_run {
        run_with_progress(&pipeline, &pb, &mut NullSink)?
    } else {
        let mut sink = CsvSink::new(&pipeline.settings().out_dir);
        run_with_progress(&pipeline, &pb, &mut sink)?
    };
    pb.finish_with_message("done");

    println!();
    println!("{} Completed in {:?}", style("✓").green(), start.elapsed());
    println!(
        "   {} unique events ({} duplicates removed)",
        style(outcome.stats.unique_events).green(),
        outcome.stats.duplicates_removed
    );
    println!(
        "   {} sources succeeded, {} failed",
        style(outcome.stats.successful_sources).green(),
        style(outcome.stats.failed_sources).red()
    );

    if !outcome.stats.sources.is_empty() {
        println!();
        println!("{}", style("Events by source:").bold());
        for (source, count) in outcome.stats.sources_by_count() {
            println!("  {source:.<40} {count:>5}");
        }
    }

    if let Some(report) = &outcome.report_path {
        println!();
        println!("{} Report: {}", style("ℹ").blue(), report.display());
    }

    if !args.dry_run && !outcome.export_ok {
        println!("{} Export failed; see log for details", style("✗").red());
    }

    Ok(())
}

/// Discards everything; used by --dry-run.
struct NullSink;

impl Sink for NullSink {
    fn export_events(&mut self, events: &[Event]) -> Result<(), ExportError> {
        debug!("dry run: discarding {} events", events.len());
        Ok(())
    }

    fn export_summary(&mut self, _stats: &RunStats) -> Result<(), ExportError> {
        Ok(())
    }
}

/// Run the pipeline, ticking the progress bar as each source starts.
fn run_with_progress(
    pipeline: &Pipeline,
    pb: &ProgressBar,
    sink: &mut dyn Sink,
) -> anyhow::Result<RunOutcome> {
    let factory = |source: &SourceConfig, settings: &PipelineSettings| {
        pb.set_message(source.name.clone());
        pb.inc(1);
        scrape::for_source(source, settings)
    };
    Ok(pipeline.run_with(&factory, sink)?)
}
