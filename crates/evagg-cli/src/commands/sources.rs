//! Sources command - inspect the configured source registry.

use std::path::PathBuf;

use clap::Args;
use console::style;

use evagg_core::models::SourcesConfig;

/// Arguments for the sources command.
#[derive(Args)]
pub struct SourcesArgs {
    /// Source registry file
    #[arg(long, default_value = "sources.yaml")]
    sources: PathBuf,

    /// Include disabled sources
    #[arg(long)]
    all: bool,
}

pub fn run(args: SourcesArgs) -> anyhow::Result<()> {
    let config = SourcesConfig::from_file(&args.sources)?;

    let listed: Vec<_> = if args.all {
        config.sites.iter().collect()
    } else {
        config.enabled_sources()
    };

    if listed.is_empty() {
        println!("No sources configured in {}", args.sources.display());
        return Ok(());
    }

    println!(
        "{} {} sources in {}",
        style("ℹ").blue(),
        listed.len(),
        args.sources.display()
    );
    println!();

    for source in listed {
        let state = if source.enabled {
            style("enabled").green()
        } else {
            style("disabled").red()
        };
        println!(
            "  {} [{}] {} ({})",
            style(&source.name).bold(),
            source.method,
            state,
            source.url
        );
    }

    Ok(())
}
