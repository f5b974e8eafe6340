//! CLI application for the community event aggregation pipeline.

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{config, run, sources};

/// Community event aggregator - scrape, normalize, deduplicate, export
#[derive(Parser)]
#[command(name = "evagg")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path to the pipeline settings file
    #[arg(short, long, global = true)]
    settings: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full aggregation pipeline
    Run(run::RunArgs),

    /// List configured sources
    Sources(sources::SourcesArgs),

    /// Manage pipeline settings
    Config(config::ConfigArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    // Execute command
    match cli.command {
        Commands::Run(args) => run::run(args, cli.settings.as_deref()),
        Commands::Sources(args) => sources::run(args),
        Commands::Config(args) => config::run(args, cli.settings.as_deref()),
    }
}
