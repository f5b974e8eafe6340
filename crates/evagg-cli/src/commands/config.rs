//! Config command - manage pipeline settings.

use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use console::style;

use evagg_core::models::PipelineSettings;

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    action: ConfigAction,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write a default settings file
    Init {
        /// Destination path
        #[arg(default_value = "settings.json")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Show the effective settings
    Show,
}

pub fn run(args: ConfigArgs, settings_path: Option<&str>) -> anyhow::Result<()> {
    match args.action {
        ConfigAction::Init { path, force } => {
            if path.exists() && !force {
                anyhow::bail!(
                    "{} already exists (use --force to overwrite)",
                    path.display()
                );
            }
            PipelineSettings::default().save(&path)?;
            println!(
                "{} Wrote default settings to {}",
                style("✓").green(),
                path.display()
            );
        }
        ConfigAction::Show => {
            let settings = match settings_path {
                Some(path) => PipelineSettings::from_file(Path::new(path))?,
                None => PipelineSettings::default(),
            };
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
    }
    Ok(())
}
