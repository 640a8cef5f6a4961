//! Validation subcommand: dry-run discovery and naming preview

use clap::Parser;
use std::path::PathBuf;

use crate::files::{discover_jobs, generate_display_name, is_sentinel};
use crate::settings::Settings;

use super::upload::Cli;
use super::CliError;

/// Validate command: checks the configuration and previews which files
/// would be uploaded under which display names, without touching the
/// remote service.
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Override the folder scanned for images
    #[arg(long)]
    pub base_folder: Option<PathBuf>,
}

impl ValidateArgs {
    /// Execute the validation command
    pub async fn execute(&self, cli: &Cli) -> Result<(), CliError> {
        let settings = Settings::load(&cli.config)?;
        println!(
            "Configuration OK: group {}, price {}, {} mode",
            settings.group_id,
            settings.assets_price,
            if settings.parallel_uploads {
                "parallel"
            } else {
                "sequential"
            }
        );

        let base_folder = self
            .base_folder
            .clone()
            .unwrap_or_else(|| settings.base_folder.clone());
        let jobs = discover_jobs(&base_folder)?;
        if jobs.is_empty() {
            println!(
                "No uploadable images found under {}",
                base_folder.display()
            );
            return Ok(());
        }

        let config = settings.upload_config();
        println!("Found {} uploadable image(s):", jobs.len());
        for job in &jobs {
            let name =
                generate_display_name(&job.source_path, &config.name_tags, config.max_name_length);
            let marker = if is_sentinel(&name) {
                " (would be skipped)"
            } else {
                ""
            };
            println!("  - [{}] {} -> \"{}\"{}", job.kind, job.file_name(), name, marker);
        }

        Ok(())
    }
}
