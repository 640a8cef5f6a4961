//! Upload command implementation

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use crate::catalog::HttpCatalogClient;
use crate::files::discover_jobs;
use crate::report;
use crate::settings::{Settings, DEFAULT_CONFIG_PATH};
use crate::shutdown::SharedShutdown;
use crate::uploader::config::RATE_LIMIT_MAX_DELAY;
use crate::uploader::{
    BackupManager, Dispatcher, JobProcessor, RateLimiter, UploadAttemptRunner,
};

use super::CliError;

/// Catalog uploader CLI
#[derive(Parser, Debug)]
#[command(name = "catalog-uploader")]
#[command(about = "Batch-upload classic clothing images to the Roblox catalog", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Path to the settings file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Bind address for the Prometheus metrics endpoint (e.g. 127.0.0.1:9090)
    #[arg(long, global = true)]
    pub metrics_addr: Option<std::net::SocketAddr>,
}

/// CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Discover images and upload them
    Upload(UploadArgs),

    /// Check configuration and preview the upload set without uploading
    Validate(super::ValidateArgs),
}

/// Upload command arguments
#[derive(Parser, Debug)]
pub struct UploadArgs {
    /// Override the folder scanned for images
    #[arg(long)]
    pub base_folder: Option<PathBuf>,

    /// Disable the terminal progress bar
    #[arg(long, default_value_t = false)]
    pub no_progress_bar: bool,
}

impl UploadArgs {
    /// Execute a full upload run: discover, dispatch, report.
    pub async fn execute(&self, cli: &Cli, shutdown: SharedShutdown) -> Result<(), CliError> {
        let settings = Settings::load(&cli.config)?;
        let config = Arc::new(settings.upload_config());

        let base_folder = self
            .base_folder
            .clone()
            .unwrap_or_else(|| settings.base_folder.clone());
        let jobs = discover_jobs(&base_folder)?;
        if jobs.is_empty() {
            info!(folder = %base_folder.display(), "No images found - nothing to do");
            println!(
                "No uploadable images found. Drop .png files into {} and run again.",
                base_folder.display()
            );
            return Ok(());
        }

        let limiter = Arc::new(RateLimiter::new(
            config.limiter_seed(jobs.len()),
            RATE_LIMIT_MAX_DELAY,
        ));
        let runner = UploadAttemptRunner::new(
            Arc::new(HttpCatalogClient::new()),
            limiter,
            settings.credentials(),
            config.clone(),
            shutdown.clone(),
        );
        let processor = JobProcessor::new(
            runner,
            BackupManager::new(settings.backup_folder.clone(), config.backup_enabled),
            config.clone(),
            settings.temp_folder.clone(),
        );

        let mut dispatcher = Dispatcher::new(Arc::new(processor), config.clone(), shutdown);
        let progress_bar = if self.no_progress_bar {
            None
        } else {
            Some(create_progress_bar(jobs.len() as u64))
        };
        if let Some(pb) = &progress_bar {
            let pb = pb.clone();
            dispatcher = dispatcher.with_progress(move |summary| {
                pb.set_position(summary.processed as u64);
                pb.set_message(format!(
                    "ok {} / failed {}",
                    summary.successful, summary.failed
                ));
            });
        }

        info!(
            total = jobs.len(),
            parallel = config.parallel,
            price = config.price,
            "Starting upload run"
        );
        let outcome = dispatcher.run(jobs).await;
        if let Some(pb) = progress_bar {
            pb.finish_and_clear();
        }

        let report_text = report::render_report(&outcome.results, &outcome.stats);
        println!("{report_text}");
        report::save_report(&report_text, Path::new("logs"));

        Ok(())
    }
}

/// Create progress bar with style
fn create_progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
            .expect("hardcoded template is valid")
            .progress_chars("#>-"),
    );
    pb.set_message("Uploading");
    pb
}
