//! Main entry point for the catalog-uploader CLI

use catalog_uploader::cli::{Cli, Commands};
use catalog_uploader::shutdown::{self, ShutdownCoordinator};
use clap::Parser;
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber with optional JSON formatting
fn init_tracing() {
    // Check if JSON output is requested via environment variable
    let json_format = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("catalog_uploader=info"));

    if json_format {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();

    if let Some(addr) = cli.metrics_addr {
        if let Err(e) = catalog_uploader::metrics::init_metrics(addr).await {
            warn!("Metrics exporter unavailable, continuing without it: {e}");
        }
    }

    // Install global shutdown coordinator and Ctrl+C handler
    let shutdown = ShutdownCoordinator::shared();
    shutdown::set_global_shutdown(shutdown.clone());
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Ctrl+C received - finishing in-flight uploads...");
                shutdown.request_shutdown();
            }
        }
    });

    let result = match cli.command {
        Commands::Upload(ref args) => args.execute(&cli, shutdown.clone()).await,
        Commands::Validate(ref args) => args.execute(&cli).await,
    };

    // Individual upload failures are reported, not fatal; only
    // configuration-level problems reach this branch.
    if let Err(e) = result {
        error!("Command failed: {}", e);
        std::process::exit(1);
    }
}
