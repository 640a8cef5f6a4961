//! Production observability metrics for the upload pipeline
//!
//! This module provides metrics collection for monitoring upload outcomes,
//! retry behavior, and rate limiter pressure.
//!
//! ## Architecture
//!
//! - Uses `metrics` crate for low-overhead metric collection
//! - Prometheus exporter for scraping endpoint (:9090/metrics)
//! - Recording before initialization is a no-op, so the pipeline never
//!   blocks on the metrics sink

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use metrics_exporter_prometheus::PrometheusBuilder;
use once_cell::sync::Lazy;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::uploader::job::{UploadResult, UploadStatus};

/// Global metrics registry initialization flag
static METRICS_INITIALIZED: Lazy<Arc<RwLock<bool>>> = Lazy::new(|| Arc::new(RwLock::new(false)));

/// Initialize metrics system with Prometheus exporter
///
/// This should be called once at application startup, typically in main().
/// The function is idempotent and will not reinitialize if already called.
///
/// # Arguments
/// * `addr` - Socket address to bind Prometheus scrape endpoint (e.g., "0.0.0.0:9090")
///
/// # Returns
/// Ok(()) if metrics initialized successfully, Err if binding fails
pub async fn init_metrics(addr: SocketAddr) -> Result<(), Box<dyn std::error::Error>> {
    let mut initialized = METRICS_INITIALIZED.write().await;
    if *initialized {
        debug!("Metrics already initialized, skipping");
        return Ok(());
    }

    info!("Initializing metrics system on {}", addr);

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {e}"))?;

    describe_counter!(
        "uploads_completed_total",
        Unit::Count,
        "Total number of assets uploaded successfully"
    );

    describe_counter!(
        "uploads_failed_total",
        Unit::Count,
        "Total number of jobs that failed permanently"
    );

    describe_counter!(
        "uploads_skipped_total",
        Unit::Count,
        "Total number of jobs skipped before any upload attempt"
    );

    describe_counter!(
        "upload_bytes_total",
        Unit::Bytes,
        "Total bytes uploaded successfully"
    );

    describe_counter!(
        "rate_limit_hits_total",
        Unit::Count,
        "Total number of rate limit responses received from the catalog"
    );

    describe_histogram!(
        "upload_duration_seconds",
        Unit::Seconds,
        "Wall time per job from first attempt to terminal result"
    );

    describe_histogram!(
        "upload_attempts",
        Unit::Count,
        "Create-asset attempts used per job"
    );

    describe_histogram!(
        "retry_backoff_duration_seconds",
        Unit::Seconds,
        "Duration of retry backoff sleeps"
    );

    *initialized = true;
    info!("Metrics system initialized successfully on {}", addr);
    Ok(())
}

/// Record the terminal result of one job
pub fn record_result(result: &UploadResult) {
    match result.status {
        UploadStatus::Success => {
            counter!("uploads_completed_total").increment(1);
            if let Some(bytes) = result.byte_size {
                counter!("upload_bytes_total").increment(bytes);
            }
            if let Some(duration) = result.duration_seconds {
                histogram!("upload_duration_seconds").record(duration);
            }
        }
        UploadStatus::Skipped => {
            counter!("uploads_skipped_total").increment(1);
        }
        _ => {
            counter!("uploads_failed_total").increment(1);
        }
    }

    if result.attempt_count > 0 {
        histogram!("upload_attempts").record(result.attempt_count as f64);
    }
}

/// Record a rate limit response from the catalog
pub fn record_rate_limited() {
    counter!("rate_limit_hits_total").increment(1);
}

/// Record retry backoff duration for one phase ("upload" or "listing")
pub fn record_retry_backoff(phase: &'static str, duration: Duration) {
    histogram!("retry_backoff_duration_seconds", "phase" => phase)
        .record(duration.as_secs_f64());

    debug!(
        phase,
        backoff_ms = duration.as_millis(),
        "Retry backoff recorded"
    );
}

/// Check if metrics system is initialized
pub async fn is_initialized() -> bool {
    *METRICS_INITIALIZED.read().await
}
