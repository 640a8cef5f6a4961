//! Retry loop driving a single job through the upload state machine
//!
//! One [`UploadAttemptRunner`] is shared by all workers of a run. It owns the
//! retry policy for both remote phases: exponential backoff for asset
//! creation, linear backoff for listing. Every remote call is preceded by a
//! pass through the shared [`RateLimiter`], and every backoff sleep races the
//! shutdown signal so a cancelled run stops retrying promptly without
//! interrupting a call already in flight.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::{debug, error, info, warn};

use crate::catalog::{CatalogClient, CatalogError, Credentials};
use crate::shutdown::SharedShutdown;
use crate::uploader::config::{
    listing_backoff, upload_backoff, UploadConfig, LISTING_RETRY_AFTER_FALLBACK,
    UPLOAD_RETRY_AFTER_FALLBACK,
};
use crate::uploader::job::{
    transition, InvalidTransition, Job, UploadEvent, UploadResult, UploadStatus,
};
use crate::uploader::rate_limit::RateLimiter;

/// Drives upload and listing attempts for staged jobs.
pub struct UploadAttemptRunner {
    client: Arc<dyn CatalogClient>,
    limiter: Arc<RateLimiter>,
    credentials: Credentials,
    config: Arc<UploadConfig>,
    shutdown: SharedShutdown,
}

impl UploadAttemptRunner {
    /// Create a runner over a shared client and rate limiter.
    pub fn new(
        client: Arc<dyn CatalogClient>,
        limiter: Arc<RateLimiter>,
        credentials: Credentials,
        config: Arc<UploadConfig>,
        shutdown: SharedShutdown,
    ) -> Self {
        Self {
            client,
            limiter,
            credentials,
            config,
            shutdown,
        }
    }

    /// Upload the staged file and, for priced assets, list it for sale.
    ///
    /// Always produces a terminal result; state machine faults are converted
    /// into a `Failed` result rather than propagated.
    pub async fn run(&self, job: &Job, asset_name: &str, staged_path: &Path) -> UploadResult {
        match self.drive(job, asset_name, staged_path).await {
            Ok(result) => result,
            Err(e) => UploadResult::faulted(
                job.source_path.clone(),
                format!("upload state fault: {e}"),
            ),
        }
    }

    async fn drive(
        &self,
        job: &Job,
        asset_name: &str,
        staged_path: &Path,
    ) -> Result<UploadResult, InvalidTransition> {
        let started = Instant::now();

        let file_bytes = match tokio::fs::read(staged_path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                return Ok(UploadResult::faulted(
                    job.source_path.clone(),
                    format!("could not read staged file: {e}"),
                ));
            }
        };
        let byte_size = file_bytes.len() as u64;

        let finish = |status: UploadStatus,
                      asset_id: Option<u64>,
                      error_message: Option<String>,
                      attempt_count: u32| UploadResult {
            source_path: job.source_path.clone(),
            asset_name: asset_name.to_string(),
            status,
            asset_id,
            error_message,
            duration_seconds: Some(started.elapsed().as_secs_f64()),
            byte_size: Some(byte_size),
            attempt_count,
            created_at: Utc::now(),
        };

        let max_attempts = self.config.max_upload_attempts;
        let mut state = UploadStatus::Pending;
        let mut attempts_used = 0;
        let mut last_error = String::from("upload failed");

        for attempt in 0..max_attempts {
            attempts_used = attempt + 1;
            let event = if attempt == 0 {
                UploadEvent::Start
            } else {
                UploadEvent::Retry
            };
            state = transition(state, event)?;
            debug!(
                asset_name,
                attempt = attempts_used,
                max_attempts,
                "Upload attempt"
            );

            self.limiter.wait().await;

            match self
                .client
                .create_asset(
                    &self.credentials,
                    asset_name,
                    &file_bytes,
                    job.kind,
                    self.config.group_id,
                    &self.config.description,
                )
                .await
            {
                Ok(asset_id) => {
                    state = transition(state, UploadEvent::AssetCreated)?;

                    if self.config.price > 0 {
                        state = transition(state, UploadEvent::BeginListing)?;
                        if self.run_listing(asset_name, asset_id).await {
                            state = transition(state, UploadEvent::Complete)?;
                            self.limiter.on_success();
                            info!(asset_name, asset_id, "Uploaded and listed");
                            return Ok(finish(state, Some(asset_id), None, attempts_used));
                        }
                        state = transition(state, UploadEvent::Fail)?;
                        error!(asset_name, asset_id, "Listing failed after upload");
                        return Ok(finish(
                            state,
                            Some(asset_id),
                            Some("upload succeeded but listing failed".to_string()),
                            attempts_used,
                        ));
                    }

                    state = transition(state, UploadEvent::Complete)?;
                    self.limiter.on_success();
                    info!(asset_name, asset_id, "Uploaded");
                    return Ok(finish(state, Some(asset_id), None, attempts_used));
                }
                Err(e) if e.is_terminal() => {
                    state = transition(state, UploadEvent::Fail)?;
                    error!(asset_name, error = %e, "Upload rejected with terminal error");
                    return Ok(finish(state, None, Some(e.to_string()), attempts_used));
                }
                Err(e) => {
                    self.signal_limiter(&e, UPLOAD_RETRY_AFTER_FALLBACK);
                    last_error = e.to_string();
                }
            }

            if attempt + 1 < max_attempts {
                let backoff = upload_backoff(self.config.retry_delay, attempt);
                warn!(
                    asset_name,
                    error = %last_error,
                    delay_secs = backoff.as_secs(),
                    attempt = attempts_used,
                    max_attempts,
                    "Upload attempt failed - retrying"
                );
                crate::metrics::record_retry_backoff("upload", backoff);
                if !self.sleep_unless_shutdown(backoff).await {
                    warn!(asset_name, "Shutdown requested - abandoning retries");
                    break;
                }
            }
        }

        state = transition(state, UploadEvent::Fail)?;
        error!(asset_name, error = %last_error, "All upload attempts failed");
        Ok(finish(state, None, Some(last_error), attempts_used))
    }

    /// Attempt to list an uploaded asset for sale, retrying with linear
    /// backoff. Returns whether the listing eventually went through.
    async fn run_listing(&self, asset_name: &str, asset_id: u64) -> bool {
        let max_attempts = self.config.max_listing_attempts;

        for attempt in 0..max_attempts {
            self.limiter.wait().await;

            match self
                .client
                .release_for_sale(
                    &self.credentials,
                    asset_id,
                    self.config.price,
                    asset_name,
                    &self.config.description,
                    self.config.group_id,
                )
                .await
            {
                Ok(()) => {
                    self.limiter.on_success();
                    return true;
                }
                Err(e) => {
                    self.signal_limiter(&e, LISTING_RETRY_AFTER_FALLBACK);
                    warn!(
                        asset_name,
                        asset_id,
                        attempt = attempt + 1,
                        max_attempts,
                        error = %e,
                        "Listing attempt failed"
                    );
                }
            }

            if attempt + 1 < max_attempts {
                let backoff = listing_backoff(self.config.retry_delay, attempt + 1);
                crate::metrics::record_retry_backoff("listing", backoff);
                if !self.sleep_unless_shutdown(backoff).await {
                    warn!(asset_name, asset_id, "Shutdown requested - abandoning listing retries");
                    break;
                }
            }
        }

        false
    }

    /// Feed a failed call into the shared limiter. Throttle signals without a
    /// server hint fall back to a per-phase conservative estimate.
    fn signal_limiter(&self, error: &CatalogError, fallback: Duration) {
        if error.is_rate_limited() {
            let hint = error.retry_after().unwrap_or(fallback);
            self.limiter.on_rate_limited(Some(hint));
            crate::metrics::record_rate_limited();
        } else {
            self.limiter.on_error();
        }
    }

    /// Sleep for `delay`, waking early on shutdown. Returns false when the
    /// sleep was cut short.
    async fn sleep_unless_shutdown(&self, delay: Duration) -> bool {
        tokio::select! {
            _ = tokio::time::sleep(delay) => true,
            _ = self.shutdown.wait_for_shutdown() => false,
        }
    }
}
