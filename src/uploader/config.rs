//! Upload pipeline configuration and backoff constants

use std::time::Duration;

/// Maximum attempts for the create-asset phase.
/// 5 attempts with exponential backoff rides out short rate-limit windows
/// without looping forever on persistent failures (max total sleep 45s).
pub const MAX_UPLOAD_ATTEMPTS: u32 = 5;

/// Maximum attempts for the release-for-sale phase.
/// Listing failures after a successful create are surfaced rather than
/// retried aggressively, so the ceiling is lower than the upload phase.
pub const MAX_LISTING_ATTEMPTS: u32 = 3;

/// Base delay for retry backoff in both phases.
pub const RETRY_DELAY: Duration = Duration::from_secs(3);

/// Default price applied to listed assets.
pub const DEFAULT_PRICE: u32 = 5;

/// Default minimum interval between uploads.
/// Seeds the adaptive rate limiter; 15 seconds stays comfortably inside the
/// catalog's per-account throttle for a single worker.
pub const DEFAULT_SLEEP_EACH_UPLOAD: Duration = Duration::from_secs(15);

/// Ceiling for the adaptive rate limiter delay.
pub const RATE_LIMIT_MAX_DELAY: Duration = Duration::from_secs(60);

/// Retry-after assumed when the create-asset endpoint throttles without a hint.
pub const UPLOAD_RETRY_AFTER_FALLBACK: Duration = Duration::from_secs(60);

/// Retry-after assumed when the listing endpoint throttles without a hint.
pub const LISTING_RETRY_AFTER_FALLBACK: Duration = Duration::from_secs(30);

/// Default worker count for parallel dispatch.
pub const DEFAULT_MAX_WORKERS: usize = 3;

/// Upper bound on configured workers. More than 10 concurrent uploads
/// trips the catalog's burst detection even with a shared limiter.
pub const MAX_WORKERS_LIMIT: usize = 10;

/// Maximum length of a generated display name.
pub const MAX_NAME_LENGTH: usize = 50;

/// Calculate exponential backoff for upload retries.
///
/// `attempt_index` is the 0-based index of the attempt that just failed:
/// 3s, 6s, 12s, 24s for the default base delay.
pub fn upload_backoff(retry_delay: Duration, attempt_index: u32) -> Duration {
    retry_delay * 2u32.saturating_pow(attempt_index)
}

/// Calculate linear backoff for listing retries.
///
/// `attempt_number` is the 1-based number of the attempt that just failed:
/// 3s, 6s for the default base delay.
pub fn listing_backoff(retry_delay: Duration, attempt_number: u32) -> Duration {
    retry_delay * attempt_number.max(1)
}

/// Runtime configuration consumed read-only by the upload pipeline.
#[derive(Debug, Clone)]
pub struct UploadConfig {
    /// Group the assets are created under
    pub group_id: u64,
    /// Description applied to every asset
    pub description: String,
    /// Sale price in the catalog currency; 0 skips the listing phase
    pub price: u32,
    /// Tags appended to generated display names
    pub name_tags: Vec<String>,
    /// Maximum display name length
    pub max_name_length: usize,
    /// Dispatch jobs over a worker pool instead of sequentially
    pub parallel: bool,
    /// Upper bound on concurrent workers in parallel mode
    pub max_workers: usize,
    /// Attempt ceiling for the create-asset phase
    pub max_upload_attempts: u32,
    /// Attempt ceiling for the release-for-sale phase
    pub max_listing_attempts: u32,
    /// Base delay for retry backoff
    pub retry_delay: Duration,
    /// Target minimum interval between uploads; seeds the rate limiter
    pub sleep_each_upload: Duration,
    /// Extra fixed delay between jobs in sequential mode, on top of the
    /// adaptive limiter; zero disables it
    pub sleep_between_jobs: Duration,
    /// Archive originals after successful upload
    pub backup_enabled: bool,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            group_id: 0,
            description: String::new(),
            price: DEFAULT_PRICE,
            name_tags: Vec::new(),
            max_name_length: MAX_NAME_LENGTH,
            parallel: false,
            max_workers: DEFAULT_MAX_WORKERS,
            max_upload_attempts: MAX_UPLOAD_ATTEMPTS,
            max_listing_attempts: MAX_LISTING_ATTEMPTS,
            retry_delay: RETRY_DELAY,
            sleep_each_upload: DEFAULT_SLEEP_EACH_UPLOAD,
            sleep_between_jobs: Duration::ZERO,
            backup_enabled: true,
        }
    }
}

impl UploadConfig {
    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if self.max_workers < 1 || self.max_workers > MAX_WORKERS_LIMIT {
            return Err(format!(
                "max_workers must be between 1 and {MAX_WORKERS_LIMIT}, got {}",
                self.max_workers
            ));
        }
        if self.max_upload_attempts == 0 {
            return Err("max_upload_attempts must be at least 1".to_string());
        }
        if self.max_listing_attempts == 0 {
            return Err("max_listing_attempts must be at least 1".to_string());
        }
        if self.max_name_length == 0 {
            return Err("max_name_length must be at least 1".to_string());
        }
        Ok(())
    }

    /// Effective worker count for a job set: min(configured max, job count)
    pub fn worker_count(&self, job_count: usize) -> usize {
        self.max_workers.min(job_count).max(1)
    }

    /// Initial delay for the shared rate limiter.
    ///
    /// In parallel mode the base interval is divided across the effective
    /// worker count so aggregate request pressure matches sequential mode.
    pub fn limiter_seed(&self, job_count: usize) -> Duration {
        if self.parallel {
            self.sleep_each_upload / self.worker_count(job_count) as u32
        } else {
            self.sleep_each_upload
        }
    }
}
