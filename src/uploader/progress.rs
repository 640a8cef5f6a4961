//! Thread-safe collection of per-job outcomes and derived run statistics

use std::sync::Mutex;
use std::time::Instant;

use serde::Serialize;

use crate::uploader::job::{UploadResult, UploadStatus};

/// Aggregate statistics over all recorded results.
///
/// Produced as a consistent snapshot: every field reflects the same set of
/// recorded results, even while workers are still appending.
#[derive(Debug, Clone, Serialize)]
pub struct AggregateStats {
    /// Results recorded so far
    pub total: usize,
    /// Jobs that reached a successful terminal state
    pub successful: usize,
    /// Jobs that failed after exhausting retries or hitting a terminal error
    pub failed: usize,
    /// Jobs skipped before any remote call
    pub skipped: usize,
    /// Bytes uploaded across successful jobs
    pub total_bytes: u64,
    /// Wall-clock seconds since the aggregator was created
    pub elapsed_seconds: f64,
    /// Mean per-job duration over successful jobs, 0 when none succeeded
    pub mean_duration_seconds: f64,
    /// Successful bytes per elapsed second
    pub throughput_bytes_per_sec: f64,
}

/// Point-in-time progress of a running batch.
#[derive(Debug, Clone, Serialize)]
pub struct ProgressSummary {
    /// Results recorded so far (successes, failures and skips)
    pub processed: usize,
    /// Jobs submitted to the run
    pub expected_total: usize,
    /// Percentage of the batch processed
    pub percentage: f64,
    /// Successful jobs so far
    pub successful: usize,
    /// Failed jobs so far
    pub failed: usize,
    /// Jobs processed per minute since the run started
    pub rate_per_minute: f64,
    /// Estimated minutes until completion, 0 when the rate is unknown
    pub eta_minutes: f64,
}

impl ProgressSummary {
    /// Render the summary as a single log line.
    pub fn format(&self) -> String {
        format!(
            "Progress: {}/{} ({:.1}%) - Success: {}, Failed: {} - Rate: {:.2}/min, ETA: {:.1}min",
            self.processed,
            self.expected_total,
            self.percentage,
            self.successful,
            self.failed,
            self.rate_per_minute,
            self.eta_minutes
        )
    }
}

#[derive(Debug, Default)]
struct AggregatorState {
    results: Vec<UploadResult>,
    successful: usize,
    failed: usize,
    skipped: usize,
    total_bytes: u64,
    total_duration_seconds: f64,
}

/// Collects one [`UploadResult`] per job and answers statistics queries.
///
/// Shared between workers behind an `Arc`; all mutation happens under a
/// single short-lived lock so snapshots are never torn.
#[derive(Debug)]
pub struct ResultAggregator {
    start_time: Instant,
    expected_total: usize,
    state: Mutex<AggregatorState>,
}

impl ResultAggregator {
    /// Create an aggregator expecting `expected_total` jobs.
    pub fn new(expected_total: usize) -> Self {
        Self {
            start_time: Instant::now(),
            expected_total,
            state: Mutex::new(AggregatorState::default()),
        }
    }

    fn state(&self) -> std::sync::MutexGuard<'_, AggregatorState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Record one finished job.
    pub fn record(&self, result: UploadResult) {
        let mut state = self.state();
        match result.status {
            UploadStatus::Success => {
                state.successful += 1;
                state.total_bytes += result.byte_size.unwrap_or(0);
                state.total_duration_seconds += result.duration_seconds.unwrap_or(0.0);
            }
            UploadStatus::Skipped => state.skipped += 1,
            _ => state.failed += 1,
        }
        state.results.push(result);
    }

    /// Number of jobs the run was started with
    pub fn expected_total(&self) -> usize {
        self.expected_total
    }

    /// Results recorded so far
    pub fn len(&self) -> usize {
        self.state().results.len()
    }

    /// True when nothing has been recorded yet
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clone out the recorded results in completion order.
    pub fn results(&self) -> Vec<UploadResult> {
        self.state().results.clone()
    }

    /// Compute aggregate statistics as one consistent snapshot.
    pub fn stats(&self) -> AggregateStats {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        let state = self.state();
        let mean_duration_seconds = if state.successful > 0 {
            state.total_duration_seconds / state.successful as f64
        } else {
            0.0
        };
        let throughput_bytes_per_sec = if elapsed > 0.0 {
            state.total_bytes as f64 / elapsed
        } else {
            0.0
        };
        AggregateStats {
            total: state.results.len(),
            successful: state.successful,
            failed: state.failed,
            skipped: state.skipped,
            total_bytes: state.total_bytes,
            elapsed_seconds: elapsed,
            mean_duration_seconds,
            throughput_bytes_per_sec,
        }
    }

    /// Summarize progress for periodic emission between jobs.
    pub fn progress_summary(&self) -> ProgressSummary {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        let state = self.state();
        let processed = state.results.len();
        let percentage = if self.expected_total > 0 {
            processed as f64 / self.expected_total as f64 * 100.0
        } else {
            0.0
        };
        let rate_per_minute = if elapsed > 0.0 {
            processed as f64 / (elapsed / 60.0)
        } else {
            0.0
        };
        let remaining = self.expected_total.saturating_sub(processed);
        let eta_minutes = if rate_per_minute > 0.0 {
            remaining as f64 / rate_per_minute
        } else {
            0.0
        };
        ProgressSummary {
            processed,
            expected_total: self.expected_total,
            percentage,
            successful: state.successful,
            failed: state.failed,
            rate_per_minute,
            eta_minutes,
        }
    }
}
