//! Job dispatch: sequential or bounded-parallel execution
//!
//! The dispatcher owns the one-result-per-job guarantee. Worker panics are
//! caught at the task boundary and synthesized into `Failed` results, and a
//! shutdown request stops further submissions while letting in-flight jobs
//! drain.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tracing::{info, warn};

use crate::shutdown::SharedShutdown;
use crate::uploader::config::UploadConfig;
use crate::uploader::job::{Job, UploadResult};
use crate::uploader::processor::JobProcessor;
use crate::uploader::progress::{AggregateStats, ProgressSummary, ResultAggregator};

/// Callback invoked with a fresh progress snapshot after every recorded job
pub type ProgressFn = dyn Fn(&ProgressSummary) + Send + Sync;

/// Final outcome of one dispatch run.
#[derive(Debug)]
pub struct RunOutcome {
    /// One result per processed job, in completion order
    pub results: Vec<UploadResult>,
    /// Aggregate statistics snapshot taken at the end of the run
    pub stats: AggregateStats,
}

/// Runs a batch of jobs through a shared [`JobProcessor`].
pub struct Dispatcher {
    processor: Arc<JobProcessor>,
    config: Arc<UploadConfig>,
    shutdown: SharedShutdown,
    progress: Option<Arc<ProgressFn>>,
}

impl Dispatcher {
    /// Create a dispatcher for the given processor and configuration.
    pub fn new(
        processor: Arc<JobProcessor>,
        config: Arc<UploadConfig>,
        shutdown: SharedShutdown,
    ) -> Self {
        Self {
            processor,
            config,
            shutdown,
            progress: None,
        }
    }

    /// Attach a progress callback, e.g. for a terminal progress bar.
    pub fn with_progress(mut self, callback: impl Fn(&ProgressSummary) + Send + Sync + 'static) -> Self {
        self.progress = Some(Arc::new(callback));
        self
    }

    /// Process every job, honoring the configured execution mode.
    ///
    /// Every job submitted before a shutdown request yields exactly one
    /// result; jobs not yet submitted when shutdown arrives are left
    /// unprocessed.
    pub async fn run(&self, jobs: Vec<Job>) -> RunOutcome {
        let aggregator = Arc::new(ResultAggregator::new(jobs.len()));

        if jobs.is_empty() {
            info!("No jobs to process");
        } else if self.config.parallel {
            self.run_parallel(jobs, &aggregator).await;
        } else {
            self.run_sequential(jobs, &aggregator).await;
        }

        RunOutcome {
            results: aggregator.results(),
            stats: aggregator.stats(),
        }
    }

    async fn run_sequential(&self, jobs: Vec<Job>, aggregator: &ResultAggregator) {
        info!(total = jobs.len(), "Starting sequential upload");

        for (index, job) in jobs.into_iter().enumerate() {
            if self.shutdown.is_shutdown_requested() {
                warn!("Shutdown requested - not submitting further jobs");
                break;
            }
            if index > 0 && !self.config.sleep_between_jobs.is_zero() {
                let interrupted = tokio::select! {
                    _ = tokio::time::sleep(self.config.sleep_between_jobs) => false,
                    _ = self.shutdown.wait_for_shutdown() => true,
                };
                if interrupted {
                    warn!("Shutdown requested - not submitting further jobs");
                    break;
                }
            }

            let result = self.run_isolated(job).await;
            self.record(aggregator, result);
        }
    }

    async fn run_parallel(&self, jobs: Vec<Job>, aggregator: &ResultAggregator) {
        let workers = self.config.worker_count(jobs.len());
        info!(total = jobs.len(), workers, "Starting parallel upload");

        stream::iter(jobs)
            .map(|job| async move {
                if self.shutdown.is_shutdown_requested() {
                    return None;
                }
                Some(self.run_isolated(job).await)
            })
            .buffer_unordered(workers)
            .for_each(|completed| async {
                if let Some(result) = completed {
                    self.record(aggregator, result);
                }
            })
            .await;
    }

    /// Run one job in its own task so a panic cannot take down the
    /// dispatcher; a panicked task is converted into a `Failed` result.
    async fn run_isolated(&self, job: Job) -> UploadResult {
        let source_path = job.source_path.clone();
        let processor = self.processor.clone();
        match tokio::spawn(async move { processor.process(job).await }).await {
            Ok(result) => result,
            Err(e) => UploadResult::faulted(source_path, format!("task execution error: {e}")),
        }
    }

    fn record(&self, aggregator: &ResultAggregator, result: UploadResult) {
        crate::metrics::record_result(&result);
        aggregator.record(result);

        let summary = aggregator.progress_summary();
        info!("{}", summary.format());
        if let Some(callback) = &self.progress {
            callback(&summary);
        }
    }
}
