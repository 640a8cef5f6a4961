//! Upload orchestration: rate limiting, retries, dispatch, and aggregation
//!
//! This module provides the core upload execution engine with adaptive rate
//! limiting, per-job retry logic, and thread-safe result aggregation.
//!
//! # Overview
//!
//! The uploader orchestrates the complete batch workflow:
//!
//! 1. **Job Creation**: File discovery yields one [`job::Job`] per image
//! 2. **Processing**: Each job runs through [`processor::JobProcessor`]
//!    (naming, staging, upload, backup)
//! 3. **Rate Limiting**: All remote calls pass through a shared
//!    [`rate_limit::RateLimiter`] that adapts to server pushback
//! 4. **Dispatch**: [`dispatcher::Dispatcher`] runs jobs sequentially or over
//!    a bounded worker pool
//! 5. **Aggregation**: [`progress::ResultAggregator`] collects one
//!    [`job::UploadResult`] per job and serves live progress snapshots
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use catalog_uploader::catalog::{Credentials, HttpCatalogClient};
//! use catalog_uploader::shutdown::ShutdownCoordinator;
//! use catalog_uploader::uploader::config::RATE_LIMIT_MAX_DELAY;
//! use catalog_uploader::uploader::{
//!     AssetKind, BackupManager, Dispatcher, Job, JobProcessor, RateLimiter,
//!     UploadAttemptRunner, UploadConfig,
//! };
//!
//! # async fn example() {
//! let config = Arc::new(UploadConfig {
//!     group_id: 12345678,
//!     ..Default::default()
//! });
//! let jobs = vec![Job::new(
//!     "IMAGES_TO_UPLOAD/SHIRTS/red_shirt.png",
//!     AssetKind::Shirt,
//! )];
//!
//! let shutdown = ShutdownCoordinator::shared();
//! let limiter = Arc::new(RateLimiter::new(
//!     config.limiter_seed(jobs.len()),
//!     RATE_LIMIT_MAX_DELAY,
//! ));
//! let runner = UploadAttemptRunner::new(
//!     Arc::new(HttpCatalogClient::new()),
//!     limiter,
//!     Credentials::new(".ROBLOSECURITY value", 12345),
//!     config.clone(),
//!     shutdown.clone(),
//! );
//! let processor = JobProcessor::new(
//!     runner,
//!     BackupManager::new("backups", true),
//!     config.clone(),
//!     "temp",
//! );
//!
//! let outcome = Dispatcher::new(Arc::new(processor), config, shutdown)
//!     .run(jobs)
//!     .await;
//! println!("{} uploaded", outcome.stats.successful);
//! # }
//! ```
//!
//! # Components
//!
//! - [`dispatcher`] - Sequential and parallel job dispatch
//! - [`processor`] - Per-job pipeline from naming to backup
//! - [`attempt`] - Retry loop for the two remote phases
//! - [`rate_limit`] - Adaptive shared rate limiter
//! - [`progress`] - Result aggregation and progress snapshots
//! - [`job`] - Job definition, lifecycle statuses, and results
//! - [`backup`] - Post-success archival of source images
//! - [`config`] - Configuration values and backoff calculation
//!
//! # Error Handling
//!
//! Upload failures never propagate as `Err`: every job ends in exactly one
//! terminal [`job::UploadResult`], and per-call errors are classified by
//! [`crate::catalog::CatalogError`] into retryable and terminal cases.
//!
//! # Related Modules
//!
//! - [`crate::catalog`] - Remote catalog API client
//! - [`crate::files`] - Discovery, validation, naming, and staging
//! - [`crate::report`] - Final run report generation

pub mod attempt;
pub mod backup;
pub mod config;
pub mod dispatcher;
pub mod job;
pub mod processor;
pub mod progress;
pub mod rate_limit;

pub use attempt::UploadAttemptRunner;
pub use backup::BackupManager;
pub use config::UploadConfig;
pub use dispatcher::{Dispatcher, RunOutcome};
pub use job::{AssetKind, Job, UploadResult, UploadStatus};
pub use processor::JobProcessor;
pub use progress::{AggregateStats, ProgressSummary, ResultAggregator};
pub use rate_limit::RateLimiter;
