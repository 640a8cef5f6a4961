//! # Catalog Uploader Library
//!
//! A batch uploader for classic clothing images, built around an adaptive
//! rate limiter, a per-job retry state machine, and thread-safe result
//! aggregation. Designed for unattended runs over large folders where
//! partial success is the expected steady state.
//!
//! ## Features
//!
//! - **Folder Discovery**: One subfolder per asset kind, validated PNGs only
//! - **Adaptive Rate Limiting**: Shared limiter that backs off on server
//!   pushback and relaxes after sustained success
//! - **Retry State Machine**: Exponential backoff for asset creation, linear
//!   backoff for listing, terminal errors never retried
//! - **Sequential or Parallel Dispatch**: Bounded worker pool with one
//!   guaranteed result per job
//! - **Graceful Shutdown**: Ctrl+C drains in-flight uploads instead of
//!   killing them mid-call
//!
//! ## Quick Start
//!
//! See [`uploader`] for a complete wiring example. The short version:
//! discover jobs with [`files::discover_jobs`], build a
//! [`uploader::Dispatcher`], and hand its [`uploader::RunOutcome`] to
//! [`report::render_report`].
//!
//! ## Architecture
//!
//! The library is organized into several core modules:
//!
//! - [`catalog`] - Remote catalog API client (create asset, release for sale)
//! - [`files`] - Discovery, PNG validation, display naming, temp staging
//! - [`uploader`] - Rate limiting, retries, dispatch, and aggregation
//! - [`settings`] - On-disk configuration with template generation
//! - [`report`] - End-of-run report rendering and archival
//! - [`shutdown`] - Graceful shutdown coordination shared across modules
//! - [`metrics`] - Prometheus metrics for unattended runs

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Remote catalog API surface
pub mod catalog;

/// CLI command implementations
pub mod cli;

/// File discovery, validation, naming, and staging
pub mod files;

/// Observability metrics
pub mod metrics;

/// End-of-run report generation
pub mod report;

/// On-disk configuration
pub mod settings;

/// Graceful shutdown coordination shared across modules
pub mod shutdown;

/// Upload orchestration
pub mod uploader;

// Re-export commonly used types
pub use settings::Settings;
pub use uploader::{AssetKind, Job, UploadResult, UploadStatus};
