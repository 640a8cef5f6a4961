//! Per-job orchestration: naming, staging, upload, backup
//!
//! [`JobProcessor`] takes one discovered job from display-name generation
//! through the staged upload to the optional backup copy. The staged temp
//! file is held in an RAII guard, so it is removed on every exit path
//! including faults that unwind.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, info_span, Instrument};

use crate::files::{generate_display_name, is_sentinel, StagedFile};
use crate::uploader::attempt::UploadAttemptRunner;
use crate::uploader::backup::BackupManager;
use crate::uploader::config::UploadConfig;
use crate::uploader::job::{Job, UploadResult, UploadStatus};

/// Processes a single job end to end, always yielding a terminal result.
pub struct JobProcessor {
    runner: UploadAttemptRunner,
    backup: BackupManager,
    config: Arc<UploadConfig>,
    temp_root: PathBuf,
}

impl JobProcessor {
    /// Create a processor staging temp copies under `temp_root`.
    pub fn new(
        runner: UploadAttemptRunner,
        backup: BackupManager,
        config: Arc<UploadConfig>,
        temp_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            runner,
            backup,
            config,
            temp_root: temp_root.into(),
        }
    }

    /// Process one job. Never panics outward and never returns a
    /// non-terminal status.
    pub async fn process(&self, job: Job) -> UploadResult {
        let span = info_span!("job", file = %job.file_name());
        self.process_inner(job).instrument(span).await
    }

    async fn process_inner(&self, job: Job) -> UploadResult {
        let asset_name = generate_display_name(
            &job.source_path,
            &self.config.name_tags,
            self.config.max_name_length,
        );
        if is_sentinel(&asset_name) {
            info!("Skipping - could not generate a valid asset name");
            return UploadResult::skipped(job.source_path, "Could not generate valid asset name");
        }

        let staged = match StagedFile::stage(&job.source_path, job.kind, &self.temp_root) {
            Ok(staged) => staged,
            Err(e) => {
                return UploadResult::faulted(
                    job.source_path,
                    format!("could not stage file: {e}"),
                );
            }
        };

        let result = self.runner.run(&job, &asset_name, staged.path()).await;

        if result.status == UploadStatus::Success {
            if let Some(asset_id) = result.asset_id {
                self.backup.backup(&job.source_path, Some(asset_id));
            }
        }

        result
    }
}
