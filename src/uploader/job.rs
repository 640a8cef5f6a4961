//! Upload job structures, status state machine, and result tracking

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Asset category accepted by the catalog service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetKind {
    /// Classic shirt template
    #[serde(rename = "shirt")]
    Shirt,
    /// Classic pants template
    #[serde(rename = "pants")]
    Pants,
    /// Classic t-shirt decal
    #[serde(rename = "tshirt")]
    TShirt,
}

impl AssetKind {
    /// Identifier sent in the create-asset payload
    pub fn api_name(&self) -> &'static str {
        match self {
            AssetKind::Shirt => "shirt",
            AssetKind::Pants => "pants",
            AssetKind::TShirt => "tshirt",
        }
    }

    /// Source folder name under the upload base directory
    pub fn folder_name(&self) -> &'static str {
        match self {
            AssetKind::Shirt => "SHIRTS",
            AssetKind::Pants => "PANTS",
            AssetKind::TShirt => "TSHIRTS",
        }
    }

    /// Subdirectory used for staged temp copies
    pub fn staging_dir(&self) -> &'static str {
        match self {
            AssetKind::Shirt => "shirts",
            AssetKind::Pants => "pants",
            AssetKind::TShirt => "tshirts",
        }
    }

    /// All supported kinds, in discovery order
    pub fn all() -> [AssetKind; 3] {
        [AssetKind::Shirt, AssetKind::Pants, AssetKind::TShirt]
    }
}

impl std::fmt::Display for AssetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.api_name())
    }
}

/// One file slated for upload plus its target category.
///
/// Jobs are immutable: created by file discovery, consumed exactly once by
/// the dispatcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    /// Path to the source image on disk
    pub source_path: PathBuf,
    /// Target asset category
    pub kind: AssetKind,
}

impl Job {
    /// Create a new upload job
    pub fn new(source_path: impl Into<PathBuf>, kind: AssetKind) -> Self {
        Self {
            source_path: source_path.into(),
            kind,
        }
    }

    /// Validate job parameters
    pub fn validate(&self) -> Result<(), String> {
        if self.source_path.file_name().is_none() {
            return Err(format!(
                "Source path has no file name: {}",
                self.source_path.display()
            ));
        }
        Ok(())
    }

    /// File name of the source, for log lines
    pub fn file_name(&self) -> String {
        self.source_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Upload lifecycle status.
///
/// Legal transitions are encoded in [`transition`]; `Success`, `Failed`,
/// and `Skipped` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum UploadStatus {
    /// Job has not started yet
    #[default]
    Pending,
    /// Create-asset call in flight (or being retried)
    Uploading,
    /// Asset created remotely, awaiting next phase
    Processing,
    /// Release-for-sale call in flight
    Listing,
    /// Upload (and listing, when required) completed
    Success,
    /// Job failed permanently
    Failed,
    /// Job was skipped before any remote contact
    Skipped,
}

impl UploadStatus {
    /// Whether the status is terminal (no further transitions)
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            UploadStatus::Success | UploadStatus::Failed | UploadStatus::Skipped
        )
    }
}

/// Events that drive status transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadEvent {
    /// Begin the first upload attempt
    Start,
    /// Begin another upload attempt after a transient failure
    Retry,
    /// Remote returned a usable asset identifier
    AssetCreated,
    /// Asset must be listed for sale
    BeginListing,
    /// Upload pipeline finished for this job
    Complete,
    /// Permanent failure
    Fail,
    /// Job rejected before any remote contact
    Skip,
}

/// Attempted transition is not part of the upload lifecycle
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
#[error("invalid transition from {from:?} on {event:?}")]
pub struct InvalidTransition {
    /// Status the job was in
    pub from: UploadStatus,
    /// Event that was applied
    pub event: UploadEvent,
}

/// Apply an event to a status, yielding the next status.
///
/// This is the single source of truth for the upload lifecycle:
///
/// ```text
/// Pending -> Uploading -> Processing -> Listing -> Success
///                     \-> Processing -----------> Success   (free assets)
/// Failed  <- Uploading | Processing | Listing
/// Skipped <- Pending
/// ```
pub fn transition(
    current: UploadStatus,
    event: UploadEvent,
) -> Result<UploadStatus, InvalidTransition> {
    use UploadEvent::*;
    use UploadStatus::*;

    match (current, event) {
        (Pending, Start) => Ok(Uploading),
        (Pending, Skip) => Ok(Skipped),
        (Uploading, Retry) => Ok(Uploading),
        (Uploading, AssetCreated) => Ok(Processing),
        (Processing, BeginListing) => Ok(Listing),
        (Processing, Complete) => Ok(Success),
        (Listing, Complete) => Ok(Success),
        (Uploading, Fail) | (Processing, Fail) | (Listing, Fail) => Ok(Failed),
        (from, event) => Err(InvalidTransition { from, event }),
    }
}

/// Outcome of one job, handed by value to the result aggregator.
///
/// Built inside the attempt runner and replaced (not mutated) at each retry
/// boundary; immutable once recorded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResult {
    /// Original source file path
    pub source_path: PathBuf,
    /// Display name sent to the catalog (empty when skipped before naming)
    pub asset_name: String,
    /// Terminal status for this job
    pub status: UploadStatus,
    /// Remote asset identifier, when the create call succeeded
    pub asset_id: Option<u64>,
    /// Failure or skip reason
    pub error_message: Option<String>,
    /// Wall time of the successful upload call, in seconds
    pub duration_seconds: Option<f64>,
    /// Source file size in bytes
    pub byte_size: Option<u64>,
    /// Number of upload attempts made (0 if never reached the remote)
    pub attempt_count: u32,
    /// When this result was produced
    pub created_at: DateTime<Utc>,
}

impl UploadResult {
    /// Result for a job skipped before any remote contact
    pub fn skipped(source_path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self {
            source_path: source_path.into(),
            asset_name: String::new(),
            status: UploadStatus::Skipped,
            asset_id: None,
            error_message: Some(reason.into()),
            duration_seconds: None,
            byte_size: None,
            attempt_count: 0,
            created_at: Utc::now(),
        }
    }

    /// Synthesized failure for a job whose processing faulted unexpectedly
    pub fn faulted(source_path: impl Into<PathBuf>, error: impl Into<String>) -> Self {
        Self {
            source_path: source_path.into(),
            asset_name: String::new(),
            status: UploadStatus::Failed,
            asset_id: None,
            error_message: Some(error.into()),
            duration_seconds: None,
            byte_size: None,
            attempt_count: 0,
            created_at: Utc::now(),
        }
    }

    /// File name of the source, for report lines
    pub fn file_name(&self) -> String {
        Path::new(&self.source_path)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}
