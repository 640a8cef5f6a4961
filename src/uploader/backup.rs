//! Post-success backup copies of uploaded source files

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

/// Copies successfully uploaded files into a backup folder.
///
/// Backups are strictly best-effort: any failure is logged and swallowed so
/// a full disk or permission problem can never fail a job that already
/// uploaded. When disabled every call is a no-op.
#[derive(Debug, Clone)]
pub struct BackupManager {
    backup_dir: PathBuf,
    enabled: bool,
}

impl BackupManager {
    /// Create a manager writing into `backup_dir`, creating it when enabled.
    pub fn new(backup_dir: impl Into<PathBuf>, enabled: bool) -> Self {
        let backup_dir = backup_dir.into();
        if enabled {
            if let Err(e) = fs::create_dir_all(&backup_dir) {
                warn!(path = %backup_dir.display(), error = %e, "Could not create backup folder");
            }
        }
        Self { backup_dir, enabled }
    }

    /// Whether backups are being written
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Copy `source` into the backup folder, tagging the copy with the asset
    /// id and the current unix timestamp.
    ///
    /// Returns the backup path on success, `None` when disabled or when the
    /// copy failed.
    pub fn backup(&self, source: &Path, asset_id: Option<u64>) -> Option<PathBuf> {
        if !self.enabled {
            return None;
        }

        let stem = source.file_stem().and_then(|s| s.to_str()).unwrap_or("file");
        let ext = source
            .extension()
            .and_then(|s| s.to_str())
            .map(|e| format!(".{e}"))
            .unwrap_or_default();
        let timestamp = chrono::Utc::now().timestamp();
        let file_name = match asset_id {
            Some(id) => format!("{stem}_{id}_{timestamp}{ext}"),
            None => format!("{stem}_{timestamp}{ext}"),
        };
        let target = self.backup_dir.join(file_name);

        match fs::copy(source, &target) {
            Ok(_) => {
                debug!(source = %source.display(), backup = %target.display(), "Backed up file");
                Some(target)
            }
            Err(e) => {
                warn!(source = %source.display(), error = %e, "Backup failed");
                None
            }
        }
    }
}
