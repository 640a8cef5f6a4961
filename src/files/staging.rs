//! Temporary staging copies for upload
//!
//! Uploads never read the source file directly: each job works on a staged
//! copy under the temp folder. [`StagedFile`] removes its copy on drop, so
//! the staged file disappears on every exit path including panics.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::uploader::job::AssetKind;

/// RAII handle to a staged temp copy of a source file.
#[derive(Debug)]
pub struct StagedFile {
    path: PathBuf,
}

impl StagedFile {
    /// Copy `source` into the staging area for `kind` under `temp_root`.
    ///
    /// The copy is named `{unix_timestamp}_{original_name}` inside a
    /// per-kind subfolder, keeping concurrent stagings of differently named
    /// sources from colliding.
    pub fn stage(source: &Path, kind: AssetKind, temp_root: &Path) -> io::Result<StagedFile> {
        let staging_dir = temp_root.join(kind.staging_dir());
        fs::create_dir_all(&staging_dir)?;

        let original_name = source
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("staged.png");
        let timestamp = chrono::Utc::now().timestamp();
        let path = staging_dir.join(format!("{timestamp}_{original_name}"));

        fs::copy(source, &path)?;
        debug!(source = %source.display(), staged = %path.display(), "Staged file");
        Ok(StagedFile { path })
    }

    /// Location of the staged copy
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => debug!(staged = %self.path.display(), "Removed staged file"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                warn!(staged = %self.path.display(), error = %e, "Could not remove staged file");
            }
        }
    }
}
