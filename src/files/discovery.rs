//! Source image discovery across the per-kind input folders

use std::fs;
use std::io;
use std::path::Path;

use tracing::{info, warn};

use crate::files::validate::validate_image;
use crate::uploader::job::{AssetKind, Job};

/// Scan the base folder for uploadable images and build the job list.
///
/// Each asset kind has its own subfolder (`SHIRTS`, `PANTS`, `TSHIRTS`).
/// Missing folders are created so the expected layout is visible after a
/// first run. Files failing validation are logged and left out. Jobs are
/// returned sorted by path within each kind, giving a deterministic
/// processing order.
pub fn discover_jobs(base_folder: &Path) -> io::Result<Vec<Job>> {
    if !base_folder.is_dir() {
        info!(path = %base_folder.display(), "Creating base folder");
        fs::create_dir_all(base_folder)?;
    }

    info!("Scanning for uploadable images...");
    let mut jobs = Vec::new();

    for kind in AssetKind::all() {
        let folder = base_folder.join(kind.folder_name());
        if !folder.exists() {
            info!(path = %folder.display(), "Creating subfolder");
            fs::create_dir_all(&folder)?;
            continue;
        }

        let mut candidates: Vec<_> = fs::read_dir(&folder)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file()
                    && path
                        .extension()
                        .and_then(|e| e.to_str())
                        .map(|e| e.eq_ignore_ascii_case("png"))
                        .unwrap_or(false)
            })
            .collect();
        candidates.sort();

        if candidates.is_empty() {
            info!(folder = kind.folder_name(), "No supported files found");
            continue;
        }
        info!(
            folder = kind.folder_name(),
            count = candidates.len(),
            "Found potential files"
        );

        let mut valid = 0;
        for path in candidates {
            match validate_image(&path) {
                Ok(()) => {
                    jobs.push(Job::new(path, kind));
                    valid += 1;
                }
                Err(reason) => {
                    warn!(file = %path.display(), reason, "Skipping invalid file");
                }
            }
        }
        info!(folder = kind.folder_name(), valid, "Validated files");
    }

    if jobs.is_empty() {
        warn!(
            "No valid images found. Check folders: {:?}",
            AssetKind::all().map(|k| k.folder_name())
        );
    } else {
        info!(total = jobs.len(), "Files ready for upload");
    }

    Ok(jobs)
}
