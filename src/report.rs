//! Final run report: rendering and archival
//!
//! The report is plain text, printed to the console at the end of a run and
//! saved under `logs/`. Failures to save are logged and swallowed; the
//! report is a convenience, not part of the upload contract.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::uploader::job::{UploadResult, UploadStatus};
use crate::uploader::progress::AggregateStats;

const REPORT_WIDTH: usize = 80;

/// Successful uploads listed by name before the report switches to a count
const SUCCESS_LIST_LIMIT: usize = 10;

/// Render the end-of-run report.
pub fn render_report(results: &[UploadResult], stats: &AggregateStats) -> String {
    let rule = "=".repeat(REPORT_WIDTH);
    let megabytes = stats.total_bytes as f64 / (1024.0 * 1024.0);
    let success_rate = if stats.total > 0 {
        stats.successful as f64 / stats.total as f64 * 100.0
    } else {
        0.0
    };
    let throughput_mb = stats.throughput_bytes_per_sec / (1024.0 * 1024.0);

    let mut out = String::new();
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "UPLOAD REPORT");
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "Total Files: {}", stats.total);
    let _ = writeln!(out, "Successful: {}", stats.successful);
    let _ = writeln!(out, "Failed: {}", stats.failed);
    let _ = writeln!(out, "Skipped: {}", stats.skipped);
    let _ = writeln!(out, "Success Rate: {success_rate:.1}%");
    let _ = writeln!(out, "Total Uploaded: {megabytes:.2} MB");
    let _ = writeln!(out, "Total Time: {:.2}s", stats.elapsed_seconds);
    let _ = writeln!(out, "Average Upload Time: {:.2}s", stats.mean_duration_seconds);
    let _ = writeln!(out, "Throughput: {throughput_mb:.3} MB/s");

    let failed: Vec<&UploadResult> = results
        .iter()
        .filter(|r| r.status == UploadStatus::Failed)
        .collect();
    if !failed.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "FAILED UPLOADS:");
        for result in failed {
            let reason = result.error_message.as_deref().unwrap_or("unknown error");
            let _ = writeln!(out, "  - {}: {}", result.file_name(), reason);
        }
    }

    let successful: Vec<&UploadResult> = results
        .iter()
        .filter(|r| r.status == UploadStatus::Success)
        .collect();
    if !successful.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "SUCCESSFUL UPLOADS:");
        for result in successful.iter().take(SUCCESS_LIST_LIMIT) {
            let id = result
                .asset_id
                .map(|id| id.to_string())
                .unwrap_or_else(|| "unknown".to_string());
            let _ = writeln!(out, "  - {} -> ID: {}", result.file_name(), id);
        }
        if successful.len() > SUCCESS_LIST_LIMIT {
            let _ = writeln!(out, "  ... and {} more", successful.len() - SUCCESS_LIST_LIMIT);
        }
    }

    let _ = writeln!(out, "{rule}");
    out
}

/// Save a rendered report under `logs_dir`, returning the file path.
///
/// Save problems are logged and swallowed.
pub fn save_report(report: &str, logs_dir: &Path) -> Option<PathBuf> {
    if let Err(e) = fs::create_dir_all(logs_dir) {
        warn!(dir = %logs_dir.display(), error = %e, "Could not create report directory");
        return None;
    }

    let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let path = logs_dir.join(format!("upload_report_{stamp}.txt"));
    match fs::write(&path, report) {
        Ok(()) => {
            info!(path = %path.display(), "Report saved");
            Some(path)
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Could not save report");
            None
        }
    }
}
