use std::path::PathBuf;

use catalog_uploader::report::render_report;
use catalog_uploader::uploader::{AggregateStats, UploadResult, UploadStatus};

fn result(
    file: &str,
    status: UploadStatus,
    asset_id: Option<u64>,
    error: Option<&str>,
) -> UploadResult {
    UploadResult {
        source_path: PathBuf::from(file),
        asset_name: "Asset".to_string(),
        status,
        asset_id,
        error_message: error.map(str::to_string),
        duration_seconds: Some(2.5),
        byte_size: Some(1024),
        attempt_count: 1,
        created_at: chrono::Utc::now(),
    }
}

fn stats() -> AggregateStats {
    AggregateStats {
        total: 4,
        successful: 2,
        failed: 1,
        skipped: 1,
        total_bytes: 3_670_016, // 3.5 MB
        elapsed_seconds: 10.0,
        mean_duration_seconds: 2.5,
        throughput_bytes_per_sec: 262_144.0, // 0.25 MB/s
    }
}

#[test]
fn test_report_is_framed_by_full_width_rules() {
    let report = render_report(&[], &stats());
    let lines: Vec<&str> = report.lines().collect();
    let rule = "=".repeat(80);

    assert_eq!(lines[0], rule);
    assert_eq!(lines[1], "UPLOAD REPORT");
    assert_eq!(lines[2], rule);
    assert_eq!(*lines.last().unwrap(), rule);
}

#[test]
fn test_summary_block_has_fixed_line_layout() {
    let report = render_report(&[], &stats());
    let lines: Vec<&str> = report.lines().collect();

    let expected = [
        "Total Files: 4",
        "Successful: 2",
        "Failed: 1",
        "Skipped: 1",
        "Success Rate: 50.0%",
        "Total Uploaded: 3.50 MB",
        "Total Time: 10.00s",
        "Average Upload Time: 2.50s",
        "Throughput: 0.250 MB/s",
    ];
    assert_eq!(&lines[3..12], &expected[..]);
}

#[test]
fn test_failed_section_precedes_successful_section() {
    let results = vec![
        result("good.png", UploadStatus::Success, Some(5), None),
        result("bad.png", UploadStatus::Failed, None, Some("timeout")),
    ];
    let report = render_report(&results, &stats());

    let failed_at = report.find("FAILED UPLOADS:").unwrap();
    let successful_at = report.find("SUCCESSFUL UPLOADS:").unwrap();
    assert!(failed_at < successful_at);
}

#[test]
fn test_missing_details_render_as_unknown() {
    let results = vec![
        result("quiet_failure.png", UploadStatus::Failed, None, None),
        result("lost_id.png", UploadStatus::Success, None, None),
    ];
    let report = render_report(&results, &stats());

    assert!(report.contains("  - quiet_failure.png: unknown error"));
    assert!(report.contains("  - lost_id.png -> ID: unknown"));
}
