use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use tempfile::TempDir;

use catalog_uploader::settings::{ConfigError, Settings};

fn write_config(dir: &TempDir, body: &serde_json::Value) -> PathBuf {
    let path = dir.path().join("config.json");
    fs::write(&path, serde_json::to_string_pretty(body).unwrap()).unwrap();
    path
}

fn base_config() -> serde_json::Value {
    serde_json::json!({
        "roblosecurity": "cookie-value",
        "group_id": 777
    })
}

#[test]
fn test_template_exposes_every_field_users_can_edit() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    let _ = Settings::load(&path);

    let template: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    for key in [
        "roblosecurity",
        "group_id",
        "user_id",
        "description",
        "assets_price",
        "name_tags",
        "parallel_uploads",
        "max_workers",
        "sleep_each_upload",
        "sleep_between_jobs",
        "backup_enabled",
        "base_folder",
        "temp_folder",
        "backup_folder",
    ] {
        assert!(template.get(key).is_some(), "template is missing {key}");
    }
    assert_eq!(
        template["roblosecurity"],
        "PASTE_YOUR_ROBLOSECURITY_COOKIE_HERE"
    );
}

#[test]
fn test_template_error_message_points_at_the_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");

    let err = Settings::load(&path).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("template has been created"), "got: {message}");
    assert!(message.contains("config.json"), "got: {message}");
}

#[test]
fn test_unknown_fields_are_tolerated() {
    // Older or hand-edited files may carry extra keys
    let dir = TempDir::new().unwrap();
    let mut json = base_config();
    json["some_future_option"] = serde_json::json!(true);
    let path = write_config(&dir, &json);

    let settings = Settings::load(&path).unwrap();
    assert_eq!(settings.group_id, 777);
}

#[test]
fn test_sleeps_clamp_to_the_accepted_range() {
    let dir = TempDir::new().unwrap();
    let mut json = base_config();
    json["sleep_each_upload"] = serde_json::json!(-5.0);
    json["sleep_between_jobs"] = serde_json::json!(90000.0);
    let path = write_config(&dir, &json);

    let settings = Settings::load(&path).unwrap();
    assert_eq!(settings.sleep_each_upload, 0.0);
    assert_eq!(settings.sleep_between_jobs, 3600.0);

    let config = settings.upload_config();
    assert_eq!(config.sleep_each_upload, Duration::ZERO);
    assert_eq!(config.sleep_between_jobs, Duration::from_secs(3600));
}

#[test]
fn test_blank_cookie_is_rejected() {
    let dir = TempDir::new().unwrap();
    let mut json = base_config();
    json["roblosecurity"] = serde_json::json!("   ");
    let path = write_config(&dir, &json);

    let err = Settings::load(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}
