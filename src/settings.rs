//! On-disk configuration: loading, template generation, and validation
//!
//! Settings live in a JSON file next to the binary. A missing file is an
//! onboarding case, not a crash: a commented-by-example template is written
//! and the caller reports which fields must be filled in. Configuration
//! problems are the only errors that abort the program.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use crate::catalog::Credentials;
use crate::uploader::config::{
    UploadConfig, DEFAULT_MAX_WORKERS, DEFAULT_PRICE, MAX_NAME_LENGTH, MAX_WORKERS_LIMIT,
};

/// Default location of the settings file
pub const DEFAULT_CONFIG_PATH: &str = "config.json";

/// Placeholder written into a fresh template; rejected by validation
const COOKIE_PLACEHOLDER: &str = "PASTE_YOUR_ROBLOSECURITY_COOKIE_HERE";

/// Upper bound accepted for the sleep settings, in seconds
const MAX_SLEEP_SECONDS: f64 = 3600.0;

/// Configuration errors. These are the only errors that terminate the
/// program with a non-zero exit code.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// No settings file existed; a template was written for the user to fill in
    #[error(
        "config file {path} was missing - a template has been created, \
         fill in roblosecurity and group_id and run again"
    )]
    TemplateCreated {
        /// Where the template was written
        path: PathBuf,
    },

    /// The settings file could not be read or the template could not be written
    #[error("could not access config file {path}: {source}")]
    Io {
        /// Settings file path
        path: PathBuf,
        /// Underlying filesystem error
        source: std::io::Error,
    },

    /// The settings file is not valid JSON for the expected schema
    #[error("could not parse config file {path}: {source}")]
    Parse {
        /// Settings file path
        path: PathBuf,
        /// Underlying serde error
        source: serde_json::Error,
    },

    /// A required field is missing or holds a rejected value
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// User-facing settings, deserialized from `config.json`.
///
/// Every field has a default so partial files load cleanly; only the
/// credential fields are required to be filled in.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// `.ROBLOSECURITY` session cookie used for authentication
    pub roblosecurity: String,
    /// Group the assets are uploaded under
    pub group_id: u64,
    /// User id of the uploading account, used as the listing publisher
    pub user_id: u64,
    /// Description applied to every uploaded asset
    pub description: String,
    /// Sale price in Robux; 0 uploads without listing
    pub assets_price: i64,
    /// Tags appended to generated display names
    pub name_tags: Vec<String>,
    /// Process jobs over a worker pool instead of one at a time
    pub parallel_uploads: bool,
    /// Worker pool size for parallel uploads
    pub max_workers: usize,
    /// Target minimum seconds between uploads
    pub sleep_each_upload: f64,
    /// Extra fixed pause between jobs in sequential mode, in seconds
    pub sleep_between_jobs: f64,
    /// Archive source images after successful upload
    pub backup_enabled: bool,
    /// Folder scanned for images, with one subfolder per asset kind
    pub base_folder: PathBuf,
    /// Folder for staged temp copies
    pub temp_folder: PathBuf,
    /// Folder successful uploads are archived into
    pub backup_folder: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            roblosecurity: COOKIE_PLACEHOLDER.to_string(),
            group_id: 0,
            user_id: 0,
            description: String::new(),
            assets_price: DEFAULT_PRICE as i64,
            name_tags: Vec::new(),
            parallel_uploads: false,
            max_workers: DEFAULT_MAX_WORKERS,
            sleep_each_upload: 15.0,
            sleep_between_jobs: 0.0,
            backup_enabled: true,
            base_folder: PathBuf::from("IMAGES_TO_UPLOAD"),
            temp_folder: PathBuf::from("temp"),
            backup_folder: PathBuf::from("backups"),
        }
    }
}

// The session cookie must never end up in logs.
impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("roblosecurity", &"<redacted>")
            .field("group_id", &self.group_id)
            .field("user_id", &self.user_id)
            .field("assets_price", &self.assets_price)
            .field("parallel_uploads", &self.parallel_uploads)
            .field("max_workers", &self.max_workers)
            .field("base_folder", &self.base_folder)
            .finish_non_exhaustive()
    }
}

impl Settings {
    /// Load settings from `path`.
    ///
    /// A missing file writes a fresh template and returns
    /// [`ConfigError::TemplateCreated`]. Out-of-range tunables are clamped
    /// with a warning; missing credentials are a hard error.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            Self::write_template(path)?;
            return Err(ConfigError::TemplateCreated {
                path: path.to_path_buf(),
            });
        }

        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut settings: Settings =
            serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        settings.normalize();
        settings.validate()?;

        info!(path = %path.display(), "Configuration loaded");
        Ok(settings)
    }

    fn write_template(path: &Path) -> Result<(), ConfigError> {
        let template = serde_json::to_string_pretty(&Settings::default())
            .unwrap_or_else(|_| "{}".to_string());
        fs::write(path, template).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "Created configuration template");
        Ok(())
    }

    /// Clamp tunables into their accepted ranges, warning on each adjustment.
    fn normalize(&mut self) {
        if self.assets_price < 0 {
            warn!(
                configured = self.assets_price,
                fallback = DEFAULT_PRICE,
                "assets_price is negative - using default"
            );
            self.assets_price = DEFAULT_PRICE as i64;
        }
        if self.max_workers < 1 || self.max_workers > MAX_WORKERS_LIMIT {
            warn!(
                configured = self.max_workers,
                fallback = DEFAULT_MAX_WORKERS,
                "max_workers outside 1..={MAX_WORKERS_LIMIT} - using default"
            );
            self.max_workers = DEFAULT_MAX_WORKERS;
        }
        self.sleep_each_upload = clamp_sleep("sleep_each_upload", self.sleep_each_upload);
        self.sleep_between_jobs = clamp_sleep("sleep_between_jobs", self.sleep_between_jobs);
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.roblosecurity.trim().is_empty() || self.roblosecurity == COOKIE_PLACEHOLDER {
            return Err(ConfigError::Invalid(
                "roblosecurity is not set - paste your .ROBLOSECURITY cookie into the config file"
                    .to_string(),
            ));
        }
        if self.group_id == 0 {
            return Err(ConfigError::Invalid(
                "group_id is not set - enter the id of the group to upload under".to_string(),
            ));
        }
        Ok(())
    }

    /// Credentials for the catalog client
    pub fn credentials(&self) -> Credentials {
        Credentials::new(self.roblosecurity.clone(), self.user_id)
    }

    /// Pipeline configuration derived from these settings
    pub fn upload_config(&self) -> UploadConfig {
        UploadConfig {
            group_id: self.group_id,
            description: self.description.clone(),
            price: self.assets_price.max(0) as u32,
            name_tags: self.name_tags.clone(),
            max_name_length: MAX_NAME_LENGTH,
            parallel: self.parallel_uploads,
            max_workers: self.max_workers,
            sleep_each_upload: Duration::from_secs_f64(self.sleep_each_upload),
            sleep_between_jobs: Duration::from_secs_f64(self.sleep_between_jobs),
            backup_enabled: self.backup_enabled,
            ..UploadConfig::default()
        }
    }
}

fn clamp_sleep(field: &str, value: f64) -> f64 {
    if !(0.0..=MAX_SLEEP_SECONDS).contains(&value) {
        let clamped = value.clamp(0.0, MAX_SLEEP_SECONDS);
        warn!(field, configured = value, clamped, "sleep setting out of range - clamping");
        clamped
    } else {
        value
    }
}
