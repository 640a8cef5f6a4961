//! CLI error types and conversions

use crate::settings::ConfigError;

/// CLI errors.
///
/// Individual job failures never surface here; the dispatcher records them
/// as results and the run still exits cleanly. Anything that does reach
/// this type aborts the command.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Filesystem error while preparing the run
    #[error("filesystem error: {0}")]
    Io(#[from] std::io::Error),
}
