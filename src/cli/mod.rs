//! CLI command implementations

pub mod error;
pub mod upload;
pub mod validate;

pub use error::CliError;
pub use upload::{Cli, Commands, UploadArgs};
pub use validate::ValidateArgs;
