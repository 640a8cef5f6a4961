//! Local file handling: discovery, validation, naming and staging

pub mod discovery;
pub mod naming;
pub mod staging;
pub mod validate;

pub use discovery::discover_jobs;
pub use naming::{generate_display_name, is_sentinel, FALLBACK_NAME};
pub use staging::StagedFile;
pub use validate::validate_image;
