//! Pre-upload validation of source images

use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Largest accepted source image in megabytes
pub const MAX_FILE_SIZE_MB: u64 = 10;

/// Accepted file extension (lowercased comparison)
pub const PNG_EXTENSION: &str = "png";

/// Magic bytes every PNG file starts with
const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

/// Validate that `path` points at an uploadable PNG image.
///
/// Checks existence, size bounds, extension and the PNG signature. Returns a
/// human-readable reason when the file should be skipped.
pub fn validate_image(path: &Path) -> Result<(), String> {
    let metadata = match path.metadata() {
        Ok(m) => m,
        Err(_) => return Err("File does not exist".to_string()),
    };

    let size = metadata.len();
    if size > MAX_FILE_SIZE_MB * 1024 * 1024 {
        return Err(format!(
            "File too large ({:.1}MB > {}MB)",
            size as f64 / (1024.0 * 1024.0),
            MAX_FILE_SIZE_MB
        ));
    }
    if size == 0 {
        return Err("File is empty".to_string());
    }

    let has_png_extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case(PNG_EXTENSION))
        .unwrap_or(false);
    if !has_png_extension {
        return Err(format!("Invalid file type (must be .{PNG_EXTENSION})"));
    }

    let mut header = [0u8; 8];
    let mut file = File::open(path).map_err(|e| format!("Validation error: {e}"))?;
    file.read_exact(&mut header)
        .map_err(|e| format!("Validation error: {e}"))?;
    if header != PNG_MAGIC {
        return Err("Invalid PNG file format".to_string());
    }

    Ok(())
}
