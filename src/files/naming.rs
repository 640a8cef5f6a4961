//! Display name generation from source file names
//!
//! Turns raw file names like `roblox_red_dragon_shirt_final.png` into
//! catalog-presentable names like `Red Dragon Shirt`, optionally appending
//! configured tags while respecting the maximum name length.

use std::path::Path;

/// Name returned when nothing usable is left after cleaning.
///
/// Treated as a sentinel by the pipeline: jobs producing it are skipped
/// before any remote call.
pub const FALLBACK_NAME: &str = "Untitled Asset";

/// Prefixes stripped once from the front of a file stem
const PREFIXES: [&str; 4] = ["roblox_", "shirt_", "pants_", "asset_"];

/// Suffixes stripped once from the end of a file stem
const SUFFIXES: [&str; 4] = ["_final", "_export", "_upload", "_ready"];

/// True when a generated name signals "unnameable" and the job must be
/// skipped without contacting the catalog.
pub fn is_sentinel(name: &str) -> bool {
    name.trim().is_empty() || name.eq_ignore_ascii_case(FALLBACK_NAME)
}

/// Generate a display name for a source file.
///
/// Cleaning steps: lowercase the stem, strip one known prefix and one known
/// suffix, turn separator runs into spaces, drop everything that is not
/// alphanumeric or whitespace, collapse whitespace, then capitalize each
/// word. Tags are appended while they fit under `max_length`; the first gets
/// a space separator, the rest comma separators.
pub fn generate_display_name(path: &Path, tags: &[String], max_length: usize) -> String {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();

    let mut clean = stem.to_lowercase();
    for prefix in PREFIXES {
        if let Some(rest) = clean.strip_prefix(prefix) {
            clean = rest.to_string();
            break;
        }
    }
    for suffix in SUFFIXES {
        if let Some(rest) = clean.strip_suffix(suffix) {
            clean = rest.to_string();
            break;
        }
    }

    let spaced: String = clean
        .chars()
        .map(|c| if matches!(c, '_' | '-' | '.') { ' ' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace())
        .collect();

    let mut name = spaced
        .split_whitespace()
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ");

    if !tags.is_empty() {
        let available = max_length.saturating_sub(char_len(&name) + 2);
        let mut appended = String::new();
        for tag in tags {
            let with_sep = if appended.is_empty() {
                format!(" {tag}")
            } else {
                format!(", {tag}")
            };
            if char_len(&appended) + char_len(&with_sep) <= available {
                appended.push_str(&with_sep);
            } else {
                break;
            }
        }
        name.push_str(&appended);
    }

    if char_len(&name) > max_length {
        name = name.chars().take(max_length).collect();
        name.truncate(name.trim_end().len());
    }

    if name.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        name
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}
