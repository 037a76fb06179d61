//! String utility functions
//!
//! Utilities for turning names found inside documents into safe file names.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref UNSAFE_FILENAME_CHARS: Regex = Regex::new(r"[^A-Za-z0-9._-]+").unwrap();
}

/// Fallback stem used when a suggested name sanitizes to nothing
pub const DEFAULT_IMAGE_STEM: &str = "image";

/// Turn a suggested image name into a safe file stem
///
/// Any directory part and extension are dropped, runs of characters outside
/// `[A-Za-z0-9._-]` become a single underscore, and leading dots are removed
/// so the result can never be hidden or climb out of the output directory.
pub fn sanitize_file_stem(suggested: &str) -> String {
    let base = suggested.rsplit(['/', '\\']).next().unwrap_or("");
    let stem = match base.rfind('.') {
        Some(idx) if idx > 0 => &base[..idx],
        _ => base,
    };

    let cleaned = UNSAFE_FILENAME_CHARS.replace_all(stem, "_");
    let cleaned = cleaned.trim_start_matches('.').trim_matches('_');

    if cleaned.is_empty() {
        DEFAULT_IMAGE_STEM.to_string()
    } else {
        cleaned.to_string()
    }
}

/// Final path component of a `/`-separated package part name
pub fn part_file_name(part_name: &str) -> &str {
    part_name.rsplit('/').next().unwrap_or(part_name)
}
