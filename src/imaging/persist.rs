//! Image persistence
//!
//! Writes extracted image bytes to the output directory under a unique,
//! sanitized name. Names are claimed with create-new semantics so workers
//! sharing an output directory never write to the same path.

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use log::{debug, warn};

use crate::errors::{ExtractError, ExtractResult};
use crate::utils::string_utils::sanitize_file_stem;
use super::convert;
use super::formats::ImageKind;
use super::sniff::sniff_image_kind;

/// Upper bound on numeric suffixes tried for one name
const MAX_NAME_SUFFIX: u32 = 100_000;

/// Options controlling how images are written
#[derive(Debug, Clone, Copy)]
pub struct SaveOptions {
    /// Re-encode JPEG 2000 images as PNG
    pub convert_jp2: bool,
}

impl Default for SaveOptions {
    fn default() -> Self {
        SaveOptions { convert_jp2: true }
    }
}

/// Image bytes ready to be written, with their final kind
#[derive(Debug)]
pub struct PreparedImage {
    pub kind: ImageKind,
    pub data: Vec<u8>,
}

/// Sniff the real format and convert it if needed
pub fn prepare_image(data: &[u8], options: &SaveOptions) -> ExtractResult<PreparedImage> {
    let kind = sniff_image_kind(data)
        .ok_or_else(|| ExtractError::UndecodableImage(format!("Unrecognized image data ({} bytes)", data.len())))?;

    if kind == ImageKind::Jp2 && options.convert_jp2 {
        debug!("Converting JPEG 2000 image to PNG");
        let png = convert::jp2_to_png(data)?;
        return Ok(PreparedImage { kind: ImageKind::Png, data: png });
    }

    Ok(PreparedImage { kind, data: data.to_vec() })
}

/// Save image bytes into `output_dir`
///
/// # Arguments
/// * `data` - Raw image bytes as found in the document
/// * `suggested_name` - Name reported by the document handler
/// * `output_dir` - Directory to write into (created if absent)
/// * `options` - Conversion options
///
/// # Returns
/// The path the image was written to
pub fn save_image(data: &[u8], suggested_name: &str, output_dir: &Path, options: &SaveOptions) -> ExtractResult<PathBuf> {
    let prepared = prepare_image(data, options)?;

    fs::create_dir_all(output_dir)?;

    let stem = sanitize_file_stem(suggested_name);
    let (path, file) = create_unique_file(output_dir, &stem, prepared.kind.extension())?;
    write_claimed(&path, file, &prepared.data)?;

    debug!("Saved {} image to {}", prepared.kind, path.display());
    Ok(path)
}

/// Write into a freshly claimed file, removing it again if the write fails
fn write_claimed<W: Write>(path: &Path, mut writer: W, data: &[u8]) -> ExtractResult<()> {
    let result = writer.write_all(data).and_then(|_| writer.flush());
    drop(writer);

    if let Err(e) = result {
        if let Err(remove_error) = fs::remove_file(path) {
            warn!("Could not remove partial file {}: {}", path.display(), remove_error);
        }
        return Err(ExtractError::IoError(e));
    }
    Ok(())
}

/// Claim the first free name of the form `stem.ext`, `stem_1.ext`, ...
fn create_unique_file(dir: &Path, stem: &str, extension: &str) -> ExtractResult<(PathBuf, File)> {
    for suffix in 0..MAX_NAME_SUFFIX {
        let candidate = dir.join(candidate_name(stem, extension, suffix));

        match OpenOptions::new().write(true).create_new(true).open(&candidate) {
            Ok(file) => return Ok((candidate, file)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(ExtractError::IoError(e)),
        }
    }

    Err(ExtractError::GenericError(format!(
        "No free file name for {}.{} in {}",
        stem, extension, dir.display()
    )))
}

/// File name for the given collision suffix (0 means no suffix)
fn candidate_name(stem: &str, extension: &str, suffix: u32) -> String {
    if suffix == 0 {
        format!("{}.{}", stem, extension)
    } else {
        format!("{}_{}.{}", stem, suffix, extension)
    }
}
