//! Image format allow-list
//!
//! The set of image formats the extractor writes is fixed. Canonical
//! extensions, aliases and MIME types come from `image_formats.toml`,
//! parsed once at startup.

use std::collections::HashMap;
use std::fmt;
use lazy_static::lazy_static;
use crate::errors::{ExtractError, ExtractResult};

lazy_static! {
    static ref IMAGE_FORMATS: ImageFormatTable = {
        let content = include_str!("../../image_formats.toml");
        ImageFormatTable::from_str(content).unwrap_or_else(|e| {
                eprintln!("Warning: Failed to parse image format table: {}", e);
                ImageFormatTable::builtin()
            })
    };
}

/// Image formats that may be written to the output directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageKind {
    Jpeg,
    Png,
    Gif,
    Bmp,
    Tiff,
    Webp,
    Jp2,
}

impl ImageKind {
    /// All allowed kinds, in table order
    pub fn all() -> &'static [ImageKind] {
        &[
            ImageKind::Jpeg,
            ImageKind::Png,
            ImageKind::Gif,
            ImageKind::Bmp,
            ImageKind::Tiff,
            ImageKind::Webp,
            ImageKind::Jp2,
        ]
    }

    /// Key of this kind in the format table
    pub fn key(&self) -> &'static str {
        match self {
            ImageKind::Jpeg => "jpeg",
            ImageKind::Png => "png",
            ImageKind::Gif => "gif",
            ImageKind::Bmp => "bmp",
            ImageKind::Tiff => "tiff",
            ImageKind::Webp => "webp",
            ImageKind::Jp2 => "jp2",
        }
    }

    fn from_key(key: &str) -> Option<ImageKind> {
        ImageKind::all().iter().copied().find(|kind| kind.key() == key)
    }

    /// Canonical file extension, without the dot
    pub fn extension(&self) -> &'static str {
        IMAGE_FORMATS.extension_of(*self)
    }

    /// Look up a kind by file extension (case-insensitive, dot optional)
    pub fn from_extension(ext: &str) -> Option<ImageKind> {
        IMAGE_FORMATS.by_extension(ext)
    }

    /// Look up a kind by MIME content type
    pub fn from_mime(mime: &str) -> Option<ImageKind> {
        IMAGE_FORMATS.by_mime(mime)
    }

    /// Map a format detected by the `image` crate onto the allow-list
    pub fn from_image_format(format: image::ImageFormat) -> Option<ImageKind> {
        match format {
            image::ImageFormat::Jpeg => Some(ImageKind::Jpeg),
            image::ImageFormat::Png => Some(ImageKind::Png),
            image::ImageFormat::Gif => Some(ImageKind::Gif),
            image::ImageFormat::Bmp => Some(ImageKind::Bmp),
            image::ImageFormat::Tiff => Some(ImageKind::Tiff),
            image::ImageFormat::WebP => Some(ImageKind::Webp),
            _ => None,
        }
    }
}

impl fmt::Display for ImageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Lookup tables built from the format definition file
#[derive(Debug, Default)]
pub struct ImageFormatTable {
    // Canonical extension per kind
    extensions: HashMap<ImageKind, String>,
    // Canonical extensions and aliases to kinds
    extension_lookup: HashMap<String, ImageKind>,
    // Content types to kinds
    mime_lookup: HashMap<String, ImageKind>,
}

impl ImageFormatTable {
    /// Parse the format table from a TOML string
    pub fn from_str(content: &str) -> ExtractResult<Self> {
        let toml_value: toml::Value = match content.parse() {
            Ok(value) => value,
            Err(e) => return Err(ExtractError::ConfigError(format!("Failed to parse TOML: {}", e))),
        };

        let formats = toml_value.get("formats")
            .and_then(|v| v.as_table())
            .ok_or_else(|| ExtractError::ConfigError("Missing [formats] table".to_string()))?;

        let mut table = ImageFormatTable::default();

        for (key, entry) in formats {
            let Some(kind) = ImageKind::from_key(key) else {
                return Err(ExtractError::ConfigError(format!("Unknown image format: {}", key)));
            };

            let extension = entry.get("extension")
                .and_then(|v| v.as_str())
                .ok_or_else(|| ExtractError::ConfigError(format!("Format {} has no extension", key)))?
                .to_ascii_lowercase();

            table.extension_lookup.insert(extension.clone(), kind);
            table.extensions.insert(kind, extension);

            Self::parse_string_list(entry, "aliases", kind, &mut table.extension_lookup);
            Self::parse_string_list(entry, "mime", kind, &mut table.mime_lookup);
        }

        // Every kind must have a canonical extension
        for kind in ImageKind::all() {
            if !table.extensions.contains_key(kind) {
                return Err(ExtractError::ConfigError(format!("Format {} is not defined", kind)));
            }
        }

        Ok(table)
    }

    /// Helper to collect string arrays into a lookup map
    fn parse_string_list(entry: &toml::Value, field: &str, kind: ImageKind, target: &mut HashMap<String, ImageKind>) {
        if let Some(values) = entry.get(field).and_then(|v| v.as_array()) {
            for value in values.iter().filter_map(|v| v.as_str()) {
                target.insert(value.to_ascii_lowercase(), kind);
            }
        }
    }

    /// Minimal table used when the definition file cannot be parsed
    fn builtin() -> Self {
        let mut table = ImageFormatTable::default();
        for kind in ImageKind::all() {
            let ext = match kind {
                ImageKind::Jpeg => "jpg",
                other => other.key(),
            };
            table.extension_lookup.insert(ext.to_string(), *kind);
            table.extension_lookup.insert(kind.key().to_string(), *kind);
            table.extensions.insert(*kind, ext.to_string());
        }
        table
    }

    fn extension_of(&self, kind: ImageKind) -> &str {
        self.extensions.get(&kind).map(String::as_str).unwrap_or("bin")
    }

    fn by_extension(&self, ext: &str) -> Option<ImageKind> {
        let ext = ext.trim_start_matches('.').to_ascii_lowercase();
        self.extension_lookup.get(&ext).copied()
    }

    fn by_mime(&self, mime: &str) -> Option<ImageKind> {
        // Ignore parameters such as "; charset=..."
        let base = mime.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
        self.mime_lookup.get(&base).copied()
    }
}
