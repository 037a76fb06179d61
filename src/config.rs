//! Extractor configuration
//!
//! Settings come from defaults, optionally overridden by a TOML file and then
//! by command-line flags. A config file looks like:
//!
//! ```toml
//! output_dir_name = "images"
//! jobs = 4
//! dedupe = true
//! convert_jp2 = false
//! progress = false
//! log_file = "docimgx.log"
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use log::debug;

use crate::errors::{ExtractError, ExtractResult};
use crate::handlers::ExtractOptions;
use crate::imaging::SaveOptions;

/// Name of the output folder created beside a document when none is given
pub const DEFAULT_OUTPUT_DIR_NAME: &str = "extracted_images";

/// Settings for an extraction run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractorConfig {
    /// Folder name used beside the source when no output directory is given
    pub output_dir_name: String,
    /// Maximum number of documents processed concurrently
    pub jobs: usize,
    /// Write identical payloads only once per document
    pub dedupe: bool,
    /// Re-encode JPEG 2000 images as PNG
    pub convert_jp2: bool,
    /// Show a progress bar for batch runs
    pub progress: bool,
    /// Mirror log records to this file
    pub log_file: Option<PathBuf>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        ExtractorConfig {
            output_dir_name: DEFAULT_OUTPUT_DIR_NAME.to_string(),
            jobs: default_jobs(),
            dedupe: false,
            convert_jp2: true,
            progress: true,
            log_file: None,
        }
    }
}

impl ExtractorConfig {
    /// Load a configuration file
    ///
    /// # Arguments
    /// * `path` - Path to a TOML file
    ///
    /// # Returns
    /// The defaults overridden by the values present in the file
    pub fn from_file(path: &Path) -> ExtractResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            ExtractError::ConfigError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        debug!("Loaded configuration from {}", path.display());
        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string
    ///
    /// Unknown keys are ignored. A known key with the wrong type is an error.
    pub fn from_str(content: &str) -> ExtractResult<Self> {
        let toml_value: toml::Value = match content.parse() {
            Ok(value) => value,
            Err(e) => return Err(ExtractError::ConfigError(format!("Failed to parse TOML: {}", e))),
        };

        let mut config = ExtractorConfig::default();

        if let Some(name) = get_str(&toml_value, "output_dir_name")? {
            if name.trim().is_empty() {
                return Err(ExtractError::ConfigError("output_dir_name must not be empty".to_string()));
            }
            config.output_dir_name = name.to_string();
        }
        if let Some(jobs) = get_integer(&toml_value, "jobs")? {
            if jobs < 1 {
                return Err(ExtractError::ConfigError(format!("jobs must be at least 1, got {}", jobs)));
            }
            config.jobs = jobs as usize;
        }
        if let Some(dedupe) = get_bool(&toml_value, "dedupe")? {
            config.dedupe = dedupe;
        }
        if let Some(convert_jp2) = get_bool(&toml_value, "convert_jp2")? {
            config.convert_jp2 = convert_jp2;
        }
        if let Some(progress) = get_bool(&toml_value, "progress")? {
            config.progress = progress;
        }
        if let Some(log_file) = get_str(&toml_value, "log_file")? {
            config.log_file = Some(PathBuf::from(log_file));
        }

        Ok(config)
    }

    /// Handler options derived from this configuration
    pub fn extract_options(&self) -> ExtractOptions {
        ExtractOptions {
            dedupe: self.dedupe,
            save: SaveOptions {
                convert_jp2: self.convert_jp2,
            },
        }
    }
}

/// Number of worker threads used when none is configured
pub fn default_jobs() -> usize {
    thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
}

fn get_str<'v>(value: &'v toml::Value, key: &str) -> ExtractResult<Option<&'v str>> {
    match value.get(key) {
        None => Ok(None),
        Some(v) => v.as_str().map(Some).ok_or_else(|| type_error(key, "a string", v)),
    }
}

fn get_bool(value: &toml::Value, key: &str) -> ExtractResult<Option<bool>> {
    match value.get(key) {
        None => Ok(None),
        Some(v) => v.as_bool().map(Some).ok_or_else(|| type_error(key, "a boolean", v)),
    }
}

fn get_integer(value: &toml::Value, key: &str) -> ExtractResult<Option<i64>> {
    match value.get(key) {
        None => Ok(None),
        Some(v) => v.as_integer().map(Some).ok_or_else(|| type_error(key, "an integer", v)),
    }
}

fn type_error(key: &str, expected: &str, found: &toml::Value) -> ExtractError {
    ExtractError::ConfigError(format!("{} must be {}, found {}", key, expected, found.type_str()))
}
