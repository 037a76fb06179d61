//! Custom error types for document image extraction

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Extraction error types
#[derive(Debug)]
pub enum ExtractError {
    /// I/O error
    IoError(io::Error),
    /// Input document does not exist
    InputNotFound(PathBuf),
    /// No handler is registered for the file extension
    UnsupportedFormat {
        extension: String,
        supported: Vec<String>,
    },
    /// The document could not be opened or parsed
    CorruptDocument {
        path: PathBuf,
        reason: String,
    },
    /// Embedded bytes are not a recognizable image
    UndecodableImage(String),
    /// Invalid configuration value or file
    ConfigError(String),
    /// Generic error with message
    GenericError(String),
}

impl ExtractError {
    /// Build a `CorruptDocument` error for the given path
    pub fn corrupt(path: impl Into<PathBuf>, reason: impl fmt::Display) -> Self {
        ExtractError::CorruptDocument {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Whether this error only concerns a single embedded image
    ///
    /// Image-level failures are skipped by the orchestrator; everything
    /// else aborts extraction of the current document.
    pub fn is_image_local(&self) -> bool {
        matches!(self, ExtractError::UndecodableImage(_))
    }
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractError::IoError(e) => write!(f, "I/O error: {}", e),
            ExtractError::InputNotFound(p) => write!(f, "Input file not found: {}", p.display()),
            ExtractError::UnsupportedFormat { extension, supported } => {
                let shown = if extension.is_empty() { "<none>" } else { extension.as_str() };
                write!(f, "Unsupported file type: {}. Supported types: {}", shown, supported.join(", "))
            }
            ExtractError::CorruptDocument { path, reason } => {
                write!(f, "Failed to read document {}: {}", path.display(), reason)
            }
            ExtractError::UndecodableImage(msg) => write!(f, "Undecodable image: {}", msg),
            ExtractError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            ExtractError::GenericError(msg) => write!(f, "Extraction error: {}", msg),
        }
    }
}

impl std::error::Error for ExtractError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExtractError::IoError(e) => Some(e),
            _ => None,
        }
    }
}

/// Result type for extraction operations
pub type ExtractResult<T> = Result<T, ExtractError>;

impl From<io::Error> for ExtractError {
    fn from(error: io::Error) -> Self {
        ExtractError::IoError(error)
    }
}

impl From<zip::result::ZipError> for ExtractError {
    fn from(error: zip::result::ZipError) -> Self {
        match error {
            zip::result::ZipError::Io(e) => ExtractError::IoError(e),
            other => ExtractError::GenericError(format!("Zip error: {}", other)),
        }
    }
}

impl From<quick_xml::Error> for ExtractError {
    fn from(error: quick_xml::Error) -> Self {
        ExtractError::GenericError(format!("XML error: {}", error))
    }
}

impl From<image::ImageError> for ExtractError {
    fn from(error: image::ImageError) -> Self {
        match error {
            image::ImageError::IoError(e) => ExtractError::IoError(e),
            other => ExtractError::UndecodableImage(other.to_string()),
        }
    }
}
