use std::path::{Path, PathBuf};
use crate::errors::ExtractResult;

/// Outcome of extracting one document in a batch
#[derive(Debug)]
pub struct FileReport {
    /// Document the report is about
    pub source: PathBuf,
    /// Written image paths in document order, or the reason extraction failed
    pub result: ExtractResult<Vec<PathBuf>>,
}

impl FileReport {
    pub fn new(source: impl Into<PathBuf>, result: ExtractResult<Vec<PathBuf>>) -> Self {
        FileReport {
            source: source.into(),
            result,
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    /// Written paths; empty when extraction failed
    pub fn written(&self) -> &[PathBuf] {
        match &self.result {
            Ok(paths) => paths,
            Err(_) => &[],
        }
    }
}
