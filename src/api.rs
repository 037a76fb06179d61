use std::path::{Path, PathBuf};
use log::info;

use crate::config::ExtractorConfig;
use crate::errors::ExtractResult;
use crate::extractor::{FileReport, ImageExtractor};
use crate::handlers::HandlerRegistry;
use crate::utils::logger::Logger;

/// Main interface to the docimgx library
pub struct DocImgx {
    registry: HandlerRegistry,
    logger: Logger,
    config: ExtractorConfig,
}

impl DocImgx {
    /// Create a new instance with every supported document format
    ///
    /// # Arguments
    /// * `config` - Extraction settings; `log_file` enables the path journal
    ///
    /// # Returns
    /// A DocImgx instance or an error if the journal cannot be created
    pub fn new(config: ExtractorConfig) -> ExtractResult<Self> {
        Self::with_registry(HandlerRegistry::with_default_handlers(), config)
    }

    /// Create a new instance using a custom handler registry
    pub fn with_registry(registry: HandlerRegistry, config: ExtractorConfig) -> ExtractResult<Self> {
        let logger = match &config.log_file {
            Some(path) => Logger::new(path)?,
            None => Logger::disabled(),
        };
        Ok(DocImgx { registry, logger, config })
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    /// Extensions of the documents that can be processed, sorted
    pub fn supported_extensions(&self) -> Vec<String> {
        self.registry.supported_extensions()
    }

    /// Extract all images from a document
    ///
    /// # Arguments
    /// * `input_path` - Document to read
    /// * `output_dir` - Target directory, or `None` for a folder beside the document
    ///
    /// # Returns
    /// Paths of the written images in document order
    pub fn extract(&self, input_path: &Path, output_dir: Option<&Path>) -> ExtractResult<Vec<PathBuf>> {
        info!("Extracting images from {}", input_path.display());
        self.extractor().extract(input_path, output_dir)
    }

    /// Extract images from several documents, one report per input in order
    pub fn extract_many(&self, input_paths: &[PathBuf], output_dir: Option<&Path>) -> Vec<FileReport> {
        self.extractor().extract_many(input_paths, output_dir)
    }

    fn extractor(&self) -> ImageExtractor<'_> {
        ImageExtractor::new(&self.registry, &self.logger, self.config.clone())
    }
}

/// Extract all images from a document with the default settings
///
/// # Arguments
/// * `path` - PDF, DOCX or PPTX document
/// * `output_dir` - Target directory, or `None` for `extracted_images` beside the document
///
/// # Returns
/// Paths of the written images in document order
pub fn extract(path: impl AsRef<Path>, output_dir: Option<&Path>) -> ExtractResult<Vec<PathBuf>> {
    let registry = HandlerRegistry::with_default_handlers();
    let logger = Logger::disabled();
    ImageExtractor::new(&registry, &logger, ExtractorConfig::default()).extract(path.as_ref(), output_dir)
}
