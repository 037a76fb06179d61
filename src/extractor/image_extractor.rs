//! Document image extractor
//!
//! Facade over the handler registry: picks the handler for a document,
//! decides where its images go and fans batches out over a thread pool.

use std::path::{Path, PathBuf};
use log::{debug, error, info, warn};
use rayon::prelude::*;

use crate::config::ExtractorConfig;
use crate::errors::{ExtractError, ExtractResult};
use crate::handlers::HandlerRegistry;
use crate::utils::logger::Logger;
use crate::utils::progress::ProgressTracker;
use super::report::FileReport;

/// Main extractor that delegates to the registered document handlers
pub struct ImageExtractor<'a> {
    /// Handlers keyed by file extension
    registry: &'a HandlerRegistry,
    /// Journal receiving every written path
    logger: &'a Logger,
    /// Run settings
    config: ExtractorConfig,
}

impl<'a> ImageExtractor<'a> {
    /// Create a new image extractor
    ///
    /// # Arguments
    /// * `registry` - Registry used to resolve document handlers
    /// * `logger` - Journal for written image paths
    /// * `config` - Extraction settings
    pub fn new(registry: &'a HandlerRegistry, logger: &'a Logger, config: ExtractorConfig) -> Self {
        ImageExtractor {
            registry,
            logger,
            config,
        }
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Output directory used for a document when none is given
    ///
    /// This is a folder named after `output_dir_name` next to the document.
    pub fn default_output_dir(&self, source_path: &Path) -> PathBuf {
        source_path
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join(&self.config.output_dir_name)
    }

    /// Extract every embedded image of one document
    ///
    /// # Arguments
    /// * `source_path` - Document to read
    /// * `output_dir` - Target directory; defaults to [`Self::default_output_dir`]
    ///
    /// # Returns
    /// Paths of the written images in document order (possibly empty)
    pub fn extract(&self, source_path: &Path, output_dir: Option<&Path>) -> ExtractResult<Vec<PathBuf>> {
        if !source_path.exists() {
            return Err(ExtractError::InputNotFound(source_path.to_path_buf()));
        }

        let output_dir = match output_dir {
            Some(dir) => dir.to_path_buf(),
            None => self.default_output_dir(source_path),
        };

        let handler = self.registry.resolve_path(source_path)?;
        debug!("Using {} handler for {}", handler.name(), source_path.display());

        let written = handler.extract(source_path, &output_dir, &self.config.extract_options())?;

        for path in &written {
            if let Err(e) = self.logger.log(&format!("{} -> {}", source_path.display(), path.display())) {
                warn!("Failed to write journal entry for {}: {}", path.display(), e);
            }
        }

        Ok(written)
    }

    /// Extract images from many documents
    ///
    /// Documents are processed concurrently on a pool of `jobs` threads. A
    /// failing document does not stop the others.
    ///
    /// # Returns
    /// One report per document, in input order
    pub fn extract_many(&self, sources: &[PathBuf], output_dir: Option<&Path>) -> Vec<FileReport> {
        info!("Extracting images from {} documents with {} jobs", sources.len(), self.config.jobs);

        let progress = if self.config.progress && sources.len() > 1 {
            ProgressTracker::new(sources.len() as u64, "Extracting images")
        } else {
            ProgressTracker::hidden()
        };

        let process = |source: &PathBuf| {
            let result = self.extract(source, output_dir);
            if let Err(e) = &result {
                error!("Failed to extract images from {}: {}", source.display(), e);
            }
            progress.increment(1);
            FileReport::new(source, result)
        };

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.jobs.max(1))
            .build();

        let reports: Vec<FileReport> = match pool {
            Ok(pool) => pool.install(|| sources.par_iter().map(process).collect()),
            Err(e) => {
                warn!("Failed to create thread pool, processing sequentially: {}", e);
                sources.iter().map(process).collect()
            }
        };

        progress.finish();

        let failed = reports.iter().filter(|report| !report.is_ok()).count();
        let images: usize = reports.iter().map(|report| report.written().len()).sum();
        info!("Wrote {} images from {} documents ({} failed)", images, sources.len(), failed);

        reports
    }
}
