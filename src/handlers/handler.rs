//! Extractor handler trait definition

use std::collections::HashSet;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use log::{debug, info, warn};

use crate::errors::ExtractResult;
use crate::imaging::{save_image, sniff_image_kind, ImageKind, SaveOptions};

/// One embedded image as reported by a document handler
#[derive(Debug, Clone)]
pub struct ExtractedImage {
    /// Raw bytes as stored in the document
    pub data: Vec<u8>,
    /// Base name suggested by the document (page/image index, part name, ...)
    pub suggested_name: String,
    /// Format the document claims, if any; the bytes are still sniffed
    pub format_hint: Option<ImageKind>,
}

impl ExtractedImage {
    pub fn new(data: Vec<u8>, suggested_name: impl Into<String>) -> Self {
        ExtractedImage {
            data,
            suggested_name: suggested_name.into(),
            format_hint: None,
        }
    }

    pub fn with_hint(mut self, hint: Option<ImageKind>) -> Self {
        self.format_hint = hint;
        self
    }
}

/// Options shared by all handlers for one extraction
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractOptions {
    /// Write identical image payloads only once per document
    pub dedupe: bool,
    /// Options passed to image persistence
    pub save: SaveOptions,
}

/// Callback receiving each embedded image in document order
///
/// Handlers pass `Err` for an image they found but could not unwrap, so
/// the failure is counted where the image would have been written.
pub type ImageVisitor<'v> = dyn FnMut(ExtractResult<ExtractedImage>) -> ExtractResult<()> + 'v;

/// Strategy trait for enumerating images in one document format
pub trait ExtractorHandler: Send + Sync {
    /// Human-readable name of the document format
    fn name(&self) -> &'static str;

    /// File extensions this handler is registered for, without dots
    fn extensions(&self) -> &'static [&'static str];

    /// Visit every embedded image in deterministic document order
    ///
    /// A document without images visits nothing and succeeds. An error
    /// returned by the visitor stops the walk and is propagated.
    fn for_each_image(&self, source_path: &Path, visit: &mut ImageVisitor<'_>) -> ExtractResult<()>;

    /// Extract all images from `source_path` into `output_dir`
    ///
    /// Images whose bytes cannot be decoded are skipped with a warning;
    /// document and I/O errors abort the extraction.
    ///
    /// # Returns
    /// Paths of the written files, in document order
    fn extract(&self, source_path: &Path, output_dir: &Path, options: &ExtractOptions) -> ExtractResult<Vec<PathBuf>> {
        info!("Extracting images from {}: {}", self.name(), source_path.display());

        let mut sink = ImageSink::new(source_path, output_dir, options);
        self.for_each_image(source_path, &mut |item: ExtractResult<ExtractedImage>| sink.accept(item))?;

        if sink.skipped > 0 {
            info!("Extracted {} images from {} ({} skipped)", sink.written.len(), source_path.display(), sink.skipped);
        } else {
            info!("Extracted {} images from {}", sink.written.len(), source_path.display());
        }

        Ok(sink.written)
    }
}

/// Receives visited images for one document and writes them out
struct ImageSink<'a> {
    source_path: &'a Path,
    output_dir: &'a Path,
    options: &'a ExtractOptions,
    written: Vec<PathBuf>,
    seen: HashSet<(u64, usize)>,
    skipped: usize,
}

impl<'a> ImageSink<'a> {
    fn new(source_path: &'a Path, output_dir: &'a Path, options: &'a ExtractOptions) -> Self {
        ImageSink {
            source_path,
            output_dir,
            options,
            written: Vec::new(),
            seen: HashSet::new(),
            skipped: 0,
        }
    }

    /// Write one visited image, counting image-local failures as skipped
    fn accept(&mut self, item: ExtractResult<ExtractedImage>) -> ExtractResult<()> {
        let image = match item {
            Ok(image) => image,
            Err(e) if e.is_image_local() => {
                warn!("Skipping image in {}: {}", self.source_path.display(), e);
                self.skipped += 1;
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        if self.options.dedupe && !self.seen.insert(payload_digest(&image.data)) {
            debug!("Skipping duplicate image {}", image.suggested_name);
            return Ok(());
        }

        if let Some(hint) = image.format_hint {
            let sniffed = sniff_image_kind(&image.data);
            if sniffed != Some(hint) {
                debug!("{} is labelled {} but content is {:?}", image.suggested_name, hint, sniffed);
            }
        }

        match save_image(&image.data, &image.suggested_name, self.output_dir, &self.options.save) {
            Ok(path) => {
                self.written.push(path);
                Ok(())
            }
            Err(e) if e.is_image_local() => {
                warn!("Skipping image {} in {}: {}", image.suggested_name, self.source_path.display(), e);
                self.skipped += 1;
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}

/// Content digest used for duplicate detection
fn payload_digest(data: &[u8]) -> (u64, usize) {
    let mut hasher = DefaultHasher::new();
    data.hash(&mut hasher);
    (hasher.finish(), data.len())
}
