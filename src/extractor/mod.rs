//! Extraction orchestration
//!
//! The `ImageExtractor` resolves the handler for each document, drives it
//! and collects the paths of the written images.

mod image_extractor;
mod report;

pub use image_extractor::ImageExtractor;
pub use report::FileReport;
