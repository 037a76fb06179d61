//! Document handlers
//!
//! One handler per document format enumerates the embedded images of a
//! document; the registry maps file extensions to handlers.

pub mod handler;
pub mod factory;
pub mod registry;
pub(crate) mod ooxml;
mod pdf;
mod docx;
mod pptx;

pub use handler::{ExtractedImage, ExtractOptions, ExtractorHandler, ImageVisitor};
pub use factory::{DocumentFormat, HandlerFactory};
pub use registry::HandlerRegistry;
pub use pdf::PdfHandler;
pub use docx::DocxHandler;
pub use pptx::PptxHandler;
