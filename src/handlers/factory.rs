//! Factory for creating document handlers

use std::fmt;
use super::handler::ExtractorHandler;
use super::pdf::PdfHandler;
use super::docx::DocxHandler;
use super::pptx::PptxHandler;

/// Supported document formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentFormat {
    Pdf,
    Docx,
    Pptx,
}

impl DocumentFormat {
    /// All supported formats
    pub fn all() -> &'static [DocumentFormat] {
        &[DocumentFormat::Pdf, DocumentFormat::Docx, DocumentFormat::Pptx]
    }

    /// File extensions for this format, without dots
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            DocumentFormat::Pdf => &["pdf"],
            DocumentFormat::Docx => &["docx"],
            DocumentFormat::Pptx => &["pptx"],
        }
    }

    /// Format for a file extension (case-insensitive, dot optional)
    pub fn from_extension(ext: &str) -> Option<DocumentFormat> {
        let ext = ext.trim_start_matches('.').to_ascii_lowercase();
        DocumentFormat::all()
            .iter()
            .copied()
            .find(|format| format.extensions().contains(&ext.as_str()))
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentFormat::Pdf => write!(f, "PDF"),
            DocumentFormat::Docx => write!(f, "DOCX"),
            DocumentFormat::Pptx => write!(f, "PPTX"),
        }
    }
}

/// Factory for creating document handlers
pub struct HandlerFactory;

impl HandlerFactory {
    /// Create the handler for a document format
    pub fn create_handler(format: DocumentFormat) -> Box<dyn ExtractorHandler> {
        match format {
            DocumentFormat::Pdf => Box::new(PdfHandler),
            DocumentFormat::Docx => Box::new(DocxHandler),
            DocumentFormat::Pptx => Box::new(PptxHandler),
        }
    }
}
