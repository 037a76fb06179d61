pub mod errors;
pub mod imaging;
pub mod handlers;
pub mod extractor;
pub mod config;
pub mod utils;
pub mod commands;
pub mod api;

pub use crate::api::{extract, DocImgx};

pub use errors::{ExtractError, ExtractResult};
pub use config::ExtractorConfig;
pub use extractor::{FileReport, ImageExtractor};
pub use handlers::{DocumentFormat, ExtractedImage, ExtractOptions, ExtractorHandler, HandlerFactory, HandlerRegistry};
pub use imaging::{save_image, ImageKind, SaveOptions};
