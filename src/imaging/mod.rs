//! Image handling for extracted assets
//!
//! This module sniffs image formats, converts formats that are not kept
//! as-is, and writes images to disk under unique names.

mod formats;
mod sniff;
pub(crate) mod convert;
mod persist;

pub use formats::{ImageKind, ImageFormatTable};
pub use sniff::{sniff_image_kind, is_jpeg2000};
pub use persist::{save_image, prepare_image, PreparedImage, SaveOptions};
