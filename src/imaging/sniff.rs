//! Content-based image format detection
//!
//! The extension a document claims for an embedded image is not trusted;
//! the kind is inferred from the leading bytes instead.

use byteorder::{BigEndian, ByteOrder};
use log::debug;

use super::formats::ImageKind;

/// JP2 signature box: length 12, type "jP  ", content 0x0D0A870A
const JP2_SIGNATURE_BOX_TYPE: &[u8; 4] = b"jP  ";
const JP2_SIGNATURE_CONTENT: u32 = 0x0D0A_870A;
/// Raw JPEG 2000 codestream: SOC marker followed by SIZ marker
const J2K_CODESTREAM_MAGIC: [u8; 4] = [0xFF, 0x4F, 0xFF, 0x51];

/// Infer the image kind from raw bytes
///
/// Returns `None` when the bytes are not one of the allowed formats.
pub fn sniff_image_kind(data: &[u8]) -> Option<ImageKind> {
    if is_jpeg2000(data) {
        return Some(ImageKind::Jp2);
    }

    match image::guess_format(data) {
        Ok(format) => {
            let kind = ImageKind::from_image_format(format);
            if kind.is_none() {
                debug!("Detected image format {:?} is not in the allow-list", format);
            }
            kind
        }
        Err(_) => None,
    }
}

/// Check for a JP2 container or a bare J2K codestream
pub fn is_jpeg2000(data: &[u8]) -> bool {
    if data.starts_with(&J2K_CODESTREAM_MAGIC) {
        return true;
    }

    if data.len() < 12 {
        return false;
    }

    let box_length = BigEndian::read_u32(&data[0..4]);
    let box_type = &data[4..8];
    let content = BigEndian::read_u32(&data[8..12]);

    box_length == 12 && box_type == JP2_SIGNATURE_BOX_TYPE && content == JP2_SIGNATURE_CONTENT
}
