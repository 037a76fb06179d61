//! Image re-encoding helpers
//!
//! Converts formats that are not written as-is (JPEG 2000, raw PDF
//! samples) into PNG.

use std::io::Cursor;
use image::{DynamicImage, GrayImage, ImageFormat, RgbImage};
use log::debug;

use crate::errors::{ExtractError, ExtractResult};

/// Encode a decoded image as PNG bytes
pub fn encode_png(image: &DynamicImage) -> ExtractResult<Vec<u8>> {
    let mut png_data = Vec::new();
    image.write_to(&mut Cursor::new(&mut png_data), ImageFormat::Png)?;
    Ok(png_data)
}

/// Decode JPEG 2000 bytes and re-encode them as PNG
///
/// RGBA images are flattened to RGB before encoding.
#[cfg(feature = "jpeg2000")]
pub fn jp2_to_png(data: &[u8]) -> ExtractResult<Vec<u8>> {
    let jp2 = jpeg2k::Image::from_bytes(data)
        .map_err(|e| ExtractError::UndecodableImage(format!("Failed to decode JPEG 2000: {}", e)))?;

    let decoded = DynamicImage::try_from(&jp2)
        .map_err(|e| ExtractError::UndecodableImage(format!("Failed to convert JPEG 2000: {}", e)))?;

    debug!("Decoded JPEG 2000 image {}x{}", decoded.width(), decoded.height());

    let decoded = match decoded {
        DynamicImage::ImageRgba8(_) => DynamicImage::ImageRgb8(decoded.to_rgb8()),
        other => other,
    };

    encode_png(&decoded)
}

/// JPEG 2000 support is compiled out; every JP2 image is undecodable
#[cfg(not(feature = "jpeg2000"))]
pub fn jp2_to_png(_data: &[u8]) -> ExtractResult<Vec<u8>> {
    Err(ExtractError::UndecodableImage(
        "JPEG 2000 conversion requires the `jpeg2000` feature".to_string(),
    ))
}

/// Build a PNG from uncompressed 8-bit samples
///
/// The component count is inferred from the buffer size: 1 for gray,
/// 3 for RGB, 4 for CMYK (converted to RGB).
pub fn raw_samples_to_png(samples: Vec<u8>, width: u32, height: u32) -> ExtractResult<Vec<u8>> {
    let pixels = width as usize * height as usize;
    if pixels == 0 {
        return Err(ExtractError::UndecodableImage("Image has zero dimensions".to_string()));
    }

    let components = samples.len() / pixels;
    let expected = pixels * components;
    let mut samples = samples;
    // Streams are sometimes padded past the last row
    samples.truncate(expected);

    let image = match components {
        1 => GrayImage::from_raw(width, height, samples).map(DynamicImage::ImageLuma8),
        3 => RgbImage::from_raw(width, height, samples).map(DynamicImage::ImageRgb8),
        4 => RgbImage::from_raw(width, height, cmyk_to_rgb(&samples)).map(DynamicImage::ImageRgb8),
        n => {
            return Err(ExtractError::UndecodableImage(format!(
                "Unsupported sample layout: {} bytes for {}x{} pixels ({} components)",
                expected, width, height, n
            )))
        }
    };

    let image = image.ok_or_else(|| {
        ExtractError::UndecodableImage("Failed to create image from raw samples".to_string())
    })?;

    encode_png(&image)
}

/// Convert CMYK bytes to RGB
#[allow(clippy::many_single_char_names)]
fn cmyk_to_rgb(cmyk: &[u8]) -> Vec<u8> {
    let mut rgb = Vec::with_capacity((cmyk.len() / 4) * 3);
    for chunk in cmyk.chunks_exact(4) {
        let c = f32::from(chunk[0]) / 255.0;
        let m = f32::from(chunk[1]) / 255.0;
        let y = f32::from(chunk[2]) / 255.0;
        let k = f32::from(chunk[3]) / 255.0;

        rgb.push((255.0 * (1.0 - c) * (1.0 - k)) as u8);
        rgb.push((255.0 * (1.0 - m) * (1.0 - k)) as u8);
        rgb.push((255.0 * (1.0 - y) * (1.0 - k)) as u8);
    }
    rgb
}
