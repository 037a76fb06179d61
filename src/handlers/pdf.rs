//! Handler for PDF documents
//!
//! Pages are visited in page-number order and each page's image XObjects in
//! resource dictionary order. A page without its own `Resources` inherits
//! them from the nearest ancestor in the page tree, and images drawn through
//! form XObjects are visited where the form appears. Image streams are
//! unwrapped as far as needed to hand over a standalone image file: JPEG and
//! JPEG 2000 payloads are passed through, fully decoded samples are encoded
//! as PNG.

use std::borrow::Cow;
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;
use flate2::read::ZlibDecoder;
use log::{debug, info, warn};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

use crate::errors::{ExtractError, ExtractResult};
use crate::imaging::{convert, ImageKind};
use super::handler::{ExtractedImage, ExtractorHandler, ImageVisitor};

/// Deepest page tree walked when looking for inherited resources
const MAX_TREE_DEPTH: usize = 64;

/// Deepest nesting of form XObjects followed
const MAX_FORM_DEPTH: usize = 16;

/// Extracts image XObjects page by page
pub struct PdfHandler;

impl ExtractorHandler for PdfHandler {
    fn name(&self) -> &'static str {
        "PDF"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["pdf"]
    }

    fn for_each_image(&self, source_path: &Path, visit: &mut ImageVisitor<'_>) -> ExtractResult<()> {
        let document = match Document::load(source_path) {
            Ok(document) => document,
            Err(lopdf::Error::IO(e)) => return Err(ExtractError::IoError(e)),
            Err(e) => return Err(ExtractError::corrupt(source_path, e)),
        };

        let pages = document.get_pages();
        info!("Found {} pages in {}", pages.len(), source_path.display());

        for (page_number, page_id) in pages {
            debug!("Processing page {}", page_number);

            let resources = match page_resources(&document, page_id) {
                Ok(Some(resources)) => resources,
                Ok(None) => {
                    debug!("Page {} has no resources", page_number);
                    continue;
                }
                Err(reason) => {
                    warn!("Skipping page {} in {}: {}", page_number, source_path.display(), reason);
                    continue;
                }
            };

            let mut streams = Vec::new();
            collect_image_streams(&document, resources, &mut HashSet::new(), 0, &mut streams);

            for (index, stream) in streams.into_iter().enumerate() {
                let name = format!("page{}_image{}", page_number, index + 1);

                let item = read_image_stream(&document, stream)
                    .and_then(|image| decode_image_stream(&image))
                    .map(|(data, kind)| ExtractedImage::new(data, name.as_str()).with_hint(Some(kind)))
                    .map_err(|e| match e {
                        ExtractError::UndecodableImage(reason) => {
                            ExtractError::UndecodableImage(format!("{}: {}", name, reason))
                        }
                        other => other,
                    });

                visit(item)?;
            }
        }

        Ok(())
    }
}

/// Resolve an object through any chain of references
fn resolve<'a>(document: &'a Document, object: &'a Object) -> lopdf::Result<&'a Object> {
    document.dereference(object).map(|(_, object)| object)
}

/// Look up a dictionary entry and resolve it, `None` when absent or dangling
fn resolved_entry<'a>(document: &'a Document, dict: &'a Dictionary, key: &[u8]) -> Option<&'a Object> {
    dict.get(key).ok().and_then(|object| resolve(document, object).ok())
}

/// Resources in effect for a page, following the `Parent` chain
///
/// # Returns
/// `Ok(None)` when no node up to the root carries a `Resources` entry, or
/// an error message when the page tree cannot be walked.
fn page_resources(document: &Document, page_id: ObjectId) -> Result<Option<&Dictionary>, String> {
    let mut node = document
        .get_dictionary(page_id)
        .map_err(|e| format!("unreadable page object: {}", e))?;

    for _ in 0..MAX_TREE_DEPTH {
        if let Ok(resources) = node.get(b"Resources") {
            return resolve(document, resources)
                .and_then(Object::as_dict)
                .map(Some)
                .map_err(|e| format!("unreadable Resources: {}", e));
        }

        match node.get(b"Parent") {
            Ok(parent) => {
                node = resolve(document, parent)
                    .and_then(Object::as_dict)
                    .map_err(|e| format!("unreadable Parent: {}", e))?;
            }
            Err(_) => return Ok(None),
        }
    }

    Err("page tree is too deep".to_string())
}

/// Collect image streams of a resource dictionary in entry order
///
/// Form XObjects are expanded in place through their own resources. Each
/// form is expanded at most once per page, which also breaks cycles.
fn collect_image_streams<'a>(
    document: &'a Document,
    resources: &'a Dictionary,
    visited_forms: &mut HashSet<ObjectId>,
    depth: usize,
    streams: &mut Vec<&'a Stream>,
) {
    let Some(xobjects) = resolved_entry(document, resources, b"XObject") else {
        return;
    };
    let Ok(xobjects) = xobjects.as_dict() else {
        debug!("XObject resource is not a dictionary");
        return;
    };

    for (key, value) in xobjects.iter() {
        let label = String::from_utf8_lossy(key);
        let (id, object) = match document.dereference(value) {
            Ok(found) => found,
            Err(e) => {
                warn!("Skipping XObject {}: {}", label, e);
                continue;
            }
        };
        let Ok(stream) = object.as_stream() else {
            debug!("XObject {} is not a stream", label);
            continue;
        };

        let subtype = resolved_entry(document, &stream.dict, b"Subtype").and_then(|s| s.as_name().ok());
        match subtype {
            Some(b"Image") => streams.push(stream),
            Some(b"Form") => {
                if depth >= MAX_FORM_DEPTH {
                    warn!("Form XObject {} nested too deeply", label);
                    continue;
                }
                if let Some(id) = id {
                    if !visited_forms.insert(id) {
                        continue;
                    }
                }
                let form_resources = resolved_entry(document, &stream.dict, b"Resources").and_then(|r| r.as_dict().ok());
                if let Some(form_resources) = form_resources {
                    collect_image_streams(document, form_resources, visited_forms, depth + 1, streams);
                }
            }
            _ => {}
        }
    }
}

/// Image stream attributes with indirect values resolved
#[derive(Debug)]
struct ImageStream<'a> {
    width: Option<i64>,
    height: Option<i64>,
    bits_per_component: Option<i64>,
    color_space: Option<String>,
    filters: Vec<String>,
    predictor: bool,
    content: &'a [u8],
}

/// Read the attributes needed to unwrap an image stream
fn read_image_stream<'a>(document: &'a Document, stream: &'a Stream) -> ExtractResult<ImageStream<'a>> {
    let dict = &stream.dict;

    let integer = |key: &[u8]| -> ExtractResult<Option<i64>> {
        match resolved_entry(document, dict, key) {
            Some(object) => object.as_i64().map(Some).map_err(|_| {
                ExtractError::UndecodableImage(format!("{} is not an integer", String::from_utf8_lossy(key)))
            }),
            None => Ok(None),
        }
    };

    let color_space = match resolved_entry(document, dict, b"ColorSpace") {
        Some(Object::Name(name)) => Some(String::from_utf8_lossy(name).into_owned()),
        Some(Object::Array(items)) => items
            .first()
            .and_then(|family| resolve(document, family).ok())
            .and_then(|family| family.as_name().ok())
            .map(|family| String::from_utf8_lossy(family).into_owned()),
        _ => None,
    };

    let filters = match resolved_entry(document, dict, b"Filter") {
        Some(Object::Name(name)) => vec![String::from_utf8_lossy(name).into_owned()],
        Some(Object::Array(items)) => items
            .iter()
            .map(|item| {
                resolve(document, item)
                    .and_then(Object::as_name)
                    .map(|name| String::from_utf8_lossy(name).into_owned())
                    .map_err(|_| ExtractError::UndecodableImage("malformed Filter array".to_string()))
            })
            .collect::<ExtractResult<Vec<String>>>()?,
        Some(_) => return Err(ExtractError::UndecodableImage("malformed Filter entry".to_string())),
        None => Vec::new(),
    };

    Ok(ImageStream {
        width: integer(b"Width")?,
        height: integer(b"Height")?,
        bits_per_component: integer(b"BitsPerComponent")?,
        color_space,
        filters,
        predictor: uses_predictor(document, dict),
        content: &stream.content,
    })
}

/// Unwrap an image stream into standalone image bytes
fn decode_image_stream(image: &ImageStream<'_>) -> ExtractResult<(Vec<u8>, ImageKind)> {
    let mut data: Cow<'_, [u8]> = Cow::Borrowed(image.content);

    for (i, filter) in image.filters.iter().enumerate() {
        let is_last = i + 1 == image.filters.len();
        match filter.as_str() {
            "FlateDecode" | "Fl" => {
                if image.predictor {
                    return Err(ExtractError::UndecodableImage("FlateDecode with predictor is not supported".to_string()));
                }
                data = Cow::Owned(inflate(&data)?);
            }
            "DCTDecode" | "DCT" if is_last => return Ok((data.into_owned(), ImageKind::Jpeg)),
            "JPXDecode" if is_last => return Ok((data.into_owned(), ImageKind::Jp2)),
            other => {
                return Err(ExtractError::UndecodableImage(format!("unsupported image filter {}", other)));
            }
        }
    }

    // Every filter has been undone; what is left are raw samples
    if image.color_space.as_deref() == Some("Indexed") {
        return Err(ExtractError::UndecodableImage("indexed color space is not supported".to_string()));
    }

    let bits = image.bits_per_component.unwrap_or(8);
    if bits != 8 {
        return Err(ExtractError::UndecodableImage(format!("{} bits per component is not supported", bits)));
    }

    let width = dimension(image.width, "Width")?;
    let height = dimension(image.height, "Height")?;

    let png = convert::raw_samples_to_png(data.into_owned(), width, height)?;
    Ok((png, ImageKind::Png))
}

fn dimension(value: Option<i64>, key: &str) -> ExtractResult<u32> {
    let value = value.ok_or_else(|| ExtractError::UndecodableImage(format!("missing {}", key)))?;
    u32::try_from(value).map_err(|_| ExtractError::UndecodableImage(format!("invalid {} {}", key, value)))
}

/// Inflate a zlib stream
fn inflate(data: &[u8]) -> ExtractResult<Vec<u8>> {
    let mut decoder = ZlibDecoder::new(data);
    let mut decompressed = Vec::new();
    decoder
        .read_to_end(&mut decompressed)
        .map_err(|e| ExtractError::UndecodableImage(format!("Decompression failed: {}", e)))?;
    Ok(decompressed)
}

/// Whether the stream's decode parameters request a PNG/TIFF predictor
fn uses_predictor(document: &Document, dict: &Dictionary) -> bool {
    let predictor_of = |object: &Object| {
        resolve(document, object)
            .and_then(Object::as_dict)
            .ok()
            .and_then(|parms| resolved_entry(document, parms, b"Predictor"))
            .and_then(|p| p.as_i64().ok())
            .is_some_and(|p| p > 1)
    };

    match resolved_entry(document, dict, b"DecodeParms") {
        Some(Object::Array(items)) => items.iter().any(predictor_of),
        Some(object) => predictor_of(object),
        None => false,
    }
}
