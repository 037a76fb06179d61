//! Document fixtures built on the fly for integration tests

#![allow(dead_code)]

use std::fs::File;
use std::io::{Cursor, Write};
use std::path::Path;

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Encode a solid-colour image
pub fn encoded_image(width: u32, height: u32, color: [u8; 3], format: ImageFormat) -> Vec<u8> {
    let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(color)));
    let mut buffer = Cursor::new(Vec::new());
    image.write_to(&mut buffer, format).unwrap();
    buffer.into_inner()
}

pub fn png(color: [u8; 3]) -> Vec<u8> {
    encoded_image(4, 3, color, ImageFormat::Png)
}

pub fn jpeg(color: [u8; 3]) -> Vec<u8> {
    encoded_image(8, 8, color, ImageFormat::Jpeg)
}

/// Real 8x6 lossless JPEG 2000 file: left half (200, 30, 30), right half (20, 40, 220)
pub const TWO_TONE_JP2: &[u8] = include_bytes!("../data/two_tone.jp2");

/// Image XObject placed on a fixture page
pub enum PdfImage {
    /// JPEG bytes stored with `DCTDecode`
    Jpeg(Vec<u8>),
    /// JPEG bytes whose `Width` and `Height` are indirect objects
    IndirectJpeg(Vec<u8>),
    /// JPEG bytes drawn through a form XObject
    FormJpeg(Vec<u8>),
    /// JPEG 2000 bytes stored with `JPXDecode`
    Jpx(Vec<u8>),
    /// Stream using a filter the extractor cannot unwrap
    Jbig2,
    /// Uncompressed 8-bit RGB samples
    RawRgb { width: u32, height: u32, samples: Vec<u8> },
}

fn image_stream(filter: Option<&str>, width: Object, height: Object, content: Vec<u8>) -> Stream {
    let mut dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => width,
        "Height" => height,
        "ColorSpace" => "DeviceRGB",
        "BitsPerComponent" => 8i64,
    };
    if let Some(filter) = filter {
        dict.set("Filter", filter);
    }
    Stream::new(dict, content)
}

fn add_image(doc: &mut Document, image: &PdfImage) -> ObjectId {
    match image {
        PdfImage::Jpeg(bytes) => {
            doc.add_object(image_stream(Some("DCTDecode"), 8.into(), 8.into(), bytes.clone()))
        }
        PdfImage::IndirectJpeg(bytes) => {
            let width = doc.add_object(Object::Integer(8));
            let height = doc.add_object(Object::Integer(8));
            doc.add_object(image_stream(Some("DCTDecode"), width.into(), height.into(), bytes.clone()))
        }
        PdfImage::FormJpeg(bytes) => {
            let inner = doc.add_object(image_stream(Some("DCTDecode"), 8.into(), 8.into(), bytes.clone()));
            doc.add_object(Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Form",
                    "BBox" => vec![0.into(), 0.into(), 8.into(), 8.into()],
                    "Resources" => dictionary! { "XObject" => dictionary! { "Im1" => inner } },
                },
                b"q 8 0 0 8 0 0 cm /Im1 Do Q".to_vec(),
            ))
        }
        PdfImage::Jpx(bytes) => {
            doc.add_object(image_stream(Some("JPXDecode"), 8.into(), 6.into(), bytes.clone()))
        }
        PdfImage::Jbig2 => {
            doc.add_object(image_stream(Some("JBIG2Decode"), 8.into(), 8.into(), vec![0; 16]))
        }
        PdfImage::RawRgb { width, height, samples } => doc.add_object(image_stream(
            None,
            (*width as i64).into(),
            (*height as i64).into(),
            samples.clone(),
        )),
    }
}

fn xobject_resources(doc: &mut Document, images: &[PdfImage]) -> Dictionary {
    let mut xobjects = Dictionary::new();
    for (index, image) in images.iter().enumerate() {
        let image_id = add_image(doc, image);
        xobjects.set(format!("Im{}", index + 1), image_id);
    }
    dictionary! { "XObject" => xobjects }
}

fn finish_pdf(mut doc: Document, path: &Path, pages_id: ObjectId, mut pages_dict: Dictionary, kids: Vec<Object>) {
    pages_dict.set("Count", kids.len() as i64);
    pages_dict.set("Kids", kids);
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path).unwrap();
}

/// Write a PDF with one entry per page, each listing the images on it
pub fn write_pdf(path: &Path, pages: &[Vec<PdfImage>]) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let mut kids: Vec<Object> = Vec::new();

    for images in pages {
        let resources = xobject_resources(&mut doc, images);
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Resources" => resources,
        });
        kids.push(page_id.into());
    }

    finish_pdf(doc, path, pages_id, dictionary! { "Type" => "Pages" }, kids);
}

/// Write a PDF whose pages carry no `Resources` and inherit one shared,
/// indirect resource dictionary from the page tree root
pub fn write_pdf_with_inherited_resources(path: &Path, page_count: usize, images: &[PdfImage]) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let resources = xobject_resources(&mut doc, images);
    let resources_id = doc.add_object(resources);

    let kids: Vec<Object> = (0..page_count)
        .map(|_| {
            doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            })
            .into()
        })
        .collect();

    finish_pdf(doc, path, pages_id, dictionary! { "Type" => "Pages", "Resources" => resources_id }, kids);
}

/// Write a zip archive with the given entries, in order
pub fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
    let file = File::create(path).unwrap();
    let mut writer = ZipWriter::new(file);
    let options = SimpleFileOptions::default();
    for (name, data) in entries {
        writer.start_file(*name, options).unwrap();
        writer.write_all(data).unwrap();
    }
    writer.finish().unwrap();
}

const OFFICE_DOCUMENT_REL_TYPE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";

const DOCX_DOCUMENT: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:p/></w:body></w:document>"#;

/// Write a DOCX whose media folder holds the given (file name, bytes) pairs
pub fn write_docx(path: &Path, media: &[(&str, Vec<u8>)]) {
    write_docx_with_main_part(path, "word/document.xml", media);
}

/// Write a DOCX whose `officeDocument` relationship points at `main_part`;
/// media go into the `media/` folder beside it
pub fn write_docx_with_main_part(path: &Path, main_part: &str, media: &[(&str, Vec<u8>)]) {
    let media_dir = match main_part.rsplit_once('/') {
        Some((dir, _)) => format!("{}/media", dir),
        None => "media".to_string(),
    };
    let content_types = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Default Extension="png" ContentType="image/png"/>
  <Default Extension="jpeg" ContentType="image/jpeg"/>
  <Override PartName="/{}" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
</Types>"#,
        main_part
    );
    let root_rels = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="{}" Target="{}"/></Relationships>"#,
        OFFICE_DOCUMENT_REL_TYPE, main_part
    );

    let names: Vec<String> = media.iter().map(|(name, _)| format!("{}/{}", media_dir, name)).collect();
    let mut entries: Vec<(&str, &[u8])> = vec![
        ("[Content_Types].xml", content_types.as_bytes()),
        ("_rels/.rels", root_rels.as_bytes()),
        (main_part, DOCX_DOCUMENT.as_bytes()),
    ];
    for (name, (_, data)) in names.iter().zip(media) {
        entries.push((name.as_str(), data.as_slice()));
    }
    write_zip(path, &entries);
}

const PPTX_CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Default Extension="png" ContentType="image/png"/>
  <Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/>
</Types>"#;

const SLIDE_REL_TYPE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";
const IMAGE_REL_TYPE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";

/// Write a PPTX with `slide_count` slides
///
/// `pictures` lists (1-based slide number, media file name, bytes); each
/// becomes a picture shape on that slide.
pub fn write_pptx(path: &Path, slide_count: usize, pictures: &[(usize, &str, Vec<u8>)]) {
    let mut parts: Vec<(String, Vec<u8>)> = Vec::new();
    parts.push(("[Content_Types].xml".to_string(), PPTX_CONTENT_TYPES.as_bytes().to_vec()));

    let mut slide_ids = String::new();
    let mut presentation_rels = String::new();
    for n in 1..=slide_count {
        slide_ids.push_str(&format!(r#"<p:sldId id="{}" r:id="rId{}"/>"#, 255 + n, n));
        presentation_rels.push_str(&format!(
            r#"<Relationship Id="rId{}" Type="{}" Target="slides/slide{}.xml"/>"#,
            n, SLIDE_REL_TYPE, n
        ));
    }

    parts.push((
        "ppt/presentation.xml".to_string(),
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:presentation xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:sldIdLst>{}</p:sldIdLst></p:presentation>"#,
            slide_ids
        )
        .into_bytes(),
    ));
    parts.push((
        "ppt/_rels/presentation.xml.rels".to_string(),
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{}</Relationships>"#,
            presentation_rels
        )
        .into_bytes(),
    ));

    for n in 1..=slide_count {
        let mut shapes = String::new();
        let mut rels = String::new();
        for (index, (_, name, data)) in pictures.iter().filter(|(slide, _, _)| *slide == n).enumerate() {
            let rel_id = format!("rIdImg{}", index + 1);
            shapes.push_str(&format!(
                r#"<p:pic><p:nvPicPr><p:cNvPr id="{}" name="Picture"/></p:nvPicPr><p:blipFill><a:blip r:embed="{}"/></p:blipFill></p:pic>"#,
                index + 2,
                rel_id
            ));
            rels.push_str(&format!(
                r#"<Relationship Id="{}" Type="{}" Target="../media/{}"/>"#,
                rel_id, IMAGE_REL_TYPE, name
            ));
            parts.push((format!("ppt/media/{}", name), data.clone()));
        }

        parts.push((
            format!("ppt/slides/slide{}.xml", n),
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:cSld><p:spTree>{}</p:spTree></p:cSld></p:sld>"#,
                shapes
            )
            .into_bytes(),
        ));
        parts.push((
            format!("ppt/slides/_rels/slide{}.xml.rels", n),
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{}</Relationships>"#,
                rels
            )
            .into_bytes(),
        ));
    }

    let entries: Vec<(&str, &[u8])> = parts.iter().map(|(name, data)| (name.as_str(), data.as_slice())).collect();
    write_zip(path, &entries);
}
