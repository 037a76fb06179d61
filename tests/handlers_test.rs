//! Integration tests for the document handlers

mod common;

use std::fs;
use std::path::PathBuf;

use docimgx::{ExtractError, ExtractOptions, HandlerRegistry};
use common::PdfImage;

fn file_names(paths: &[PathBuf]) -> Vec<String> {
    paths
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect()
}

#[test]
fn test_pdf_images_follow_page_order() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("report.pdf");
    common::write_pdf(
        &source,
        &[
            vec![PdfImage::Jpeg(common::jpeg([200, 10, 10]))],
            vec![],
            vec![PdfImage::RawRgb { width: 2, height: 2, samples: vec![0, 255, 0, 0, 255, 0, 0, 255, 0, 0, 255, 0] }],
        ],
    );

    let registry = HandlerRegistry::with_default_handlers();
    let handler = registry.resolve_path(&source).unwrap();
    let out = dir.path().join("out");
    let written = handler.extract(&source, &out, &ExtractOptions::default()).unwrap();

    assert_eq!(file_names(&written), vec!["page1_image1.jpg", "page3_image1.png"]);
    for path in &written {
        assert!(path.exists());
        assert!(path.starts_with(&out));
    }

    let decoded = image::open(&written[1]).unwrap().to_rgb8();
    assert_eq!(decoded.dimensions(), (2, 2));
    assert_eq!(decoded.get_pixel(1, 1).0, [0, 255, 0]);
}

#[test]
fn test_pdf_without_images_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("text.pdf");
    common::write_pdf(&source, &[vec![], vec![]]);

    let registry = HandlerRegistry::with_default_handlers();
    let written = registry
        .resolve("pdf")
        .unwrap()
        .extract(&source, &dir.path().join("out"), &ExtractOptions::default())
        .unwrap();

    assert!(written.is_empty());
}

#[test]
fn test_pdf_dedupe_writes_identical_images_once() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("logo.pdf");
    let logo = common::jpeg([1, 2, 3]);
    common::write_pdf(
        &source,
        &[vec![PdfImage::Jpeg(logo.clone())], vec![PdfImage::Jpeg(logo)]],
    );

    let registry = HandlerRegistry::with_default_handlers();
    let handler = registry.resolve("pdf").unwrap();

    let all = handler
        .extract(&source, &dir.path().join("all"), &ExtractOptions::default())
        .unwrap();
    assert_eq!(all.len(), 2);

    let options = ExtractOptions { dedupe: true, ..ExtractOptions::default() };
    let unique = handler.extract(&source, &dir.path().join("unique"), &options).unwrap();
    assert_eq!(file_names(&unique), vec!["page1_image1.jpg"]);
}

fn extract_pdf(source: &std::path::Path, out: &std::path::Path) -> Vec<PathBuf> {
    let registry = HandlerRegistry::with_default_handlers();
    registry
        .resolve("pdf")
        .unwrap()
        .extract(source, out, &ExtractOptions::default())
        .unwrap()
}

#[test]
fn test_pdf_pages_inherit_resources_from_page_tree() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("inherited.pdf");
    common::write_pdf_with_inherited_resources(&source, 2, &[PdfImage::Jpeg(common::jpeg([90, 90, 90]))]);

    let written = extract_pdf(&source, &dir.path().join("out"));

    assert_eq!(file_names(&written), vec!["page1_image1.jpg", "page2_image1.jpg"]);
}

#[test]
fn test_pdf_indirect_dimensions_are_resolved() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("indirect.pdf");
    common::write_pdf(
        &source,
        &[vec![
            PdfImage::IndirectJpeg(common::jpeg([10, 20, 30])),
            PdfImage::Jpeg(common::jpeg([30, 20, 10])),
        ]],
    );

    let written = extract_pdf(&source, &dir.path().join("out"));

    assert_eq!(file_names(&written), vec!["page1_image1.jpg", "page1_image2.jpg"]);
}

#[test]
fn test_pdf_images_inside_form_xobjects_are_found() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("forms.pdf");
    let boxed = common::jpeg([250, 250, 0]);
    common::write_pdf(
        &source,
        &[vec![PdfImage::FormJpeg(boxed.clone()), PdfImage::Jpeg(common::jpeg([0, 0, 0]))]],
    );

    let written = extract_pdf(&source, &dir.path().join("out"));

    assert_eq!(file_names(&written), vec!["page1_image1.jpg", "page1_image2.jpg"]);
    assert_eq!(fs::read(&written[0]).unwrap(), boxed);
}

#[test]
fn test_pdf_unsupported_filter_skips_only_that_image() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("fax.pdf");
    common::write_pdf(&source, &[vec![PdfImage::Jbig2, PdfImage::Jpeg(common::jpeg([5, 6, 7]))]]);

    let written = extract_pdf(&source, &dir.path().join("out"));

    assert_eq!(file_names(&written), vec!["page1_image2.jpg"]);
}

#[cfg(feature = "jpeg2000")]
#[test]
fn test_pdf_jpx_image_is_written_as_png() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("scan.pdf");
    common::write_pdf(&source, &[vec![PdfImage::Jpx(common::TWO_TONE_JP2.to_vec())]]);

    let written = extract_pdf(&source, &dir.path().join("out"));

    assert_eq!(file_names(&written), vec!["page1_image1.png"]);
    let decoded = image::open(&written[0]).unwrap().to_rgb8();
    assert_eq!(decoded.dimensions(), (8, 6));
    assert_eq!(decoded.get_pixel(1, 1).0, [200, 30, 30]);
    assert_eq!(decoded.get_pixel(6, 4).0, [20, 40, 220]);
}

#[test]
fn test_pdf_jpx_image_kept_when_conversion_disabled() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("scan.pdf");
    common::write_pdf(&source, &[vec![PdfImage::Jpx(common::TWO_TONE_JP2.to_vec())]]);

    let registry = HandlerRegistry::with_default_handlers();
    let mut options = ExtractOptions::default();
    options.save.convert_jp2 = false;
    let written = registry
        .resolve("pdf")
        .unwrap()
        .extract(&source, &dir.path().join("out"), &options)
        .unwrap();

    assert_eq!(file_names(&written), vec!["page1_image1.jp2"]);
    assert_eq!(fs::read(&written[0]).unwrap(), common::TWO_TONE_JP2);
}

#[test]
fn test_docx_writes_every_media_part() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("letter.docx");
    let first = common::png([255, 0, 0]);
    common::write_docx(
        &source,
        &[
            ("image1.png", first.clone()),
            ("image2.jpeg", common::jpeg([0, 0, 255])),
            ("image3.png", common::png([0, 255, 0])),
        ],
    );

    let registry = HandlerRegistry::with_default_handlers();
    let out = dir.path().join("out");
    let written = registry
        .resolve_path(&source)
        .unwrap()
        .extract(&source, &out, &ExtractOptions::default())
        .unwrap();

    assert_eq!(file_names(&written), vec!["image1.png", "image2.jpg", "image3.png"]);
    assert_eq!(fs::read(&written[0]).unwrap(), first);
}

#[test]
fn test_docx_skips_undecodable_media() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("mixed.docx");
    common::write_docx(
        &source,
        &[
            ("image1.emf", b"not an image at all".to_vec()),
            ("image2.png", common::png([9, 9, 9])),
        ],
    );

    let registry = HandlerRegistry::with_default_handlers();
    let written = registry
        .resolve("docx")
        .unwrap()
        .extract(&source, &dir.path().join("out"), &ExtractOptions::default())
        .unwrap();

    assert_eq!(file_names(&written), vec!["image2.png"]);
}

#[test]
fn test_docx_without_media_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("plain.docx");
    common::write_docx(&source, &[]);

    let registry = HandlerRegistry::with_default_handlers();
    let written = registry
        .resolve("docx")
        .unwrap()
        .extract(&source, &dir.path().join("out"), &ExtractOptions::default())
        .unwrap();

    assert!(written.is_empty());
}

#[test]
fn test_pptx_images_follow_slide_order() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("deck.pptx");
    // Media numbering runs opposite to slide order
    common::write_pptx(
        &source,
        5,
        &[
            (5, "image1.png", common::png([5, 5, 5])),
            (2, "image2.png", common::png([2, 2, 2])),
        ],
    );

    let registry = HandlerRegistry::with_default_handlers();
    let written = registry
        .resolve_path(&source)
        .unwrap()
        .extract(&source, &dir.path().join("out"), &ExtractOptions::default())
        .unwrap();

    assert_eq!(file_names(&written), vec!["image2.png", "image1.png"]);
}

#[test]
fn test_not_a_zip_is_corrupt() {
    let dir = tempfile::tempdir().unwrap();
    let registry = HandlerRegistry::with_default_handlers();

    for name in ["broken.docx", "broken.pptx", "broken.pdf"] {
        let source = dir.path().join(name);
        fs::write(&source, b"this is plain text").unwrap();

        let result = registry
            .resolve_path(&source)
            .unwrap()
            .extract(&source, &dir.path().join("out"), &ExtractOptions::default());

        match result {
            Err(ExtractError::CorruptDocument { path, .. }) => assert_eq!(path, source),
            other => panic!("Expected CorruptDocument for {}, got {:?}", name, other),
        }
    }
}

#[test]
fn test_docx_without_document_part_is_corrupt() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("empty.docx");
    common::write_zip(&source, &[("readme.txt", b"hello".as_slice())]);

    let registry = HandlerRegistry::with_default_handlers();
    let result = registry
        .resolve("docx")
        .unwrap()
        .extract(&source, &dir.path().join("out"), &ExtractOptions::default());

    assert!(matches!(result, Err(ExtractError::CorruptDocument { .. })));
}

#[test]
fn test_docx_main_part_comes_from_package_relationships() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("renamed.docx");
    common::write_docx_with_main_part(&source, "word/document2.xml", &[("image1.png", common::png([1, 2, 3]))]);

    let registry = HandlerRegistry::with_default_handlers();
    let written = registry
        .resolve("docx")
        .unwrap()
        .extract(&source, &dir.path().join("out"), &ExtractOptions::default())
        .unwrap();

    assert_eq!(file_names(&written), vec!["image1.png"]);
}

#[test]
fn test_docx_missing_main_part_is_corrupt() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("dangling.docx");
    let rels = br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/main.xml"/></Relationships>"#;
    common::write_zip(&source, &[("_rels/.rels", rels.as_slice()), ("word/document.xml", b"<w:document/>".as_slice())]);

    let registry = HandlerRegistry::with_default_handlers();
    let result = registry
        .resolve("docx")
        .unwrap()
        .extract(&source, &dir.path().join("out"), &ExtractOptions::default());

    match result {
        Err(ExtractError::CorruptDocument { reason, .. }) => assert!(reason.contains("word/main.xml")),
        other => panic!("Expected CorruptDocument, got {:?}", other),
    }
}
