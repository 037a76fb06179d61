//! Handler for Word (DOCX) documents

use std::path::Path;
use log::debug;

use crate::errors::ExtractResult;
use crate::utils::string_utils::part_file_name;
use super::handler::{ExtractedImage, ExtractorHandler, ImageVisitor};
use super::ooxml::{resolve_target, OoxmlPackage, OFFICE_DOCUMENT_RELATIONSHIP};

/// Main part used when the package declares none
const DEFAULT_MAIN_PART: &str = "word/document.xml";

/// Extracts every part stored in the media folder beside the main document part
pub struct DocxHandler;

impl ExtractorHandler for DocxHandler {
    fn name(&self) -> &'static str {
        "DOCX"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["docx"]
    }

    fn for_each_image(&self, source_path: &Path, visit: &mut ImageVisitor<'_>) -> ExtractResult<()> {
        let mut package = OoxmlPackage::open(source_path)?;
        let main_part = main_document_part(&mut package)?;
        package.require_part(&main_part)?;

        let media_prefix = media_prefix_for(&main_part);
        let media_parts: Vec<String> = package
            .part_names()?
            .into_iter()
            .filter(|name| name.starts_with(&media_prefix))
            .collect();

        debug!("Found {} media parts under {} in {}", media_parts.len(), media_prefix, source_path.display());

        for part_name in media_parts {
            let Some(data) = package.read_part(&part_name)? else {
                continue;
            };
            let hint = package.image_hint(&part_name);
            visit(Ok(ExtractedImage::new(data, part_file_name(&part_name)).with_hint(hint)))?;
        }

        Ok(())
    }
}

/// Main document part named by the package-level `officeDocument` relationship
fn main_document_part(package: &mut OoxmlPackage) -> ExtractResult<String> {
    let main_part = package
        .relationships("")?
        .into_iter()
        .find(|rel| !rel.external && rel.is_type(OFFICE_DOCUMENT_RELATIONSHIP))
        .map(|rel| resolve_target("", &rel.target));

    Ok(main_part.unwrap_or_else(|| {
        debug!("No officeDocument relationship in {}, assuming {}", package.path().display(), DEFAULT_MAIN_PART);
        DEFAULT_MAIN_PART.to_string()
    }))
}

/// Media folder that sits beside the main part (`word/media/` for `word/document.xml`)
fn media_prefix_for(main_part: &str) -> String {
    match main_part.rsplit_once('/') {
        Some((dir, _)) => format!("{}/media/", dir),
        None => "media/".to_string(),
    }
}
