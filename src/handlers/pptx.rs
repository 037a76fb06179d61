//! Handler for PowerPoint (PPTX) presentations
//!
//! Slides are visited in presentation order and, within a slide, picture
//! shapes are visited in shape-tree order (group shapes included).

use std::collections::HashMap;
use std::path::Path;
use log::{debug, warn};
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::errors::{ExtractError, ExtractResult};
use crate::utils::string_utils::part_file_name;
use super::handler::{ExtractedImage, ExtractorHandler, ImageVisitor};
use super::ooxml::{self, OoxmlPackage, XmlError, IMAGE_RELATIONSHIP, SLIDE_RELATIONSHIP};

const PRESENTATION_PART: &str = "ppt/presentation.xml";
const SLIDE_PREFIX: &str = "ppt/slides/slide";

/// Extracts the pictures placed on each slide
pub struct PptxHandler;

impl ExtractorHandler for PptxHandler {
    fn name(&self) -> &'static str {
        "PPTX"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["pptx"]
    }

    fn for_each_image(&self, source_path: &Path, visit: &mut ImageVisitor<'_>) -> ExtractResult<()> {
        let mut package = OoxmlPackage::open(source_path)?;
        let slides = slide_order(&mut package)?;

        debug!("Found {} slides in {}", slides.len(), source_path.display());

        for (index, slide_part) in slides.iter().enumerate() {
            let Some(slide_xml) = package.read_part(slide_part)? else {
                warn!("Slide {} ({}) is missing from {}", index + 1, slide_part, source_path.display());
                continue;
            };

            let embeds = picture_embeds(&slide_xml).map_err(|e| ExtractError::corrupt(source_path, e))?;
            if embeds.is_empty() {
                continue;
            }

            let image_targets: HashMap<String, String> = package
                .relationships(slide_part)?
                .into_iter()
                .filter(|rel| rel.is_type(IMAGE_RELATIONSHIP) && !rel.external)
                .map(|rel| {
                    let target = ooxml::resolve_target(slide_part, &rel.target);
                    (rel.id, target)
                })
                .collect();

            debug!("Slide {} has {} pictures", index + 1, embeds.len());

            for embed in embeds {
                let Some(media_part) = image_targets.get(&embed) else {
                    warn!("Slide {} references unknown image relationship {}", index + 1, embed);
                    continue;
                };

                let Some(data) = package.read_part(media_part)? else {
                    warn!("Slide {} image {} is missing from the package", index + 1, media_part);
                    continue;
                };

                let hint = package.image_hint(media_part);
                visit(Ok(ExtractedImage::new(data, part_file_name(media_part)).with_hint(hint)))?;
            }
        }

        Ok(())
    }
}

/// Slide part names in presentation order
///
/// The order comes from `p:sldIdLst` in the presentation part, resolved
/// through its relationships. Packages without that list fall back to the
/// numeric order of `ppt/slides/slideN.xml`.
fn slide_order(package: &mut OoxmlPackage) -> ExtractResult<Vec<String>> {
    let presentation = package.require_part(PRESENTATION_PART)?;
    let slide_ids = slide_relationship_ids(&presentation)
        .map_err(|e| ExtractError::corrupt(package.path(), e))?;

    if !slide_ids.is_empty() {
        let targets: HashMap<String, String> = package
            .relationships(PRESENTATION_PART)?
            .into_iter()
            .filter(|rel| rel.is_type(SLIDE_RELATIONSHIP))
            .map(|rel| {
                let target = ooxml::resolve_target(PRESENTATION_PART, &rel.target);
                (rel.id, target)
            })
            .collect();

        let ordered: Vec<String> = slide_ids
            .iter()
            .filter_map(|id| targets.get(id).cloned())
            .collect();

        if !ordered.is_empty() {
            return Ok(ordered);
        }
        debug!("Slide list could not be resolved, falling back to part names");
    }

    let mut numbered: Vec<(u32, String)> = package
        .part_names()?
        .into_iter()
        .filter_map(|name| slide_number(&name).map(|n| (n, name)))
        .collect();
    numbered.sort();

    Ok(numbered.into_iter().map(|(_, name)| name).collect())
}

/// Number N of a `ppt/slides/slideN.xml` part
fn slide_number(part_name: &str) -> Option<u32> {
    part_name
        .strip_prefix(SLIDE_PREFIX)?
        .strip_suffix(".xml")?
        .parse()
        .ok()
}

/// Relationship ids of `p:sldId` entries, in list order
fn slide_relationship_ids(presentation_xml: &[u8]) -> Result<Vec<String>, XmlError> {
    let mut reader = Reader::from_reader(presentation_xml);
    reader.config_mut().trim_text(true);

    let mut ids = Vec::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf).map_err(ooxml::xml_error)? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"sldId" => {
                let attributes = ooxml::element_attributes(&e)?;
                if let Some(id) = ooxml::prefixed_attribute(&attributes, "id") {
                    ids.push(id.to_string());
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(ids)
}

/// `r:embed` ids of the blips inside picture shapes, in document order
fn picture_embeds(slide_xml: &[u8]) -> Result<Vec<String>, XmlError> {
    let mut reader = Reader::from_reader(slide_xml);
    reader.config_mut().trim_text(true);

    let mut embeds = Vec::new();
    let mut buf = Vec::new();
    // Nesting depth of picture elements
    let mut picture_depth = 0usize;

    loop {
        match reader.read_event_into(&mut buf).map_err(ooxml::xml_error)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"pic" => picture_depth += 1,
                b"blip" if picture_depth > 0 => push_embed(&e, &mut embeds)?,
                _ => {}
            },
            Event::Empty(e) if picture_depth > 0 && e.local_name().as_ref() == b"blip" => {
                push_embed(&e, &mut embeds)?;
            }
            Event::End(e) if e.local_name().as_ref() == b"pic" => {
                picture_depth = picture_depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(embeds)
}

fn push_embed(blip: &quick_xml::events::BytesStart<'_>, embeds: &mut Vec<String>) -> Result<(), XmlError> {
    let attributes = ooxml::element_attributes(blip)?;
    match ooxml::prefixed_attribute(&attributes, "embed") {
        Some(id) => embeds.push(id.to_string()),
        None => debug!("Skipping picture without embedded image"),
    }
    Ok(())
}
