//! Shared access to OOXML (zip-backed) packages
//!
//! DOCX and PPTX files are zip archives of XML parts linked by
//! relationship (`.rels`) parts. This module opens the package and
//! resolves parts, relationships and content types.

use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use log::debug;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use zip::ZipArchive;

use crate::errors::{ExtractError, ExtractResult};
use crate::imaging::ImageKind;

/// Relationship type suffix for images
pub const IMAGE_RELATIONSHIP: &str = "/image";
/// Relationship type suffix for slides
pub const SLIDE_RELATIONSHIP: &str = "/slide";
/// Relationship type suffix for the package's main document part
pub const OFFICE_DOCUMENT_RELATIONSHIP: &str = "/officeDocument";

/// Most bytes reserved up front for one part; the declared size is untrusted
const MAX_PREALLOCATION: u64 = 16 * 1024 * 1024;

/// An opened OOXML package
pub struct OoxmlPackage {
    path: PathBuf,
    archive: ZipArchive<File>,
    content_types: ContentTypes,
}

impl OoxmlPackage {
    /// Open a package, failing with `CorruptDocument` if it is not a zip
    pub fn open(path: &Path) -> ExtractResult<Self> {
        let file = File::open(path)?;

        let mut archive = match ZipArchive::new(file) {
            Ok(archive) => archive,
            Err(zip::result::ZipError::Io(e)) => return Err(ExtractError::IoError(e)),
            Err(e) => return Err(ExtractError::corrupt(path, format!("not a valid OOXML package: {}", e))),
        };

        let content_types = match read_entry(&mut archive, "[Content_Types].xml")? {
            Some(xml) => ContentTypes::parse(&xml).map_err(|e| ExtractError::corrupt(path, e))?,
            None => {
                debug!("{} has no [Content_Types].xml part", path.display());
                ContentTypes::default()
            }
        };

        Ok(OoxmlPackage {
            path: path.to_path_buf(),
            archive,
            content_types,
        })
    }

    /// Path of the package on disk
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Names of all file entries, in archive order
    pub fn part_names(&mut self) -> ExtractResult<Vec<String>> {
        let mut names = Vec::with_capacity(self.archive.len());
        for i in 0..self.archive.len() {
            let entry = self.archive.by_index(i)?;
            if !entry.is_dir() {
                names.push(entry.name().to_string());
            }
        }
        Ok(names)
    }

    /// Read a part by name, `None` if it does not exist
    pub fn read_part(&mut self, name: &str) -> ExtractResult<Option<Vec<u8>>> {
        read_entry(&mut self.archive, name)
    }

    /// Read a part that must exist
    pub fn require_part(&mut self, name: &str) -> ExtractResult<Vec<u8>> {
        match self.read_part(name)? {
            Some(data) => Ok(data),
            None => Err(ExtractError::corrupt(&self.path, format!("missing part {}", name))),
        }
    }

    /// Relationships of a part, in document order (empty if none)
    pub fn relationships(&mut self, part_name: &str) -> ExtractResult<Vec<Relationship>> {
        let rels_name = rels_path_for(part_name);
        match self.read_part(&rels_name)? {
            Some(xml) => parse_relationships(&xml).map_err(|e| ExtractError::corrupt(&self.path, e)),
            None => Ok(Vec::new()),
        }
    }

    /// Image kind the package declares for a part
    pub fn image_hint(&self, part_name: &str) -> Option<ImageKind> {
        self.content_types
            .content_type_of(part_name)
            .and_then(ImageKind::from_mime)
            .or_else(|| part_extension(part_name).and_then(ImageKind::from_extension))
    }
}

fn read_entry(archive: &mut ZipArchive<File>, name: &str) -> ExtractResult<Option<Vec<u8>>> {
    let mut entry = match archive.by_name(name) {
        Ok(entry) => entry,
        Err(zip::result::ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let mut data = Vec::with_capacity(initial_capacity(entry.size()));
    entry.read_to_end(&mut data)?;
    Ok(Some(data))
}

fn initial_capacity(declared_size: u64) -> usize {
    usize::try_from(declared_size.min(MAX_PREALLOCATION)).unwrap_or(0)
}

/// One entry of a `.rels` part
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub id: String,
    pub rel_type: String,
    pub target: String,
    pub external: bool,
}

impl Relationship {
    /// Whether the relationship type ends with the given suffix
    pub fn is_type(&self, suffix: &str) -> bool {
        self.rel_type.ends_with(suffix)
    }
}

/// Error raised while reading package XML
#[derive(Debug)]
pub struct XmlError(String);

impl fmt::Display for XmlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "malformed package XML: {}", self.0)
    }
}

pub fn xml_error(e: impl fmt::Display) -> XmlError {
    XmlError(e.to_string())
}

/// Read the attributes of an element into (qualified name, value) pairs
pub fn element_attributes(element: &BytesStart<'_>) -> Result<Vec<(String, String)>, XmlError> {
    let mut attributes = Vec::new();
    for attr in element.attributes() {
        let attr = attr.map_err(xml_error)?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value().map_err(xml_error)?.into_owned();
        attributes.push((key, value));
    }
    Ok(attributes)
}

/// Find an attribute by exact qualified name, then by local name
pub fn attribute<'a>(attributes: &'a [(String, String)], name: &str) -> Option<&'a str> {
    attributes
        .iter()
        .find(|(key, _)| key == name)
        .or_else(|| attributes.iter().find(|(key, _)| local_part(key) == name))
        .map(|(_, value)| value.as_str())
}

/// Find a namespace-prefixed attribute by local name (e.g. `r:id`)
pub fn prefixed_attribute<'a>(attributes: &'a [(String, String)], local: &str) -> Option<&'a str> {
    attributes
        .iter()
        .find(|(key, _)| key.contains(':') && local_part(key) == local)
        .map(|(_, value)| value.as_str())
}

fn local_part(name: &str) -> &str {
    name.rsplit(':').next().unwrap_or(name)
}

/// Parse a `.rels` part
pub fn parse_relationships(xml: &[u8]) -> Result<Vec<Relationship>, XmlError> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut relationships = Vec::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf).map_err(xml_error)? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"Relationship" => {
                let attributes = element_attributes(&e)?;
                if let (Some(id), Some(rel_type), Some(target)) = (
                    attribute(&attributes, "Id"),
                    attribute(&attributes, "Type"),
                    attribute(&attributes, "Target"),
                ) {
                    relationships.push(Relationship {
                        id: id.to_string(),
                        rel_type: rel_type.to_string(),
                        target: target.to_string(),
                        external: attribute(&attributes, "TargetMode") == Some("External"),
                    });
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(relationships)
}

/// Content types declared in `[Content_Types].xml`
#[derive(Debug, Default)]
pub struct ContentTypes {
    // Lower-case extension to content type
    defaults: HashMap<String, String>,
    // Part name (without leading slash) to content type
    overrides: HashMap<String, String>,
}

impl ContentTypes {
    pub fn parse(xml: &[u8]) -> Result<Self, XmlError> {
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);

        let mut types = ContentTypes::default();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf).map_err(xml_error)? {
                Event::Start(e) | Event::Empty(e) => {
                    let attributes = element_attributes(&e)?;
                    let content_type = attribute(&attributes, "ContentType");
                    match (e.local_name().as_ref(), content_type) {
                        (b"Default", Some(ct)) => {
                            if let Some(ext) = attribute(&attributes, "Extension") {
                                types.defaults.insert(ext.to_ascii_lowercase(), ct.to_string());
                            }
                        }
                        (b"Override", Some(ct)) => {
                            if let Some(part) = attribute(&attributes, "PartName") {
                                types.overrides.insert(part.trim_start_matches('/').to_string(), ct.to_string());
                            }
                        }
                        _ => {}
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(types)
    }

    /// Content type of a part, by override first and extension second
    pub fn content_type_of(&self, part_name: &str) -> Option<&str> {
        let part_name = part_name.trim_start_matches('/');
        self.overrides
            .get(part_name)
            .or_else(|| {
                part_extension(part_name).and_then(|ext| self.defaults.get(&ext.to_ascii_lowercase()))
            })
            .map(String::as_str)
    }
}

fn part_extension(part_name: &str) -> Option<&str> {
    let file_name = part_name.rsplit('/').next()?;
    match file_name.rfind('.') {
        Some(idx) if idx + 1 < file_name.len() => Some(&file_name[idx + 1..]),
        _ => None,
    }
}

/// Name of the `.rels` part describing `part_name`
pub fn rels_path_for(part_name: &str) -> String {
    let part_name = part_name.trim_start_matches('/');
    match part_name.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", part_name),
    }
}

/// Resolve a relationship target relative to its source part
///
/// Absolute targets (leading `/`) are package-rooted. `.` and `..`
/// segments are collapsed; `..` never climbs above the package root.
pub fn resolve_target(source_part: &str, target: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();

    if !target.starts_with('/') {
        if let Some((dir, _)) = source_part.trim_start_matches('/').rsplit_once('/') {
            segments.extend(dir.split('/').filter(|s| !s.is_empty()));
        }
    }

    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    segments.join("/")
}
