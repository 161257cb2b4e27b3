//! OPC package access: parts, relationships and part name resolution.

use deckcheck_core::{Error, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::io::{Read, Seek};
use zip::result::ZipError;
use zip::ZipArchive;

pub const REL_SLIDE: &str = "/slide";
pub const REL_SLIDE_LAYOUT: &str = "/slideLayout";
pub const REL_SLIDE_MASTER: &str = "/slideMaster";
pub const REL_NOTES_SLIDE: &str = "/notesSlide";
pub const REL_THEME: &str = "/theme";

/// A relationship from one part to another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub id: String,
    pub rel_type: String,
    /// Absolute part name of the target, without leading slash.
    pub target: String,
    pub external: bool,
}

impl Relationship {
    /// Whether the relationship type ends with `kind` (e.g. [`REL_SLIDE`]).
    pub fn is(&self, kind: &str) -> bool {
        !self.external && self.rel_type.ends_with(kind)
    }
}

/// A `.pptx` ZIP archive.
pub struct Package<R> {
    archive: ZipArchive<R>,
}

impl<R: Read + Seek> Package<R> {
    pub fn open(reader: R) -> Result<Self> {
        let archive = ZipArchive::new(reader)
            .map_err(|e| Error::ZipError(format!("Failed to open ZIP: {}", e)))?;
        Ok(Self { archive })
    }

    /// Read a part as text.
    pub fn read_part(&mut self, path: &str) -> Result<String> {
        let mut file = match self.archive.by_name(path) {
            Ok(file) => file,
            Err(ZipError::FileNotFound) => return Err(Error::MissingPart(path.to_string())),
            Err(e) => {
                return Err(Error::ZipError(format!(
                    "Failed to open '{}' in archive: {}",
                    path, e
                )))
            }
        };

        let mut content = String::new();
        file.read_to_string(&mut content)
            .map_err(|e| Error::ZipError(format!("Failed to read '{}': {}", path, e)))?;

        Ok(content)
    }

    /// Read a part that may be absent.
    pub fn read_optional_part(&mut self, path: &str) -> Result<Option<String>> {
        match self.read_part(path) {
            Ok(content) => Ok(Some(content)),
            Err(Error::MissingPart(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Relationships of `part`; empty when the part has none.
    pub fn relationships(&mut self, part: &str) -> Result<Vec<Relationship>> {
        match self.read_optional_part(&rels_path(part))? {
            Some(xml) => parse_relationships(&xml, part),
            None => Ok(Vec::new()),
        }
    }

    /// Target of the first relationship of `kind` from `part`.
    pub fn related_part(&mut self, part: &str, kind: &str) -> Result<Option<String>> {
        Ok(self
            .relationships(part)?
            .into_iter()
            .find(|rel| rel.is(kind))
            .map(|rel| rel.target))
    }
}

/// Parse a `.rels` part. Targets are resolved against `source`.
pub fn parse_relationships(xml: &str, source: &str) -> Result<Vec<Relationship>> {
    let mut relationships = Vec::new();
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if local_name(e.name().as_ref()) == b"Relationship" =>
            {
                let external = attribute(e, b"TargetMode").as_deref() == Some("External");
                let target = attribute(e, b"Target").unwrap_or_default();
                relationships.push(Relationship {
                    id: attribute(e, b"Id").unwrap_or_default(),
                    rel_type: attribute(e, b"Type").unwrap_or_default(),
                    target: if external {
                        target
                    } else {
                        resolve_target(source, &target)
                    },
                    external,
                });
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!(
                    "Error parsing relationships of '{}': {}",
                    source, e
                )));
            }
            _ => {}
        }
    }

    Ok(relationships)
}

/// Name of the relationships part belonging to `part`.
pub fn rels_path(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", part),
    }
}

/// Resolve a relationship target relative to the part that holds it.
pub fn resolve_target(source: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }

    let mut segments: Vec<&str> = match source.rsplit_once('/') {
        Some((dir, _)) => dir.split('/').collect(),
        None => Vec::new(),
    };
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

/// Extract the local name from a potentially namespaced XML element name.
pub fn local_name(name: &[u8]) -> &[u8] {
    if let Some(pos) = name.iter().position(|&b| b == b':') {
        &name[pos + 1..]
    } else {
        name
    }
}

/// Value of an unprefixed attribute.
pub fn attribute(e: &BytesStart<'_>, name: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == name)
        .map(|attr| String::from_utf8_lossy(&attr.value).to_string())
}

/// Value of a namespaced `r:id` attribute, whatever its prefix.
pub fn relationship_id(e: &BytesStart<'_>) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| {
            let key = attr.key.as_ref();
            key.contains(&b':') && local_name(key) == b"id"
        })
        .map(|attr| String::from_utf8_lossy(&attr.value).to_string())
}

/// Extract a slide number from a string like "rId2" or "slide3.xml".
pub fn extract_slide_number(s: &str) -> Option<usize> {
    let s = s.trim_end_matches(".xml").trim_end_matches(".rels");

    let digits: String = s.chars().rev().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    let digits: String = digits.chars().rev().collect();
    digits.parse().ok()
}
