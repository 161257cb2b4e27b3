//! PPTX package reader producing a [`Deck`].

use crate::package::{
    attribute, extract_slide_number, local_name, relationship_id, Package, Relationship,
    REL_NOTES_SLIDE, REL_SLIDE, REL_SLIDE_LAYOUT, REL_SLIDE_MASTER, REL_THEME,
};
use crate::shapes::{parse_shape_tree, ShapeTree};
use deckcheck_core::types::{ColorScheme, Deck, Rgb, Slide, ThemeColor};
use deckcheck_core::{Error, Result};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

const PRESENTATION_PART: &str = "ppt/presentation.xml";
const DEFAULT_THEME_PART: &str = "ppt/theme/theme1.xml";

/// Parser for PPTX (Office Open XML) files.
pub struct PptxParser;

impl PptxParser {
    /// Create a new PPTX parser.
    pub fn new() -> Self {
        Self
    }

    /// Open and parse a `.pptx` file. Other extensions are rejected.
    pub fn parse_file(&self, path: &Path) -> Result<Deck> {
        let is_pptx = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pptx"));
        if !is_pptx {
            return Err(Error::UnsupportedFormat(format!(
                "{} (only .pptx files are supported)",
                path.display()
            )));
        }

        let file = File::open(path)?;
        self.parse(BufReader::new(file))
    }

    /// Parse a PPTX package from a reader.
    pub fn parse<R: Read + Seek>(&self, reader: R) -> Result<Deck> {
        let mut package = Package::open(reader)?;

        let xml = package.read_part(PRESENTATION_PART)?;
        let info = parse_presentation(&xml)?;
        let rels = package.relationships(PRESENTATION_PART)?;

        let mut deck = Deck::new(info.width, info.height);
        deck.first_slide_number = info.first_slide_number;
        deck.color_scheme = self.load_color_scheme(&mut package, &rels)?;

        let mut templates = TemplateCache::default();
        for (index, part) in slide_order(&info.slide_ids, &rels).iter().enumerate() {
            log::debug!("Parsing slide {} from {}", index + 1, part);
            let slide = self.parse_slide(&mut package, &mut templates, part)?;
            deck.add_slide(slide);
        }

        log::debug!(
            "Parsed {} slides ({}x{} EMU)",
            deck.slides.len(),
            deck.width,
            deck.height
        );
        Ok(deck)
    }

    /// Read the theme color scheme, falling back to the default palette.
    fn load_color_scheme<R: Read + Seek>(
        &self,
        package: &mut Package<R>,
        rels: &[Relationship],
    ) -> Result<ColorScheme> {
        let part = rels
            .iter()
            .find(|rel| rel.is(REL_THEME))
            .map(|rel| rel.target.as_str())
            .unwrap_or(DEFAULT_THEME_PART);

        match package.read_optional_part(part)? {
            Some(xml) => parse_color_scheme(&xml),
            None => {
                log::warn!("No theme found at {}, using the default color scheme", part);
                Ok(ColorScheme::default())
            }
        }
    }

    fn parse_slide<R: Read + Seek>(
        &self,
        package: &mut Package<R>,
        templates: &mut TemplateCache,
        part: &str,
    ) -> Result<Slide> {
        let xml = package.read_part(part)?;
        let tree = parse_shape_tree(&xml)?;
        let rels = package.relationships(part)?;

        let layout_part = rels
            .iter()
            .find(|rel| rel.is(REL_SLIDE_LAYOUT))
            .map(|rel| rel.target.clone());
        let master_part = match &layout_part {
            Some(layout) => templates.master_of(package, layout)?,
            None => None,
        };
        templates.load(package, layout_part.as_deref())?;
        templates.load(package, master_part.as_deref())?;
        let layout = templates.get(layout_part.as_deref());
        let master = templates.get(master_part.as_deref());

        let mut slide = Slide::new();
        slide.background = tree
            .background
            .or_else(|| layout.and_then(|t| t.background))
            .or_else(|| master.and_then(|t| t.background));

        for parsed in tree.shapes {
            let mut shape = parsed.shape;
            if let Some(ph) = &parsed.placeholder {
                if !parsed.has_transform {
                    if let Some(geometry) = layout
                        .and_then(|t| t.placeholder_geometry(ph, true))
                        .or_else(|| master.and_then(|t| t.placeholder_geometry(ph, false)))
                    {
                        shape.geometry = geometry;
                    }
                }
                if ph.is_title() && slide.title.is_none() {
                    slide.title = Some(shape.text());
                }
            }
            slide.shapes.push(shape);
        }

        if let Some(notes_part) = rels.iter().find(|rel| rel.is(REL_NOTES_SLIDE)) {
            slide.notes = self.parse_notes(package, &notes_part.target)?;
        }

        Ok(slide)
    }

    /// Text of the body placeholder of a notes page.
    fn parse_notes<R: Read + Seek>(
        &self,
        package: &mut Package<R>,
        part: &str,
    ) -> Result<Option<String>> {
        let Some(xml) = package.read_optional_part(part)? else {
            log::warn!("Notes part {} is missing", part);
            return Ok(None);
        };
        let tree = parse_shape_tree(&xml)?;
        Ok(tree.find_placeholder("body").map(|notes| notes.shape.text()))
    }
}

impl Default for PptxParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Parsed layouts and masters, keyed by part name.
#[derive(Default)]
struct TemplateCache {
    trees: HashMap<String, Option<ShapeTree>>,
    masters: HashMap<String, Option<String>>,
}

impl TemplateCache {
    /// Master part of a layout.
    fn master_of<R: Read + Seek>(
        &mut self,
        package: &mut Package<R>,
        layout: &str,
    ) -> Result<Option<String>> {
        if let Some(master) = self.masters.get(layout) {
            return Ok(master.clone());
        }
        let master = package.related_part(layout, REL_SLIDE_MASTER)?;
        self.masters.insert(layout.to_string(), master.clone());
        Ok(master)
    }

    /// Parse a template part unless it is already cached.
    fn load<R: Read + Seek>(&mut self, package: &mut Package<R>, part: Option<&str>) -> Result<()> {
        let Some(part) = part else {
            return Ok(());
        };
        if self.trees.contains_key(part) {
            return Ok(());
        }
        let tree = match package.read_optional_part(part)? {
            Some(xml) => Some(parse_shape_tree(&xml)?),
            None => {
                log::warn!("Template part {} is missing", part);
                None
            }
        };
        self.trees.insert(part.to_string(), tree);
        Ok(())
    }

    fn get(&self, part: Option<&str>) -> Option<&ShapeTree> {
        self.trees.get(part?).and_then(Option::as_ref)
    }
}

/// Deck-level settings from `presentation.xml`.
#[derive(Debug, Clone, PartialEq)]
struct PresentationInfo {
    width: i64,
    height: i64,
    first_slide_number: usize,
    /// Relationship ids of the slides, in show order.
    slide_ids: Vec<String>,
}

fn parse_presentation(xml: &str) -> Result<PresentationInfo> {
    let mut info = PresentationInfo {
        width: Deck::DEFAULT_WIDTH,
        height: Deck::DEFAULT_HEIGHT,
        first_slide_number: 1,
        slide_ids: Vec::new(),
    };

    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => match local_name(e.name().as_ref()) {
                b"presentation" => {
                    if let Some(n) = attribute(e, b"firstSlideNum").and_then(|v| v.parse().ok()) {
                        info.first_slide_number = n;
                    }
                }
                b"sldSz" => {
                    if let Some(cx) = attribute(e, b"cx").and_then(|v| v.parse().ok()) {
                        info.width = cx;
                    }
                    if let Some(cy) = attribute(e, b"cy").and_then(|v| v.parse().ok()) {
                        info.height = cy;
                    }
                }
                b"sldId" => {
                    if let Some(id) = relationship_id(e) {
                        info.slide_ids.push(id);
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!(
                    "Error parsing presentation.xml: {}",
                    e
                )));
            }
            _ => {}
        }
    }

    Ok(info)
}

/// Slide part names in show order.
///
/// Follows `sldIdLst`; without one, slide relationships are ordered by the
/// number in their id or file name.
fn slide_order(slide_ids: &[String], rels: &[Relationship]) -> Vec<String> {
    let slides: Vec<&Relationship> = rels.iter().filter(|rel| rel.is(REL_SLIDE)).collect();

    if !slide_ids.is_empty() {
        return slide_ids
            .iter()
            .filter_map(|id| match slides.iter().find(|rel| &rel.id == id) {
                Some(rel) => Some(rel.target.clone()),
                None => {
                    log::warn!("Slide relationship {} not found", id);
                    None
                }
            })
            .collect();
    }

    let mut numbered: Vec<(Option<usize>, &str)> = slides
        .iter()
        .map(|rel| {
            let n = extract_slide_number(&rel.id).or_else(|| extract_slide_number(&rel.target));
            (n, rel.target.as_str())
        })
        .collect();
    numbered.sort_by(|a, b| match (a.0, b.0) {
        (Some(na), Some(nb)) => na.cmp(&nb),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.1.cmp(b.1),
    });
    numbered.into_iter().map(|(_, part)| part.to_string()).collect()
}

/// Read `a:clrScheme` from a theme part. Roles it leaves out keep their
/// default color.
fn parse_color_scheme(xml: &str) -> Result<ColorScheme> {
    let mut scheme = ColorScheme::default();
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut in_scheme = false;
    let mut role: Option<ThemeColor> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                let name = String::from_utf8_lossy(local_name(e.name().as_ref())).to_string();
                match name.as_str() {
                    "clrScheme" => in_scheme = true,
                    "srgbClr" | "sysClr" if in_scheme => {
                        let value = if name == "srgbClr" {
                            attribute(e, b"val")
                        } else {
                            attribute(e, b"lastClr")
                        };
                        if let (Some(role), Some(rgb)) = (role, value.and_then(|v| Rgb::from_hex(&v))) {
                            scheme.set(role, rgb);
                        }
                    }
                    other if in_scheme => {
                        if let Some(color) = ThemeColor::from_scheme_name(other) {
                            role = Some(color);
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::End(ref e)) if local_name(e.name().as_ref()) == b"clrScheme" => break,
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!("Error parsing theme: {}", e)));
            }
            _ => {}
        }
    }

    Ok(scheme)
}

#[cfg(test)]
mod tests {
    use super::*;
    use deckcheck_core::types::{ColorRef, Fill, Geometry, ShapeKind};
    use std::io::{Cursor, Write};
    use zip::write::FileOptions;

    const NS: &str = r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships""#;
    const REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

    fn package(parts: &[(&str, String)]) -> Cursor<Vec<u8>> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, content) in parts {
            writer.start_file(*name, FileOptions::default()).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        let mut cursor = writer.finish().unwrap();
        cursor.set_position(0);
        cursor
    }

    fn rels(entries: &[(&str, &str, &str)]) -> String {
        let body: String = entries
            .iter()
            .map(|(id, kind, target)| {
                format!(
                    r#"<Relationship Id="{}" Type="{}/{}" Target="{}"/>"#,
                    id, REL, kind, target
                )
            })
            .collect();
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{}</Relationships>"#,
            body
        )
    }

    fn part(root: &str, tree: &str) -> String {
        format!(r#"<p:{root} {NS}><p:cSld>{tree}</p:cSld></p:{root}>"#)
    }

    fn text_shape(id: u32, ph: &str, xfrm: &str, text: &str) -> String {
        format!(
            r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="Shape {id}"/><p:cNvSpPr/><p:nvPr>{ph}</p:nvPr></p:nvSpPr><p:spPr>{xfrm}</p:spPr><p:txBody><a:bodyPr/><a:p><a:r><a:rPr sz="2400"/><a:t>{text}</a:t></a:r></a:p></p:txBody></p:sp>"#
        )
    }

    fn xfrm(x: i64, y: i64, cx: i64, cy: i64) -> String {
        format!(r#"<a:xfrm><a:off x="{x}" y="{y}"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm>"#)
    }

    fn sample_deck() -> Cursor<Vec<u8>> {
        let presentation = format!(
            r#"<p:presentation {NS} firstSlideNum="0"><p:sldIdLst><p:sldId id="257" r:id="rId3"/><p:sldId id="256" r:id="rId2"/></p:sldIdLst><p:sldSz cx="9144000" cy="6858000"/></p:presentation>"#
        );
        let theme = format!(
            r#"<a:theme {NS} name="Office"><a:themeElements><a:clrScheme name="Custom"><a:dk1><a:sysClr val="windowText" lastClr="111111"/></a:dk1><a:lt1><a:sysClr val="window" lastClr="FFFFFF"/></a:lt1><a:accent1><a:srgbClr val="C00000"/></a:accent1></a:clrScheme></a:themeElements></a:theme>"#
        );
        let master = part(
            "sldMaster",
            &format!(
                r#"<p:bg><p:bgPr><a:solidFill><a:schemeClr val="bg1"/></a:solidFill></p:bgPr></p:bg><p:spTree>{}{}</p:spTree>"#,
                text_shape(2, r#"<p:ph type="title"/>"#, &xfrm(10, 20, 30, 40), "Master title"),
                text_shape(3, r#"<p:ph type="body" idx="1"/>"#, &xfrm(50, 60, 70, 80), "Master body"),
            ),
        );
        let layout = part(
            "sldLayout",
            &format!(
                "<p:spTree>{}</p:spTree>",
                text_shape(2, r#"<p:ph type="title"/>"#, &xfrm(11, 21, 31, 41), "Layout title")
            ),
        );
        let slide1 = part(
            "sld",
            &format!(
                "<p:spTree>{}{}</p:spTree>",
                text_shape(2, r#"<p:ph type="title"/>"#, "", "Introduction"),
                text_shape(3, r#"<p:ph idx="1"/>"#, "", "Why it matters"),
            ),
        );
        let slide2 = part(
            "sld",
            &format!(
                r#"<p:bg><p:bgPr><a:solidFill><a:srgbClr val="000000"/></a:solidFill></p:bgPr></p:bg><p:spTree>{}</p:spTree>"#,
                text_shape(2, "", &xfrm(1, 2, 3, 4), "Plain text"),
            ),
        );
        let notes = part(
            "notes",
            &format!(
                "<p:spTree>{}{}</p:spTree>",
                text_shape(2, r#"<p:ph type="sldImg"/>"#, "", ""),
                text_shape(3, r#"<p:ph type="body" idx="1"/>"#, "", "Hello world. [pause]"),
            ),
        );

        package(&[
            ("ppt/presentation.xml", presentation),
            (
                "ppt/_rels/presentation.xml.rels",
                rels(&[
                    ("rId1", "slideMaster", "slideMasters/slideMaster1.xml"),
                    ("rId2", "slide", "slides/slide1.xml"),
                    ("rId3", "slide", "slides/slide2.xml"),
                    ("rId4", "theme", "theme/theme1.xml"),
                ]),
            ),
            ("ppt/theme/theme1.xml", theme),
            ("ppt/slideMasters/slideMaster1.xml", master),
            ("ppt/slideLayouts/slideLayout1.xml", layout),
            (
                "ppt/slideLayouts/_rels/slideLayout1.xml.rels",
                rels(&[("rId1", "slideMaster", "../slideMasters/slideMaster1.xml")]),
            ),
            ("ppt/slides/slide1.xml", slide1),
            (
                "ppt/slides/_rels/slide1.xml.rels",
                rels(&[
                    ("rId1", "slideLayout", "../slideLayouts/slideLayout1.xml"),
                    ("rId2", "notesSlide", "../notesSlides/notesSlide1.xml"),
                ]),
            ),
            ("ppt/slides/slide2.xml", slide2),
            (
                "ppt/slides/_rels/slide2.xml.rels",
                rels(&[("rId1", "slideLayout", "../slideLayouts/slideLayout1.xml")]),
            ),
            ("ppt/notesSlides/notesSlide1.xml", notes),
        ])
    }

    #[test]
    fn test_parse_deck() {
        let deck = PptxParser::new().parse(sample_deck()).unwrap();

        assert_eq!(deck.width, 9_144_000);
        assert_eq!(deck.height, 6_858_000);
        assert_eq!(deck.first_slide_number, 0);
        assert_eq!(deck.color_scheme.get(ThemeColor::Dark1), Some(Rgb::new(0x11, 0x11, 0x11)));
        assert_eq!(deck.color_scheme.get(ThemeColor::Accent1), Some(Rgb::new(0xC0, 0, 0)));
        // Not in the theme: default palette.
        assert!(deck.color_scheme.get(ThemeColor::Accent2).is_some());

        // sldIdLst order: rId3 (slide2.xml) first.
        assert_eq!(deck.slides.len(), 2);
        let first = &deck.slides[0];
        assert_eq!(first.title, None);
        assert_eq!(first.notes, None);
        assert_eq!(
            first.background,
            Some(Fill::Solid(ColorRef::Rgb(Rgb::BLACK)))
        );
        assert_eq!(first.shapes[0].kind, ShapeKind::AutoShape);
        assert_eq!(first.shapes[0].geometry, Geometry::new(1, 2, 3, 4));

        let second = &deck.slides[1];
        assert_eq!(second.title.as_deref(), Some("Introduction"));
        assert_eq!(second.notes.as_deref(), Some("Hello world. [pause]"));
        assert_eq!(
            second.background,
            Some(Fill::Solid(ColorRef::theme(ThemeColor::Light1)))
        );
        // Title geometry from the layout, body from the master.
        assert_eq!(second.shapes[0].kind, ShapeKind::Placeholder);
        assert_eq!(second.shapes[0].geometry, Geometry::new(11, 21, 31, 41));
        assert_eq!(second.shapes[1].geometry, Geometry::new(50, 60, 70, 80));
        let run = second.shapes[1].text_frame.as_ref().unwrap().text_runs().next().unwrap();
        assert_eq!(run.font_size, Some(24.0));
    }

    #[test]
    fn test_slide_order_without_id_list() {
        let rels = vec![
            Relationship {
                id: "rId10".into(),
                rel_type: format!("{}/slide", REL),
                target: "ppt/slides/slide10.xml".into(),
                external: false,
            },
            Relationship {
                id: "rId2".into(),
                rel_type: format!("{}/slide", REL),
                target: "ppt/slides/slide2.xml".into(),
                external: false,
            },
            Relationship {
                id: "rId1".into(),
                rel_type: format!("{}/slideMaster", REL),
                target: "ppt/slideMasters/slideMaster1.xml".into(),
                external: false,
            },
        ];
        assert_eq!(
            slide_order(&[], &rels),
            vec!["ppt/slides/slide2.xml", "ppt/slides/slide10.xml"]
        );
    }

    #[test]
    fn test_presentation_defaults() {
        let info = parse_presentation(&format!("<p:presentation {NS}/>")).unwrap();
        assert_eq!(info.width, Deck::DEFAULT_WIDTH);
        assert_eq!(info.height, Deck::DEFAULT_HEIGHT);
        assert_eq!(info.first_slide_number, 1);
        assert!(info.slide_ids.is_empty());
    }

    #[test]
    fn test_missing_theme_uses_default_scheme() {
        let presentation = format!("<p:presentation {NS}/>");
        let deck = PptxParser::new()
            .parse(package(&[("ppt/presentation.xml", presentation)]))
            .unwrap();
        assert_eq!(deck.color_scheme, ColorScheme::default());
        assert!(deck.slides.is_empty());
    }

    #[test]
    fn test_not_a_zip() {
        let err = PptxParser::new()
            .parse(Cursor::new(b"not a zip".to_vec()))
            .unwrap_err();
        assert!(matches!(err, Error::ZipError(_)));
    }

    #[test]
    fn test_missing_presentation_part() {
        let err = PptxParser::new()
            .parse(package(&[("docProps/app.xml", String::new())]))
            .unwrap_err();
        assert!(matches!(err, Error::MissingPart(_)));
    }

    #[test]
    fn test_rejects_other_extensions() {
        let err = PptxParser::new()
            .parse_file(Path::new("talk.ppt"))
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat(_)));
    }
}
