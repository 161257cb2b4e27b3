//! Shape-tree parsing shared by slides, layouts, masters and notes pages.
//!
//! Only top-level shapes of `p:spTree` are produced. A group becomes one
//! shape of kind [`ShapeKind::Other`]; its children are not descended into.

use crate::package::{attribute, local_name};
use deckcheck_core::types::{
    ColorRef, Fill, Geometry, Paragraph, Rgb, Shape, ShapeKind, TextFrame, TextRun, ThemeColor,
    EMU_PER_POINT,
};
use deckcheck_core::{Error, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

const CHART_URI: &str = "drawingml/2006/chart";
const TABLE_URI: &str = "drawingml/2006/table";

/// A placeholder reference (`p:ph`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    /// Placeholder type; `obj` when the document omits it.
    pub kind: String,
    pub idx: Option<u32>,
}

impl Placeholder {
    pub fn is_title(&self) -> bool {
        matches!(self.kind.as_str(), "title" | "ctrTitle")
    }

    /// The type a master uses for the same slot.
    fn master_kind(&self) -> &str {
        match self.kind.as_str() {
            "ctrTitle" => "title",
            "subTitle" | "obj" => "body",
            other => other,
        }
    }
}

/// A shape together with the data needed to resolve inheritance.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedShape {
    pub shape: Shape,
    pub placeholder: Option<Placeholder>,
    /// Whether the shape carries its own transform.
    pub has_transform: bool,
}

/// Shapes and background of one part.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShapeTree {
    pub shapes: Vec<ParsedShape>,
    pub background: Option<Fill>,
}

impl ShapeTree {
    /// Geometry of the placeholder filling the same slot as `ph`.
    ///
    /// Layouts are matched on `idx` first; masters only by type.
    pub fn placeholder_geometry(&self, ph: &Placeholder, match_idx: bool) -> Option<Geometry> {
        let candidates = || {
            self.shapes
                .iter()
                .filter(|s| s.has_transform)
                .filter_map(|s| s.placeholder.as_ref().map(|p| (p, s.shape.geometry)))
        };

        let by_idx = if match_idx && ph.idx.is_some() {
            candidates().find(|(p, _)| p.idx == ph.idx)
        } else {
            None
        };
        by_idx
            .or_else(|| candidates().find(|(p, _)| p.master_kind() == ph.master_kind()))
            .map(|(_, geometry)| geometry)
    }

    /// First placeholder of the given type.
    pub fn find_placeholder(&self, kind: &str) -> Option<&ParsedShape> {
        self.shapes
            .iter()
            .find(|s| s.placeholder.as_ref().is_some_and(|p| p.kind == kind))
    }
}

/// Parse the shape tree and background of a slide-like part.
pub fn parse_shape_tree(xml: &str) -> Result<ShapeTree> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(false);

    let mut parser = TreeParser::default();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => parser.start(e),
            Ok(Event::Empty(ref e)) => {
                parser.start(e);
                parser.end();
            }
            Ok(Event::End(_)) => parser.end(),
            Ok(Event::Text(ref e)) => {
                let text = e.unescape().unwrap_or_default();
                parser.text(&text);
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!(
                    "Error at position {}: {}",
                    reader.buffer_position(),
                    e
                )));
            }
            _ => {}
        }
    }

    Ok(parser.tree)
}

/// Where a `solidFill` being read ends up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColorTarget {
    ShapeFill,
    RunColor,
    Background,
}

/// Accumulates a DrawingML color element and its modifiers.
#[derive(Debug, Default)]
struct ColorParser {
    base: Option<ColorBase>,
    lum_mod: Option<f64>,
    lum_off: Option<f64>,
}

#[derive(Debug)]
enum ColorBase {
    Rgb(Rgb),
    Theme(ThemeColor),
    Unknown,
}

impl ColorParser {
    fn element(&mut self, name: &str, e: &BytesStart<'_>) {
        match name {
            "srgbClr" => {
                self.base = Some(
                    attribute(e, b"val")
                        .and_then(|v| Rgb::from_hex(&v))
                        .map_or(ColorBase::Unknown, ColorBase::Rgb),
                );
            }
            "sysClr" => {
                self.base = Some(
                    attribute(e, b"lastClr")
                        .and_then(|v| Rgb::from_hex(&v))
                        .map_or(ColorBase::Unknown, ColorBase::Rgb),
                );
            }
            "schemeClr" => {
                self.base = Some(
                    attribute(e, b"val")
                        .and_then(|v| ThemeColor::from_scheme_name(&v))
                        .map_or(ColorBase::Unknown, ColorBase::Theme),
                );
            }
            "prstClr" | "hslClr" | "scrgbClr" => self.base = Some(ColorBase::Unknown),
            "lumMod" => self.lum_mod = percentage(e),
            "lumOff" => self.lum_off = percentage(e),
            _ => {}
        }
    }

    /// Brightness in [-1, 1]: `lumOff` lightens, `lumMod` alone darkens.
    fn brightness(&self) -> f64 {
        let brightness = match (self.lum_mod, self.lum_off) {
            (_, Some(off)) if off > 0.0 => off,
            (Some(modulation), _) => modulation - 1.0,
            _ => 0.0,
        };
        brightness.clamp(-1.0, 1.0)
    }

    fn finish(self) -> Option<ColorRef> {
        let brightness = self.brightness();
        match self.base? {
            ColorBase::Rgb(rgb) => Some(ColorRef::Rgb(rgb)),
            ColorBase::Theme(color) => Some(ColorRef::Theme { color, brightness }),
            ColorBase::Unknown => None,
        }
    }
}

fn percentage(e: &BytesStart<'_>) -> Option<f64> {
    attribute(e, b"val")?
        .parse::<f64>()
        .ok()
        .map(|v| v / 100_000.0)
}

fn emu(e: &BytesStart<'_>, name: &[u8]) -> i64 {
    attribute(e, name)
        .and_then(|v| v.parse().ok())
        .unwrap_or(0)
}

/// A shape being read.
#[derive(Debug)]
struct ShapeBuilder {
    /// Stack depth of the shape element.
    depth: usize,
    element: String,
    name: String,
    geometry: Geometry,
    has_transform: bool,
    placeholder: Option<Placeholder>,
    text_box: bool,
    preset: Option<String>,
    fill: Option<Fill>,
    line_width: Option<f64>,
    graphic: Option<ShapeKind>,
    paragraphs: Option<Vec<Paragraph>>,
    run: Option<TextRun>,
}

impl ShapeBuilder {
    fn new(element: &str, depth: usize) -> Self {
        Self {
            depth,
            element: element.to_string(),
            name: String::new(),
            geometry: Geometry::default(),
            has_transform: false,
            placeholder: None,
            text_box: false,
            preset: None,
            fill: None,
            line_width: None,
            graphic: None,
            paragraphs: None,
            run: None,
        }
    }

    fn current_paragraph(&mut self) -> Option<&mut Paragraph> {
        self.paragraphs.as_mut().and_then(|p| p.last_mut())
    }

    fn finish(self) -> ParsedShape {
        let kind = match self.element.as_str() {
            "sp" if self.placeholder.is_some() => ShapeKind::Placeholder,
            "sp" if self.text_box => ShapeKind::TextBox,
            "sp" if self.preset.as_deref() == Some("line") => ShapeKind::Line,
            "sp" => ShapeKind::AutoShape,
            "cxnSp" => ShapeKind::Line,
            "pic" => ShapeKind::Picture,
            "graphicFrame" => self.graphic.unwrap_or(ShapeKind::Other),
            _ => ShapeKind::Other,
        };

        let mut shape = Shape::new(kind, self.geometry).with_name(self.name);
        if self.element == "sp" {
            shape.fill = Some(self.fill.unwrap_or(Fill::Other));
            shape.text_frame = self.paragraphs.map(|paragraphs| TextFrame { paragraphs });
        }
        if kind == ShapeKind::AutoShape {
            shape.auto_shape = self.preset;
        }
        if kind == ShapeKind::Line {
            shape.line_width = self.line_width;
        }

        ParsedShape {
            shape,
            placeholder: self.placeholder,
            has_transform: self.has_transform,
        }
    }
}

#[derive(Default)]
struct TreeParser {
    stack: Vec<String>,
    current: Option<ShapeBuilder>,
    /// Open `solidFill`: its stack depth, target and accumulated color.
    color: Option<(usize, ColorTarget, ColorParser)>,
    tree: ShapeTree,
}

impl TreeParser {
    fn start(&mut self, e: &BytesStart<'_>) {
        let name = String::from_utf8_lossy(local_name(e.name().as_ref())).to_string();
        let depth = self.stack.len();

        if let Some((_, _, color)) = &mut self.color {
            color.element(&name, e);
        }

        match &mut self.current {
            None => self.start_outside_shape(&name, depth),
            Some(builder) => {
                let path: Vec<&str> = self.stack[builder.depth + 1..]
                    .iter()
                    .map(String::as_str)
                    .chain(std::iter::once(name.as_str()))
                    .collect();
                if let Some(target) = start_in_shape(builder, &path, e) {
                    self.color = Some((depth, target, ColorParser::default()));
                }
            }
        }

        self.stack.push(name);
    }

    fn start_outside_shape(&mut self, name: &str, depth: usize) {
        let parent = self.stack.last().map(String::as_str);
        if parent == Some("spTree")
            && matches!(name, "sp" | "cxnSp" | "pic" | "graphicFrame" | "grpSp")
        {
            self.current = Some(ShapeBuilder::new(name, depth));
            return;
        }

        let in_bg_pr = depth >= 2 && self.stack[depth - 2] == "bg" && self.stack[depth - 1] == "bgPr";
        if in_bg_pr {
            match name {
                "solidFill" => self.color = Some((depth, ColorTarget::Background, ColorParser::default())),
                "noFill" => self.tree.background = Some(Fill::NoFill),
                "gradFill" | "pattFill" | "blipFill" => self.tree.background = Some(Fill::Other),
                _ => {}
            }
        } else if name == "bgRef" && parent == Some("bg") {
            self.tree.background = Some(Fill::Other);
        }
    }

    fn end(&mut self) {
        let path_len = self.stack.len();

        if self.color.as_ref().is_some_and(|(depth, _, _)| depth + 1 == path_len) {
            if let Some((_, target, color)) = self.color.take() {
                self.finish_color(target, color.finish());
            }
        }

        if let Some(builder) = &mut self.current {
            if builder.depth + 1 == path_len {
                if let Some(builder) = self.current.take() {
                    self.tree.shapes.push(builder.finish());
                }
            } else {
                let path: Vec<&str> = self.stack[builder.depth + 1..]
                    .iter()
                    .map(String::as_str)
                    .collect();
                if matches!(path.as_slice(), ["txBody", "p", "r" | "fld"]) {
                    if let Some(run) = builder.run.take() {
                        if let Some(paragraph) = builder.current_paragraph() {
                            paragraph.runs.push(run);
                        }
                    }
                }
            }
        }

        self.stack.pop();
    }

    fn text(&mut self, text: &str) {
        let Some(builder) = &mut self.current else {
            return;
        };
        let in_run_text = self.stack.len() == builder.depth + 5
            && self.stack[builder.depth + 1] == "txBody"
            && self.stack.last().is_some_and(|n| n == "t");
        if in_run_text {
            if let Some(run) = &mut builder.run {
                run.text.push_str(text);
            }
        }
    }

    fn finish_color(&mut self, target: ColorTarget, color: Option<ColorRef>) {
        match target {
            ColorTarget::Background => {
                self.tree.background = Some(color.map_or(Fill::Other, Fill::Solid));
            }
            ColorTarget::ShapeFill => {
                if let Some(builder) = &mut self.current {
                    builder.fill = Some(color.map_or(Fill::Other, Fill::Solid));
                }
            }
            ColorTarget::RunColor => {
                if let Some(run) = self.current.as_mut().and_then(|b| b.run.as_mut()) {
                    run.color = color.unwrap_or(ColorRef::Unspecified);
                }
            }
        }
    }
}

/// Handle an element inside a shape. `path` runs from the shape's child
/// down to the element itself. Returns a color target when a fill starts.
fn start_in_shape(
    builder: &mut ShapeBuilder,
    path: &[&str],
    e: &BytesStart<'_>,
) -> Option<ColorTarget> {
    match path {
        [_, "cNvPr"] => builder.name = attribute(e, b"name").unwrap_or_default(),
        [_, "cNvSpPr"] => builder.text_box = attribute(e, b"txBox").as_deref() == Some("1"),
        [_, "nvPr", "ph"] => {
            builder.placeholder = Some(Placeholder {
                kind: attribute(e, b"type").unwrap_or_else(|| "obj".to_string()),
                idx: attribute(e, b"idx").and_then(|v| v.parse().ok()),
            });
        }
        ["spPr" | "grpSpPr", "xfrm", "off"] | ["xfrm", "off"] => {
            builder.geometry.left = emu(e, b"x");
            builder.geometry.top = emu(e, b"y");
            builder.has_transform = true;
        }
        ["spPr" | "grpSpPr", "xfrm", "ext"] | ["xfrm", "ext"] => {
            builder.geometry.width = emu(e, b"cx");
            builder.geometry.height = emu(e, b"cy");
        }
        ["spPr", "prstGeom"] => builder.preset = attribute(e, b"prst"),
        ["spPr", "solidFill"] => return Some(ColorTarget::ShapeFill),
        ["spPr", "noFill"] => builder.fill = Some(Fill::NoFill),
        ["spPr", "gradFill" | "pattFill" | "blipFill" | "grpFill"] => builder.fill = Some(Fill::Other),
        ["spPr", "ln"] => {
            builder.line_width = attribute(e, b"w")
                .and_then(|v| v.parse::<f64>().ok())
                .map(|w| w / EMU_PER_POINT as f64);
        }
        ["graphic", "graphicData"] => {
            let uri = attribute(e, b"uri").unwrap_or_default();
            builder.graphic = if uri.ends_with(CHART_URI) {
                Some(ShapeKind::Chart)
            } else if uri.ends_with(TABLE_URI) {
                Some(ShapeKind::Table)
            } else {
                None
            };
        }
        ["txBody"] => builder.paragraphs = Some(Vec::new()),
        ["txBody", "p"] => {
            if let Some(paragraphs) = &mut builder.paragraphs {
                paragraphs.push(Paragraph::default());
            }
        }
        ["txBody", "p", "r"] => builder.run = Some(TextRun::new("")),
        ["txBody", "p", "fld"] => builder.run = Some(TextRun::field("")),
        ["txBody", "p", "br"] => {
            if let Some(paragraph) = builder.current_paragraph() {
                paragraph.runs.push(TextRun::line_break());
            }
        }
        ["txBody", "p", "r" | "fld", "rPr"] => {
            let size = attribute(e, b"sz").and_then(|v| v.parse::<f64>().ok());
            if let (Some(run), Some(size)) = (&mut builder.run, size) {
                run.font_size = Some(size / 100.0);
            }
        }
        ["txBody", "p", "r" | "fld", "rPr", "solidFill"] => return Some(ColorTarget::RunColor),
        _ => {}
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use deckcheck_core::types::RunKind;

    fn slide(tree: &str) -> String {
        format!(
            r#"<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><p:cSld>{}</p:cSld></p:sld>"#,
            tree
        )
    }

    #[test]
    fn test_text_box_runs() {
        let xml = slide(
            r#"<p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/></p:nvGrpSpPr><p:grpSpPr/>
<p:sp><p:nvSpPr><p:cNvPr id="2" name="TextBox 1"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr>
<p:spPr><a:xfrm><a:off x="100" y="200"/><a:ext cx="300" cy="400"/></a:xfrm><a:prstGeom prst="rect"/></p:spPr>
<p:txBody><a:bodyPr/><a:p><a:r><a:rPr lang="en-US" sz="1200"><a:solidFill><a:schemeClr val="accent1"><a:lumMod val="75000"/></a:schemeClr></a:solidFill></a:rPr><a:t>Fast &amp; cheap</a:t></a:r><a:br/><a:r><a:t> second line</a:t></a:r></a:p>
<a:p><a:fld id="{1}" type="slidenum"><a:t>4</a:t></a:fld></a:p><a:p/></p:txBody></p:sp></p:spTree>"#,
        );
        let tree = parse_shape_tree(&xml).unwrap();
        assert_eq!(tree.shapes.len(), 1);

        let shape = &tree.shapes[0].shape;
        assert_eq!(shape.name, "TextBox 1");
        assert_eq!(shape.kind, ShapeKind::TextBox);
        assert_eq!(shape.geometry, Geometry::new(100, 200, 300, 400));
        assert_eq!(shape.fill, Some(Fill::Other));
        assert_eq!(shape.auto_shape, None);

        let frame = shape.text_frame.as_ref().unwrap();
        assert_eq!(frame.paragraphs.len(), 3);
        let runs = &frame.paragraphs[0].runs;
        assert_eq!(runs.len(), 3);
        assert_eq!(runs[0].text, "Fast & cheap");
        assert_eq!(runs[0].font_size, Some(12.0));
        assert_eq!(
            runs[0].color,
            ColorRef::Theme {
                color: ThemeColor::Accent1,
                brightness: -0.25
            }
        );
        assert_eq!(runs[1].kind, RunKind::Break);
        assert_eq!(runs[2].text, " second line");
        assert_eq!(runs[2].color, ColorRef::Unspecified);
        assert_eq!(frame.paragraphs[1].runs[0].kind, RunKind::Field);
        assert_eq!(shape.text(), "Fast & cheap\n second line\n4\n");
    }

    #[test]
    fn test_shape_kinds() {
        let xml = slide(
            r#"<p:spTree>
<p:sp><p:nvSpPr><p:cNvPr id="2" name="Title 1"/><p:cNvSpPr/><p:nvPr><p:ph type="title"/></p:nvPr></p:nvSpPr><p:spPr/><p:txBody><a:p><a:r><a:t>Results</a:t></a:r></a:p></p:txBody></p:sp>
<p:sp><p:nvSpPr><p:cNvPr id="3" name="Oval"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr><p:spPr><a:xfrm><a:off x="1" y="2"/><a:ext cx="3" cy="4"/></a:xfrm><a:prstGeom prst="ellipse"/><a:solidFill><a:srgbClr val="FF0000"/></a:solidFill></p:spPr></p:sp>
<p:cxnSp><p:nvCxnSpPr><p:cNvPr id="4" name="Connector"/><p:cNvCxnSpPr/><p:nvPr/></p:nvCxnSpPr><p:spPr><a:prstGeom prst="line"/><a:ln w="6350"><a:solidFill><a:srgbClr val="000000"/></a:solidFill></a:ln></p:spPr></p:cxnSp>
<p:pic><p:nvPicPr><p:cNvPr id="5" name="Picture"/><p:cNvPicPr/><p:nvPr/></p:nvPicPr><p:blipFill/><p:spPr><a:xfrm><a:off x="10" y="20"/><a:ext cx="30" cy="40"/></a:xfrm></p:spPr></p:pic>
<p:graphicFrame><p:nvGraphicFramePr><p:cNvPr id="6" name="Chart"/><p:cNvGraphicFramePr/><p:nvPr/></p:nvGraphicFramePr><p:xfrm><a:off x="5" y="6"/><a:ext cx="7" cy="8"/></p:xfrm><a:graphic><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/chart"/></a:graphic></p:graphicFrame>
<p:grpSp><p:nvGrpSpPr><p:cNvPr id="7" name="Group"/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr><a:xfrm><a:off x="50" y="60"/><a:ext cx="70" cy="80"/></a:xfrm></p:grpSpPr>
<p:sp><p:nvSpPr><p:cNvPr id="8" name="Inner"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr><p:spPr><a:xfrm><a:off x="999" y="999"/><a:ext cx="1" cy="1"/></a:xfrm></p:spPr><p:txBody><a:p><a:r><a:t>hidden</a:t></a:r></a:p></p:txBody></p:sp></p:grpSp>
</p:spTree>"#,
        );
        let tree = parse_shape_tree(&xml).unwrap();
        let kinds: Vec<ShapeKind> = tree.shapes.iter().map(|s| s.shape.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ShapeKind::Placeholder,
                ShapeKind::AutoShape,
                ShapeKind::Line,
                ShapeKind::Picture,
                ShapeKind::Chart,
                ShapeKind::Other,
            ]
        );

        let title = &tree.shapes[0];
        assert!(title.placeholder.as_ref().unwrap().is_title());
        assert!(!title.has_transform);
        assert_eq!(title.shape.text(), "Results");

        let oval = &tree.shapes[1].shape;
        assert_eq!(oval.auto_shape.as_deref(), Some("ellipse"));
        assert_eq!(oval.fill, Some(Fill::Solid(ColorRef::Rgb(Rgb::new(255, 0, 0)))));

        let line = &tree.shapes[2].shape;
        assert_eq!(line.line_width, Some(0.5));
        assert_eq!(line.fill, None);

        assert_eq!(tree.shapes[3].shape.fill, None);
        assert_eq!(tree.shapes[4].shape.geometry, Geometry::new(5, 6, 7, 8));

        let group = &tree.shapes[5].shape;
        assert_eq!(group.geometry, Geometry::new(50, 60, 70, 80));
        assert!(!group.has_text_frame());
    }

    #[test]
    fn test_background() {
        let xml = slide(
            r#"<p:bg><p:bgPr><a:solidFill><a:schemeClr val="tx2"><a:lumMod val="60000"/><a:lumOff val="40000"/></a:schemeClr></a:solidFill><a:effectLst/></p:bgPr></p:bg><p:spTree/>"#,
        );
        let tree = parse_shape_tree(&xml).unwrap();
        assert_eq!(
            tree.background,
            Some(Fill::Solid(ColorRef::Theme {
                color: ThemeColor::Dark2,
                brightness: 0.4
            }))
        );

        let xml = slide(r#"<p:bg><p:bgRef idx="1001"><a:schemeClr val="bg1"/></p:bgRef></p:bg><p:spTree/>"#);
        assert_eq!(parse_shape_tree(&xml).unwrap().background, Some(Fill::Other));

        let xml = slide("<p:spTree/>");
        assert_eq!(parse_shape_tree(&xml).unwrap().background, None);
    }

    #[test]
    fn test_placeholder_geometry() {
        let geometry = |x| Geometry::new(x, 0, 10, 10);
        let placeholder = |kind: &str, idx: Option<u32>, x: i64| ParsedShape {
            shape: Shape::new(ShapeKind::Placeholder, geometry(x)),
            placeholder: Some(Placeholder {
                kind: kind.to_string(),
                idx,
            }),
            has_transform: true,
        };
        let layout = ShapeTree {
            shapes: vec![
                placeholder("title", None, 1),
                placeholder("obj", Some(1), 2),
                placeholder("obj", Some(2), 3),
            ],
            background: None,
        };

        let body = Placeholder {
            kind: "obj".to_string(),
            idx: Some(2),
        };
        assert_eq!(layout.placeholder_geometry(&body, true), Some(geometry(3)));
        assert_eq!(layout.placeholder_geometry(&body, false), Some(geometry(2)));

        let centered = Placeholder {
            kind: "ctrTitle".to_string(),
            idx: None,
        };
        assert_eq!(layout.placeholder_geometry(&centered, true), Some(geometry(1)));
    }
}
