//! Domain types for representing a parsed slide deck.
//!
//! All positions and sizes are in EMU (English Metric Units, 914400 per inch),
//! the native unit of OOXML packages.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// EMU per typographic point.
pub const EMU_PER_POINT: i64 = 12_700;

/// A concrete 24-bit color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(0xFF, 0xFF, 0xFF);
    pub const BLACK: Rgb = Rgb::new(0x00, 0x00, 0x00);

    /// Create a color from its channels.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a `RRGGBB` hex string (as found in `srgbClr/@val`).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
        Some(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// A named slot of the theme color scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ThemeColor {
    Dark1,
    Light1,
    Dark2,
    Light2,
    Accent1,
    Accent2,
    Accent3,
    Accent4,
    Accent5,
    Accent6,
    Hyperlink,
    FollowedHyperlink,
}

impl ThemeColor {
    /// Every role of a complete color scheme, in scheme order.
    pub const ALL: [ThemeColor; 12] = [
        ThemeColor::Dark1,
        ThemeColor::Light1,
        ThemeColor::Dark2,
        ThemeColor::Light2,
        ThemeColor::Accent1,
        ThemeColor::Accent2,
        ThemeColor::Accent3,
        ThemeColor::Accent4,
        ThemeColor::Accent5,
        ThemeColor::Accent6,
        ThemeColor::Hyperlink,
        ThemeColor::FollowedHyperlink,
    ];

    /// Map a `schemeClr/@val` or color-scheme element name to a role.
    ///
    /// The text/background aliases (`tx1`, `bg1`, ...) map onto the dark/light
    /// slots they point to in the default color map. `phClr` and unknown names
    /// return `None`.
    pub fn from_scheme_name(name: &str) -> Option<Self> {
        let color = match name {
            "dk1" | "tx1" => ThemeColor::Dark1,
            "lt1" | "bg1" => ThemeColor::Light1,
            "dk2" | "tx2" => ThemeColor::Dark2,
            "lt2" | "bg2" => ThemeColor::Light2,
            "accent1" => ThemeColor::Accent1,
            "accent2" => ThemeColor::Accent2,
            "accent3" => ThemeColor::Accent3,
            "accent4" => ThemeColor::Accent4,
            "accent5" => ThemeColor::Accent5,
            "accent6" => ThemeColor::Accent6,
            "hlink" => ThemeColor::Hyperlink,
            "folHlink" => ThemeColor::FollowedHyperlink,
            _ => return None,
        };
        Some(color)
    }

    /// The element name of this role inside `a:clrScheme`.
    pub fn scheme_name(&self) -> &'static str {
        match self {
            ThemeColor::Dark1 => "dk1",
            ThemeColor::Light1 => "lt1",
            ThemeColor::Dark2 => "dk2",
            ThemeColor::Light2 => "lt2",
            ThemeColor::Accent1 => "accent1",
            ThemeColor::Accent2 => "accent2",
            ThemeColor::Accent3 => "accent3",
            ThemeColor::Accent4 => "accent4",
            ThemeColor::Accent5 => "accent5",
            ThemeColor::Accent6 => "accent6",
            ThemeColor::Hyperlink => "hlink",
            ThemeColor::FollowedHyperlink => "folHlink",
        }
    }
}

/// The deck's theme colors, keyed by role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorScheme {
    colors: BTreeMap<ThemeColor, Rgb>,
}

impl ColorScheme {
    /// Create an empty scheme. Lookups fall back to the default Office colors.
    pub fn empty() -> Self {
        Self {
            colors: BTreeMap::new(),
        }
    }

    /// Set the color of a role.
    pub fn set(&mut self, role: ThemeColor, rgb: Rgb) {
        self.colors.insert(role, rgb);
    }

    /// Builder form of [`ColorScheme::set`].
    pub fn with(mut self, role: ThemeColor, rgb: Rgb) -> Self {
        self.set(role, rgb);
        self
    }

    /// Color of a role, if this scheme defines it.
    pub fn get(&self, role: ThemeColor) -> Option<Rgb> {
        self.colors.get(&role).copied()
    }

    /// Number of roles defined.
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Whether no role is defined.
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

impl Default for ColorScheme {
    /// The Office 2013+ default theme.
    fn default() -> Self {
        let defaults = [
            (ThemeColor::Dark1, Rgb::new(0x00, 0x00, 0x00)),
            (ThemeColor::Light1, Rgb::new(0xFF, 0xFF, 0xFF)),
            (ThemeColor::Dark2, Rgb::new(0x44, 0x54, 0x6A)),
            (ThemeColor::Light2, Rgb::new(0xE7, 0xE6, 0xE6)),
            (ThemeColor::Accent1, Rgb::new(0x44, 0x72, 0xC4)),
            (ThemeColor::Accent2, Rgb::new(0xED, 0x7D, 0x31)),
            (ThemeColor::Accent3, Rgb::new(0xA5, 0xA5, 0xA5)),
            (ThemeColor::Accent4, Rgb::new(0xFF, 0xC0, 0x00)),
            (ThemeColor::Accent5, Rgb::new(0x5B, 0x9B, 0xD5)),
            (ThemeColor::Accent6, Rgb::new(0x70, 0xAD, 0x47)),
            (ThemeColor::Hyperlink, Rgb::new(0x05, 0x63, 0xC1)),
            (ThemeColor::FollowedHyperlink, Rgb::new(0x95, 0x4F, 0x72)),
        ];
        Self {
            colors: defaults.into_iter().collect(),
        }
    }
}

/// A reference to a color as written in the document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum ColorRef {
    /// An explicit RGB value.
    Rgb(Rgb),
    /// A theme role with a brightness adjustment in [-1.0, 1.0].
    Theme { color: ThemeColor, brightness: f64 },
    /// No color information at all (inherit from the text style).
    #[default]
    Unspecified,
}

impl ColorRef {
    /// A theme reference without brightness adjustment.
    pub fn theme(color: ThemeColor) -> Self {
        ColorRef::Theme {
            color,
            brightness: 0.0,
        }
    }
}

/// Fill of a shape or slide background.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Fill {
    /// A single solid color.
    Solid(ColorRef),
    /// Explicitly transparent.
    NoFill,
    /// Gradient, pattern, picture, or a fill inherited from the shape style.
    Other,
}

/// Kind of a shape on a slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ShapeKind {
    AutoShape,
    Line,
    Picture,
    Chart,
    Table,
    TextBox,
    Placeholder,
    Other,
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ShapeKind::AutoShape => "auto shape",
            ShapeKind::Line => "line",
            ShapeKind::Picture => "picture",
            ShapeKind::Chart => "chart",
            ShapeKind::Table => "table",
            ShapeKind::TextBox => "text box",
            ShapeKind::Placeholder => "placeholder",
            ShapeKind::Other => "shape",
        };
        f.write_str(name)
    }
}

/// Position and size of a shape. Always defined; zero when the document omits it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Geometry {
    pub left: i64,
    pub top: i64,
    pub width: i64,
    pub height: i64,
}

impl Geometry {
    pub fn new(left: i64, top: i64, width: i64, height: i64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// The (left, top) corner.
    pub fn position(&self) -> (i64, i64) {
        (self.left, self.top)
    }
}

/// What a run inside a paragraph holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunKind {
    /// Regular text (`a:r`).
    Text,
    /// A field such as the slide number (`a:fld`).
    Field,
    /// A soft line break (`a:br`).
    Break,
}

/// A span of text sharing one set of character properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRun {
    pub text: String,
    pub kind: RunKind,
    /// Font size in points, when set on the run.
    pub font_size: Option<f64>,
    pub color: ColorRef,
}

impl TextRun {
    /// Create a plain text run without explicit formatting.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: RunKind::Text,
            font_size: None,
            color: ColorRef::Unspecified,
        }
    }

    /// Create a field run (e.g. a slide-number field).
    pub fn field(text: impl Into<String>) -> Self {
        Self {
            kind: RunKind::Field,
            ..Self::new(text)
        }
    }

    /// Create a line break.
    pub fn line_break() -> Self {
        Self {
            kind: RunKind::Break,
            ..Self::new("\n")
        }
    }

    pub fn with_font_size(mut self, points: f64) -> Self {
        self.font_size = Some(points);
        self
    }

    pub fn with_color(mut self, color: ColorRef) -> Self {
        self.color = color;
        self
    }
}

/// A paragraph of a text frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    pub runs: Vec<TextRun>,
}

impl Paragraph {
    pub fn new(runs: Vec<TextRun>) -> Self {
        Self { runs }
    }

    /// Regular text runs only; fields and breaks are skipped.
    pub fn text_runs(&self) -> impl Iterator<Item = &TextRun> {
        self.runs.iter().filter(|r| r.kind == RunKind::Text)
    }

    /// Full paragraph text including fields and line breaks.
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

/// The text content of a shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextFrame {
    pub paragraphs: Vec<Paragraph>,
}

impl TextFrame {
    /// Create a text frame with one single-run paragraph per line of `text`.
    pub fn from_text(text: &str) -> Self {
        Self {
            paragraphs: text
                .split('\n')
                .map(|line| Paragraph::new(vec![TextRun::new(line)]))
                .collect(),
        }
    }

    /// All paragraph texts joined with newlines.
    pub fn text(&self) -> String {
        self.paragraphs
            .iter()
            .map(Paragraph::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Regular text runs of all paragraphs, in reading order.
    pub fn text_runs(&self) -> impl Iterator<Item = &TextRun> {
        self.paragraphs.iter().flat_map(Paragraph::text_runs)
    }
}

/// A shape on a slide.
///
/// Capabilities are explicit: `fill` is `None` for shapes that cannot carry a
/// fill (pictures, groups, graphic frames), `line_width` is only set for
/// lines, `text_frame` only for shapes with a text body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    pub name: String,
    pub kind: ShapeKind,
    /// Preset geometry of auto shapes (e.g. `rect`, `roundRect`, `ellipse`).
    pub auto_shape: Option<String>,
    pub geometry: Geometry,
    pub fill: Option<Fill>,
    /// Outline width in points.
    pub line_width: Option<f64>,
    pub text_frame: Option<TextFrame>,
}

impl Shape {
    /// Create a shape of the given kind without fill or text.
    pub fn new(kind: ShapeKind, geometry: Geometry) -> Self {
        Self {
            name: String::new(),
            kind,
            auto_shape: None,
            geometry,
            fill: None,
            line_width: None,
            text_frame: None,
        }
    }

    /// A text box holding `text`, one paragraph per line.
    pub fn text_box(geometry: Geometry, text: &str) -> Self {
        Self::new(ShapeKind::TextBox, geometry)
            .with_fill(Fill::Other)
            .with_text_frame(TextFrame::from_text(text))
    }

    /// An auto shape with the given preset geometry.
    pub fn auto_shape(preset: &str, geometry: Geometry) -> Self {
        Self {
            auto_shape: Some(preset.to_string()),
            ..Self::new(ShapeKind::AutoShape, geometry).with_fill(Fill::Other)
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_fill(mut self, fill: Fill) -> Self {
        self.fill = Some(fill);
        self
    }

    pub fn with_line_width(mut self, points: f64) -> Self {
        self.line_width = Some(points);
        self
    }

    pub fn with_text_frame(mut self, frame: TextFrame) -> Self {
        self.text_frame = Some(frame);
        self
    }

    /// Whether the shape has a text body.
    pub fn has_text_frame(&self) -> bool {
        self.text_frame.is_some()
    }

    /// The shape's full text, or an empty string.
    pub fn text(&self) -> String {
        self.text_frame
            .as_ref()
            .map(TextFrame::text)
            .unwrap_or_default()
    }

    /// Auto shapes are described by their preset, everything else by its kind.
    pub fn descriptor(&self) -> String {
        match (&self.kind, &self.auto_shape) {
            (ShapeKind::AutoShape, Some(preset)) => preset.clone(),
            (kind, _) => kind.to_string(),
        }
    }

    /// Rectangles and rounded rectangles, commonly used as overlays.
    pub fn is_rectangle(&self) -> bool {
        self.kind == ShapeKind::AutoShape
            && matches!(self.auto_shape.as_deref(), Some("rect") | Some("roundRect"))
    }
}

/// A single slide.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Slide {
    pub shapes: Vec<Shape>,
    /// Text of the title placeholder, if the slide has one.
    pub title: Option<String>,
    /// Background fill; `None` when inherited from the layout.
    pub background: Option<Fill>,
    /// Speaker notes text.
    pub notes: Option<String>,
}

impl Slide {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_shape(mut self, shape: Shape) -> Self {
        self.shapes.push(shape);
        self
    }

    pub fn with_background(mut self, fill: Fill) -> Self {
        self.background = Some(fill);
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Whether this slide starts the backup (appendix) section.
    pub fn is_backup(&self) -> bool {
        self.title_contains("backup")
    }

    /// Case-insensitive search in the title.
    pub fn title_contains(&self, needle: &str) -> bool {
        self.title
            .as_deref()
            .map(|t| t.to_lowercase().contains(needle))
            .unwrap_or(false)
    }
}

/// A whole presentation, as seen by the rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deck {
    pub slides: Vec<Slide>,
    /// Slide width in EMU.
    pub width: i64,
    /// Slide height in EMU.
    pub height: i64,
    pub color_scheme: ColorScheme,
    /// Number printed on the first slide (`firstSlideNum`).
    pub first_slide_number: usize,
}

impl Deck {
    /// Default 16:9 slide size.
    pub const DEFAULT_WIDTH: i64 = 12_192_000;
    pub const DEFAULT_HEIGHT: i64 = 6_858_000;

    /// Create an empty deck of the given slide size with the default theme.
    pub fn new(width: i64, height: i64) -> Self {
        Self {
            slides: Vec::new(),
            width,
            height,
            color_scheme: ColorScheme::default(),
            first_slide_number: 1,
        }
    }

    /// Add a slide to the deck.
    pub fn add_slide(&mut self, slide: Slide) {
        self.slides.push(slide);
    }

    pub fn with_slide(mut self, slide: Slide) -> Self {
        self.add_slide(slide);
        self
    }

    /// Index of the first backup slide, or the slide count when there is none.
    pub fn backup_boundary(&self) -> usize {
        self.slides
            .iter()
            .position(Slide::is_backup)
            .unwrap_or(self.slides.len())
    }
}

impl Default for Deck {
    fn default() -> Self {
        Self::new(Self::DEFAULT_WIDTH, Self::DEFAULT_HEIGHT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_hex() {
        assert_eq!(Rgb::from_hex("FF8000"), Some(Rgb::new(255, 128, 0)));
        assert_eq!(Rgb::from_hex("#00ff00"), Some(Rgb::new(0, 255, 0)));
        assert_eq!(Rgb::from_hex("12345"), None);
        assert_eq!(Rgb::from_hex("GG0000"), None);
        assert_eq!(Rgb::new(1, 2, 171).to_string(), "0102AB");
    }

    #[test]
    fn test_theme_color_aliases() {
        assert_eq!(ThemeColor::from_scheme_name("tx1"), Some(ThemeColor::Dark1));
        assert_eq!(ThemeColor::from_scheme_name("bg2"), Some(ThemeColor::Light2));
        assert_eq!(ThemeColor::from_scheme_name("phClr"), None);
        for role in ThemeColor::ALL {
            assert_eq!(ThemeColor::from_scheme_name(role.scheme_name()), Some(role));
        }
    }

    #[test]
    fn test_shape_text_and_descriptor() {
        let shape = Shape::text_box(Geometry::default(), "one\ntwo");
        assert_eq!(shape.text(), "one\ntwo");
        assert_eq!(shape.descriptor(), "text box");

        let rect = Shape::auto_shape("roundRect", Geometry::default());
        assert!(rect.is_rectangle());
        assert_eq!(rect.descriptor(), "roundRect");
        assert!(!Shape::auto_shape("ellipse", Geometry::default()).is_rectangle());
    }

    #[test]
    fn test_paragraph_runs_skip_fields() {
        let paragraph = Paragraph::new(vec![
            TextRun::new("Page "),
            TextRun::field("3"),
            TextRun::line_break(),
        ]);
        assert_eq!(paragraph.text(), "Page 3\n");
        assert_eq!(paragraph.text_runs().count(), 1);
    }

    #[test]
    fn test_backup_boundary() {
        let deck = Deck::default()
            .with_slide(Slide::new().with_title("Intro"))
            .with_slide(Slide::new().with_title("Results"))
            .with_slide(Slide::new().with_title("BACKUP slides"))
            .with_slide(Slide::new().with_title("Extra"));
        assert_eq!(deck.backup_boundary(), 2);
        assert_eq!(Deck::default().backup_boundary(), 0);
    }
}
