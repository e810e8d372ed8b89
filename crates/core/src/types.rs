//! Domain types for representing parsed presentation content.

use serde::{Deserialize, Serialize};

/// English Metric Units per inch. All PPTX geometry is expressed in EMU.
pub const EMU_PER_INCH: i64 = 914_400;

/// English Metric Units per typographic point.
pub const EMU_PER_POINT: i64 = 12_700;

/// Represents an entire presentation, parsed for rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlideDeck {
    /// Original filename (without path).
    pub filename: String,

    /// Slide canvas size in EMU.
    pub slide_size: SlideSize,

    /// Slides in presentation order.
    pub slides: Vec<Slide>,
}

impl SlideDeck {
    /// Create a new, empty deck with the given filename and canvas size.
    pub fn new(filename: impl Into<String>, slide_size: SlideSize) -> Self {
        Self {
            filename: filename.into(),
            slide_size,
            slides: Vec::new(),
        }
    }

    /// Add a slide to the deck.
    pub fn add_slide(&mut self, slide: Slide) {
        self.slides.push(slide);
    }

    /// Total number of slides.
    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }
}

/// Slide canvas size in EMU, from `p:sldSz` in presentation.xml.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideSize {
    /// Width in EMU.
    pub cx: i64,
    /// Height in EMU.
    pub cy: i64,
}

impl Default for SlideSize {
    /// The PowerPoint 16:9 default canvas (13.333in x 7.5in).
    fn default() -> Self {
        Self {
            cx: 12_192_000,
            cy: 6_858_000,
        }
    }
}

/// The format of the source presentation file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PresentationFormat {
    /// Modern PPTX (Office Open XML).
    Pptx,
    /// Legacy PPT (OLE/CFB binary). Detected but not renderable.
    Ppt,
}

impl PresentationFormat {
    /// Detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "pptx" => Some(Self::Pptx),
            "ppt" => Some(Self::Ppt),
            _ => None,
        }
    }

    /// Detect format from file magic bytes.
    pub fn from_magic(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < 4 {
            return None;
        }

        // PPTX is a ZIP file (PK\x03\x04)
        if bytes.starts_with(&[0x50, 0x4B, 0x03, 0x04]) {
            return Some(Self::Pptx);
        }

        // PPT is an OLE/CFB file (D0 CF 11 E0 A1 B1 1A E1)
        if bytes.len() >= 8
            && bytes.starts_with(&[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1])
        {
            return Some(Self::Ppt);
        }

        None
    }
}

/// A single slide, parsed for rendering.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Slide {
    /// 1-based slide number.
    pub number: usize,

    /// Slide background, if the slide declares one.
    pub background: Option<Fill>,

    /// Shapes in document (z) order.
    pub shapes: Vec<Shape>,
}

impl Slide {
    /// Create a new slide with the given number.
    pub fn new(number: usize) -> Self {
        Self {
            number,
            ..Default::default()
        }
    }

    /// Add a shape to this slide.
    pub fn add_shape(&mut self, shape: Shape) {
        self.shapes.push(shape);
    }
}

/// A shape on a slide: a placeholder, text box, auto shape, or picture.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Shape {
    /// Position and extent on the slide canvas, in EMU.
    /// None when the shape inherits its frame from the layout.
    pub frame: Option<ShapeFrame>,

    /// Solid fill, if the shape declares one.
    pub fill: Option<Fill>,

    /// Text content, one entry per `a:p` paragraph.
    pub paragraphs: Vec<Paragraph>,
}

impl Shape {
    /// Whether this shape carries any non-whitespace text.
    pub fn has_text(&self) -> bool {
        self.paragraphs
            .iter()
            .flat_map(|p| p.runs.iter())
            .any(|r| !r.text.trim().is_empty())
    }
}

/// Shape position and extent in EMU (`a:off` + `a:ext`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShapeFrame {
    /// X offset from the left edge of the canvas.
    pub x: i64,
    /// Y offset from the top edge of the canvas.
    pub y: i64,
    /// Width.
    pub cx: i64,
    /// Height.
    pub cy: i64,
}

/// A paragraph of text inside a shape's text body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Paragraph {
    /// Text runs in order.
    pub runs: Vec<TextRun>,
}

impl Paragraph {
    /// Concatenated text of all runs.
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    /// The largest run size in this paragraph, in hundredths of a point.
    /// None when no run declares a size.
    pub fn max_run_size(&self) -> Option<u32> {
        self.runs.iter().filter_map(|r| r.size_centipoints).max()
    }
}

/// A run of text with uniform formatting (`a:r`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TextRun {
    /// The text content (`a:t`).
    pub text: String,

    /// Font size in hundredths of a point (`a:rPr sz`). None if inherited.
    pub size_centipoints: Option<u32>,

    /// Run color. None if inherited.
    pub color: Option<Color>,

    /// Bold flag (`a:rPr b`).
    pub bold: bool,
}

impl TextRun {
    /// Create a plain run with no explicit formatting.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }
}

/// A fill applied to a slide background or a shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Fill {
    /// Uniform color (`a:solidFill` with `a:srgbClr`).
    Solid(Color),
}

impl Fill {
    /// The representative color of this fill.
    pub fn color(&self) -> Color {
        match self {
            Fill::Solid(c) => *c,
        }
    }
}

/// An sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color {
        r: 255,
        g: 255,
        b: 255,
    };

    pub const BLACK: Color = Color { r: 0, g: 0, b: 0 };

    /// Parse a 6-digit hex string as found in `a:srgbClr val="RRGGBB"`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        if hex.len() != 6 {
            return None;
        }
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        Some(Self { r, g, b })
    }
}
