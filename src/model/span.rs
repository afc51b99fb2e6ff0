//! Span-level input types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A positioned run of text with font metadata, as produced by the layout
/// extractor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    /// Page number (1-indexed)
    pub page: u32,

    /// Text content
    pub text: String,

    /// Bounding box on the page
    pub bbox: BBox,

    /// Font name (e.g., "Arial-BoldMT")
    pub font: String,

    /// Font size in points
    pub size: f64,

    /// Text color as packed RGB integer
    pub color: u32,

    /// Bold flag
    pub bold: bool,

    /// Italic flag
    pub italic: bool,

    /// Link attached to the span, if any
    #[serde(default)]
    pub hyperlink_target: Option<LinkTarget>,
}

impl Span {
    /// Create a regular (non-bold, non-italic, black) span.
    pub fn new(
        page: u32,
        text: impl Into<String>,
        bbox: BBox,
        font: impl Into<String>,
        size: f64,
    ) -> Self {
        Self {
            page,
            text: text.into(),
            bbox,
            font: font.into(),
            size,
            color: 0,
            bold: false,
            italic: false,
            hyperlink_target: None,
        }
    }

    /// Mark the span bold.
    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    /// Mark the span italic.
    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    /// Set the span color.
    pub fn with_color(mut self, color: u32) -> Self {
        self.color = color;
        self
    }

    /// Attach a link target.
    pub fn with_link(mut self, target: LinkTarget) -> Self {
        self.hyperlink_target = Some(target);
        self
    }
}

/// Axis-aligned bounding box, y growing downwards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct BBox {
    /// Left edge
    pub x0: f64,
    /// Top edge
    pub y0: f64,
    /// Right edge
    pub x1: f64,
    /// Bottom edge
    pub y1: f64,
}

impl BBox {
    /// Create a bounding box from its corners.
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Box height.
    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }
}

impl From<[f64; 4]> for BBox {
    fn from(v: [f64; 4]) -> Self {
        Self::new(v[0], v[1], v[2], v[3])
    }
}

impl From<BBox> for [f64; 4] {
    fn from(b: BBox) -> Self {
        [b.x0, b.y0, b.x1, b.y1]
    }
}

/// Destination of a hyperlink found on a span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LinkTarget {
    /// Internal link to a page (or numbered note)
    Page(i64),
    /// External link
    Uri(String),
}

impl LinkTarget {
    /// Parse the textual form used in the chunk table.
    ///
    /// Returns `None` for blank input. Integers in canonical form become
    /// `Page`; anything else, including "012" or "+5", is kept verbatim as
    /// `Uri`.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        match raw.parse::<i64>() {
            Ok(n) if n.to_string() == raw => Some(LinkTarget::Page(n)),
            _ => Some(LinkTarget::Uri(raw.to_string())),
        }
    }
}

impl fmt::Display for LinkTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkTarget::Page(n) => write!(f, "{}", n),
            LinkTarget::Uri(s) => f.write_str(s),
        }
    }
}
