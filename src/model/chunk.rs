//! Chunk types: classified, style-coherent runs of spans.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{BBox, LinkTarget};
use crate::error::Error;

/// Stable chunk identifier (`ch0000`, `ch0001`, ...).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChunkId(String);

impl ChunkId {
    /// Identifier for the n-th span group of a document.
    pub fn from_index(index: usize) -> Self {
        Self(format!("ch{:04}", index))
    }

    /// Borrow the identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ChunkId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ChunkId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Semantic role of a chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkType {
    /// Top-level heading by style
    SectionH1,
    /// Second-level heading by style
    SectionH2,
    /// Third-level heading by style
    SectionH3,
    /// Body text
    Paragraph,
    /// Short small-print line (figure captions, footers)
    Caption,
    /// Text pointing at a figure, table or other section
    Reference,
    /// Bulleted list item
    ListItem,
    /// Numbered or lettered list item
    OrderedListItem,
    /// Coalesced run of bulleted items
    ListBlock,
    /// Coalesced run of numbered items
    OrderedListBlock,
}

impl ChunkType {
    /// All chunk types in declaration order.
    pub const ALL: [ChunkType; 10] = [
        ChunkType::SectionH1,
        ChunkType::SectionH2,
        ChunkType::SectionH3,
        ChunkType::Paragraph,
        ChunkType::Caption,
        ChunkType::Reference,
        ChunkType::ListItem,
        ChunkType::OrderedListItem,
        ChunkType::ListBlock,
        ChunkType::OrderedListBlock,
    ];

    /// Tag used in the chunk table.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChunkType::SectionH1 => "section_h1",
            ChunkType::SectionH2 => "section_h2",
            ChunkType::SectionH3 => "section_h3",
            ChunkType::Paragraph => "paragraph",
            ChunkType::Caption => "caption",
            ChunkType::Reference => "reference",
            ChunkType::ListItem => "list_item",
            ChunkType::OrderedListItem => "ordered_list_item",
            ChunkType::ListBlock => "list_block",
            ChunkType::OrderedListBlock => "ordered_list_block",
        }
    }

    /// Check if this is a style-classified heading.
    pub fn is_heading(&self) -> bool {
        matches!(
            self,
            ChunkType::SectionH1 | ChunkType::SectionH2 | ChunkType::SectionH3
        )
    }

    /// Check if this is a single (not yet coalesced) list item.
    pub fn is_list_item(&self) -> bool {
        matches!(self, ChunkType::ListItem | ChunkType::OrderedListItem)
    }

    /// Check if this is a coalesced list block.
    pub fn is_list_block(&self) -> bool {
        matches!(self, ChunkType::ListBlock | ChunkType::OrderedListBlock)
    }

    /// Block type a run of this list item type collapses into.
    pub fn block_type(&self) -> Option<ChunkType> {
        match self {
            ChunkType::ListItem => Some(ChunkType::ListBlock),
            ChunkType::OrderedListItem => Some(ChunkType::OrderedListBlock),
            _ => None,
        }
    }
}

impl fmt::Display for ChunkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChunkType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        ChunkType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| Error::Schema(format!("unknown chunk type '{}'", s)))
    }
}

/// A classified chunk of document text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Stable identifier, monotonic in document order
    pub chunk_id: ChunkId,

    /// First page the chunk touches
    pub page_start: u32,

    /// Last page the chunk touches
    pub page_end: u32,

    /// Semantic role
    #[serde(rename = "type")]
    pub chunk_type: ChunkType,

    /// Mean font size of the member spans (2 decimals)
    pub font_size: f64,

    /// Chunk text
    pub text: String,

    /// Bounding box of the first member span
    pub bbox: Option<BBox>,

    /// First link found among the member spans
    pub hyperlink_target: Option<LinkTarget>,

    /// List entries, only for list blocks
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<String>,
}

impl Chunk {
    /// Create a chunk on a single page with no box, link or items.
    pub fn new(
        chunk_id: impl Into<ChunkId>,
        chunk_type: ChunkType,
        page: u32,
        font_size: f64,
        text: impl Into<String>,
    ) -> Self {
        Self {
            chunk_id: chunk_id.into(),
            page_start: page,
            page_end: page,
            chunk_type,
            font_size,
            text: text.into(),
            bbox: None,
            hyperlink_target: None,
            items: Vec::new(),
        }
    }

    /// Font size as integer hundredths, the key used for exact size matching.
    pub fn size_key(&self) -> i64 {
        size_key(self.font_size)
    }
}

/// Round a font size to 2 decimals.
pub fn round_size(size: f64) -> f64 {
    (size * 100.0).round() / 100.0
}

/// Integer key of a font size at 0.01pt precision.
pub fn size_key(size: f64) -> i64 {
    (size * 100.0).round() as i64
}
