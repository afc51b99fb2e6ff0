//! Section outline types.

use serde::{Deserialize, Serialize};

use super::{BBox, ChunkId};

/// Id of the synthetic section that collects chunks preceding the first heading.
pub const ROOT_SECTION_ID: &str = "section_root";

/// A heading promoted to an outline node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Graph node id (`section_<chunk_id>`)
    pub id: String,

    /// Outline level: 1 or 2, 0 for the synthetic document root
    pub level: u8,

    /// Backing heading chunk (`None` for the document root)
    pub chunk_id: Option<ChunkId>,

    /// Heading text
    pub text: String,

    /// First page of the heading
    pub page_start: u32,

    /// Last page of the heading
    pub page_end: u32,

    /// Heading font size
    pub font_size: f64,

    /// Heading bounding box
    pub bbox: Option<BBox>,

    /// Arena index of the parent section
    #[serde(skip)]
    pub parent: Option<usize>,
}

impl Section {
    /// Check if this is the synthetic document root.
    pub fn is_root(&self) -> bool {
        self.chunk_id.is_none()
    }
}

/// Flat storage for the section forest; parents are arena indices.
#[derive(Debug, Clone, Default)]
pub struct SectionArena {
    sections: Vec<Section>,
}

impl SectionArena {
    /// Create an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a section and return its index.
    pub fn push(&mut self, section: Section) -> usize {
        self.sections.push(section);
        self.sections.len() - 1
    }

    /// Get a section by index.
    pub fn get(&self, index: usize) -> Option<&Section> {
        self.sections.get(index)
    }

    /// Get a mutable section by index.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Section> {
        self.sections.get_mut(index)
    }

    /// Number of sections.
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// Check if the arena is empty.
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Iterate sections in creation (document) order.
    pub fn iter(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter()
    }

    /// Parent of the section at `index`.
    pub fn parent(&self, index: usize) -> Option<&Section> {
        self.sections
            .get(index)
            .and_then(|s| s.parent)
            .and_then(|p| self.sections.get(p))
    }

    /// Indices of the ancestors of `index`, nearest first.
    pub fn ancestors(&self, index: usize) -> Vec<usize> {
        let mut out = Vec::new();
        let mut current = self.sections.get(index).and_then(|s| s.parent);
        while let Some(p) = current {
            // parents always precede children, so this terminates
            if p >= index || out.contains(&p) {
                break;
            }
            out.push(p);
            current = self.sections[p].parent;
        }
        out
    }

    /// Indices of the direct children of `index`, in document order.
    pub fn children(&self, index: usize) -> Vec<usize> {
        self.sections
            .iter()
            .enumerate()
            .filter(|(_, s)| s.parent == Some(index))
            .map(|(i, _)| i)
            .collect()
    }

    /// Indices of sections without a parent.
    pub fn roots(&self) -> Vec<usize> {
        self.sections
            .iter()
            .enumerate()
            .filter(|(_, s)| s.parent.is_none())
            .map(|(i, _)| i)
            .collect()
    }

    /// Consume the arena into its sections.
    pub fn into_vec(self) -> Vec<Section> {
        self.sections
    }
}
