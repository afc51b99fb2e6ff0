//! Figure and list-item entities.

use serde::{Deserialize, Serialize};

use super::ChunkId;

/// One row of the figure metadata table produced by the visual-asset extractor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FigureRecord {
    /// Extractor-assigned figure id
    pub figure_id: String,

    /// Number printed in the caption ("3" for "Рис. 3")
    pub figure_number: Option<String>,

    /// Page the figure sits on
    pub page: u32,

    /// Chunk holding the caption, if one was matched
    pub caption_chunk: Option<ChunkId>,

    /// Caption text
    pub caption_text: String,

    /// Saved image file name
    pub file: String,

    /// Image extension
    pub saved_ext: String,

    /// Bounding box in its serialized form
    pub bbox: String,

    /// Image width in pixels
    pub width_px: Option<u32>,

    /// Image height in pixels
    pub height_px: Option<u32>,
}

impl FigureRecord {
    /// Graph node id of this figure.
    pub fn node_id(&self) -> String {
        format!("figure_{}", self.figure_id)
    }
}

/// One entry of a list block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListItem {
    /// Graph node id (`listitem_<chunk_id>_<order>`)
    pub id: String,

    /// Owning list block
    pub chunk_id: ChunkId,

    /// Position within the block, from 0
    pub order: usize,

    /// Item text
    pub text: String,

    /// First page of the owning block
    pub page_start: u32,

    /// Last page of the owning block
    pub page_end: u32,
}
