//! Data model shared by every stage of the pipeline.
//!
//! Spans come in from the layout extractor, chunks are derived from them once,
//! and sections, list items and graph nodes are derived from the final chunk
//! sequence. Nothing here is mutated after it is produced.

mod chunk;
mod figure;
mod graph;
mod section;
mod span;

pub use chunk::{round_size, size_key, Chunk, ChunkId, ChunkType};
pub use figure::{FigureRecord, ListItem};
pub use graph::{
    chunk_node_id, list_item_node_id, section_node_id, Edge, Graph, Node, NodeData, NodeKind,
    Relation, Subgraph,
};
pub use section::{Section, SectionArena, ROOT_SECTION_ID};
pub use span::{BBox, LinkTarget, Span};
