//! Node/edge tables derived from the chunk sequence and figure metadata.
//!
//! Each extractor is a pure function of its input and produces a
//! [`Subgraph`](crate::model::Subgraph); deduplication across extractors is
//! left to the graph assembler.

mod figures;
mod hyperlinks;
mod list_items;

pub use figures::FigureGraphBuilder;
pub use hyperlinks::{HyperlinkExtractor, TargetKind};
pub use list_items::ListItemExtractor;
