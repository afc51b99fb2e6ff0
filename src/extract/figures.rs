//! Figure nodes and caption edges.

use std::collections::HashSet;

use crate::model::{chunk_node_id, Edge, FigureRecord, Node, Relation, Subgraph};

/// Turns figure metadata rows into `Figure` nodes linked to their captions.
#[derive(Debug, Default, Clone, Copy)]
pub struct FigureGraphBuilder;

impl FigureGraphBuilder {
    /// Create a builder.
    pub fn new() -> Self {
        Self
    }

    /// One node per record, plus `CAPTIONS` from the caption chunk when known.
    ///
    /// A record repeating an earlier `figure_id` is dropped with its caption.
    pub fn build(&self, figures: &[FigureRecord]) -> Subgraph {
        let mut out = Subgraph::new();
        let mut seen = HashSet::new();

        for figure in figures {
            if !seen.insert(figure.figure_id.as_str()) {
                log::debug!("Duplicate figure {} dropped", figure.figure_id);
                continue;
            }
            let node = Node::figure(figure.clone());
            if let Some(caption) = &figure.caption_chunk {
                out.edges.push(Edge::new(
                    chunk_node_id(caption),
                    node.id.clone(),
                    Relation::Captions,
                ));
            }
            out.nodes.push(node);
        }

        log::debug!(
            "FigureGraphBuilder: {} figures, {} captions",
            out.nodes.len(),
            out.edges.len()
        );
        out
    }
}
