//! List-item nodes for list blocks.

use crate::model::{
    chunk_node_id, list_item_node_id, Chunk, Edge, ListItem, Node, Relation, Subgraph,
};

/// Splits list blocks into `ListItem` nodes linked with `HAS_ITEM`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ListItemExtractor;

impl ListItemExtractor {
    /// Create an extractor.
    pub fn new() -> Self {
        Self
    }

    /// Check whether a chunk carries list entries.
    pub fn is_list_chunk(chunk: &Chunk) -> bool {
        chunk.chunk_type.is_list_block() || !chunk.items.is_empty()
    }

    /// Normalize one raw entry: trims it and drops a leading bullet glyph.
    ///
    /// Returns `None` for entries that are empty afterwards.
    pub fn clean_item(raw: &str) -> Option<String> {
        let mut text = raw.trim();
        if text.starts_with('•') {
            text = text.trim_start_matches('•').trim();
        }
        if text.is_empty() {
            None
        } else {
            Some(text.to_string())
        }
    }

    /// Build list-item nodes and edges for every list chunk.
    pub fn extract(&self, chunks: &[Chunk]) -> Subgraph {
        let mut out = Subgraph::new();
        let mut list_chunks = 0usize;

        for chunk in chunks.iter().filter(|c| Self::is_list_chunk(c)) {
            list_chunks += 1;
            let items: Vec<String> = chunk
                .items
                .iter()
                .filter_map(|raw| Self::clean_item(raw))
                .collect();
            if items.is_empty() {
                log::debug!("List chunk {} has no usable items, skipped", chunk.chunk_id);
                continue;
            }

            let chunk_node = chunk_node_id(&chunk.chunk_id);
            for (order, text) in items.into_iter().enumerate() {
                let item = ListItem {
                    id: list_item_node_id(&chunk.chunk_id, order),
                    chunk_id: chunk.chunk_id.clone(),
                    order,
                    text,
                    page_start: chunk.page_start,
                    page_end: chunk.page_end,
                };
                out.edges.push(Edge::new(
                    chunk_node.clone(),
                    item.id.clone(),
                    Relation::HasItem,
                ));
                out.nodes.push(Node::list_item(item));
            }
        }

        log::debug!(
            "ListItemExtractor: {} list chunks, {} items",
            list_chunks,
            out.nodes.len()
        );
        out
    }
}
