//! Graph assembly: merges per-extractor node/edge tables into one graph.

use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::model::{Chunk, Edge, Graph, Node, Subgraph};

/// Seen-id bookkeeping for one assembly run.
#[derive(Debug, Default)]
pub struct AssemblyContext {
    seen: HashSet<String>,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    dropped: usize,
}

impl AssemblyContext {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node, applying the duplicate policy of its kind.
    ///
    /// Returns whether the node was kept.
    pub fn add_node(&mut self, node: Node) -> Result<bool> {
        if self.seen.contains(&node.id) {
            if node.kind().first_seen_wins() {
                log::debug!("Duplicate {} node {} dropped", node.label(), node.id);
                self.dropped += 1;
                return Ok(false);
            }
            return Err(Error::DuplicateNode(node.id));
        }
        self.seen.insert(node.id.clone());
        self.nodes.push(node);
        Ok(true)
    }

    /// Add an edge whose endpoints must already be assembled.
    pub fn add_edge(&mut self, edge: Edge) -> Result<()> {
        if !self.contains(&edge.source) || !self.contains(&edge.target) {
            return Err(Error::DanglingEdge {
                from: edge.source,
                to: edge.target,
                relation: edge.relation.to_string(),
            });
        }
        self.edges.push(edge);
        Ok(())
    }

    /// Check whether a node id has been assembled.
    pub fn contains(&self, id: &str) -> bool {
        self.seen.contains(id)
    }

    /// Number of duplicate nodes dropped so far.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Finish assembly.
    pub fn into_graph(self) -> Graph {
        Graph {
            nodes: self.nodes,
            edges: self.edges,
        }
    }
}

/// Inputs of one assembly, one table per producer.
#[derive(Debug, Clone, Default)]
pub struct GraphParts {
    /// Section nodes and containment edges
    pub sections: Subgraph,
    /// List-item nodes and `HAS_ITEM` edges
    pub list_items: Subgraph,
    /// Figure nodes and `CAPTIONS` edges
    pub figures: Subgraph,
    /// Link-target nodes and `LINKS_TO` edges
    pub hyperlinks: Subgraph,
}

/// Merges the chunk sequence and extractor tables in a fixed order.
#[derive(Debug, Default, Clone, Copy)]
pub struct GraphAssembler;

impl GraphAssembler {
    /// Create an assembler.
    pub fn new() -> Self {
        Self
    }

    /// Assemble nodes (chunks, sections, list items, figures, link targets),
    /// then edges in the same producer order.
    pub fn assemble(&self, chunks: &[Chunk], parts: GraphParts) -> Result<Graph> {
        let mut ctx = AssemblyContext::new();

        for chunk in chunks {
            ctx.add_node(Node::chunk(chunk.clone()))?;
        }

        let GraphParts {
            sections,
            list_items,
            figures,
            hyperlinks,
        } = parts;
        let tables = [sections, list_items, figures, hyperlinks];

        let mut edges = Vec::with_capacity(tables.iter().map(|t| t.edges.len()).sum());
        for table in tables {
            for node in table.nodes {
                ctx.add_node(node)?;
            }
            edges.extend(table.edges);
        }
        for edge in edges {
            ctx.add_edge(edge)?;
        }

        if ctx.dropped() > 0 {
            log::debug!("{} duplicate nodes dropped during assembly", ctx.dropped());
        }
        let graph = ctx.into_graph();
        log::info!(
            "Assembled graph: {} nodes, {} edges",
            graph.node_count(),
            graph.edge_count()
        );
        Ok(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ChunkType, NodeData, Relation};

    fn chunk(id: &str) -> Chunk {
        Chunk::new(id, ChunkType::Paragraph, 1, 11.0, id)
    }

    fn url(id: &str, value: &str) -> Node {
        Node {
            id: id.to_string(),
            data: NodeData::Url {
                value: value.to_string(),
            },
        }
    }

    #[test]
    fn test_nodes_precede_edges_in_producer_order() {
        let chunks = vec![chunk("ch0000"), chunk("ch0001")];
        let parts = GraphParts {
            hyperlinks: Subgraph {
                nodes: vec![url("url_a", "https://a")],
                edges: vec![Edge::new("chunk_ch0001", "url_a", Relation::LinksTo)],
            },
            ..Default::default()
        };
        let graph = GraphAssembler::new().assemble(&chunks, parts).unwrap();

        let ids: Vec<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["chunk_ch0000", "chunk_ch0001", "url_a"]);
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_first_seen_wins_for_link_targets() {
        let parts = GraphParts {
            hyperlinks: Subgraph {
                nodes: vec![url("url_a", "first"), url("url_a", "second")],
                edges: Vec::new(),
            },
            ..Default::default()
        };
        let graph = GraphAssembler::new().assemble(&[], parts).unwrap();
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.nodes[0].text(), "first");
    }

    #[test]
    fn test_duplicate_chunk_is_an_error() {
        let err = GraphAssembler::new()
            .assemble(&[chunk("ch0000"), chunk("ch0000")], GraphParts::default())
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateNode(id) if id == "chunk_ch0000"));
    }

    #[test]
    fn test_dangling_edge_is_an_error() {
        let parts = GraphParts {
            figures: Subgraph {
                nodes: Vec::new(),
                edges: vec![Edge::new("chunk_ch0009", "figure_1", Relation::Captions)],
            },
            ..Default::default()
        };
        let err = GraphAssembler::new()
            .assemble(&[chunk("ch0000")], parts)
            .unwrap_err();
        match err {
            Error::DanglingEdge { from, to, relation } => {
                assert_eq!(from, "chunk_ch0009");
                assert_eq!(to, "figure_1");
                assert_eq!(relation, "CAPTIONS");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }
}
