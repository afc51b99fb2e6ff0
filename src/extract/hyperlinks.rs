//! Link-target nodes for chunk hyperlinks.

use std::collections::HashSet;

use md5::{Digest, Md5};

use crate::model::{chunk_node_id, Chunk, Edge, LinkTarget, Node, NodeData, Relation, Subgraph};

/// How a raw hyperlink target is represented in the graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetKind {
    /// Internal target (page or note number)
    Reference(String),
    /// External URL
    Url(String),
}

impl TargetKind {
    /// Classify a chunk's link target.
    ///
    /// `http://` and `https://` targets are URLs, integers are references,
    /// blanks yield `None` and anything else is kept as a URL.
    pub fn classify(target: &LinkTarget) -> Option<Self> {
        match target {
            LinkTarget::Page(n) => Some(TargetKind::Reference(n.to_string())),
            LinkTarget::Uri(raw) => {
                let value = raw.trim();
                if value.is_empty() {
                    None
                } else if value.starts_with("http://") || value.starts_with("https://") {
                    Some(TargetKind::Url(value.to_string()))
                } else if value.parse::<i64>().is_ok() {
                    Some(TargetKind::Reference(value.to_string()))
                } else {
                    Some(TargetKind::Url(value.to_string()))
                }
            }
        }
    }

    /// Graph node id for this target.
    pub fn node_id(&self) -> String {
        match self {
            TargetKind::Reference(value) => format!("ref_{}", value),
            TargetKind::Url(value) => format!("url_{}", url_digest(value)),
        }
    }

    fn into_node(self) -> Node {
        let id = self.node_id();
        let data = match self {
            TargetKind::Reference(value) => NodeData::ReferenceTarget { value },
            TargetKind::Url(value) => NodeData::Url { value },
        };
        Node { id, data }
    }
}

/// First 12 hex digits of the MD5 digest of a URL.
fn url_digest(url: &str) -> String {
    let digest = Md5::digest(url.as_bytes());
    let hex: String = digest.iter().map(|b| format!("{:02x}", b)).collect();
    hex[..12].to_string()
}

/// Emits one target node per distinct link and a `LINKS_TO` edge per occurrence.
#[derive(Debug, Default, Clone, Copy)]
pub struct HyperlinkExtractor;

impl HyperlinkExtractor {
    /// Create an extractor.
    pub fn new() -> Self {
        Self
    }

    /// Build target nodes and link edges for every chunk with a hyperlink.
    pub fn extract(&self, chunks: &[Chunk]) -> Subgraph {
        let mut out = Subgraph::new();
        let mut seen: HashSet<String> = HashSet::new();

        for chunk in chunks {
            let Some(kind) = chunk.hyperlink_target.as_ref().and_then(TargetKind::classify)
            else {
                continue;
            };

            let target_id = kind.node_id();
            out.edges.push(Edge::new(
                chunk_node_id(&chunk.chunk_id),
                target_id.clone(),
                Relation::LinksTo,
            ));
            if seen.insert(target_id) {
                out.nodes.push(kind.into_node());
            }
        }

        log::debug!(
            "HyperlinkExtractor: {} targets, {} links",
            out.nodes.len(),
            out.edges.len()
        );
        out
    }
}
