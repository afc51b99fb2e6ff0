//! Typed graph nodes and edges.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{Chunk, ChunkId, FigureRecord, ListItem, Section};

/// Node id of a chunk (`chunk_<chunk_id>`).
pub fn chunk_node_id(chunk_id: &ChunkId) -> String {
    format!("chunk_{}", chunk_id)
}

/// Node id of the section backed by a heading chunk (`section_<chunk_id>`).
pub fn section_node_id(chunk_id: &ChunkId) -> String {
    format!("section_{}", chunk_id)
}

/// Node id of a list entry (`listitem_<chunk_id>_<order>`).
pub fn list_item_node_id(chunk_id: &ChunkId, order: usize) -> String {
    format!("listitem_{}_{}", chunk_id, order)
}

/// Kind of a graph node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    /// Classified chunk
    Chunk,
    /// Outline section
    Section,
    /// Entry of a list block
    ListItem,
    /// Extracted figure
    Figure,
    /// Internal link target (page or note number)
    ReferenceTarget,
    /// External URL
    Url,
}

impl NodeKind {
    /// Label used in exported tables.
    pub fn label(&self) -> &'static str {
        match self {
            NodeKind::Chunk => "Chunk",
            NodeKind::Section => "Section",
            NodeKind::ListItem => "ListItem",
            NodeKind::Figure => "Figure",
            NodeKind::ReferenceTarget => "ReferenceTarget",
            NodeKind::Url => "Url",
        }
    }

    /// Whether later duplicates of this kind are dropped instead of rejected.
    pub fn first_seen_wins(&self) -> bool {
        matches!(
            self,
            NodeKind::Figure | NodeKind::ReferenceTarget | NodeKind::Url
        )
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Payload of a graph node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "label")]
pub enum NodeData {
    /// A chunk of the final chunk sequence
    Chunk(Chunk),
    /// An outline section
    Section(Section),
    /// A list entry
    ListItem(ListItem),
    /// A figure from the asset extractor
    Figure(FigureRecord),
    /// An internal link target
    ReferenceTarget {
        /// Target value (page or note number)
        value: String,
    },
    /// An external link
    Url {
        /// The URL
        value: String,
    },
}

/// A graph node: a namespaced id plus a typed payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Globally unique id
    pub id: String,

    /// Typed payload
    pub data: NodeData,
}

impl Node {
    /// Node for a chunk.
    pub fn chunk(chunk: Chunk) -> Self {
        Self {
            id: chunk_node_id(&chunk.chunk_id),
            data: NodeData::Chunk(chunk),
        }
    }

    /// Node for a section.
    pub fn section(section: Section) -> Self {
        Self {
            id: section.id.clone(),
            data: NodeData::Section(section),
        }
    }

    /// Node for a list item.
    pub fn list_item(item: ListItem) -> Self {
        Self {
            id: item.id.clone(),
            data: NodeData::ListItem(item),
        }
    }

    /// Node for a figure.
    pub fn figure(figure: FigureRecord) -> Self {
        Self {
            id: figure.node_id(),
            data: NodeData::Figure(figure),
        }
    }

    /// Kind of the node.
    pub fn kind(&self) -> NodeKind {
        match self.data {
            NodeData::Chunk(_) => NodeKind::Chunk,
            NodeData::Section(_) => NodeKind::Section,
            NodeData::ListItem(_) => NodeKind::ListItem,
            NodeData::Figure(_) => NodeKind::Figure,
            NodeData::ReferenceTarget { .. } => NodeKind::ReferenceTarget,
            NodeData::Url { .. } => NodeKind::Url,
        }
    }

    /// Label of the node kind.
    pub fn label(&self) -> &'static str {
        self.kind().label()
    }

    /// Main text of the node: chunk/section/item text, caption, or link value.
    pub fn text(&self) -> &str {
        match &self.data {
            NodeData::Chunk(c) => &c.text,
            NodeData::Section(s) => &s.text,
            NodeData::ListItem(i) => &i.text,
            NodeData::Figure(f) => &f.caption_text,
            NodeData::ReferenceTarget { value } | NodeData::Url { value } => value,
        }
    }
}

/// Relation carried by an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Relation {
    /// Section contains a chunk
    HasChunk,
    /// Section contains a subsection
    HasSubsection,
    /// List block contains an item
    HasItem,
    /// Chunk is the caption of a figure
    Captions,
    /// Chunk links to a reference target or URL
    LinksTo,
}

impl Relation {
    /// Tag used in exported tables.
    pub fn as_str(&self) -> &'static str {
        match self {
            Relation::HasChunk => "HAS_CHUNK",
            Relation::HasSubsection => "HAS_SUBSECTION",
            Relation::HasItem => "HAS_ITEM",
            Relation::Captions => "CAPTIONS",
            Relation::LinksTo => "LINKS_TO",
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A directed, typed edge between two node ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    /// Source node id
    pub source: String,
    /// Target node id
    pub target: String,
    /// Relation
    pub relation: Relation,
}

impl Edge {
    /// Create an edge.
    pub fn new(source: impl Into<String>, target: impl Into<String>, relation: Relation) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            relation,
        }
    }
}

/// Node and edge tables produced by one extractor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Subgraph {
    /// Nodes in emission order
    pub nodes: Vec<Node>,
    /// Edges in emission order
    pub edges: Vec<Edge>,
}

impl Subgraph {
    /// Create an empty subgraph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if nothing was produced.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }
}

/// The assembled document graph.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Graph {
    /// Nodes in assembly order
    pub nodes: Vec<Node>,
    /// Edges in assembly order
    pub edges: Vec<Edge>,
}

impl Graph {
    /// Find a node by id.
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Nodes of one kind, in assembly order.
    pub fn nodes_of(&self, kind: NodeKind) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(move |n| n.kind() == kind)
    }

    /// Edges carrying one relation, in assembly order.
    pub fn edges_of(&self, relation: Relation) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(move |e| e.relation == relation)
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}
