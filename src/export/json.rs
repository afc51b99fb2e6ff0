//! GraphRAG JSON export.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::tables::NodeRow;
use crate::error::Result;
use crate::model::{Edge, Graph, Node};

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Node record of the GraphRAG export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphRagNode {
    /// Node id
    pub id: String,
    /// Node label
    #[serde(rename = "type")]
    pub node_type: String,
    /// Main text: chunk/section/item text, caption, or link value
    pub text: String,
    /// Remaining non-empty columns plus `label`
    pub attributes: Map<String, Value>,
}

/// Edge record of the GraphRAG export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphRagEdge {
    /// Source node id
    pub source: String,
    /// Target node id
    pub target: String,
    /// Relation tag
    #[serde(rename = "type")]
    pub edge_type: String,
}

/// Both GraphRAG tables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphRagExport {
    /// Node records in graph order
    pub nodes: Vec<GraphRagNode>,
    /// Edge records in graph order
    pub edges: Vec<GraphRagEdge>,
}

// Columns carried at the top level of a node record instead of in `attributes`.
const TEXT_COLUMNS: [&str; 4] = ["id", "text", "caption_text", "value"];

impl GraphRagNode {
    /// Build the record for one node.
    pub fn from_node(node: &Node) -> Self {
        let mut attributes = Map::new();
        if let Ok(Value::Object(row)) = serde_json::to_value(NodeRow::from_node(node)) {
            for (key, value) in row {
                if value.is_null() || TEXT_COLUMNS.contains(&key.as_str()) {
                    continue;
                }
                attributes.insert(key, value);
            }
        }

        Self {
            id: node.id.clone(),
            node_type: node.label().to_string(),
            text: node.text().to_string(),
            attributes,
        }
    }
}

impl From<&Edge> for GraphRagEdge {
    fn from(edge: &Edge) -> Self {
        Self {
            source: edge.source.clone(),
            target: edge.target.clone(),
            edge_type: edge.relation.to_string(),
        }
    }
}

impl GraphRagExport {
    /// Convert an assembled graph.
    pub fn from_graph(graph: &Graph) -> Self {
        Self {
            nodes: graph.nodes.iter().map(GraphRagNode::from_node).collect(),
            edges: graph.edges.iter().map(GraphRagEdge::from).collect(),
        }
    }

    /// Serialize the node records alone.
    pub fn nodes_json(&self, format: JsonFormat) -> Result<String> {
        render(&self.nodes, format)
    }

    /// Serialize the edge records alone.
    pub fn edges_json(&self, format: JsonFormat) -> Result<String> {
        render(&self.edges, format)
    }
}

fn render<T: Serialize + ?Sized>(value: &T, format: JsonFormat) -> Result<String> {
    let json = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(value)?,
        JsonFormat::Compact => serde_json::to_string(value)?,
    };
    Ok(json)
}

/// Convert a graph to a single GraphRAG document (`{"nodes": [...], "edges": [...]}`).
pub fn to_json(graph: &Graph, format: JsonFormat) -> Result<String> {
    render(&GraphRagExport::from_graph(graph), format)
}
