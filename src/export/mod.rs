//! File formats: the chunk artifact, figure metadata and graph exports.

mod json;
mod tables;

pub use json::{to_json, GraphRagEdge, GraphRagExport, GraphRagNode, JsonFormat};
pub use tables::{
    bbox_to_string, read_chunks, read_figures, write_chunks, write_edges, write_figures,
    write_nodes, NodeRow, CHUNK_COLUMNS, FIGURE_COLUMNS,
};

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::model::{Chunk, FigureRecord, Graph};

/// File name of the chunk artifact.
pub const CHUNKS_FILE: &str = "chunks.csv";
/// File name of the unified node table.
pub const NODES_FILE: &str = "all_nodes.csv";
/// File name of the unified edge table.
pub const EDGES_FILE: &str = "all_edges.csv";
/// File name of the GraphRAG node records.
pub const GRAPHRAG_NODES_FILE: &str = "graphrag_nodes.json";
/// File name of the GraphRAG edge records.
pub const GRAPHRAG_EDGES_FILE: &str = "graphrag_edges.json";

/// Write the chunk artifact to `path`.
pub fn write_chunks_file(chunks: &[Chunk], path: impl AsRef<Path>) -> Result<()> {
    let file = File::create(path)?;
    write_chunks(chunks, BufWriter::new(file))
}

/// Read the chunk artifact from `path`.
pub fn read_chunks_file(path: impl AsRef<Path>) -> Result<Vec<Chunk>> {
    let file = File::open(path)?;
    read_chunks(BufReader::new(file))
}

/// Read a figure table from `path`.
pub fn read_figures_file(path: impl AsRef<Path>) -> Result<Vec<FigureRecord>> {
    let file = File::open(path)?;
    read_figures(BufReader::new(file))
}

/// Write the node/edge CSV tables and the GraphRAG records into `dir`.
///
/// The directory is created when missing. Returns the written paths.
pub fn write_graph_dir(
    graph: &Graph,
    dir: impl AsRef<Path>,
    format: JsonFormat,
) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;

    let nodes_path = dir.join(NODES_FILE);
    write_nodes(graph, BufWriter::new(File::create(&nodes_path)?))?;

    let edges_path = dir.join(EDGES_FILE);
    write_edges(graph, BufWriter::new(File::create(&edges_path)?))?;

    let export = GraphRagExport::from_graph(graph);
    let rag_nodes_path = dir.join(GRAPHRAG_NODES_FILE);
    fs::write(&rag_nodes_path, export.nodes_json(format)?)?;
    let rag_edges_path = dir.join(GRAPHRAG_EDGES_FILE);
    fs::write(&rag_edges_path, export.edges_json(format)?)?;

    log::info!("Wrote graph tables to {}", dir.display());
    Ok(vec![nodes_path, edges_path, rag_nodes_path, rag_edges_path])
}
