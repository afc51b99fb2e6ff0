//! Error types for docgraph library.

use std::io;
use thiserror::Error;

use crate::model::Chunk;

/// Result type alias for docgraph operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while building the document graph.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error reading or writing a CSV table.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Error reading or writing JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An external table lacks required columns.
    #[error("{artifact} is missing required columns: {}", .columns.join(", "))]
    MissingColumns {
        /// Name of the table (e.g. "chunks.csv")
        artifact: String,
        /// The missing column names
        columns: Vec<String>,
    },

    /// An external record violates the input contract.
    #[error("Schema violation: {0}")]
    Schema(String),

    /// No font size qualified as a section heading level.
    #[error("No font size suitable for section levels (need paragraph chunks larger than {min_size}pt)")]
    NoSectionLevels {
        /// Lower bound a candidate size had to exceed
        min_size: f64,
    },

    /// Two nodes in a namespace that must be unique share an id.
    #[error("Duplicate node id: {0}")]
    DuplicateNode(String),

    /// An edge points at a node that was never assembled.
    #[error("Edge {relation} {from} -> {to} references a missing node")]
    DanglingEdge {
        /// Edge source id
        from: String,
        /// Edge target id
        to: String,
        /// Relation tag
        relation: String,
    },

    /// A pattern failed to compile.
    #[error("Invalid pattern: {0}")]
    Regex(#[from] regex::Error),

    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Chunking succeeded but building the outline or graph failed.
    #[error("{source} ({} chunks were built)", .chunks.len())]
    GraphStage {
        /// The finished chunk sequence
        chunks: Vec<Chunk>,
        /// What stopped the graph stage
        source: Box<Error>,
    },
}

impl Error {
    /// The chunk sequence carried by a graph-stage failure.
    pub fn chunks(&self) -> Option<&[Chunk]> {
        match self {
            Error::GraphStage { chunks, .. } => Some(chunks),
            _ => None,
        }
    }

    /// Take the chunk sequence out of a graph-stage failure.
    pub fn into_chunks(self) -> Option<Vec<Chunk>> {
        match self {
            Error::GraphStage { chunks, .. } => Some(chunks),
            _ => None,
        }
    }

    /// The underlying error, looking through a graph-stage wrapper.
    pub fn root(&self) -> &Error {
        match self {
            Error::GraphStage { source, .. } => source.root(),
            other => other,
        }
    }
}
