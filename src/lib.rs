//! # docgraph
//!
//! Turns the text spans of a technical document into a typed document graph
//! for retrieval-augmented search.
//!
//! Spans (positioned text runs with font metadata, produced by an external
//! layout extractor) are grouped into style-coherent chunks, each chunk gets a
//! semantic role, runs of list items and wrapped headings are coalesced, and a
//! section outline is inferred from font-size statistics. The chunk sequence,
//! outline, list items, figures and hyperlink targets are then merged into one
//! graph of namespaced nodes and typed edges.
//!
//! ## Quick Start
//!
//! ```no_run
//! use docgraph::{DocGraph, JsonFormat};
//!
//! fn main() -> docgraph::Result<()> {
//!     let result = DocGraph::new()
//!         .with_figures("figures.csv")
//!         .run("spans.json")?;
//!
//!     result.write_chunks("output/chunks.csv")?;
//!     result.write_graph_dir("output", JsonFormat::Pretty)?;
//!     println!("{} nodes", result.graph().node_count());
//!     Ok(())
//! }
//! ```
//!
//! ## Stages
//!
//! - **Chunking**: grouping, classification, list and heading coalescing
//! - **Outline**: heading levels from font sizes, stack-based nesting
//! - **Extraction**: list items, figures, hyperlink targets
//! - **Assembly**: id-checked merge into one graph
//! - **Export**: chunk CSV, node/edge CSV, GraphRAG JSON

pub mod chunker;
pub mod error;
pub mod export;
pub mod extract;
pub mod graph;
pub mod hierarchy;
pub mod model;
pub mod pipeline;
pub mod source;

// Re-export commonly used types
pub use chunker::{Chunker, ChunkerConfig};
pub use error::{Error, Result};
pub use export::{GraphRagExport, JsonFormat};
pub use graph::GraphAssembler;
pub use hierarchy::{HierarchyConfig, LevelSource, OrphanPolicy, SectionHierarchyBuilder};
pub use model::{
    BBox, Chunk, ChunkId, ChunkType, Edge, FigureRecord, Graph, LinkTarget, Node, NodeKind,
    Relation, Section, Span,
};
pub use pipeline::{Pipeline, PipelineOptions, PipelineOutput, PipelineStats};
pub use source::{CsvFigureSource, FigureSource, JsonSpanSource, NoFigures, SpanSource};

use std::path::{Path, PathBuf};

/// Chunk spans with the default thresholds.
///
/// # Example
///
/// ```
/// use docgraph::{chunk_spans, BBox, ChunkType, Span};
///
/// let spans = vec![
///     Span::new(1, "Overview", BBox::new(50.0, 40.0, 300.0, 56.0), "Arial", 16.0).bold(),
///     Span::new(1, "Body text.", BBox::new(50.0, 70.0, 300.0, 81.0), "Arial", 11.0),
/// ];
/// let chunks = chunk_spans(spans).unwrap();
/// assert_eq!(chunks[0].chunk_type, ChunkType::SectionH1);
/// ```
pub fn chunk_spans(spans: Vec<Span>) -> Result<Vec<Chunk>> {
    Chunker::default().chunk(spans)
}

/// Chunk a JSON span dump with the default thresholds.
///
/// # Example
///
/// ```no_run
/// use docgraph::chunk_file;
///
/// let chunks = chunk_file("spans.json").unwrap();
/// println!("{} chunks", chunks.len());
/// ```
pub fn chunk_file<P: AsRef<Path>>(path: P) -> Result<Vec<Chunk>> {
    let spans = JsonSpanSource::new(path.as_ref()).spans()?;
    chunk_spans(spans)
}

/// Build the document graph from a chunk sequence with default settings.
pub fn build_graph(chunks: Vec<Chunk>, figures: &[FigureRecord]) -> Result<PipelineOutput> {
    Pipeline::default().build_graph(chunks, figures)
}

/// Build the graph for a chunk artifact and render it as GraphRAG JSON.
///
/// # Example
///
/// ```no_run
/// use docgraph::{to_json, JsonFormat};
///
/// let json = to_json("chunks.csv", JsonFormat::Pretty).unwrap();
/// std::fs::write("graph.json", json).unwrap();
/// ```
pub fn to_json<P: AsRef<Path>>(chunks_path: P, format: JsonFormat) -> Result<String> {
    let chunks = export::read_chunks_file(chunks_path)?;
    let output = build_graph(chunks, &[])?;
    export::to_json(&output.graph, format)
}

/// Builder for a full run over files on disk.
///
/// # Example
///
/// ```no_run
/// use docgraph::{DocGraph, OrphanPolicy};
///
/// let result = DocGraph::new()
///     .with_orphan_policy(OrphanPolicy::DocumentRoot)
///     .with_color_tolerance(20)
///     .run("spans.json")?;
/// println!("{} sections", result.sections().len());
/// # Ok::<(), docgraph::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct DocGraph {
    options: PipelineOptions,
    figures: Option<PathBuf>,
}

impl DocGraph {
    /// Create a builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all settings.
    pub fn with_options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    /// Read figure metadata from a CSV table.
    pub fn with_figures(mut self, path: impl Into<PathBuf>) -> Self {
        self.figures = Some(path.into());
        self
    }

    /// Set the color tolerance used when grouping spans.
    pub fn with_color_tolerance(mut self, tolerance: u32) -> Self {
        self.options.chunker = self.options.chunker.with_color_tolerance(tolerance);
        self
    }

    /// Set which chunks may define section levels.
    pub fn with_level_source(mut self, source: LevelSource) -> Self {
        self.options.hierarchy = self.options.hierarchy.with_level_source(source);
        self
    }

    /// Set the treatment of chunks before the first section.
    pub fn with_orphan_policy(mut self, policy: OrphanPolicy) -> Self {
        self.options.hierarchy = self.options.hierarchy.with_orphan_policy(policy);
        self
    }

    /// Run the pipeline over a JSON span dump.
    ///
    /// If the outline or graph cannot be built, the error is
    /// [`Error::GraphStage`] and [`Error::into_chunks`] returns the chunk
    /// sequence, which can still be written with
    /// [`export::write_chunks_file`].
    pub fn run<P: AsRef<Path>>(self, spans_path: P) -> Result<DocGraphResult> {
        let pipeline = Pipeline::new(self.options);
        let spans = JsonSpanSource::new(spans_path.as_ref());
        let output = match self.figures {
            Some(path) => pipeline.run(&spans, &CsvFigureSource::new(path))?,
            None => pipeline.run(&spans, &NoFigures)?,
        };
        Ok(DocGraphResult { output })
    }

    /// Run the pipeline over in-memory spans.
    pub fn run_spans(self, spans: Vec<Span>) -> Result<DocGraphResult> {
        let pipeline = Pipeline::new(self.options);
        let output = match self.figures {
            Some(path) => pipeline.run(&spans, &CsvFigureSource::new(path))?,
            None => pipeline.run(&spans, &NoFigures)?,
        };
        Ok(DocGraphResult { output })
    }
}

/// Result of a [`DocGraph`] run.
#[derive(Debug, Clone)]
pub struct DocGraphResult {
    /// Everything the pipeline produced
    pub output: PipelineOutput,
}

impl DocGraphResult {
    /// The final chunk sequence.
    pub fn chunks(&self) -> &[Chunk] {
        &self.output.chunks
    }

    /// The outline sections.
    pub fn sections(&self) -> &[Section] {
        &self.output.sections
    }

    /// The assembled graph.
    pub fn graph(&self) -> &Graph {
        &self.output.graph
    }

    /// Run statistics.
    pub fn stats(&self) -> &PipelineStats {
        &self.output.stats
    }

    /// Render the graph as GraphRAG JSON.
    pub fn to_json(&self, format: JsonFormat) -> Result<String> {
        export::to_json(&self.output.graph, format)
    }

    /// Write the chunk artifact.
    pub fn write_chunks<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        export::write_chunks_file(&self.output.chunks, path)
    }

    /// Write the node/edge tables and GraphRAG records into a directory.
    pub fn write_graph_dir<P: AsRef<Path>>(
        &self,
        dir: P,
        format: JsonFormat,
    ) -> Result<Vec<PathBuf>> {
        export::write_graph_dir(&self.output.graph, dir, format)
    }
}
