//! End-to-end pipeline: spans to chunks, chunks to the document graph.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::chunker::{Chunker, ChunkerConfig};
use crate::error::{Error, Result};
use crate::extract::{FigureGraphBuilder, HyperlinkExtractor, ListItemExtractor};
use crate::graph::{GraphAssembler, GraphParts};
use crate::hierarchy::{HierarchyConfig, SectionHierarchy, SectionHierarchyBuilder};
use crate::model::{Chunk, FigureRecord, Graph, NodeKind, Section, Span};
use crate::source::{FigureSource, SpanSource};

/// Configuration of a whole pipeline run.
///
/// Every field has a default, so a JSON config file only needs the values it
/// overrides:
///
/// ```json
/// { "chunker": { "color_tolerance": 20 }, "hierarchy": { "orphan_policy": "document_root" } }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineOptions {
    /// Grouping and classification thresholds
    pub chunker: ChunkerConfig,

    /// Level inference and outline settings
    pub hierarchy: HierarchyConfig,
}

impl PipelineOptions {
    /// Create options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the chunker configuration.
    pub fn with_chunker(mut self, config: ChunkerConfig) -> Self {
        self.chunker = config;
        self
    }

    /// Set the hierarchy configuration.
    pub fn with_hierarchy(mut self, config: HierarchyConfig) -> Self {
        self.hierarchy = config;
        self
    }

    /// Parse options from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json)?;
        options.chunker.validate()?;
        options.hierarchy.validate()?;
        Ok(options)
    }

    /// Load options from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_json(&fs::read_to_string(path)?)
    }
}

/// Counts collected over one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineStats {
    /// Input spans (0 when the run started from a chunk artifact)
    pub span_count: usize,

    /// Chunks in the final sequence
    pub chunk_count: usize,

    /// Chunks per type tag
    pub chunk_types: BTreeMap<String, usize>,

    /// Outline sections, including a synthetic root if one was created
    pub section_count: usize,

    /// Containment edges emitted by the outline builder
    pub containment_edges: usize,

    /// List-item nodes
    pub list_item_count: usize,

    /// Figure nodes
    pub figure_count: usize,

    /// Reference-target nodes
    pub reference_count: usize,

    /// URL nodes
    pub url_count: usize,

    /// Nodes in the assembled graph
    pub node_count: usize,

    /// Edges in the assembled graph
    pub edge_count: usize,
}

impl PipelineStats {
    /// Chunk-level counts only.
    pub fn for_chunks(chunks: &[Chunk]) -> Self {
        let mut chunk_types = BTreeMap::new();
        for chunk in chunks {
            *chunk_types
                .entry(chunk.chunk_type.as_str().to_string())
                .or_insert(0) += 1;
        }
        Self {
            chunk_count: chunks.len(),
            chunk_types,
            ..Default::default()
        }
    }

    fn record_graph(&mut self, graph: &Graph) {
        self.list_item_count = graph.nodes_of(NodeKind::ListItem).count();
        self.figure_count = graph.nodes_of(NodeKind::Figure).count();
        self.reference_count = graph.nodes_of(NodeKind::ReferenceTarget).count();
        self.url_count = graph.nodes_of(NodeKind::Url).count();
        self.node_count = graph.node_count();
        self.edge_count = graph.edge_count();
    }
}

/// Everything one run produces.
#[derive(Debug, Clone, Default)]
pub struct PipelineOutput {
    /// Final chunk sequence
    pub chunks: Vec<Chunk>,

    /// Outline sections in document order
    pub sections: Vec<Section>,

    /// Assembled document graph
    pub graph: Graph,

    /// Run statistics
    pub stats: PipelineStats,
}

/// Drives chunking, outline building, extraction and assembly.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    options: PipelineOptions,
}

impl Pipeline {
    /// Create a pipeline.
    pub fn new(options: PipelineOptions) -> Self {
        Self { options }
    }

    /// The options in use.
    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Turn reading-order spans into the final chunk sequence.
    pub fn build_chunks(&self, spans: Vec<Span>) -> Result<Vec<Chunk>> {
        Chunker::new(self.options.chunker.clone()).chunk(spans)
    }

    /// Build the section outline over a chunk sequence.
    pub fn build_hierarchy(&self, chunks: &[Chunk]) -> Result<SectionHierarchy> {
        SectionHierarchyBuilder::new(self.options.hierarchy.clone()).build(chunks)
    }

    /// Build the document graph from a chunk sequence and figure metadata.
    ///
    /// On failure the chunk sequence is handed back inside
    /// [`Error::GraphStage`].
    pub fn build_graph(
        &self,
        chunks: Vec<Chunk>,
        figures: &[FigureRecord],
    ) -> Result<PipelineOutput> {
        match self.graph_stage(&chunks, figures) {
            Ok((sections, graph, stats)) => Ok(PipelineOutput {
                chunks,
                sections,
                graph,
                stats,
            }),
            Err(source) => Err(Error::GraphStage {
                chunks,
                source: Box::new(source),
            }),
        }
    }

    fn graph_stage(
        &self,
        chunks: &[Chunk],
        figures: &[FigureRecord],
    ) -> Result<(Vec<Section>, Graph, PipelineStats)> {
        let hierarchy = self.build_hierarchy(chunks)?;
        let sections: Vec<Section> = hierarchy.arena.iter().cloned().collect();

        let mut stats = PipelineStats::for_chunks(chunks);
        stats.section_count = sections.len();
        stats.containment_edges = hierarchy.edges.len();

        let parts = GraphParts {
            sections: hierarchy.into_subgraph(),
            list_items: ListItemExtractor::new().extract(chunks),
            figures: FigureGraphBuilder::new().build(figures),
            hyperlinks: HyperlinkExtractor::new().extract(chunks),
        };
        let graph = GraphAssembler::new().assemble(chunks, parts)?;
        stats.record_graph(&graph);

        Ok((sections, graph, stats))
    }

    /// Run every stage over the given sources.
    ///
    /// Once chunking has succeeded, any later failure is reported as
    /// [`Error::GraphStage`] carrying the chunk sequence.
    pub fn run<S, F>(&self, spans: &S, figures: &F) -> Result<PipelineOutput>
    where
        S: SpanSource + ?Sized,
        F: FigureSource + ?Sized,
    {
        let spans = spans.spans()?;
        let span_count = spans.len();
        let chunks = self.build_chunks(spans)?;
        let figures = match figures.figures() {
            Ok(figures) => figures,
            Err(source) => {
                return Err(Error::GraphStage {
                    chunks,
                    source: Box::new(source),
                })
            }
        };

        let mut output = self.build_graph(chunks, &figures)?;
        output.stats.span_count = span_count;
        log::info!(
            "Pipeline done: {} spans, {} chunks, {} sections, {} nodes, {} edges",
            span_count,
            output.stats.chunk_count,
            output.stats.section_count,
            output.stats.node_count,
            output.stats.edge_count
        );
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::OrphanPolicy;
    use crate::model::ChunkType;
    use crate::source::NoFigures;

    #[test]
    fn test_options_from_partial_json() {
        let options = PipelineOptions::from_json(
            r#"{"chunker": {"color_tolerance": 20}, "hierarchy": {"orphan_policy": "document_root"}}"#,
        )
        .unwrap();
        assert_eq!(options.chunker.color_tolerance, 20);
        assert_eq!(options.chunker.large_gap, ChunkerConfig::default().large_gap);
        assert_eq!(options.hierarchy.orphan_policy, OrphanPolicy::DocumentRoot);
        assert_eq!(options.hierarchy.max_levels, 2);
    }

    #[test]
    fn test_options_reject_unbounded_levels() {
        let json = r#"{"hierarchy": {"max_levels": 300}}"#;
        let err = PipelineOptions::from_json(json).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_options_reject_inverted_heading_sizes() {
        let json = r#"{"chunker": {"h1_min_size": 10.0}}"#;
        assert!(PipelineOptions::from_json(json).is_err());
    }

    #[test]
    fn test_build_graph_counts() {
        let mut list = Chunk::new("ch0002", ChunkType::ListBlock, 1, 11.0, "• a\n• b");
        list.items = vec!["• a".to_string(), "• b".to_string()];
        let chunks = vec![
            Chunk::new("ch0000", ChunkType::Paragraph, 1, 16.0, "Setup"),
            Chunk::new("ch0001", ChunkType::Paragraph, 1, 11.0, "Body"),
            list,
        ];
        let output = Pipeline::default().build_graph(chunks, &[]).unwrap();

        assert_eq!(output.sections.len(), 1);
        assert_eq!(output.stats.chunk_count, 3);
        assert_eq!(output.stats.chunk_types["paragraph"], 2);
        assert_eq!(output.stats.list_item_count, 2);
        assert_eq!(output.stats.node_count, 3 + 1 + 2);
        // 3 HAS_CHUNK + 2 HAS_ITEM
        assert_eq!(output.stats.edge_count, 5);
    }

    #[test]
    fn test_run_without_headings_keeps_chunks() {
        use crate::model::BBox;

        let spans = vec![Span::new(
            1,
            "Body text without any heading above it.",
            BBox::new(50.0, 60.0, 500.0, 71.0),
            "Times",
            11.0,
        )];
        let err = Pipeline::default().run(&spans, &NoFigures).unwrap_err();

        assert!(matches!(err.root(), Error::NoSectionLevels { .. }));
        let chunks = err.into_chunks().unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "Body text without any heading above it.");
    }

    #[test]
    fn test_source_errors_are_not_wrapped() {
        struct Broken;
        impl SpanSource for Broken {
            fn spans(&self) -> Result<Vec<Span>> {
                Err(Error::Schema("span record 0: bad".into()))
            }
        }
        let err = Pipeline::default().run(&Broken, &NoFigures).unwrap_err();
        assert!(matches!(err, Error::Schema(_)));
    }
}
