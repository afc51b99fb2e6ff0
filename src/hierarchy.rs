//! Section outline construction.
//!
//! Heading levels are inferred from font-size statistics of the chunk
//! sequence, then a single forward pass with a stack of open sections builds
//! the outline and emits the containment edges.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{
    chunk_node_id, section_node_id, Chunk, ChunkType, Edge, Node, Relation, Section,
    SectionArena, Subgraph, ROOT_SECTION_ID,
};

/// Deepest outline level that can be inferred.
pub const MAX_LEVELS: usize = 2;

/// Which chunks may seed and receive section levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelSource {
    /// Only `paragraph` chunks (large unbolded type set as headings)
    #[default]
    Paragraphs,
    /// `paragraph` chunks and chunks classified `section_h1/h2/h3`
    ParagraphsAndHeadings,
}

impl LevelSource {
    fn admits(&self, chunk_type: ChunkType) -> bool {
        match self {
            LevelSource::Paragraphs => chunk_type == ChunkType::Paragraph,
            LevelSource::ParagraphsAndHeadings => {
                chunk_type == ChunkType::Paragraph || chunk_type.is_heading()
            }
        }
    }
}

/// What happens to chunks that appear before the first section opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrphanPolicy {
    /// Leave them without a containment edge
    #[default]
    Drop,
    /// Attach them to a synthetic `section_root` section
    DocumentRoot,
}

/// Configuration of level inference and outline building.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HierarchyConfig {
    /// Candidate heading sizes must be strictly larger than this
    pub min_heading_size: f64,

    /// Number of outline levels to infer
    pub max_levels: usize,

    /// Chunks considered for level inference and promotion
    pub level_source: LevelSource,

    /// Treatment of chunks preceding the first section
    pub orphan_policy: OrphanPolicy,
}

impl HierarchyConfig {
    /// Create a configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the level source.
    pub fn with_level_source(mut self, source: LevelSource) -> Self {
        self.level_source = source;
        self
    }

    /// Set the orphan policy.
    pub fn with_orphan_policy(mut self, policy: OrphanPolicy) -> Self {
        self.orphan_policy = policy;
        self
    }

    /// Set the minimum heading size.
    pub fn with_min_heading_size(mut self, size: f64) -> Self {
        self.min_heading_size = size;
        self
    }

    /// Reject level counts outside `1..=MAX_LEVELS`.
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_LEVELS).contains(&self.max_levels) {
            return Err(Error::Config(format!(
                "max_levels must be between 1 and {} (got {})",
                MAX_LEVELS, self.max_levels
            )));
        }
        Ok(())
    }
}

impl Default for HierarchyConfig {
    fn default() -> Self {
        Self {
            min_heading_size: 12.0,
            max_levels: 2,
            level_source: LevelSource::default(),
            orphan_policy: OrphanPolicy::default(),
        }
    }
}

/// Mapping from heading font size to outline level.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SectionLevels {
    /// `(size, level)` pairs, largest size (level 1) first
    pub sizes: Vec<(f64, u8)>,
    by_key: HashMap<i64, u8>,
    source: LevelSource,
}

impl SectionLevels {
    /// Level of a chunk, or 0 when it does not open a section.
    pub fn level_of(&self, chunk: &Chunk) -> u8 {
        if !self.source.admits(chunk.chunk_type) {
            return 0;
        }
        self.by_key.get(&chunk.size_key()).copied().unwrap_or(0)
    }

    /// Number of inferred levels.
    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    /// Check if no level was inferred.
    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }
}

/// Result of outline building.
#[derive(Debug, Clone, Default)]
pub struct SectionHierarchy {
    /// Inferred size-to-level mapping
    pub levels: SectionLevels,
    /// Sections in document order, with parent links
    pub arena: SectionArena,
    /// `HAS_SUBSECTION` and `HAS_CHUNK` edges in emission order
    pub edges: Vec<Edge>,
}

impl SectionHierarchy {
    /// Section graph nodes in document order.
    pub fn nodes(&self) -> Vec<Node> {
        self.arena.iter().cloned().map(Node::section).collect()
    }

    /// Node and edge tables for graph assembly.
    pub fn into_subgraph(self) -> Subgraph {
        Subgraph {
            nodes: self.nodes(),
            edges: self.edges,
        }
    }
}

/// Builds the section forest over a final chunk sequence.
#[derive(Debug, Clone, Default)]
pub struct SectionHierarchyBuilder {
    config: HierarchyConfig,
}

impl SectionHierarchyBuilder {
    /// Create a builder.
    pub fn new(config: HierarchyConfig) -> Self {
        Self { config }
    }

    /// Infer heading levels from the distinct sizes of eligible chunks.
    ///
    /// The largest `max_levels` distinct sizes above `min_heading_size` map to
    /// levels 1, 2, ... in descending order. Fails when no size qualifies.
    pub fn detect_levels(&self, chunks: &[Chunk]) -> Result<SectionLevels> {
        self.config.validate()?;
        let source = self.config.level_source;
        let candidates: BTreeSet<i64> = chunks
            .iter()
            .filter(|c| source.admits(c.chunk_type))
            .filter(|c| c.font_size > self.config.min_heading_size)
            .map(|c| c.size_key())
            .collect();

        if candidates.is_empty() {
            return Err(Error::NoSectionLevels {
                min_size: self.config.min_heading_size,
            });
        }

        let mut levels = SectionLevels {
            source,
            ..Default::default()
        };
        for (key, level) in candidates
            .into_iter()
            .rev()
            .take(self.config.max_levels)
            .zip(1u8..)
        {
            levels.by_key.insert(key, level);
            levels.sizes.push((key as f64 / 100.0, level));
        }

        for (size, level) in &levels.sizes {
            log::info!("Section level L{} <- font_size {}", level, size);
        }
        Ok(levels)
    }

    /// Build the outline in one pass over `chunks`.
    pub fn build(&self, chunks: &[Chunk]) -> Result<SectionHierarchy> {
        let levels = self.detect_levels(chunks)?;

        let mut arena = SectionArena::new();
        let mut edges = Vec::new();
        let mut stack: Vec<usize> = Vec::new();
        let mut root: Option<usize> = None;
        let mut dropped = 0usize;

        for chunk in chunks {
            let chunk_node = chunk_node_id(&chunk.chunk_id);
            let level = levels.level_of(chunk);

            if level > 0 {
                // close open sections of the same or a deeper level
                while let Some(&top) = stack.last() {
                    match arena.get(top) {
                        Some(open) if open.level >= level => {
                            stack.pop();
                        }
                        _ => break,
                    }
                }

                let parent = stack.last().copied();
                let section = Section {
                    id: section_node_id(&chunk.chunk_id),
                    level,
                    chunk_id: Some(chunk.chunk_id.clone()),
                    text: chunk.text.clone(),
                    page_start: chunk.page_start,
                    page_end: chunk.page_end,
                    font_size: chunk.font_size,
                    bbox: chunk.bbox,
                    parent,
                };
                let section_id = section.id.clone();

                if let Some(parent_section) = parent.and_then(|p| arena.get(p)) {
                    edges.push(Edge::new(
                        parent_section.id.clone(),
                        section_id.clone(),
                        Relation::HasSubsection,
                    ));
                }

                stack.push(arena.push(section));
                // a heading's chunk belongs to the section it defines
                edges.push(Edge::new(section_id, chunk_node, Relation::HasChunk));
            } else if let Some(open) = stack.last().and_then(|&top| arena.get(top)) {
                edges.push(Edge::new(open.id.clone(), chunk_node, Relation::HasChunk));
            } else {
                match self.config.orphan_policy {
                    OrphanPolicy::Drop => dropped += 1,
                    OrphanPolicy::DocumentRoot => {
                        let index = match root {
                            Some(index) => index,
                            None => {
                                let index = arena.push(Self::root_section(chunk));
                                root = Some(index);
                                index
                            }
                        };
                        if let Some(section) = arena.get_mut(index) {
                            section.page_end = section.page_end.max(chunk.page_end);
                        }
                        edges.push(Edge::new(ROOT_SECTION_ID, chunk_node, Relation::HasChunk));
                    }
                }
            }
        }

        if dropped > 0 {
            log::debug!(
                "{} chunks precede the first section and stay unattached",
                dropped
            );
        }
        log::info!(
            "Built {} sections, {} containment edges",
            arena.len(),
            edges.len()
        );

        Ok(SectionHierarchy {
            levels,
            arena,
            edges,
        })
    }

    fn root_section(first_orphan: &Chunk) -> Section {
        Section {
            id: ROOT_SECTION_ID.to_string(),
            level: 0,
            chunk_id: None,
            text: String::new(),
            page_start: first_orphan.page_start,
            page_end: first_orphan.page_end,
            font_size: 0.0,
            bbox: None,
            parent: None,
        }
    }
}
