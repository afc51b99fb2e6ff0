//! Span-to-chunk stages: grouping, classification and coalescing.
//!
//! The stages run strictly in order over one document:
//!
//! 1. [`SpanGrouper`] merges adjacent same-style spans into groups.
//! 2. [`ChunkClassifier`] types each group and assigns its chunk id.
//! 3. [`ListCoalescer`] turns runs of list items into list blocks.
//! 4. [`HeadingCoalescer`] joins headings that wrapped over several groups.
//!
//! The resulting chunk sequence is the artifact every later stage reads.

mod classifier;
mod coalesce;
mod grouper;
mod options;

pub use classifier::ChunkClassifier;
pub use coalesce::{HeadingCoalescer, ListCoalescer};
pub use grouper::{SpanGroup, SpanGrouper};
pub use options::ChunkerConfig;

use crate::error::Result;
use crate::model::{Chunk, Span};

/// Runs the four chunking stages with one configuration.
#[derive(Debug, Clone, Default)]
pub struct Chunker {
    config: ChunkerConfig,
}

impl Chunker {
    /// Create a chunker with the given thresholds.
    pub fn new(config: ChunkerConfig) -> Self {
        Self { config }
    }

    /// The thresholds in use.
    pub fn config(&self) -> &ChunkerConfig {
        &self.config
    }

    /// Turn reading-order spans into the final chunk sequence.
    pub fn chunk(&self, spans: Vec<Span>) -> Result<Vec<Chunk>> {
        self.config.validate()?;

        let span_count = spans.len();
        let groups = SpanGrouper::new(&self.config).group(spans);
        let chunks = ChunkClassifier::new(&self.config)?.classify_groups(groups);
        let classified = chunks.len();
        let chunks = ListCoalescer::new().coalesce(chunks);
        let chunks = HeadingCoalescer::new().coalesce(chunks);

        log::info!(
            "Chunked {} spans into {} chunks ({} before coalescing)",
            span_count,
            chunks.len(),
            classified
        );
        Ok(chunks)
    }
}
