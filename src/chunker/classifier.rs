//! Semantic classification of span groups.

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use super::{ChunkerConfig, SpanGroup};
use crate::error::Result;
use crate::model::{round_size, Chunk, ChunkId, ChunkType};

/// Lead of an ordered list item: "1. ", "2) ", "a) ", "б) ".
const ORDERED_LEAD: &str = r"^(\d+[.)]|[a-zA-Zа-яА-Я]\))\s";

/// Summary of a group that the decision rules look at.
#[derive(Debug, Clone)]
struct GroupFeatures {
    text: String,
    mean_size: f64,
    any_bold: bool,
    char_count: usize,
    has_reference: bool,
}

/// Assigns a [`ChunkType`] to each span group and builds the chunk.
pub struct ChunkClassifier<'a> {
    config: &'a ChunkerConfig,
    ordered_lead: Regex,
}

impl<'a> ChunkClassifier<'a> {
    /// Create a classifier over the given thresholds.
    pub fn new(config: &'a ChunkerConfig) -> Result<Self> {
        Ok(Self {
            config,
            ordered_lead: Regex::new(ORDERED_LEAD)?,
        })
    }

    /// Classify every group, numbering chunks in group order.
    pub fn classify_groups(&self, groups: Vec<SpanGroup>) -> Vec<Chunk> {
        groups
            .into_iter()
            .enumerate()
            .map(|(index, group)| self.build_chunk(ChunkId::from_index(index), group))
            .collect()
    }

    /// Classify one group.
    pub fn classify(&self, group: &SpanGroup) -> ChunkType {
        self.decide(&self.features(group))
    }

    /// Build the chunk for one group.
    pub fn build_chunk(&self, chunk_id: ChunkId, group: SpanGroup) -> Chunk {
        let features = self.features(&group);
        let chunk_type = self.decide(&features);

        let bbox = group.spans.first().map(|s| s.bbox);
        let hyperlink_target = group
            .spans
            .iter()
            .find_map(|s| s.hyperlink_target.clone());

        Chunk {
            chunk_id,
            page_start: group.page_start,
            page_end: group.page_end,
            chunk_type,
            font_size: round_size(features.mean_size),
            text: features.text,
            bbox,
            hyperlink_target,
            items: Vec::new(),
        }
    }

    fn features(&self, group: &SpanGroup) -> GroupFeatures {
        let joined = group
            .spans
            .iter()
            .map(|s| s.text.trim())
            .collect::<Vec<_>>()
            .join(" ");
        let text = if self.config.normalize_unicode {
            joined.trim().nfc().collect::<String>()
        } else {
            joined.trim().to_string()
        };

        let count = group.spans.len().max(1) as f64;
        let mean_size = group.spans.iter().map(|s| s.size).sum::<f64>() / count;
        let any_bold = group.spans.iter().any(|s| s.bold);

        let has_reference = group.spans.iter().any(|s| {
            let lower = s.text.to_lowercase();
            self.config
                .reference_markers
                .iter()
                .any(|m| lower.contains(m.as_str()))
        });

        GroupFeatures {
            char_count: text.chars().count(),
            text,
            mean_size,
            any_bold,
            has_reference,
        }
    }

    /// First matching rule wins. Shape checks (list leads, headings) come
    /// before content checks so a short bold bulleted line stays a list item.
    fn decide(&self, f: &GroupFeatures) -> ChunkType {
        let c = self.config;
        let lead = f.text.trim_start();
        let short = f.char_count < c.heading_max_chars;

        if self.ordered_lead.is_match(lead) {
            ChunkType::OrderedListItem
        } else if c.starts_with_marker(lead) {
            ChunkType::ListItem
        } else if f.mean_size >= c.h1_min_size && f.any_bold && short {
            ChunkType::SectionH1
        } else if f.mean_size >= c.h2_min_size
            && f.mean_size < c.h1_min_size
            && f.any_bold
            && short
        {
            ChunkType::SectionH2
        } else if f.mean_size >= c.h3_min_size
            && f.mean_size < c.h2_min_size
            && f.any_bold
            && short
        {
            ChunkType::SectionH3
        } else if f.has_reference {
            ChunkType::Reference
        } else if f.mean_size < c.caption_max_size
            && !f.any_bold
            && f.char_count < c.caption_max_chars
        {
            ChunkType::Caption
        } else {
            ChunkType::Paragraph
        }
    }
}
