//! Chunking thresholds and configuration.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Heuristic thresholds used to group spans and classify chunks.
///
/// Defaults are tuned for single-column technical manuals typeset with a
/// 10-11pt body font and 12-18pt bold headings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkerConfig {
    /// Two colors are "equal" when their packed values differ by less than this
    pub color_tolerance: u32,

    /// Spans at least this large use `large_gap` as the leading tolerance
    pub large_size_cutoff: f64,

    /// Maximum vertical gap between spans of large type
    pub large_gap: f64,

    /// Maximum vertical gap between spans of regular type
    pub small_gap: f64,

    /// Bullet glyphs; also used to detect unordered list items
    pub list_markers: Vec<String>,

    /// Headings must be shorter than this many characters
    pub heading_max_chars: usize,

    /// Minimum mean size of a bold `section_h1`
    pub h1_min_size: f64,

    /// Minimum mean size of a bold `section_h2`
    pub h2_min_size: f64,

    /// Minimum mean size of a bold `section_h3`
    pub h3_min_size: f64,

    /// Captions are smaller than this
    pub caption_max_size: f64,

    /// Captions are shorter than this many characters
    pub caption_max_chars: usize,

    /// Lowercase substrings marking a cross-reference
    pub reference_markers: Vec<String>,

    /// Apply Unicode NFC normalization to chunk text
    pub normalize_unicode: bool,
}

impl ChunkerConfig {
    /// Create a configuration with default thresholds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the color tolerance.
    pub fn with_color_tolerance(mut self, tolerance: u32) -> Self {
        self.color_tolerance = tolerance;
        self
    }

    /// Set the vertical gap thresholds for large and regular type.
    pub fn with_gaps(mut self, large: f64, small: f64) -> Self {
        self.large_gap = large;
        self.small_gap = small;
        self
    }

    /// Set the size from which `large_gap` applies.
    pub fn with_large_size_cutoff(mut self, size: f64) -> Self {
        self.large_size_cutoff = size;
        self
    }

    /// Set the heading size cutoffs.
    pub fn with_heading_sizes(mut self, h1: f64, h2: f64, h3: f64) -> Self {
        self.h1_min_size = h1;
        self.h2_min_size = h2;
        self.h3_min_size = h3;
        self
    }

    /// Replace the reference markers.
    pub fn with_reference_markers<I, S>(mut self, markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.reference_markers = markers
            .into_iter()
            .map(|m| m.into().to_lowercase())
            .collect();
        self
    }

    /// Enable or disable Unicode normalization.
    pub fn with_unicode_normalization(mut self, enabled: bool) -> Self {
        self.normalize_unicode = enabled;
        self
    }

    /// Maximum vertical gap tolerated before a span of `size`.
    pub fn max_gap(&self, size: f64) -> f64 {
        if size >= self.large_size_cutoff {
            self.large_gap
        } else {
            self.small_gap
        }
    }

    /// Check if `text` (already trimmed) is a bare list marker glyph.
    pub fn is_marker(&self, text: &str) -> bool {
        self.list_markers.iter().any(|m| m == text)
    }

    /// Check if `text` starts with a list marker glyph.
    pub fn starts_with_marker(&self, text: &str) -> bool {
        self.list_markers
            .iter()
            .any(|m| !m.is_empty() && text.starts_with(m.as_str()))
    }

    /// Reject configurations whose size cutoffs overlap.
    pub fn validate(&self) -> Result<()> {
        if !(self.h3_min_size <= self.h2_min_size && self.h2_min_size <= self.h1_min_size) {
            return Err(Error::Config(format!(
                "heading sizes must satisfy h3 <= h2 <= h1 (got {}, {}, {})",
                self.h3_min_size, self.h2_min_size, self.h1_min_size
            )));
        }
        if self.large_gap < 0.0 || self.small_gap < 0.0 {
            return Err(Error::Config("gap thresholds must be non-negative".into()));
        }
        Ok(())
    }
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            color_tolerance: 10,
            large_size_cutoff: 13.0,
            large_gap: 10.0,
            small_gap: 6.0,
            list_markers: ["•", "-", "–", "·", "◦", "*"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            heading_max_chars: 160,
            h1_min_size: 16.0,
            h2_min_size: 13.5,
            h3_min_size: 12.0,
            caption_max_size: 12.0,
            caption_max_chars: 100,
            reference_markers: ["рис", "табл", "см.", "fig.", "tab.", "see also"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            normalize_unicode: true,
        }
    }
}
