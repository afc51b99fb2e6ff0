//! Grouping of adjacent same-style spans.

use super::ChunkerConfig;
use crate::model::Span;

/// A run of consecutive spans that will become one chunk.
#[derive(Debug, Clone)]
pub struct SpanGroup {
    /// Member spans in reading order
    pub spans: Vec<Span>,
    /// Page of the first member
    pub page_start: u32,
    /// Page of the last member
    pub page_end: u32,
}

impl SpanGroup {
    fn start(span: Span) -> Self {
        Self {
            page_start: span.page,
            page_end: span.page,
            spans: vec![span],
        }
    }

    fn push(&mut self, span: Span) {
        self.page_end = span.page;
        self.spans.push(span);
    }

    fn last(&self) -> Option<&Span> {
        self.spans.last()
    }

    /// Number of member spans.
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    /// Check if the group has no spans.
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }
}

/// Merges adjacent spans sharing style into groups.
pub struct SpanGrouper<'a> {
    config: &'a ChunkerConfig,
}

impl<'a> SpanGrouper<'a> {
    /// Create a grouper over the given thresholds.
    pub fn new(config: &'a ChunkerConfig) -> Self {
        Self { config }
    }

    /// Group spans (in reading order) into style-homogeneous runs.
    pub fn group(&self, spans: Vec<Span>) -> Vec<SpanGroup> {
        let mut groups = Vec::new();
        let mut current: Option<SpanGroup> = None;

        for span in spans {
            if span.text.trim().is_empty() {
                log::debug!("Skipping blank span on page {}", span.page);
                continue;
            }

            let starts_new = match current.as_ref() {
                Some(group) => group
                    .last()
                    .map_or(true, |prev| !self.continues(prev, &span)),
                None => true,
            };

            if starts_new {
                if let Some(done) = current.replace(SpanGroup::start(span)) {
                    groups.push(done);
                }
            } else if let Some(group) = current.as_mut() {
                group.push(span);
            }
        }

        if let Some(group) = current {
            groups.push(group);
        }

        log::debug!("SpanGrouper: formed {} groups", groups.len());
        groups
    }

    /// Check whether `curr` continues the group ending with `prev`.
    fn continues(&self, prev: &Span, curr: &Span) -> bool {
        // A bare bullet glyph always sticks to the text that follows it
        if self.config.is_marker(prev.text.trim()) {
            return true;
        }

        let gap = curr.bbox.y0 - prev.bbox.y1;
        self.same_style(prev, curr) && gap <= self.config.max_gap(curr.size)
    }

    fn same_style(&self, a: &Span, b: &Span) -> bool {
        a.size == b.size
            && a.bold == b.bold
            && a.italic == b.italic
            && a.color.abs_diff(b.color) < self.config.color_tolerance
            && a.font == b.font
    }
}
