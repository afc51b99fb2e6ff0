//! Coalescing passes over the classified chunk sequence.
//!
//! Both passes replace maximal contiguous runs with a single chunk placed at
//! the run's first position; chunks outside runs pass through untouched.

use crate::model::{Chunk, ChunkType};

/// Collapses runs of same-kind list items into list blocks.
#[derive(Debug, Default, Clone, Copy)]
pub struct ListCoalescer;

impl ListCoalescer {
    /// Create a list coalescer.
    pub fn new() -> Self {
        Self
    }

    /// Replace each run of `list_item` / `ordered_list_item` chunks with one
    /// `list_block` / `ordered_list_block`.
    pub fn coalesce(&self, chunks: Vec<Chunk>) -> Vec<Chunk> {
        let mut out: Vec<Chunk> = Vec::with_capacity(chunks.len());
        // head of the open run; its `items` collect the member texts
        let mut open: Option<Chunk> = None;

        for chunk in chunks {
            if let Some(head) = open.as_mut() {
                if head.chunk_type == chunk.chunk_type {
                    head.page_end = chunk.page_end;
                    head.items.push(chunk.text);
                    continue;
                }
            }

            if let Some(head) = open.take() {
                out.push(Self::close_run(head));
            }

            if chunk.chunk_type.is_list_item() {
                let mut head = chunk;
                head.items = vec![head.text.clone()];
                open = Some(head);
            } else {
                out.push(chunk);
            }
        }

        if let Some(head) = open {
            out.push(Self::close_run(head));
        }

        out
    }

    fn close_run(mut head: Chunk) -> Chunk {
        log::debug!(
            "ListCoalescer: {} items merged into {}",
            head.items.len(),
            head.chunk_id
        );

        head.chunk_type = head
            .chunk_type
            .block_type()
            .unwrap_or(ChunkType::ListBlock);
        head.text = head.items.join("\n");
        head.hyperlink_target = None;
        head
    }
}

/// Merges runs of the same heading type (headings wrapped over several groups).
#[derive(Debug, Default, Clone, Copy)]
pub struct HeadingCoalescer;

impl HeadingCoalescer {
    /// Create a heading coalescer.
    pub fn new() -> Self {
        Self
    }

    /// Merge each run of identical `section_h*` chunks into its first member.
    pub fn coalesce(&self, chunks: Vec<Chunk>) -> Vec<Chunk> {
        let mut out: Vec<Chunk> = Vec::with_capacity(chunks.len());

        for chunk in chunks {
            match out.last_mut() {
                Some(prev)
                    if chunk.chunk_type.is_heading() && prev.chunk_type == chunk.chunk_type =>
                {
                    prev.text.push(' ');
                    prev.text.push_str(&chunk.text);
                    prev.page_end = chunk.page_end;
                }
                _ => out.push(chunk),
            }
        }

        out
    }
}
