//! Chunk parameters and output types.

use filingdex_core::config::ChunkingConfig;
use filingdex_core::{FilingError, Result, SectionType};
use serde::Serialize;

// ── Parameters ──────────────────────────────────────────────────────────────

/// Validated chunking parameters, in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ChunkParams {
    pub chunk_size: usize,
    pub overlap: usize,
}

impl ChunkParams {
    /// `chunk_size` must be positive and `overlap` strictly smaller than it.
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(FilingError::InvalidArgument(
                "chunk_size must be positive".into(),
            ));
        }
        if overlap >= chunk_size {
            return Err(FilingError::InvalidArgument(format!(
                "overlap ({overlap}) must be smaller than chunk_size ({chunk_size})"
            )));
        }
        Ok(Self { chunk_size, overlap })
    }
}

impl TryFrom<ChunkingConfig> for ChunkParams {
    type Error = FilingError;

    fn try_from(c: ChunkingConfig) -> Result<Self> {
        Self::new(c.chunk_size, c.overlap)
    }
}

// ── Spans ───────────────────────────────────────────────────────────────────

/// Byte offsets of one chunk inside the text it was split from.
///
/// `start..new_start` is the repeated overlap, `new_start..end` the new content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkSpan {
    pub start: usize,
    pub new_start: usize,
    pub end: usize,
}

// ── Chunk output ────────────────────────────────────────────────────────────

/// A chunk of section text with provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chunk {
    /// 0-based index; global across the document when served by the stream.
    pub chunk_index: usize,
    pub section_type: SectionType,
    pub section_name: String,
    pub content: String,
    pub char_count: usize,
    /// Leading characters of `content` repeated from the previous chunk.
    pub overlap_chars: usize,
    /// Normalized byte offset where this chunk's new content begins.
    pub start_offset: usize,
    /// Approximate raw byte offset of `start_offset`.
    pub raw_offset: usize,
}

impl Chunk {
    /// Content without the repeated overlap prefix.
    pub fn new_content(&self) -> &str {
        let skip = self
            .content
            .char_indices()
            .nth(self.overlap_chars)
            .map_or(self.content.len(), |(i, _)| i);
        &self.content[skip..]
    }
}
