//! Windowed access to a document's chunk stream.

use filingdex_core::{DocumentKey, Fidelity, FilingError, Result, SectionType};
use serde::Serialize;

use crate::cache::DocumentCache;
use crate::chunker::{Chunk, ChunkParams};
use crate::source::RawDocumentSource;

/// Position of one window inside the full chunk stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PaginationCursor {
    pub start_chunk: usize,
    /// Exclusive end of the returned window.
    pub end_chunk: usize,
    pub max_chunks: usize,
    pub total_chunks: usize,
    pub has_next: bool,
    pub has_prev: bool,
    pub next_start: Option<usize>,
    pub prev_start: Option<usize>,
}

impl PaginationCursor {
    /// Cursor for `max_chunks` entries from `start_chunk`. Starting at or past
    /// the end is a valid, empty window.
    pub fn new(start_chunk: usize, max_chunks: usize, total_chunks: usize) -> Result<Self> {
        if max_chunks == 0 {
            return Err(FilingError::InvalidArgument(
                "max_chunks must be positive".into(),
            ));
        }
        let end_chunk = start_chunk
            .saturating_add(max_chunks)
            .min(total_chunks)
            .max(start_chunk);
        let has_next = end_chunk < total_chunks;
        let has_prev = start_chunk > 0;
        Ok(Self {
            start_chunk,
            end_chunk,
            max_chunks,
            total_chunks,
            has_next,
            has_prev,
            next_start: has_next.then_some(end_chunk),
            prev_start: has_prev.then(|| start_chunk.min(total_chunks).saturating_sub(max_chunks)),
        })
    }

    pub fn returned(&self) -> usize {
        self.end_chunk - self.start_chunk
    }
}

/// One page of the chunk stream.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Window {
    pub chunks: Vec<Chunk>,
    pub pagination: PaginationCursor,
    pub fidelity: Fidelity,
}

/// One chunk of one section, addressed by section type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionChunk {
    pub chunk: Chunk,
    /// Chunks in the section.
    pub total_chunks: usize,
    /// Global index of this chunk in the document stream.
    pub stream_index: usize,
    pub section_chars: usize,
    pub section_words: usize,
    pub fidelity: Fidelity,
}

/// Slice `max_chunks` chunks from `start_chunk` of the document's stream.
pub async fn window(
    cache: &DocumentCache,
    source: &dyn RawDocumentSource,
    key: &DocumentKey,
    params: ChunkParams,
    start_chunk: usize,
    max_chunks: usize,
) -> Result<Window> {
    let mut budget = cache.budget();
    let doc = cache.get_or_build(key, source, &mut budget).await?;
    let table = cache.chunk_table(&doc, params, &mut budget).await?;
    let cursor = PaginationCursor::new(start_chunk, max_chunks, table.total_chunks())?;
    Ok(Window {
        chunks: table.chunks(&doc, cursor.start_chunk..cursor.end_chunk),
        pagination: cursor,
        fidelity: doc.fidelity(),
    })
}

/// Chunk `chunk_index` of the section of type `section_type`.
///
/// An absent section or an index past the section's last chunk is `NotFound`.
pub async fn section_chunk(
    cache: &DocumentCache,
    source: &dyn RawDocumentSource,
    key: &DocumentKey,
    section_type: SectionType,
    params: ChunkParams,
    chunk_index: usize,
) -> Result<SectionChunk> {
    let mut budget = cache.budget();
    let doc = cache.get_or_build(key, source, &mut budget).await?;
    let (position, section) = doc.section(section_type).ok_or_else(|| {
        FilingError::NotFound(format!("section {section_type} not present in {key}"))
    })?;
    let table = cache.chunk_table(&doc, params, &mut budget).await?;
    let total_chunks = table.section_chunk_count(position);
    let chunk = table
        .section_chunk(&doc, position, chunk_index)
        .ok_or_else(|| {
            FilingError::NotFound(format!(
                "chunk {chunk_index} of {section_type} (section has {total_chunks})"
            ))
        })?;
    Ok(SectionChunk {
        stream_index: table.first_chunk(position).unwrap_or(0) + chunk_index,
        total_chunks,
        section_chars: section.char_count,
        section_words: section.word_count,
        fidelity: doc.fidelity(),
        chunk,
    })
}
