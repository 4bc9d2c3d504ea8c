//! Splitting strategy: fill each chunk, then back off to the best boundary.

use super::helpers::{advance, back, build_chunk, find_split};
use super::types::{Chunk, ChunkParams, ChunkSpan};
use crate::normalize::NormalizedDocument;
use crate::sections::Section;

/// Split `text` into chunk spans.
///
/// The new content of consecutive spans tiles `text` exactly. Every span is
/// at most `chunk_size` characters including its overlap.
pub fn split_text(text: &str, params: ChunkParams) -> Vec<ChunkSpan> {
    let mut spans = Vec::new();
    let mut pos = 0;

    while pos < text.len() {
        let start = if spans.is_empty() {
            pos
        } else {
            back(text, pos, params.overlap)
        };
        let overlap_chars = text[start..pos].chars().count();
        let budget = params.chunk_size - overlap_chars;

        let limit = advance(text, pos, budget);
        let end = if limit == text.len() {
            limit
        } else {
            // Hard cut when the window has no whitespace.
            pos + find_split(&text[pos..limit]).unwrap_or(limit - pos)
        };

        spans.push(ChunkSpan {
            start,
            new_start: pos,
            end,
        });
        pos = end;
    }

    spans
}

/// Chunk one section of a normalized document, indices starting at 0.
pub fn chunk_section(
    doc: &NormalizedDocument,
    section: &Section,
    params: ChunkParams,
) -> Vec<Chunk> {
    split_text(section.text(&doc.text), params)
        .iter()
        .enumerate()
        .map(|(i, span)| build_chunk(doc, section, span, i))
        .collect()
}
