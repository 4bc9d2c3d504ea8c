//! Character arithmetic and split-point search used by the strategies.

use super::types::{Chunk, ChunkSpan};
use crate::normalize::NormalizedDocument;
use crate::sections::Section;

/// Byte offset `n` characters after `from`, clamped to the end of `text`.
pub(crate) fn advance(text: &str, from: usize, n: usize) -> usize {
    text[from..]
        .char_indices()
        .nth(n)
        .map_or(text.len(), |(i, _)| from + i)
}

/// Byte offset `n` characters before `to`, clamped to 0.
pub(crate) fn back(text: &str, to: usize, n: usize) -> usize {
    if n == 0 {
        return to;
    }
    text[..to]
        .char_indices()
        .rev()
        .nth(n - 1)
        .map_or(0, |(i, _)| i)
}

/// Pick where to end a chunk whose new content may fill all of `window`.
///
/// Returns a byte length in `1..=window.len()`, or `None` when the window
/// holds no whitespace at all and must be hard-cut. Paragraph breaks and
/// sentence ends only count in the back half of the window.
pub(crate) fn find_split(window: &str) -> Option<usize> {
    let half = advance(window, 0, window.chars().count() / 2);
    let tail = &window[half..];

    if let Some(i) = tail.rfind('\n') {
        return Some(half + i + 1);
    }

    let mut next: Option<(usize, char)> = None;
    for (i, c) in tail.char_indices().rev() {
        if let Some((j, n)) = next {
            if matches!(c, '.' | '!' | '?') && n.is_whitespace() {
                return Some(half + j + n.len_utf8());
            }
        }
        next = Some((i, c));
    }

    window
        .char_indices()
        .rev()
        .find(|(_, c)| c.is_whitespace())
        .map(|(i, c)| i + c.len_utf8())
}

/// Materialize one chunk of `section` from its span.
pub(crate) fn build_chunk(
    doc: &NormalizedDocument,
    section: &Section,
    span: &ChunkSpan,
    chunk_index: usize,
) -> Chunk {
    let text = section.text(&doc.text);
    let content = text[span.start..span.end].to_string();
    let start_offset = section.start + span.new_start;
    Chunk {
        chunk_index,
        section_type: section.section_type,
        section_name: section.name.clone(),
        char_count: content.chars().count(),
        content,
        overlap_chars: text[span.start..span.new_start].chars().count(),
        start_offset,
        raw_offset: doc.raw_offset(start_offset),
    }
}
