//! Section (item) identification over normalized text.
//!
//! Two passes: [`scanner`] finds every line that starts with an
//! `Item <number><letter?>` header followed by the item's title, then
//! [`select`] discards table-of-contents listings and keeps one boundary
//! per item type. Each section runs to the next chosen boundary.

mod scanner;
mod select;

use filingdex_core::config::SectionConfig;
use filingdex_core::SectionType;
use serde::Serialize;
use tracing::debug;

/// Longest header line reported in [`Section::heading`], in characters.
const MAX_HEADING_CHARS: usize = 200;

/// One identified item of a filing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    pub section_type: SectionType,
    /// Canonical name, e.g. `Item 1A. Risk Factors`.
    pub name: String,
    /// Header line as it appears in the filing.
    pub heading: String,
    /// Byte offsets into the normalized text, half-open.
    pub start: usize,
    pub end: usize,
    pub char_count: usize,
    pub word_count: usize,
}

impl Section {
    /// The section's slice of the normalized text it was identified in.
    pub fn text<'a>(&self, document_text: &'a str) -> &'a str {
        &document_text[self.start..self.end]
    }
}

/// Identify sections in `text`, ordered by start offset and non-overlapping.
///
/// Items with no header in the text are omitted.
pub fn identify_sections(text: &str, cfg: &SectionConfig) -> Vec<Section> {
    let candidates = scanner::scan(text, cfg.header_title_window);
    let chosen = select::select(&candidates, text.len(), cfg);
    debug!(
        candidates = candidates.len(),
        sections = chosen.len(),
        "identified sections"
    );

    chosen
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let end = chosen.get(i + 1).map_or(text.len(), |next| next.offset);
            let body = &text[c.offset..end];
            Section {
                section_type: c.item,
                name: c.item.display_name(),
                heading: heading_line(body),
                start: c.offset,
                end,
                char_count: body.chars().count(),
                word_count: body.split_whitespace().count(),
            }
        })
        .collect()
}

fn heading_line(body: &str) -> String {
    let line = body.lines().next().unwrap_or("").trim();
    line.chars().take(MAX_HEADING_CHARS).collect()
}
