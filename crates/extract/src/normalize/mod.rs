//! Markup normalization.
//!
//! Turns raw filing text (HTML with inline XBRL, or an SGML full-submission
//! `.txt` wrapping several documents) into clean text: tags and hidden XBRL
//! containers removed, entities decoded, whitespace collapsed, paragraph
//! breaks kept as single `\n`. Every normalized byte can be traced back to an
//! approximate raw position through [`OffsetMap`].
//!
//! Normalization never fails. Markup the structural pass cannot make sense of
//! (an unterminated tag, comment, or script block) drops to a permissive
//! strip-all-tags pass and marks the result [`Fidelity::Degraded`].

mod builder;
mod entities;
mod markup;
pub mod submission;

use std::ops::Range;

use filingdex_core::Fidelity;
use tracing::{debug, warn};

pub use builder::OffsetMap;
pub use submission::EmbeddedDocument;

/// Clean text extracted from one raw document.
#[derive(Debug, Clone)]
pub struct NormalizedDocument {
    pub text: String,
    pub offsets: OffsetMap,
    /// Byte length of the raw input.
    pub raw_len: usize,
    pub fidelity: Fidelity,
    /// Filename of the embedded document chosen from a full submission.
    pub primary_document: Option<String>,
}

impl NormalizedDocument {
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    /// Approximate raw byte offset for a normalized byte offset.
    pub fn raw_offset(&self, normalized: usize) -> usize {
        self.offsets.raw_offset(normalized)
    }
}

/// Normalize a raw document. Pure; never fails.
pub fn normalize(raw: &str) -> NormalizedDocument {
    let (body, primary_document) = match submission::select_primary(raw) {
        Some(doc) => {
            debug!(
                doc_type = %doc.doc_type,
                filename = doc.filename.as_deref().unwrap_or("(none)"),
                "selected primary document from submission"
            );
            (doc.body.clone(), doc.filename.clone())
        }
        None => (0..raw.len(), None),
    };

    let preserve_newlines = !looks_like_html(&raw[body.clone()]);

    let (built, fidelity) = match markup::structural(raw, body.clone(), preserve_newlines) {
        Ok(built) => (built, Fidelity::Full),
        Err(e) => {
            warn!(error = %e, "structural markup pass failed, stripping tags permissively");
            (markup::permissive(raw, body), Fidelity::Degraded)
        }
    };

    let (text, offsets) = built.finish();
    NormalizedDocument {
        text,
        offsets,
        raw_len: raw.len(),
        fidelity,
        primary_document,
    }
}

const HTML_MARKERS: &[&str] = &[
    "<html", "<body", "<div", "<p>", "<p ", "<table", "<br", "<font", "<span",
];

/// HTML documents carry their layout in tags, so raw newlines are just spacing.
fn looks_like_html(body: &str) -> bool {
    let probe_end = floor_char_boundary(body, 64 * 1024);
    let probe = body[..probe_end].to_ascii_lowercase();
    HTML_MARKERS.iter().any(|m| probe.contains(m))
}

pub(crate) fn floor_char_boundary(s: &str, mut idx: usize) -> usize {
    if idx >= s.len() {
        return s.len();
    }
    while !s.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

/// Byte range helper shared by the passes.
pub(crate) fn clamp_range(raw: &str, range: Range<usize>) -> Range<usize> {
    let end = range.end.min(raw.len());
    range.start.min(end)..end
}
