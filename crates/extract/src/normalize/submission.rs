//! SGML full-submission envelopes.
//!
//! An EDGAR `.txt` submission concatenates every document of a filing, each
//! wrapped as:
//!
//! ```text
//! <DOCUMENT>
//! <TYPE>10-K
//! <SEQUENCE>1
//! <FILENAME>aapl-20230930.htm
//! <DESCRIPTION>10-K
//! <TEXT>
//! ...body...
//! </TEXT>
//! </DOCUMENT>
//! ```

use std::ops::Range;

use serde::Serialize;

/// Form types that carry the filing's main narrative.
const PRIMARY_FORM_TYPES: &[&str] = &["10-K", "10-Q", "8-K", "10-K/A", "10-Q/A", "8-K/A"];

/// One `<DOCUMENT>` block of a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmbeddedDocument {
    pub doc_type: String,
    pub sequence: Option<u32>,
    pub filename: Option<String>,
    pub description: Option<String>,
    /// Byte range of the body inside the raw submission.
    #[serde(skip)]
    pub body: Range<usize>,
    /// Non-empty body lines that are not bare markup.
    pub content_lines: usize,
}

impl EmbeddedDocument {
    pub fn body_len(&self) -> usize {
        self.body.len()
    }

    /// Preference score; the highest-scoring document is the primary one.
    pub fn score(&self) -> usize {
        let mut score = 0;
        if PRIMARY_FORM_TYPES.contains(&self.doc_type.as_str()) {
            score += 1000;
        }
        if self
            .filename
            .as_deref()
            .is_some_and(|f| f.ends_with(".htm") || f.ends_with(".html"))
        {
            score += 500;
        }
        if self.content_lines > 1000 {
            score += 300;
        } else if self.content_lines > 100 {
            score += 100;
        }
        score + (self.body_len() / 1000).min(200)
    }
}

pub fn is_submission(raw: &str) -> bool {
    raw.contains("<DOCUMENT>")
}

/// List every embedded document, in submission order.
pub fn list_embedded_documents(raw: &str) -> Vec<EmbeddedDocument> {
    let mut docs = Vec::new();
    let mut current: Option<DocBuilder> = None;
    let mut offset = 0;

    for line in raw.split_inclusive('\n') {
        let line_start = offset;
        offset += line.len();
        let trimmed = line.trim();

        if trimmed.starts_with("<DOCUMENT>") {
            current = Some(DocBuilder::default());
            continue;
        }
        let Some(doc) = current.as_mut() else {
            continue;
        };
        if trimmed.starts_with("</DOCUMENT>") {
            if let Some(done) = current.take().and_then(|b| b.finish(line_start)) {
                docs.push(done);
            }
            continue;
        }
        doc.line(trimmed, line_start, offset);
    }

    docs
}

/// Pick the primary document of a submission, if `raw` is one.
pub fn select_primary(raw: &str) -> Option<EmbeddedDocument> {
    if !is_submission(raw) {
        return None;
    }
    // Highest score wins; ties go to the earliest document.
    list_embedded_documents(raw)
        .into_iter()
        .rev()
        .max_by_key(EmbeddedDocument::score)
}

#[derive(Debug, Default)]
struct DocBuilder {
    doc_type: Option<String>,
    sequence: Option<u32>,
    filename: Option<String>,
    description: Option<String>,
    body_start: Option<usize>,
    body_end: Option<usize>,
    content_lines: usize,
}

impl DocBuilder {
    fn line(&mut self, trimmed: &str, start: usize, end: usize) {
        if self.body_end.is_some() {
            return;
        }
        if self.body_start.is_none() {
            if let Some(v) = trimmed.strip_prefix("<TYPE>") {
                self.doc_type = Some(v.trim().to_string());
                return;
            }
            if let Some(v) = trimmed.strip_prefix("<SEQUENCE>") {
                self.sequence = v.trim().parse().ok();
                return;
            }
            if let Some(v) = trimmed.strip_prefix("<FILENAME>") {
                self.filename = Some(v.trim().to_string());
                return;
            }
            if let Some(v) = trimmed.strip_prefix("<DESCRIPTION>") {
                self.description = Some(v.trim().to_string());
                return;
            }
            if trimmed.starts_with("<TEXT>") {
                self.body_start = Some(end);
                return;
            }
            if trimmed.is_empty() {
                return;
            }
            self.body_start = Some(start);
        }
        if trimmed.starts_with("</TEXT>") {
            self.body_end = Some(start);
            return;
        }
        if !trimmed.is_empty() && !trimmed.starts_with('<') {
            self.content_lines += 1;
        }
    }

    fn finish(self, document_end: usize) -> Option<EmbeddedDocument> {
        let start = self.body_start?;
        let end = self.body_end.unwrap_or(document_end).max(start);
        Some(EmbeddedDocument {
            doc_type: self.doc_type.unwrap_or_else(|| "UNKNOWN".to_string()),
            sequence: self.sequence,
            filename: self.filename,
            description: self.description,
            body: start..end,
            content_lines: self.content_lines,
        })
    }
}
