//! Request and response payloads of the four document operations.

use filingdex_core::{DocumentKey, Fidelity, FilingError, Result, SectionType};
use serde::{Deserialize, Serialize};

use crate::chunker::Chunk;
use crate::pagination::PaginationCursor;

pub const DEFAULT_MAX_CHUNKS: i64 = 5;

// ── Requests ────────────────────────────────────────────────────────────────

/// Document identity as callers send it.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DocumentRequest {
    pub cik: String,
    pub accession_number: String,
    #[serde(default)]
    pub document_name: Option<String>,
}

impl DocumentRequest {
    pub fn key(&self) -> Result<DocumentKey> {
        let key = DocumentKey::new(&*self.cik, &*self.accession_number, self.document_name.clone());
        if key.cik.is_empty() || key.accession_number.is_empty() {
            return Err(FilingError::InvalidArgument(
                "cik and accession_number are required".into(),
            ));
        }
        Ok(key)
    }
}

/// Signed integers so negative input is reported instead of failing to parse.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReadSectionRequest {
    #[serde(flatten)]
    pub document: DocumentRequest,
    pub section_type: String,
    #[serde(default)]
    pub chunk_size: Option<i64>,
    #[serde(default)]
    pub overlap: Option<i64>,
    #[serde(default)]
    pub chunk_index: i64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StreamRequest {
    #[serde(flatten)]
    pub document: DocumentRequest,
    #[serde(default)]
    pub chunk_size: Option<i64>,
    #[serde(default)]
    pub overlap: Option<i64>,
    #[serde(default)]
    pub start_chunk: i64,
    #[serde(default)]
    pub max_chunks: Option<i64>,
}

pub(crate) fn non_negative(name: &str, value: i64) -> Result<usize> {
    usize::try_from(value).map_err(|_| {
        FilingError::InvalidArgument(format!("{name} must not be negative, got {value}"))
    })
}

pub(crate) fn positive(name: &str, value: i64) -> Result<usize> {
    match non_negative(name, value)? {
        0 => Err(FilingError::InvalidArgument(format!("{name} must be positive"))),
        n => Ok(n),
    }
}

// ── Responses ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct DocumentText {
    pub cik: String,
    pub accession_number: String,
    pub document_name: String,
    /// Embedded document chosen when the source was a full submission.
    pub primary_document: Option<String>,
    pub normalized_text: String,
    pub char_count: usize,
    pub raw_length: usize,
    pub fidelity: Fidelity,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionOverview {
    #[serde(rename = "type")]
    pub section_type: SectionType,
    pub name: String,
    pub heading: String,
    pub char_count: usize,
    pub word_count: usize,
    /// Share of all section characters, one decimal.
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilingSummary {
    pub total_sections: usize,
    pub total_chars: usize,
    pub total_words: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionsOverview {
    pub sections: Vec<SectionOverview>,
    pub summary: FilingSummary,
    pub fidelity: Fidelity,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionSummary {
    pub total_chars: usize,
    pub total_words: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionContent {
    pub section_type: SectionType,
    pub section_name: String,
    pub chunk_index: usize,
    pub total_chunks: usize,
    pub has_more: bool,
    pub content: String,
    pub char_count: usize,
    /// Global index in the document chunk stream.
    pub stream_index: usize,
    pub section_summary: SectionSummary,
    pub fidelity: Fidelity,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChunkStream {
    pub chunks: Vec<Chunk>,
    pub pagination: PaginationCursor,
    pub chunk_size: usize,
    pub overlap: usize,
    pub fidelity: Fidelity,
}

// ── Result envelope ─────────────────────────────────────────────────────────

/// Wrap an operation result as `{"success": true, ...}` or
/// `{"success": false, "error": {"kind", "message"}}`.
pub fn to_response<T: Serialize>(result: &Result<T>) -> serde_json::Value {
    match result {
        Ok(payload) => match serde_json::to_value(payload) {
            Ok(serde_json::Value::Object(mut map)) => {
                map.insert("success".into(), serde_json::Value::Bool(true));
                serde_json::Value::Object(map)
            }
            Ok(other) => serde_json::json!({ "success": true, "result": other }),
            Err(e) => failure(&FilingError::Internal(format!("serialization failed: {e}"))),
        },
        Err(e) => failure(e),
    }
}

fn failure(e: &FilingError) -> serde_json::Value {
    serde_json::json!({
        "success": false,
        "error": {
            "kind": e.kind(),
            "message": e.to_string(),
            "recoverable": e.is_recoverable(),
        }
    })
}
