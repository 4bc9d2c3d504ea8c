//! The four document operations: fetch, list sections, read a section, stream.
//!
//! Every operation validates its request, resolves the document through the
//! shared [`DocumentCache`], and returns a typed payload. Use
//! [`to_response`] to render any result as the success/failure envelope.

mod types;

use std::sync::Arc;

use filingdex_core::config::{default_overlap, ChunkingConfig};
use filingdex_core::{Config, DocumentKey, Result, SectionType};
use tracing::{debug, instrument};

use crate::cache::{CacheStats, DocumentCache, ParsedDocument};
use crate::chunker::ChunkParams;
use crate::pagination;
use crate::source::RawDocumentSource;

pub use types::*;

pub struct FilingService {
    source: Arc<dyn RawDocumentSource>,
    cache: Arc<DocumentCache>,
    defaults: ChunkingConfig,
}

impl FilingService {
    pub fn new(
        source: Arc<dyn RawDocumentSource>,
        cache: Arc<DocumentCache>,
        defaults: ChunkingConfig,
    ) -> Self {
        Self {
            source,
            cache,
            defaults,
        }
    }

    pub fn from_config(source: Arc<dyn RawDocumentSource>, config: &Config) -> Self {
        let cache = Arc::new(DocumentCache::new(&config.cache, config.sections));
        Self::new(source, cache, config.chunking)
    }

    pub fn cache(&self) -> &DocumentCache {
        &self.cache
    }

    pub async fn cache_stats(&self) -> CacheStats {
        self.cache.stats().await
    }

    async fn document(&self, key: &DocumentKey) -> Result<Arc<ParsedDocument>> {
        let mut budget = self.cache.budget();
        self.cache.get_or_build(key, self.source.as_ref(), &mut budget).await
    }

    /// Resolve per-call chunking overrides against the defaults. An
    /// overridden `chunk_size` without an `overlap` gets the default fraction.
    fn chunk_params(&self, chunk_size: Option<i64>, overlap: Option<i64>) -> Result<ChunkParams> {
        let chunk_size = match chunk_size {
            Some(v) => Some(positive("chunk_size", v)?),
            None => None,
        };
        let overlap = match overlap {
            Some(v) => Some(non_negative("overlap", v)?),
            None => None,
        };
        match (chunk_size, overlap) {
            (None, None) => ChunkParams::try_from(self.defaults),
            (Some(size), None) => ChunkParams::new(size, default_overlap(size)),
            (size, Some(overlap)) => {
                ChunkParams::new(size.unwrap_or(self.defaults.chunk_size), overlap)
            }
        }
    }

    /// Full normalized text of a document, without sectioning.
    #[instrument(skip_all, fields(cik = %req.cik, accession = %req.accession_number))]
    pub async fn fetch_document(&self, req: &DocumentRequest) -> Result<DocumentText> {
        let key = req.key()?;
        let doc = self.document(&key).await?;
        Ok(DocumentText {
            cik: key.cik.clone(),
            accession_number: key.accession_number.clone(),
            document_name: key.document_file(),
            primary_document: doc.normalized.primary_document.clone(),
            normalized_text: doc.normalized.text.clone(),
            char_count: doc.normalized.char_count(),
            raw_length: doc.normalized.raw_len,
            fidelity: doc.fidelity(),
        })
    }

    /// Sections found in a document, with counts and a filing summary.
    #[instrument(skip_all, fields(cik = %req.cik, accession = %req.accession_number))]
    pub async fn list_sections(&self, req: &DocumentRequest) -> Result<SectionsOverview> {
        let key = req.key()?;
        let doc = self.document(&key).await?;

        let total_chars: usize = doc.sections.iter().map(|s| s.char_count).sum();
        let total_words: usize = doc.sections.iter().map(|s| s.word_count).sum();
        let sections = doc
            .sections
            .iter()
            .map(|s| SectionOverview {
                section_type: s.section_type,
                name: s.name.clone(),
                heading: s.heading.clone(),
                char_count: s.char_count,
                word_count: s.word_count,
                percentage: percentage(s.char_count, total_chars),
            })
            .collect::<Vec<_>>();
        debug!(document = %key, sections = sections.len(), "listed sections");

        Ok(SectionsOverview {
            summary: FilingSummary {
                total_sections: sections.len(),
                total_chars,
                total_words,
            },
            sections,
            fidelity: doc.fidelity(),
        })
    }

    /// One chunk of one section. Unknown or absent section types are `NotFound`.
    #[instrument(skip_all, fields(cik = %req.document.cik, section = %req.section_type))]
    pub async fn read_section(&self, req: &ReadSectionRequest) -> Result<SectionContent> {
        let key = req.document.key()?;
        let section_type: SectionType = req.section_type.parse()?;
        let params = self.chunk_params(req.chunk_size, req.overlap)?;
        let chunk_index = non_negative("chunk_index", req.chunk_index)?;

        let found = pagination::section_chunk(
            &self.cache,
            self.source.as_ref(),
            &key,
            section_type,
            params,
            chunk_index,
        )
        .await?;

        Ok(SectionContent {
            section_type,
            section_name: found.chunk.section_name,
            chunk_index,
            total_chunks: found.total_chunks,
            has_more: chunk_index + 1 < found.total_chunks,
            char_count: found.chunk.char_count,
            content: found.chunk.content,
            stream_index: found.stream_index,
            section_summary: SectionSummary {
                total_chars: found.section_chars,
                total_words: found.section_words,
            },
            fidelity: found.fidelity,
        })
    }

    /// A window of the document-wide chunk stream.
    #[instrument(skip_all, fields(cik = %req.document.cik, start = req.start_chunk))]
    pub async fn stream_chunks(&self, req: &StreamRequest) -> Result<ChunkStream> {
        let key = req.document.key()?;
        let params = self.chunk_params(req.chunk_size, req.overlap)?;
        let start_chunk = non_negative("start_chunk", req.start_chunk)?;
        let max_chunks = positive("max_chunks", req.max_chunks.unwrap_or(DEFAULT_MAX_CHUNKS))?;

        let window = pagination::window(
            &self.cache,
            self.source.as_ref(),
            &key,
            params,
            start_chunk,
            max_chunks,
        )
        .await?;

        Ok(ChunkStream {
            chunks: window.chunks,
            pagination: window.pagination,
            chunk_size: params.chunk_size,
            overlap: params.overlap,
            fidelity: window.fidelity,
        })
    }
}

fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (part as f64 * 1000.0 / total as f64).round() / 10.0
}
