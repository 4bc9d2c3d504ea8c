//! Bounded LRU cache of parsed documents.
//!
//! Each entry holds the normalized text, the identified sections, and a small
//! per-document LRU of chunk tables keyed by [`ChunkParams`]. Concurrent misses
//! on one key share a single build through a `OnceCell` slot that stores the
//! build's outcome. Everyone who joined a failed or timed-out build gets its
//! error, and the slot is dropped so nothing partial stays installed.

use std::num::NonZeroUsize;
use std::ops::Range;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use filingdex_core::config::{CacheConfig, SectionConfig};
use filingdex_core::{DocumentKey, Fidelity, FilingError, Result, SectionType};
use lru::LruCache;
use serde::Serialize;
use tokio::sync::{Mutex, OnceCell};
use tracing::{debug, info, warn};

use crate::chunker::{build_chunk, split_text, Chunk, ChunkParams, ChunkSpan};
use crate::normalize::{normalize, NormalizedDocument};
use crate::sections::{identify_sections, Section};
use crate::source::RawDocumentSource;

type Slot = Arc<OnceCell<Result<Arc<ParsedDocument>>>>;

fn capacity(n: usize) -> NonZeroUsize {
    NonZeroUsize::new(n).unwrap_or(NonZeroUsize::MIN)
}

// ── Parsed document ───────────────────────────────────────────

/// A normalized, sectioned document. Immutable apart from its chunking memo.
#[derive(Debug)]
pub struct ParsedDocument {
    pub key: DocumentKey,
    pub normalized: NormalizedDocument,
    pub sections: Vec<Section>,
    chunkings: Mutex<LruCache<ChunkParams, Arc<ChunkTable>>>,
}

impl ParsedDocument {
    /// Normalize and section `raw`. CPU-bound; run off the async workers.
    pub fn parse(
        key: DocumentKey,
        raw: &str,
        sections: &SectionConfig,
        chunkings: usize,
    ) -> Self {
        let normalized = normalize(raw);
        let sections = identify_sections(&normalized.text, sections);
        Self {
            key,
            normalized,
            sections,
            chunkings: Mutex::new(LruCache::new(capacity(chunkings))),
        }
    }

    pub fn fidelity(&self) -> Fidelity {
        self.normalized.fidelity
    }

    /// Position and record of the section of type `t`, if the document has one.
    pub fn section(&self, t: SectionType) -> Option<(usize, &Section)> {
        self.sections
            .iter()
            .enumerate()
            .find(|(_, s)| s.section_type == t)
    }

    /// Chunkings currently memoized for this document.
    pub async fn chunking_count(&self) -> usize {
        self.chunkings.lock().await.len()
    }
}

// ── Chunk table ───────────────────────────────────────────────

/// Chunk boundaries for every section of one document under one set of params.
///
/// Stores spans only; chunk text is materialized on demand.
#[derive(Debug, PartialEq, Eq)]
pub struct ChunkTable {
    pub params: ChunkParams,
    spans: Vec<Vec<ChunkSpan>>,
    /// Global index of each section's first chunk.
    first: Vec<usize>,
    total: usize,
}

impl ChunkTable {
    pub fn build(doc: &ParsedDocument, params: ChunkParams) -> Self {
        let mut spans = Vec::with_capacity(doc.sections.len());
        let mut first = Vec::with_capacity(doc.sections.len());
        let mut total = 0;
        for section in &doc.sections {
            let section_spans = split_text(section.text(&doc.normalized.text), params);
            first.push(total);
            total += section_spans.len();
            spans.push(section_spans);
        }
        Self {
            params,
            spans,
            first,
            total,
        }
    }

    /// Length of the document chunk stream.
    pub fn total_chunks(&self) -> usize {
        self.total
    }

    pub fn section_chunk_count(&self, section: usize) -> usize {
        self.spans.get(section).map_or(0, Vec::len)
    }

    pub fn first_chunk(&self, section: usize) -> Option<usize> {
        self.first.get(section).copied()
    }

    /// Map a global chunk index to `(section, local index)`.
    fn locate(&self, global: usize) -> Option<(usize, usize)> {
        if global >= self.total {
            return None;
        }
        let section = self.first.partition_point(|&f| f <= global).checked_sub(1)?;
        Some((section, global - self.first[section]))
    }

    /// Chunk `global` of the stream, indexed globally.
    pub fn chunk(&self, doc: &ParsedDocument, global: usize) -> Option<Chunk> {
        let (section, local) = self.locate(global)?;
        let span = self.spans[section].get(local)?;
        Some(build_chunk(&doc.normalized, &doc.sections[section], span, global))
    }

    /// Chunks of the stream in `range`, clamped to the stream length.
    pub fn chunks(&self, doc: &ParsedDocument, range: Range<usize>) -> Vec<Chunk> {
        let end = range.end.min(self.total);
        (range.start.min(end)..end)
            .filter_map(|i| self.chunk(doc, i))
            .collect()
    }

    /// Chunk `local` of one section, indexed within the section.
    pub fn section_chunk(
        &self,
        doc: &ParsedDocument,
        section: usize,
        local: usize,
    ) -> Option<Chunk> {
        let span = self.spans.get(section)?.get(local)?;
        Some(build_chunk(&doc.normalized, &doc.sections[section], span, local))
    }
}

// ── Build budget ──────────────────────────────────────────────

/// CPU-time allowance for one request.
///
/// The deadline is fixed when the first CPU stage starts (fetching is not
/// counted) and shared by every later stage of the same request.
#[derive(Debug, Clone, Copy)]
pub struct BuildBudget {
    limit: Duration,
    deadline: Option<tokio::time::Instant>,
}

impl BuildBudget {
    pub fn new(limit: Duration) -> Self {
        Self {
            limit,
            deadline: None,
        }
    }

    pub fn limit(&self) -> Duration {
        self.limit
    }

    /// Deadline of this request, starting the clock on first use.
    pub fn deadline(&mut self) -> tokio::time::Instant {
        let limit = self.limit;
        *self
            .deadline
            .get_or_insert_with(|| tokio::time::Instant::now() + limit)
    }
}

// ── Cache ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub builds: u64,
    pub evictions: u64,
    pub len: usize,
    pub hit_rate: f64,
}

/// LRU cache of parsed documents with single-flight builds.
pub struct DocumentCache {
    entries: Mutex<LruCache<DocumentKey, Slot>>,
    sections: SectionConfig,
    chunkings_per_document: usize,
    build_timeout: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
    builds: AtomicU64,
    evictions: AtomicU64,
}

impl DocumentCache {
    pub fn new(config: &CacheConfig, sections: SectionConfig) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(capacity(config.capacity))),
            sections,
            chunkings_per_document: config.chunkings_per_document,
            build_timeout: Duration::from_secs(config.build_timeout_secs),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            builds: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    /// Override the per-request CPU budget.
    pub fn with_build_timeout(mut self, timeout: Duration) -> Self {
        self.build_timeout = timeout;
        self
    }

    pub fn build_timeout(&self) -> Duration {
        self.build_timeout
    }

    /// Fresh budget for one request.
    pub fn budget(&self) -> BuildBudget {
        BuildBudget::new(self.build_timeout)
    }

    /// Cached document for `key`, fetching and parsing it on a miss.
    ///
    /// Concurrent callers for the same key wait on one in-flight build and
    /// share its outcome, success or failure.
    pub async fn get_or_build(
        &self,
        key: &DocumentKey,
        source: &dyn RawDocumentSource,
        budget: &mut BuildBudget,
    ) -> Result<Arc<ParsedDocument>> {
        let slot = self.slot(key).await;
        let outcome = slot
            .get_or_init(|| self.build(key, source, budget))
            .await
            .clone();

        if outcome.is_err() {
            let mut entries = self.entries.lock().await;
            if entries.peek(key).is_some_and(|s| Arc::ptr_eq(s, &slot)) {
                entries.pop(key);
            }
        }
        outcome
    }

    async fn slot(&self, key: &DocumentKey) -> Slot {
        let mut entries = self.entries.lock().await;
        if let Some(slot) = entries.get(key) {
            // A failed slot not yet dropped by its builder starts over.
            if !matches!(slot.get(), Some(Err(_))) {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Arc::clone(slot);
            }
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        let slot: Slot = Arc::new(OnceCell::new());
        if let Some((evicted, _)) = entries.push(key.clone(), Arc::clone(&slot)) {
            if &evicted != key {
                self.evictions.fetch_add(1, Ordering::Relaxed);
                info!(evicted = %evicted, "evicted document from cache");
            }
        }
        slot
    }

    async fn build(
        &self,
        key: &DocumentKey,
        source: &dyn RawDocumentSource,
        budget: &mut BuildBudget,
    ) -> Result<Arc<ParsedDocument>> {
        let started = Instant::now();
        let raw = source.fetch_raw(key).await?;
        debug!(
            document = %key,
            source = source.name(),
            bytes = raw.len(),
            "fetched raw document"
        );

        let owned_key = key.clone();
        let sections = self.sections;
        let chunkings = self.chunkings_per_document;
        let doc = run_blocking(budget, move || {
            ParsedDocument::parse(owned_key, &raw, &sections, chunkings)
        })
        .await?;

        self.builds.fetch_add(1, Ordering::Relaxed);
        if doc.fidelity().is_degraded() {
            warn!(document = %key, "document parsed in degraded mode");
        }
        info!(
            document = %key,
            chars = doc.normalized.text.len(),
            sections = doc.sections.len(),
            fidelity = ?doc.fidelity(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "built document"
        );
        Ok(Arc::new(doc))
    }

    /// Chunk table of `doc` for `params`, memoized per document.
    pub async fn chunk_table(
        &self,
        doc: &Arc<ParsedDocument>,
        params: ChunkParams,
        budget: &mut BuildBudget,
    ) -> Result<Arc<ChunkTable>> {
        if let Some(table) = doc.chunkings.lock().await.get(&params) {
            return Ok(Arc::clone(table));
        }

        let owned = Arc::clone(doc);
        let table = run_blocking(budget, move || ChunkTable::build(&owned, params)).await?;
        let table = Arc::new(table);
        debug!(
            document = %doc.key,
            chunk_size = params.chunk_size,
            overlap = params.overlap,
            chunks = table.total_chunks(),
            "built chunk table"
        );

        // A racing request may have built the same table; both are identical.
        doc.chunkings.lock().await.put(params, Arc::clone(&table));
        Ok(table)
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    pub async fn contains(&self, key: &DocumentKey) -> bool {
        self.entries
            .lock()
            .await
            .peek(key)
            .is_some_and(|s| matches!(s.get(), Some(Ok(_))))
    }

    pub async fn stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        CacheStats {
            hits,
            misses,
            builds: self.builds.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            len: self.len().await,
            hit_rate: if total == 0 { 0.0 } else { hits as f64 / total as f64 },
        }
    }
}

/// Run CPU-bound work on the blocking pool, bounded by the request deadline.
///
/// A spent budget fails before any work is spawned. On timeout the work runs
/// to completion in the background and its result is dropped.
async fn run_blocking<T, F>(budget: &mut BuildBudget, f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let limit = budget.limit();
    let deadline = budget.deadline();
    if tokio::time::Instant::now() >= deadline {
        warn!(limit_ms = limit.as_millis() as u64, "request build budget already spent");
        return Err(FilingError::Timeout(limit));
    }
    match tokio::time::timeout_at(deadline, tokio::task::spawn_blocking(f)).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(FilingError::Internal(format!("build task failed: {e}"))),
        Err(_) => {
            warn!(limit_ms = limit.as_millis() as u64, "build exceeded time limit");
            Err(FilingError::Timeout(limit))
        }
    }
}
