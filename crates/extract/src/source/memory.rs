use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use filingdex_core::DocumentKey;

use super::{FetchError, RawDocumentSource};

/// In-memory source for fixtures and embedding. Counts fetches.
#[derive(Default)]
pub struct MemorySource {
    documents: HashMap<DocumentKey, String>,
    delay: Option<Duration>,
    failures: usize,
    fetches: AtomicUsize,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, key: DocumentKey, raw: impl Into<String>) -> Self {
        self.documents.insert(key, raw.into());
        self
    }

    /// Sleep this long inside every fetch.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Answer the first `n` fetches with a 503, as a busy upstream would.
    pub fn with_failures(mut self, n: usize) -> Self {
        self.failures = n;
        self
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RawDocumentSource for MemorySource {
    async fn fetch_raw(&self, key: &DocumentKey) -> Result<String, FetchError> {
        let attempt = self.fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if attempt < self.failures {
            return Err(FetchError::Status {
                status: 503,
                body: "busy".into(),
            });
        }
        self.documents
            .get(key)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(key.to_string()))
    }

    fn name(&self) -> &str {
        "memory"
    }
}
