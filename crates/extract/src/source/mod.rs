//! Raw document retrieval.
//!
//! The engine never performs I/O itself; it asks a [`RawDocumentSource`] for
//! the raw text of a document and treats any failure as terminal for the
//! request.

mod edgar;
mod file;
mod memory;

use async_trait::async_trait;
use filingdex_core::{DocumentKey, FilingError};
use thiserror::Error;

pub use edgar::EdgarSource;
pub use file::FileSource;
pub use memory::MemorySource;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Source misconfigured: {0}")]
    Config(String),
}

impl From<FetchError> for FilingError {
    fn from(e: FetchError) -> Self {
        match e {
            FetchError::NotFound(what) => FilingError::NotFound(what),
            other => FilingError::UpstreamFetch(other.to_string()),
        }
    }
}

/// Provider of raw filing text (EDGAR archive, local mirror, fixtures).
#[async_trait]
pub trait RawDocumentSource: Send + Sync {
    /// Fetch the raw text of one document. Bytes that are not valid UTF-8
    /// are replaced, never rejected.
    async fn fetch_raw(&self, key: &DocumentKey) -> Result<String, FetchError>;

    /// Short name for logs.
    fn name(&self) -> &str;
}
