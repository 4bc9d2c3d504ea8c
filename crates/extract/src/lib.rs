//! Section and chunk extraction for large regulatory filings.
//!
//! Turns multi-megabyte HTML / inline-XBRL filings into navigable,
//! size-bounded units for callers with a limited context budget.
//!
//! # Architecture
//!
//! - **normalize**: markup stripping with an offset map back to the raw bytes
//! - **sections**: `Item N` header scanning and table-of-contents disambiguation
//! - **chunker**: boundary-aware, optionally overlapping section chunking
//! - **cache**: bounded LRU of parsed documents with single-flight builds
//! - **pagination**: cursor windows over the document-wide chunk stream
//! - **service**: the four operations (fetch, list sections, read section, stream)
//! - **source**: raw document providers (EDGAR archive, local mirror, memory)
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use filingdex_core::Config;
//! use filingdex_extract::service::{FilingService, StreamRequest, DocumentRequest};
//! use filingdex_extract::source::FileSource;
//!
//! # async fn example() {
//! let config = Config::from_env();
//! let source = Arc::new(FileSource::new(&config.source.data_dir));
//! let service = FilingService::from_config(source, &config);
//! let page = service
//!     .stream_chunks(&StreamRequest {
//!         document: DocumentRequest {
//!             cik: "320193".into(),
//!             accession_number: "0000320193-23-000106".into(),
//!             document_name: Some("aapl-20230930.htm".into()),
//!         },
//!         chunk_size: Some(8000),
//!         overlap: None,
//!         start_chunk: 0,
//!         max_chunks: Some(3),
//!     })
//!     .await;
//! # }
//! ```

pub mod cache;
pub mod chunker;
pub mod normalize;
pub mod pagination;
pub mod sections;
pub mod service;
pub mod source;

pub use cache::{CacheStats, DocumentCache, ParsedDocument};
pub use chunker::{Chunk, ChunkParams};
pub use pagination::PaginationCursor;
pub use sections::Section;
pub use service::{to_response, FilingService};
pub use source::{FetchError, RawDocumentSource};
