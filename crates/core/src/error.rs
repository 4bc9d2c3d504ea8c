use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilingError {
    /// Unknown document, or a section type absent from the document.
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Upstream fetch failed: {0}")]
    UpstreamFetch(String),

    #[error("Document build exceeded {0:?}")]
    Timeout(Duration),

    #[error("{0}")]
    Internal(String),
}

impl FilingError {
    /// Stable snake_case tag used in serialized failure results.
    pub fn kind(&self) -> &'static str {
        match self {
            FilingError::NotFound(_) => "not_found",
            FilingError::InvalidArgument(_) => "invalid_argument",
            FilingError::UpstreamFetch(_) => "upstream_fetch_error",
            FilingError::Timeout(_) => "timeout",
            FilingError::Internal(_) => "internal",
        }
    }

    /// `NotFound` is a normal negative answer, not a failed request.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, FilingError::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, FilingError>;
