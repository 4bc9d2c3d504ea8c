use std::path::{Path, PathBuf};

use async_trait::async_trait;
use filingdex_core::DocumentKey;
use tracing::debug;

use super::{FetchError, RawDocumentSource};

/// Source reading a local mirror laid out as `{root}/{cik}/{accession}/{document}`.
pub struct FileSource {
    root: PathBuf,
}

impl FileSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, key: &DocumentKey) -> PathBuf {
        self.root
            .join(&key.cik)
            .join(&key.accession_number)
            .join(key.document_file())
    }
}

#[async_trait]
impl RawDocumentSource for FileSource {
    async fn fetch_raw(&self, key: &DocumentKey) -> Result<String, FetchError> {
        let path = self.path_for(key);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(FetchError::NotFound(path.display().to_string()));
            }
            Err(e) => return Err(FetchError::Io(e)),
        };
        debug!(path = %path.display(), bytes = bytes.len(), "read raw document");
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn name(&self) -> &str {
        "file"
    }
}
