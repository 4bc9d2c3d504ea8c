use std::time::Duration;

use async_trait::async_trait;
use filingdex_core::config::SourceConfig;
use filingdex_core::DocumentKey;
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

use super::{FetchError, RawDocumentSource};

const BACKOFF_BASE: Duration = Duration::from_millis(500);
const BACKOFF_MAX: Duration = Duration::from_secs(8);

/// Source backed by the EDGAR archive over HTTPS.
pub struct EdgarSource {
    client: Client,
    base_url: String,
    max_retries: u32,
}

impl EdgarSource {
    /// EDGAR rejects anonymous clients, so a user agent is required.
    pub fn new(config: &SourceConfig) -> Result<Self, FetchError> {
        let user_agent = config.user_agent.clone().ok_or_else(|| {
            FetchError::Config(
                "EDGAR_USER_AGENT must be set (e.g. \"Acme Research ops@acme.com\")".into(),
            )
        })?;
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(config.fetch_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: config.edgar_base_url.trim_end_matches('/').to_string(),
            max_retries: config.max_retries,
        })
    }

    /// Archive URL: `{base}/{cik}/{accession without dashes}/{document}`.
    pub fn url_for(&self, key: &DocumentKey) -> String {
        let cik = key.cik.trim_start_matches('0');
        let cik = if cik.is_empty() { "0" } else { cik };
        format!(
            "{}/{}/{}/{}",
            self.base_url,
            cik,
            key.accession_compact(),
            key.document_file()
        )
    }

    async fn fetch_once(&self, url: &str) -> Result<String, FetchError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound(url.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }
        let bytes = response.bytes().await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

fn is_transient(e: &FetchError) -> bool {
    match e {
        FetchError::Status { status, .. } => *status == 429 || *status >= 500,
        FetchError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
        _ => false,
    }
}

fn backoff(attempt: u32) -> Duration {
    BACKOFF_BASE
        .saturating_mul(1u32 << attempt.min(16))
        .min(BACKOFF_MAX)
}

#[async_trait]
impl RawDocumentSource for EdgarSource {
    async fn fetch_raw(&self, key: &DocumentKey) -> Result<String, FetchError> {
        let url = self.url_for(key);
        let mut attempt = 0;
        loop {
            match self.fetch_once(&url).await {
                Ok(body) => {
                    debug!(url = %url, bytes = body.len(), attempt, "fetched raw document");
                    return Ok(body);
                }
                Err(e) if attempt < self.max_retries && is_transient(&e) => {
                    let delay = backoff(attempt);
                    warn!(
                        url = %url,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "fetch failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn name(&self) -> &str {
        "edgar"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SourceConfig {
        SourceConfig {
            user_agent: Some("Test Suite test@example.com".into()),
            edgar_base_url: "https://example.test/Archives/edgar/data/".into(),
            ..SourceConfig::default()
        }
    }

    #[test]
    fn builds_archive_urls() {
        let source = EdgarSource::new(&config()).unwrap();
        let key = DocumentKey::new(
            "0000320193",
            "0000320193-23-000106",
            Some("aapl-20230930.htm".into()),
        );
        assert_eq!(
            source.url_for(&key),
            "https://example.test/Archives/edgar/data/320193/000032019323000106/aapl-20230930.htm"
        );

        let full = DocumentKey::new("320193", "0000320193-23-000106", None);
        assert!(source.url_for(&full).ends_with("/000032019323000106/0000320193-23-000106.txt"));
    }

    #[test]
    fn requires_user_agent() {
        let cfg = SourceConfig {
            user_agent: None,
            ..config()
        };
        assert!(matches!(EdgarSource::new(&cfg), Err(FetchError::Config(_))));
    }

    #[test]
    fn backoff_doubles_and_caps() {
        assert_eq!(backoff(0), Duration::from_millis(500));
        assert_eq!(backoff(1), Duration::from_secs(1));
        assert_eq!(backoff(3), Duration::from_secs(4));
        assert_eq!(backoff(10), BACKOFF_MAX);
    }

    #[test]
    fn only_server_side_statuses_are_retried() {
        let status = |s| FetchError::Status {
            status: s,
            body: String::new(),
        };
        assert!(is_transient(&status(503)));
        assert!(is_transient(&status(429)));
        assert!(!is_transient(&status(403)));
        assert!(!is_transient(&FetchError::NotFound("x".into())));
    }
}
