use std::sync::Arc;

use filingdex_core::config::SourceConfig;
use filingdex_core::{Config, DocumentKey, Fidelity, FilingError};
use filingdex_extract::service::{DocumentRequest, FilingService};
use filingdex_extract::source::{EdgarSource, FetchError, FileSource, RawDocumentSource};

use crate::helpers::{html_filing, test_data_dir, ACCESSION, CIK};

fn write_document(root: &std::path::Path, document: &str, contents: &str) {
    let dir = root.join(CIK).join(ACCESSION);
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join(document), contents).unwrap();
}

fn submission() -> String {
    let mut s = String::from("<SEC-DOCUMENT>0000320193-23-000106.txt\n<SEC-HEADER>\nCONFORMED SUBMISSION TYPE: 10-K\n</SEC-HEADER>\n");
    s.push_str("<DOCUMENT>\n<TYPE>10-K\n<SEQUENCE>1\n<FILENAME>main.htm\n<DESCRIPTION>10-K\n<TEXT>\n");
    s.push_str(&html_filing());
    s.push_str("\n</TEXT>\n</DOCUMENT>\n");
    s.push_str("<DOCUMENT>\n<TYPE>EX-21.1\n<SEQUENCE>2\n<FILENAME>ex211.htm\n<TEXT>\n");
    s.push_str("<html><body><p>Subsidiaries of the Registrant</p></body></html>\n");
    s.push_str("</TEXT>\n</DOCUMENT>\n</SEC-DOCUMENT>\n");
    s
}

#[tokio::test]
async fn test_file_source_reads_mirror_layout() {
    let root = test_data_dir();
    write_document(&root, "filing.htm", &html_filing());
    let source = FileSource::new(&root);

    let key = DocumentKey::new(CIK, ACCESSION, Some("filing.htm".into()));
    assert_eq!(
        source.path_for(&key),
        root.join(CIK).join(ACCESSION).join("filing.htm")
    );
    let raw = source.fetch_raw(&key).await.unwrap();
    assert_eq!(raw, html_filing());

    let compact = DocumentKey::new(CIK, ACCESSION.replace('-', ""), Some("filing.htm".into()));
    assert_eq!(source.fetch_raw(&compact).await.unwrap(), raw);

    let missing = DocumentKey::new(CIK, ACCESSION, Some("nope.htm".into()));
    assert!(matches!(
        source.fetch_raw(&missing).await,
        Err(FetchError::NotFound(_))
    ));

    std::fs::remove_dir_all(&root).ok();
}

#[tokio::test]
async fn test_full_submission_uses_primary_document() {
    let root = test_data_dir();
    write_document(&root, &format!("{ACCESSION}.txt"), &submission());
    let service = FilingService::from_config(Arc::new(FileSource::new(&root)), &Config::default());

    let req = DocumentRequest {
        cik: CIK.into(),
        accession_number: ACCESSION.into(),
        document_name: None,
    };
    let doc = service.fetch_document(&req).await.unwrap();
    assert_eq!(doc.primary_document.as_deref(), Some("main.htm"));
    assert_eq!(doc.document_name, format!("{ACCESSION}.txt"));
    assert!(doc.normalized_text.contains("Item 1A. Risk Factors"));
    assert!(!doc.normalized_text.contains("Subsidiaries"));
    assert!(!doc.normalized_text.contains("<TYPE>"));

    let overview = service.list_sections(&req).await.unwrap();
    assert_eq!(overview.summary.total_sections, 4);

    std::fs::remove_dir_all(&root).ok();
}

#[tokio::test]
async fn test_missing_document_is_not_found() {
    let root = test_data_dir();
    let service = FilingService::from_config(Arc::new(FileSource::new(&root)), &Config::default());
    let req = DocumentRequest {
        cik: CIK.into(),
        accession_number: ACCESSION.into(),
        document_name: Some("absent.htm".into()),
    };
    let err = service.fetch_document(&req).await.unwrap_err();
    assert!(matches!(err, FilingError::NotFound(_)));
    assert!(err.is_recoverable());
    assert!(service.cache().is_empty().await);

    std::fs::remove_dir_all(&root).ok();
}

#[tokio::test]
async fn test_malformed_markup_reports_degraded_fidelity() {
    let root = test_data_dir();
    let mut raw = html_filing();
    raw.push_str("<div class=\"unterminated");
    write_document(&root, "broken.htm", &raw);
    let service = FilingService::from_config(Arc::new(FileSource::new(&root)), &Config::default());

    let req = DocumentRequest {
        cik: CIK.into(),
        accession_number: ACCESSION.into(),
        document_name: Some("broken.htm".into()),
    };
    let overview = service.list_sections(&req).await.unwrap();
    assert_eq!(overview.fidelity, Fidelity::Degraded);
    assert!(overview.summary.total_sections > 0);

    std::fs::remove_dir_all(&root).ok();
}

#[test]
fn test_edgar_source_requires_user_agent() {
    let config = SourceConfig::default();
    assert!(matches!(
        EdgarSource::new(&config),
        Err(FetchError::Config(_))
    ));
}
