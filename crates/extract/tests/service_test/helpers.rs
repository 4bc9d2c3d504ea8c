use std::path::PathBuf;
use std::sync::Arc;

use uuid::Uuid;

use filingdex_core::{Config, DocumentKey};
use filingdex_extract::service::{DocumentRequest, FilingService, ReadSectionRequest, StreamRequest};
use filingdex_extract::source::MemorySource;

pub const CIK: &str = "320193";
pub const ACCESSION: &str = "0000320193-23-000106";

/// Create a unique temp directory for each test.
pub fn test_data_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("filingdex-test-{}", Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

pub fn key(document: &str) -> DocumentKey {
    DocumentKey::new(CIK, ACCESSION, Some(document.to_string()))
}

pub fn doc_request(document: &str) -> DocumentRequest {
    DocumentRequest {
        cik: CIK.to_string(),
        accession_number: ACCESSION.to_string(),
        document_name: Some(document.to_string()),
    }
}

pub fn stream_request(
    document: &str,
    chunk_size: i64,
    overlap: i64,
    start_chunk: i64,
    max_chunks: i64,
) -> StreamRequest {
    StreamRequest {
        document: doc_request(document),
        chunk_size: Some(chunk_size),
        overlap: Some(overlap),
        start_chunk,
        max_chunks: Some(max_chunks),
    }
}

pub fn section_request(
    document: &str,
    section_type: &str,
    chunk_size: i64,
    chunk_index: i64,
) -> ReadSectionRequest {
    ReadSectionRequest {
        document: doc_request(document),
        section_type: section_type.to_string(),
        chunk_size: Some(chunk_size),
        overlap: Some(0),
        chunk_index,
    }
}

/// A paragraph of exactly `len` characters ending in a period.
pub fn paragraph(head: &str, len: usize) -> String {
    let mut p = format!("{head} ");
    while p.len() < len {
        p.push_str("lorem ipsum dolor sit amet ");
    }
    p.truncate(len - 1);
    p.push('.');
    p
}

/// 50,000 characters of plain text: `Item 1` spans [0, 20000) and
/// `Item 1A` spans [20000, 50000), in 1000-character paragraphs.
pub fn scenario_document() -> String {
    let paragraphs: Vec<String> = (0..50)
        .map(|i| {
            let head = match i {
                0 => "Item 1. Business".to_string(),
                20 => "Item 1A. Risk Factors".to_string(),
                n => format!("Paragraph {n}"),
            };
            // Every paragraph but the last is followed by a newline.
            let len = if i == 49 { 1000 } else { 999 };
            paragraph(&head, len)
        })
        .collect();
    paragraphs.join("\n")
}

/// A filing rendered as HTML with a table of contents ahead of the body.
pub fn html_filing() -> String {
    let body = |topic: &str, n: usize| {
        (0..n)
            .map(|i| format!("<p>Our {topic} discussion continues in paragraph {i} with detail.</p>"))
            .collect::<String>()
    };
    let mut s = String::from("<html><head><title>10-K</title><style>p{margin:0}</style></head><body>");
    s.push_str("<div><b>TABLE OF CONTENTS</b></div><table>");
    for (item, title) in [
        ("Item 1.", "Business"),
        ("Item 1A.", "Risk Factors"),
        ("Item 2.", "Properties"),
        ("Item 7.", "Management&#8217;s Discussion and Analysis"),
    ] {
        s.push_str(&format!("<tr><td>{item}</td><td>{title}</td><td>3</td></tr>"));
    }
    s.push_str("</table>");
    s.push_str("<div style=\"display:none\"><ix:header><ix:hidden>hidden facts</ix:hidden></ix:header></div>");
    s.push_str("<p><b>Item 1.&nbsp;Business</b></p>");
    s.push_str(&body("business", 40));
    s.push_str("<p><b>Item 1A. Risk Factors</b></p>");
    s.push_str(&body("risk", 80));
    s.push_str("<p><b>Item 2. Properties</b></p>");
    s.push_str(&body("property", 10));
    s.push_str("<p><b>Item 7. Management&#8217;s Discussion and Analysis</b></p>");
    s.push_str(&body("results", 60));
    s.push_str("</body></html>");
    s
}

pub fn memory_source(docs: &[(&str, String)]) -> MemorySource {
    docs.iter()
        .fold(MemorySource::new(), |src, (name, raw)| src.with_document(key(name), raw.clone()))
}

pub fn service_over(source: Arc<MemorySource>) -> FilingService {
    FilingService::from_config(source, &Config::default())
}
