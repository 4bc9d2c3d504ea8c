use std::collections::BTreeMap;
use std::sync::Arc;

use filingdex_core::{FilingError, SectionType};
use filingdex_extract::service::to_response;

use crate::helpers::{
    doc_request, html_filing, memory_source, scenario_document, section_request, service_over,
    stream_request,
};

#[tokio::test]
async fn test_stream_window_crosses_section_boundary() {
    let source = Arc::new(memory_source(&[("scenario.txt", scenario_document())]));
    let service = service_over(source);

    let page = service
        .stream_chunks(&stream_request("scenario.txt", 8000, 0, 2, 2))
        .await
        .unwrap();

    assert_eq!(page.chunks.len(), 2);
    assert_eq!(page.chunks[0].chunk_index, 2);
    assert_eq!(page.chunks[0].section_type, SectionType::Item1);
    assert_eq!(page.chunks[0].char_count, 4000);
    assert_eq!(page.chunks[1].chunk_index, 3);
    assert_eq!(page.chunks[1].section_type, SectionType::Item1A);
    assert_eq!(page.chunks[1].char_count, 8000);

    let cursor = page.pagination;
    assert!(cursor.has_prev);
    assert!(cursor.has_next);
    assert_eq!(cursor.next_start, Some(4));
    assert_eq!(cursor.end_chunk, 4);
    assert_eq!(cursor.total_chunks, 7);
}

#[tokio::test]
async fn test_section_chunk_lengths() {
    let source = Arc::new(memory_source(&[("scenario.txt", scenario_document())]));
    let service = service_over(source);

    let page = service
        .stream_chunks(&stream_request("scenario.txt", 8000, 0, 0, 100))
        .await
        .unwrap();
    let mut lengths: BTreeMap<SectionType, Vec<usize>> = BTreeMap::new();
    for c in &page.chunks {
        lengths.entry(c.section_type).or_default().push(c.char_count);
    }
    assert_eq!(lengths[&SectionType::Item1], vec![8000, 8000, 4000]);
    assert_eq!(lengths[&SectionType::Item1A], vec![8000, 8000, 8000, 6000]);
    assert!(!page.pagination.has_next);
}

#[tokio::test]
async fn test_list_sections_summary() {
    let source = Arc::new(memory_source(&[("scenario.txt", scenario_document())]));
    let service = service_over(source);

    let overview = service.list_sections(&doc_request("scenario.txt")).await.unwrap();
    assert_eq!(overview.summary.total_sections, 2);
    assert_eq!(overview.summary.total_chars, 50_000);
    assert_eq!(overview.sections[0].section_type, SectionType::Item1);
    assert_eq!(overview.sections[0].name, "Item 1. Business");
    assert_eq!(overview.sections[0].char_count, 20_000);
    assert_eq!(overview.sections[0].percentage, 40.0);
    assert_eq!(overview.sections[1].char_count, 30_000);
    assert_eq!(overview.sections[1].percentage, 60.0);

    let json = to_response(&Ok::<_, FilingError>(overview));
    assert_eq!(json["success"], true);
    assert_eq!(json["sections"][1]["type"], "item_1a");
}

#[tokio::test]
async fn test_html_filing_skips_table_of_contents() {
    let source = Arc::new(memory_source(&[("filing.htm", html_filing())]));
    let service = service_over(source);

    let overview = service.list_sections(&doc_request("filing.htm")).await.unwrap();
    let types: Vec<SectionType> = overview.sections.iter().map(|s| s.section_type).collect();
    assert_eq!(
        types,
        vec![SectionType::Item1, SectionType::Item1A, SectionType::Item2, SectionType::Item7]
    );
    // Listing rows are a few words; the chosen sections hold the prose.
    assert!(overview.sections.iter().all(|s| s.word_count > 50));
    assert_eq!(overview.sections[3].heading, "Item 7. Management\u{2019}s Discussion and Analysis");

    let text = service.fetch_document(&doc_request("filing.htm")).await.unwrap();
    assert!(!text.normalized_text.contains("hidden facts"));
    assert!(!text.normalized_text.contains('<'));
}

#[tokio::test]
async fn test_read_section_pages_through_one_item() {
    let source = Arc::new(memory_source(&[("scenario.txt", scenario_document())]));
    let service = service_over(source);

    let first = service
        .read_section(&section_request("scenario.txt", "risk_factors", 8000, 0))
        .await
        .unwrap();
    assert_eq!(first.section_name, "Item 1A. Risk Factors");
    assert_eq!(first.total_chunks, 4);
    assert!(first.has_more);
    assert_eq!(first.stream_index, 3);
    assert_eq!(first.section_summary.total_chars, 30_000);
    assert!(first.content.starts_with("Item 1A. Risk Factors"));

    let last = service
        .read_section(&section_request("scenario.txt", "item_1a", 8000, 3))
        .await
        .unwrap();
    assert_eq!(last.char_count, 6000);
    assert!(!last.has_more);

    let past = service
        .read_section(&section_request("scenario.txt", "item_1a", 8000, 4))
        .await
        .unwrap_err();
    assert!(matches!(past, FilingError::NotFound(_)));
}

#[tokio::test]
async fn test_unknown_and_absent_sections_are_not_found() {
    let source = Arc::new(memory_source(&[("scenario.txt", scenario_document())]));
    let service = service_over(source);

    let result = service
        .read_section(&section_request("scenario.txt", "item_99", 8000, 0))
        .await;
    assert!(matches!(result, Err(FilingError::NotFound(_))));
    let json = to_response(&result);
    assert_eq!(json["success"], false);
    assert_eq!(json["error"]["kind"], "not_found");

    let absent = service
        .read_section(&section_request("scenario.txt", "item_7", 8000, 0))
        .await;
    assert!(matches!(absent, Err(FilingError::NotFound(_))));
}

#[tokio::test]
async fn test_paging_past_the_end_is_empty() {
    let source = Arc::new(memory_source(&[("scenario.txt", scenario_document())]));
    let service = service_over(source);

    let page = service
        .stream_chunks(&stream_request("scenario.txt", 8000, 0, 7, 3))
        .await
        .unwrap();
    assert!(page.chunks.is_empty());
    assert!(!page.pagination.has_next);
    assert!(page.pagination.has_prev);
    assert_eq!(page.pagination.next_start, None);
}

#[tokio::test]
async fn test_invalid_arguments_are_rejected() {
    let source = Arc::new(memory_source(&[("scenario.txt", scenario_document())]));
    let service = service_over(source);

    for req in [
        stream_request("scenario.txt", 0, 0, 0, 2),
        stream_request("scenario.txt", 8000, 0, -1, 2),
        stream_request("scenario.txt", 8000, 0, 0, 0),
        stream_request("scenario.txt", 100, 100, 0, 2),
    ] {
        let err = service.stream_chunks(&req).await.unwrap_err();
        assert!(matches!(err, FilingError::InvalidArgument(_)), "{req:?} gave {err:?}");
    }

    let err = service
        .read_section(&section_request("scenario.txt", "item_1", 8000, -2))
        .await
        .unwrap_err();
    assert!(matches!(err, FilingError::InvalidArgument(_)));
}

#[tokio::test]
async fn test_overlapping_chunks_rebuild_each_section() {
    let raw = scenario_document();
    let source = Arc::new(memory_source(&[("scenario.txt", raw.clone())]));
    let service = service_over(source);

    let page = service
        .stream_chunks(&stream_request("scenario.txt", 3000, 150, 0, 1000))
        .await
        .unwrap();
    let mut rebuilt: BTreeMap<SectionType, String> = BTreeMap::new();
    for c in &page.chunks {
        assert!(c.char_count <= 3000);
        rebuilt.entry(c.section_type).or_default().push_str(c.new_content());
    }
    assert_eq!(rebuilt[&SectionType::Item1], raw[..20_000]);
    assert_eq!(rebuilt[&SectionType::Item1A], raw[20_000..]);
}

#[tokio::test]
async fn test_results_are_deterministic() {
    let raw = html_filing();
    let a = service_over(Arc::new(memory_source(&[("filing.htm", raw.clone())])));
    let b = service_over(Arc::new(memory_source(&[("filing.htm", raw)])));

    let req = stream_request("filing.htm", 700, 35, 1, 6);
    let left = to_response(&a.stream_chunks(&req).await);
    let right = to_response(&b.stream_chunks(&req).await);
    assert_eq!(left.to_string(), right.to_string());

    let left = to_response(&a.list_sections(&doc_request("filing.htm")).await);
    let right = to_response(&b.list_sections(&doc_request("filing.htm")).await);
    assert_eq!(left, right);
}
