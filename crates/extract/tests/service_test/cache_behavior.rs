use std::sync::Arc;
use std::time::Duration;

use filingdex_core::config::{CacheConfig, ChunkingConfig, SectionConfig};
use filingdex_core::FilingError;
use filingdex_extract::cache::DocumentCache;
use filingdex_extract::service::{to_response, FilingService};

use crate::helpers::{
    doc_request, html_filing, key, memory_source, scenario_document, service_over, stream_request,
};

#[tokio::test]
async fn test_cache_hit_matches_cold_build() {
    let source = Arc::new(memory_source(&[("filing.htm", html_filing())]));
    let warm = service_over(source.clone());
    let req = stream_request("filing.htm", 900, 45, 0, 50);

    let cold = to_response(&warm.stream_chunks(&req).await);
    let hit = to_response(&warm.stream_chunks(&req).await);
    assert_eq!(cold, hit);
    assert_eq!(source.fetch_count(), 1);

    let stats = warm.cache_stats().await;
    assert_eq!(stats.builds, 1);
    assert_eq!(stats.hits, 1);

    let fresh = service_over(Arc::new(memory_source(&[("filing.htm", html_filing())])));
    assert_eq!(to_response(&fresh.stream_chunks(&req).await), cold);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_misses_share_one_build() {
    let source = Arc::new(
        memory_source(&[("filing.htm", html_filing())]).with_delay(Duration::from_millis(100)),
    );
    let service = Arc::new(service_over(source.clone()));

    let mut handles = Vec::new();
    for i in 0..8 {
        let service = service.clone();
        handles.push(tokio::spawn(async move {
            if i % 2 == 0 {
                service
                    .list_sections(&doc_request("filing.htm"))
                    .await
                    .map(|o| o.summary.total_sections)
            } else {
                service
                    .stream_chunks(&stream_request("filing.htm", 2000, 0, 0, 3))
                    .await
                    .map(|p| p.chunks.len())
            }
        }));
    }
    for handle in handles {
        assert!(handle.await.unwrap().unwrap() > 0);
    }

    assert_eq!(source.fetch_count(), 1);
    let stats = service.cache_stats().await;
    assert_eq!(stats.builds, 1);
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, 7);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_failed_build_is_shared_then_retried_once() {
    let source = Arc::new(
        memory_source(&[("filing.htm", html_filing())])
            .with_delay(Duration::from_millis(100))
            .with_failures(1),
    );
    let service = Arc::new(service_over(source.clone()));

    let spawn_at = |after: u64| {
        let service = service.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(after)).await;
            service
                .list_sections(&doc_request("filing.htm"))
                .await
                .map(|o| o.summary.total_sections)
        })
    };

    // First caller's fetch fails at ~100ms; the second joined its build.
    // The third arrives after the failure and starts the only retry.
    let first = spawn_at(0);
    let joined = spawn_at(10);
    let later = spawn_at(160);

    let first = first.await.unwrap();
    let joined = joined.await.unwrap();
    assert!(matches!(first, Err(FilingError::UpstreamFetch(_))));
    assert_eq!(joined, first);
    assert_eq!(later.await.unwrap(), Ok(4));

    // The retried build is installed and serves the next caller.
    let again = service.list_sections(&doc_request("filing.htm")).await.unwrap();
    assert_eq!(again.summary.total_sections, 4);
    assert_eq!(source.fetch_count(), 2);
    let stats = service.cache_stats().await;
    assert_eq!(stats.builds, 1);
    assert_eq!(stats.len, 1);
}

#[tokio::test]
async fn test_eviction_forces_rebuild() {
    let source = Arc::new(memory_source(&[
        ("a.htm", html_filing()),
        ("b.txt", scenario_document()),
    ]));
    let config = CacheConfig {
        capacity: 1,
        ..CacheConfig::default()
    };
    let cache = Arc::new(DocumentCache::new(&config, SectionConfig::default()));
    let service = FilingService::new(source.clone(), cache.clone(), ChunkingConfig::default());

    service.stream_chunks(&stream_request("a.htm", 1000, 0, 0, 2)).await.unwrap();
    service.list_sections(&doc_request("b.txt")).await.unwrap();
    assert!(!cache.contains(&key("a.htm")).await);

    service.stream_chunks(&stream_request("a.htm", 1000, 0, 0, 2)).await.unwrap();
    assert_eq!(source.fetch_count(), 3);
    let stats = cache.stats().await;
    assert_eq!(stats.builds, 3);
    assert_eq!(stats.evictions, 2);
    assert_eq!(stats.len, 1);
}

#[tokio::test]
async fn test_build_timeout_installs_nothing() {
    // A few megabytes of markup takes far longer than a nanosecond to parse.
    let mut big = String::from("<html><body>");
    let filler = html_filing();
    while big.len() < 6 * 1024 * 1024 {
        big.push_str(&filler);
    }
    big.push_str("</body></html>");
    let source = Arc::new(memory_source(&[("big.htm", big)]));

    let cache = Arc::new(
        DocumentCache::new(&CacheConfig::default(), SectionConfig::default())
            .with_build_timeout(Duration::from_nanos(1)),
    );
    let service = FilingService::new(source.clone(), cache.clone(), ChunkingConfig::default());

    let err = service.list_sections(&doc_request("big.htm")).await.unwrap_err();
    assert!(matches!(err, FilingError::Timeout(_)));
    assert_eq!(err.kind(), "timeout");
    assert!(cache.is_empty().await);
    assert_eq!(cache.stats().await.builds, 0);

    // Same source, normal budget: the request succeeds.
    let patient = service_over(source);
    let overview = patient.list_sections(&doc_request("big.htm")).await.unwrap();
    assert!(overview.summary.total_sections > 0);
}
