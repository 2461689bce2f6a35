//! Integration tests for the single-slot prefetch cache

use crate::integration::test_utils::{runtime, CountingFetcher, GatedFetcher, NeverFetcher};
use persona::error::FetchError;
use persona::fetch::MetadataFetcher;
use persona::prefetch::{PrefetchCache, PrefetchConfig};
use persona::types::{ContentId, ContentMetadata};
use std::sync::Arc;
use std::time::{Duration, Instant};

const LONG_WAIT: Duration = Duration::from_secs(5);

fn live() -> ContentMetadata {
    ContentMetadata::new(true, true)
}

fn vod() -> ContentMetadata {
    ContentMetadata::new(false, true)
}

#[test]
fn test_same_key_is_fetched_once() {
    let rt = runtime();
    let cache = PrefetchCache::new(rt.handle().clone(), PrefetchConfig::default());
    let fetcher = CountingFetcher::new(vod());

    let scheduled: usize = (0..10)
        .map(|_| cache.ensure_fetching(ContentId::new("A"), fetcher.clone()))
        .filter(|issued| *issued)
        .count();

    assert_eq!(scheduled, 1);
    assert_eq!(cache.get(true, LONG_WAIT), Some(vod()));
    assert_eq!(fetcher.calls(), 1);
    assert_eq!(cache.generation(), 1);
}

#[test]
fn test_concurrent_requests_for_same_key_share_one_fetch() {
    let rt = runtime();
    let cache = Arc::new(PrefetchCache::new(
        rt.handle().clone(),
        PrefetchConfig::default(),
    ));
    let fetcher = CountingFetcher::new(live());

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let cache = Arc::clone(&cache);
            let fetcher: Arc<dyn MetadataFetcher> = fetcher.clone();
            std::thread::spawn(move || cache.ensure_fetching(ContentId::new("A"), fetcher))
        })
        .collect();
    let scheduled = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|issued| *issued)
        .count();

    assert_eq!(scheduled, 1);
    assert_eq!(cache.get(true, LONG_WAIT), Some(live()));
    assert_eq!(fetcher.calls(), 1);
}

#[test]
fn test_new_key_supersedes_in_flight_fetch() {
    let rt = runtime();
    let cache = PrefetchCache::new(rt.handle().clone(), PrefetchConfig::default());
    let slow_a = GatedFetcher::new(Ok(live()));
    let quick_b = GatedFetcher::new(Ok(vod()));

    assert!(cache.ensure_fetching(ContentId::new("A"), slow_a.clone()));
    assert!(cache.ensure_fetching(ContentId::new("B"), quick_b.clone()));
    assert_eq!(cache.current_key(), Some(ContentId::new("B")));

    quick_b.open();
    assert_eq!(cache.get(true, LONG_WAIT), Some(vod()));

    // A finishing late must not overwrite B.
    slow_a.open();
    std::thread::sleep(Duration::from_millis(100));
    assert_eq!(cache.get(false, LONG_WAIT), Some(vod()));
    assert_eq!(cache.get_for(&ContentId::new("A"), false, LONG_WAIT), None);
    assert_eq!(cache.generation(), 2);
}

#[test]
fn test_returning_to_previous_key_fetches_again() {
    let rt = runtime();
    let cache = PrefetchCache::new(rt.handle().clone(), PrefetchConfig::default());
    let fetcher = CountingFetcher::new(vod());

    assert!(cache.ensure_fetching(ContentId::new("A"), fetcher.clone()));
    cache.get(true, LONG_WAIT);
    assert!(cache.ensure_fetching(ContentId::new("B"), fetcher.clone()));
    cache.get(true, LONG_WAIT);
    assert!(cache.ensure_fetching(ContentId::new("A"), fetcher.clone()));
    cache.get(true, LONG_WAIT);

    assert_eq!(fetcher.calls(), 3);
}

#[test]
fn test_blocking_read_times_out() {
    let rt = runtime();
    let cache = PrefetchCache::new(rt.handle().clone(), PrefetchConfig::default());
    cache.ensure_fetching(ContentId::new("A"), Arc::new(NeverFetcher));

    let started = Instant::now();
    let result = cache.get(true, Duration::from_millis(100));
    let elapsed = started.elapsed();

    assert_eq!(result, None);
    assert!(elapsed >= Duration::from_millis(100), "returned early: {:?}", elapsed);
    assert!(elapsed < Duration::from_secs(2), "waited too long: {:?}", elapsed);
}

#[test]
fn test_each_blocking_read_waits_full_timeout() {
    let rt = runtime();
    let cache = PrefetchCache::new(rt.handle().clone(), PrefetchConfig::default());
    cache.ensure_fetching(ContentId::new("A"), Arc::new(NeverFetcher));

    assert_eq!(cache.get(true, Duration::from_millis(50)), None);
    let started = Instant::now();
    assert_eq!(cache.get(true, Duration::from_millis(50)), None);
    assert!(started.elapsed() >= Duration::from_millis(50));
}

#[test]
fn test_non_blocking_poll_returns_immediately() {
    let rt = runtime();
    let cache = PrefetchCache::new(rt.handle().clone(), PrefetchConfig::default());
    cache.ensure_fetching(ContentId::new("A"), Arc::new(NeverFetcher));

    let started = Instant::now();
    assert_eq!(cache.get(false, LONG_WAIT), None);
    assert!(started.elapsed() < Duration::from_secs(1));
}

#[test]
fn test_failed_fetch_is_not_retried() {
    let rt = runtime();
    let cache = PrefetchCache::new(rt.handle().clone(), PrefetchConfig::default());
    let failing = GatedFetcher::new(Err(FetchError::Failed("HTTP 500".to_string())));
    failing.open();

    assert!(cache.ensure_fetching(ContentId::new("A"), failing.clone()));
    assert_eq!(cache.get(true, LONG_WAIT), None);
    assert!(!cache.ensure_fetching(ContentId::new("A"), failing));
    assert_eq!(cache.generation(), 1);
}

#[test]
fn test_async_read_sees_completion() {
    let rt = runtime();
    let cache = Arc::new(PrefetchCache::new(
        rt.handle().clone(),
        PrefetchConfig::default(),
    ));
    let gated = GatedFetcher::new(Ok(live()));
    cache.ensure_fetching(ContentId::new("A"), gated.clone());

    let reader = Arc::clone(&cache);
    let result = rt.block_on(async move {
        let read = tokio::spawn(async move { reader.get_async(LONG_WAIT).await });
        gated.open();
        read.await.unwrap()
    });
    assert_eq!(result, Some(live()));
}

#[test]
fn test_unbounded_timeout_waits_for_completion() {
    let rt = runtime();
    let cache = PrefetchCache::new(rt.handle().clone(), PrefetchConfig::default());
    let gated = GatedFetcher::new(Ok(live()));
    cache.ensure_fetching(ContentId::new("A"), gated.clone());

    gated.open();
    assert_eq!(cache.get(true, Duration::MAX), Some(live()));
    assert_eq!(
        cache.get_for(&ContentId::new("A"), true, Duration::MAX),
        Some(live())
    );
}
