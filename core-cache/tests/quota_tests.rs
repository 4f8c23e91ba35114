//! Tests for quota enforcement and eviction

#![cfg(not(target_arch = "wasm32"))]

mod common;

use std::sync::Arc;
use std::time::Duration;

use bridge_traits::{BlobStore, CachedBlob, Clock, ManualClock};
use bytes::Bytes;
use common::{DAY_MS, HOUR_MS, MB, NOW_MS};
use core_cache::{CacheConfig, CacheError, MemoryBlobStore, QuotaManager};

fn blob(url: &str, len: usize, timestamp: i64) -> CachedBlob {
    CachedBlob::new(url, Bytes::from(vec![0u8; len]), "video/mp4", timestamp)
}

fn manager(store: &Arc<MemoryBlobStore>, clock: &Arc<ManualClock>, max: u64) -> QuotaManager {
    QuotaManager::new(
        Arc::clone(store) as Arc<dyn BlobStore>,
        Arc::clone(clock) as Arc<dyn Clock>,
        max,
        CacheConfig::default().eviction_passes,
    )
}

async fn seed(store: &MemoryBlobStore, entries: &[(&str, usize, i64)]) {
    for (url, len, age_ms) in entries {
        store.put(blob(url, *len, NOW_MS - age_ms)).await.unwrap();
    }
}

#[tokio::test]
async fn test_first_pass_evicts_entries_older_than_three_days() {
    let store = Arc::new(MemoryBlobStore::new());
    let clock = Arc::new(ManualClock::new(NOW_MS));
    seed(
        &store,
        &[
            ("four-days", 40 * MB, 4 * DAY_MS),
            ("two-days", 30 * MB, 2 * DAY_MS),
            ("fresh", 25 * MB, 2 * HOUR_MS),
        ],
    )
    .await;
    let quota = manager(&store, &clock, (100 * MB) as u64);

    let outcome = quota.write(blob("incoming", 10 * MB, NOW_MS)).await.unwrap();

    assert_eq!(outcome.evicted, 1);
    assert!(!outcome.retried);
    assert!(store.peek("four-days").is_none());
    assert!(store.peek("two-days").is_some());
    assert_eq!(store.total_size().await.unwrap(), (65 * MB) as u64);
}

#[tokio::test]
async fn test_second_pass_evicts_entries_older_than_one_day() {
    let store = Arc::new(MemoryBlobStore::new());
    let clock = Arc::new(ManualClock::new(NOW_MS));
    seed(
        &store,
        &[
            ("four-days", 3 * MB, 4 * DAY_MS),
            ("two-days", 60 * MB, 2 * DAY_MS),
            ("fresh", 32 * MB, 2 * HOUR_MS),
        ],
    )
    .await;
    let quota = manager(&store, &clock, (100 * MB) as u64);

    let outcome = quota.write(blob("incoming", 10 * MB, NOW_MS)).await.unwrap();

    assert_eq!(outcome.evicted, 2);
    assert!(store.peek("fresh").is_some());
    assert!(store.peek("incoming").is_some());
    assert_eq!(store.total_size().await.unwrap(), (42 * MB) as u64);
}

#[tokio::test]
async fn test_write_proceeds_when_everything_is_fresh() {
    let store = Arc::new(MemoryBlobStore::new());
    let clock = Arc::new(ManualClock::new(NOW_MS));
    seed(&store, &[("a", 600, HOUR_MS), ("b", 350, 2 * HOUR_MS)]).await;
    let quota = manager(&store, &clock, 1000);

    let outcome = quota.write(blob("c", 100, NOW_MS)).await.unwrap();

    assert_eq!(outcome.evicted, 0);
    assert_eq!(store.len(), 3);
    assert_eq!(store.total_size().await.unwrap(), 1050);
}

#[tokio::test]
async fn test_total_stays_bounded_or_only_fresh_entries_remain() {
    const MAX: u64 = 1000;
    let store = Arc::new(MemoryBlobStore::new());
    let clock = Arc::new(ManualClock::new(NOW_MS));
    let quota = manager(&store, &clock, MAX);
    let sizes = [300usize, 450, 120, 999, 80, 640, 10, 500, 700, 260, 1000, 55];

    for (step, size) in sizes.iter().enumerate() {
        clock.advance_millis(9 * HOUR_MS);
        let now = clock.unix_timestamp_millis();
        quota
            .write(blob(&format!("item-{step}"), *size, now))
            .await
            .unwrap();

        let total = store.total_size().await.unwrap();
        let last_cutoff = now - DAY_MS;
        let entries = store.entries_by_age().await.unwrap();
        assert!(
            total <= MAX || entries.iter().all(|e| e.timestamp >= last_cutoff),
            "step {step}: {total} bytes with stale entries {entries:?}"
        );
    }
}

#[tokio::test]
async fn test_oversized_blob_is_stored_without_evicting_others() {
    let store = Arc::new(MemoryBlobStore::new());
    let clock = Arc::new(ManualClock::new(NOW_MS));
    seed(&store, &[("old", 10, 5 * DAY_MS)]).await;
    let quota = manager(&store, &clock, 100);

    let outcome = quota.write(blob("huge", 500, NOW_MS)).await.unwrap();

    assert_eq!(outcome.evicted, 0);
    assert!(store.peek("old").is_some());
    assert!(store.peek("huge").is_some());
}

#[tokio::test]
async fn test_host_rejection_evicts_oldest_and_retries_once() {
    let store = Arc::new(MemoryBlobStore::new().with_host_limit(100));
    let clock = Arc::new(ManualClock::new(NOW_MS));
    seed(
        &store,
        &[("oldest", 40, 3 * HOUR_MS), ("middle", 40, 2 * HOUR_MS), ("newest", 20, HOUR_MS)],
    )
    .await;
    let quota = manager(&store, &clock, 10_000);

    let outcome = quota.write(blob("incoming", 60, NOW_MS)).await.unwrap();

    assert!(outcome.retried);
    assert_eq!(outcome.evicted, 2);
    assert!(store.peek("oldest").is_none());
    assert!(store.peek("middle").is_none());
    assert!(store.peek("newest").is_some());
    assert!(store.peek("incoming").is_some());
}

#[tokio::test]
async fn test_host_rejection_never_evicts_the_entry_being_written() {
    let store = Arc::new(MemoryBlobStore::new().with_host_limit(100));
    let clock = Arc::new(ManualClock::new(NOW_MS));
    seed(&store, &[("target", 50, 5 * HOUR_MS), ("other", 50, HOUR_MS)]).await;
    let quota = manager(&store, &clock, 10_000);

    let outcome = quota.write(blob("target", 90, NOW_MS)).await.unwrap();

    assert!(outcome.retried);
    assert!(store.peek("other").is_none());
    assert_eq!(store.peek("target").unwrap().size(), 90);
}

#[tokio::test]
async fn test_second_host_rejection_propagates() {
    let store = Arc::new(MemoryBlobStore::new().with_host_limit(50));
    let clock = Arc::new(ManualClock::new(NOW_MS));
    seed(&store, &[("a", 30, HOUR_MS)]).await;
    let quota = manager(&store, &clock, 10_000);

    let err = quota.write(blob("big", 80, NOW_MS)).await.unwrap_err();

    assert!(matches!(err, CacheError::QuotaExceeded(_)));
    assert!(store.peek("a").is_none());
    assert_eq!(store.call_counts().writes, 3);
}

#[tokio::test]
async fn test_unavailable_store_propagates() {
    let store = Arc::new(MemoryBlobStore::new());
    store.set_unavailable(true);
    let clock = Arc::new(ManualClock::new(NOW_MS));
    let quota = manager(&store, &clock, 1000);

    let err = quota.write(blob("a", 1, NOW_MS)).await.unwrap_err();
    assert!(matches!(err, CacheError::StorageUnavailable(_)));
}

#[tokio::test]
async fn test_custom_eviction_passes() {
    let store = Arc::new(MemoryBlobStore::new());
    let clock = Arc::new(ManualClock::new(NOW_MS));
    seed(&store, &[("a", 60, 3 * HOUR_MS), ("b", 30, 30 * 60 * 1000)]).await;
    let quota = QuotaManager::new(
        Arc::clone(&store) as Arc<dyn BlobStore>,
        Arc::clone(&clock) as Arc<dyn Clock>,
        100,
        vec![Duration::from_secs(2 * 3600)],
    );

    quota.write(blob("c", 20, NOW_MS)).await.unwrap();
    assert!(store.peek("a").is_none());
    assert!(store.peek("b").is_some());
}
