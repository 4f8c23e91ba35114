//! Tests for the prefetch scheduler

#![cfg(not(target_arch = "wasm32"))]

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::*;
use core_cache::{PrefetchScheduler, StoreCallCounts};
use core_library::MediaItem;

fn feed(len: usize) -> Vec<MediaItem> {
    (0..len)
        .map(|i| {
            MediaItem::new(format!("id-{i}"), format!("{i}.jpg"), "image/jpeg")
                .with_link(format!("https://x/{i}.jpg"))
        })
        .collect()
}

fn serve_feed(h: &Harness, items: &[MediaItem]) {
    for item in items {
        if let Some(url) = item.media_url() {
            h.http.serve_bytes(url, 32, "image/jpeg");
        }
    }
}

#[tokio::test]
async fn test_fan_out_depends_on_platform() {
    let h = Harness::new();
    let permissive = PrefetchScheduler::new(Arc::new(h.cache(&permissive_signals())));
    let restricted = PrefetchScheduler::new(Arc::new(h.cache(&restricted_signals())));

    assert_eq!(permissive.fan_out(), 5);
    assert_eq!(restricted.fan_out(), 2);
}

#[tokio::test]
async fn test_run_prefetches_upcoming_items_with_wrap_around() {
    let h = Harness::new();
    let items = feed(6);
    serve_feed(&h, &items);
    let scheduler = PrefetchScheduler::new(Arc::new(h.cache(&permissive_signals())));

    let report = scheduler.run(4, &items).await;

    assert_eq!(report.targets, vec![5, 0, 1, 2, 3]);
    assert_eq!(h.store.len(), 5);
    assert!(h.store.peek("https://x/4.jpg").is_none());
    assert!(scheduler.was_attempted(0));
    assert!(!scheduler.was_attempted(4));
}

#[tokio::test]
async fn test_same_index_twice_fetches_each_target_once() {
    let h = Harness::new();
    let items = feed(10);
    serve_feed(&h, &items);
    // No persistent store on this platform, so only the record can dedupe.
    let scheduler = PrefetchScheduler::new(Arc::new(h.cache(&restricted_signals())));

    let first = scheduler.run(3, &items).await;
    let second = scheduler.run(3, &items).await;

    assert_eq!(first.targets, vec![4, 5]);
    assert!(second.targets.is_empty());
    assert_eq!(h.http.requests_for("https://x/4.jpg"), 1);
    assert_eq!(h.http.requests_for("https://x/5.jpg"), 1);
    assert_eq!(h.http.request_count(), 2);
    assert_eq!(h.store.call_counts(), StoreCallCounts::default());
}

#[tokio::test]
async fn test_overlapping_windows_only_claim_new_indices() {
    let h = Harness::new();
    let items = feed(10);
    serve_feed(&h, &items);
    let scheduler = PrefetchScheduler::new(Arc::new(h.cache(&restricted_signals())));

    scheduler.run(0, &items).await;
    let report = scheduler.run(1, &items).await;

    assert_eq!(report.targets, vec![3]);
    assert_eq!(h.http.request_count(), 3);
}

#[tokio::test]
async fn test_thumbnails_are_prefetched_when_distinct() {
    let h = Harness::new();
    let mut video = MediaItem::new("v", "v.mp4", "video/mp4").with_link("https://x/v.mp4");
    video.thumbnail_link = Some("https://x/v-thumb.jpg".into());
    let items = vec![feed(1).remove(0), video];
    h.http.serve_bytes("https://x/v.mp4", 64, "video/mp4");
    h.http.serve_bytes("https://x/v-thumb.jpg", 8, "image/jpeg");
    let scheduler = PrefetchScheduler::new(Arc::new(h.cache(&permissive_signals())));

    let report = scheduler.run(0, &items).await;

    assert_eq!(report.urls.len(), 2);
    assert!(h.store.peek("https://x/v.mp4").is_some());
    assert!(h.store.peek("https://x/v-thumb.jpg").is_some());
}

#[tokio::test]
async fn test_one_failure_does_not_cancel_others() {
    let h = Harness::new();
    let items = feed(4);
    serve_feed(&h, &items);
    h.http.serve_status("https://x/2.jpg", 500);
    let scheduler = PrefetchScheduler::new(Arc::new(h.cache(&permissive_signals())));

    let report = scheduler.run(0, &items).await;

    assert_eq!(report.targets, vec![1, 2, 3]);
    assert!(h.store.peek("https://x/1.jpg").is_some());
    assert!(h.store.peek("https://x/2.jpg").is_none());
    assert!(h.store.peek("https://x/3.jpg").is_some());
    // Failed targets stay claimed for the session.
    assert!(scheduler.run(0, &items).await.targets.is_empty());
}

#[tokio::test]
async fn test_reset_allows_new_attempts() {
    let h = Harness::new();
    let items = feed(3);
    serve_feed(&h, &items);
    let scheduler = PrefetchScheduler::new(Arc::new(h.cache(&restricted_signals())));

    scheduler.run(0, &items).await;
    scheduler.reset();
    let report = scheduler.run(0, &items).await;

    assert_eq!(report.targets, vec![1, 2]);
    assert_eq!(h.http.request_count(), 4);
}

#[tokio::test]
async fn test_short_lists() {
    let h = Harness::new();
    let scheduler = PrefetchScheduler::new(Arc::new(h.cache(&permissive_signals())));

    assert!(scheduler.run(0, &[]).await.targets.is_empty());
    assert!(scheduler.run(0, &feed(1)).await.targets.is_empty());
    assert_eq!(h.http.request_count(), 0);
}

#[tokio::test]
async fn test_schedule_runs_in_background() {
    let h = Harness::new();
    let items = feed(4);
    serve_feed(&h, &items);
    let scheduler = Arc::new(PrefetchScheduler::with_fan_out(
        Arc::new(h.cache(&permissive_signals())),
        2,
    ));

    scheduler.schedule(0, Arc::new(items));
    assert!(scheduler.was_attempted(1));

    let store = Arc::clone(&h.store);
    tokio::time::timeout(Duration::from_secs(5), async move {
        while store.len() < 2 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("prefetch task finished");

    assert!(scheduler.was_attempted(1));
    assert!(scheduler.was_attempted(2));
    assert!(!scheduler.was_attempted(3));
}
