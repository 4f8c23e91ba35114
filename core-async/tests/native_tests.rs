#![cfg(not(target_arch = "wasm32"))]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use core_async::{task, time};

#[tokio::test]
async fn test_spawned_prefetch_result_is_awaitable() {
    let handle = task::spawn(async { vec!["https://x/1.jpg", "https://x/2.jpg"] });
    assert_eq!(handle.await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_detached_tasks_keep_running() {
    let finished = Arc::new(AtomicUsize::new(0));
    for _ in 0..3 {
        let finished = Arc::clone(&finished);
        // Handles are dropped immediately, like fire-and-forget prefetch.
        task::spawn(async move {
            time::sleep(time::Duration::from_millis(5)).await;
            finished.fetch_add(1, Ordering::SeqCst);
        });
    }

    time::timeout(time::Duration::from_secs(2), async {
        while finished.load(Ordering::SeqCst) < 3 {
            time::sleep(time::Duration::from_millis(2)).await;
        }
    })
    .await
    .unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_slow_download_hits_timeout() {
    let slow = async {
        time::sleep(time::Duration::from_secs(45)).await;
        b"payload".to_vec()
    };

    let result = time::timeout(time::Duration::from_secs(30), slow).await;
    assert!(result.is_err());
}

#[tokio::test(start_paused = true)]
async fn test_fast_download_beats_timeout() {
    let fast = async {
        time::sleep(time::Duration::from_millis(250)).await;
        b"payload".to_vec()
    };

    let result = time::timeout(time::Duration::from_secs(30), fast).await;
    assert_eq!(result.unwrap(), b"payload");
}

#[test]
fn test_wall_clock_helpers_agree() {
    let millis = time::now_millis();
    let secs = time::now_secs();
    assert!(millis > 1_700_000_000_000);
    assert!((millis / 1000 - secs).abs() <= 1);
}
