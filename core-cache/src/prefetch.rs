//! Prefetch scheduling
//!
//! On every index change the feed warms the next few items. Each index is
//! attempted at most once per session: targets are recorded before any
//! network work starts, so rapid navigation never doubles up.

use std::collections::HashSet;
use std::sync::Arc;

use core_library::MediaItem;
use futures::future::join_all;
use parking_lot::Mutex;
use tracing::{debug, instrument};

use crate::facade::MediaBlobCache;

/// What one scheduler run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrefetchReport {
    /// Indices newly claimed by this run.
    pub targets: Vec<usize>,
    /// URLs handed to the cache.
    pub urls: Vec<String>,
}

/// Wrap-around indices following `current`, nearest first.
///
/// Never contains `current` and never repeats an index, so at most
/// `len - 1` entries are returned.
pub fn upcoming_indices(current: usize, len: usize, count: usize) -> Vec<usize> {
    if len <= 1 || count == 0 {
        return Vec::new();
    }

    let current = current % len;
    (1..=count.min(len - 1))
        .map(|offset| (current + offset) % len)
        .collect()
}

pub struct PrefetchScheduler {
    cache: Arc<MediaBlobCache>,
    fan_out: usize,
    record: Mutex<HashSet<usize>>,
}

impl PrefetchScheduler {
    /// Scheduler using the cache's per-platform fan-out.
    pub fn new(cache: Arc<MediaBlobCache>) -> Self {
        let fan_out = cache.prefetch_fan_out();
        Self::with_fan_out(cache, fan_out)
    }

    pub fn with_fan_out(cache: Arc<MediaBlobCache>, fan_out: usize) -> Self {
        Self {
            cache,
            fan_out,
            record: Mutex::new(HashSet::new()),
        }
    }

    pub fn fan_out(&self) -> usize {
        self.fan_out
    }

    /// Pick the upcoming indices not yet attempted and record them.
    pub fn claim(&self, current: usize, len: usize) -> Vec<usize> {
        let mut record = self.record.lock();
        upcoming_indices(current, len, self.fan_out)
            .into_iter()
            .filter(|index| record.insert(*index))
            .collect()
    }

    pub fn was_attempted(&self, index: usize) -> bool {
        self.record.lock().contains(&index)
    }

    /// Claim targets around `current` and prefetch them in parallel.
    #[instrument(skip(self, items), fields(len = items.len()))]
    pub async fn run(&self, current: usize, items: &[MediaItem]) -> PrefetchReport {
        let targets = self.claim(current, items.len());
        self.warm(targets, items).await
    }

    /// Fire-and-forget [`run`](Self::run).
    ///
    /// Targets are claimed before this returns; only the network work is
    /// deferred to the spawned task.
    pub fn schedule(self: &Arc<Self>, current: usize, items: Arc<Vec<MediaItem>>) {
        let targets = self.claim(current, items.len());
        if targets.is_empty() {
            return;
        }

        let scheduler = Arc::clone(self);
        core_async::task::spawn(async move {
            scheduler.warm(targets, &items).await;
        });
    }

    async fn warm(&self, targets: Vec<usize>, items: &[MediaItem]) -> PrefetchReport {
        if targets.is_empty() {
            return PrefetchReport::default();
        }

        let urls: Vec<String> = targets
            .iter()
            .filter_map(|index| items.get(*index))
            .flat_map(prefetch_urls)
            .collect();
        debug!(?targets, urls = urls.len(), "Prefetching upcoming media");

        join_all(urls.iter().map(|url| self.cache.prefetch(url))).await;

        PrefetchReport { targets, urls }
    }

    /// Forget every attempt, e.g. after the media list is replaced.
    pub fn reset(&self) {
        self.record.lock().clear();
    }
}

impl std::fmt::Debug for PrefetchScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrefetchScheduler")
            .field("fan_out", &self.fan_out)
            .field("attempted", &self.record.lock().len())
            .finish()
    }
}

/// Media URL plus thumbnail when it differs.
fn prefetch_urls(item: &MediaItem) -> Vec<String> {
    let mut urls = Vec::with_capacity(2);
    if let Some(media) = item.media_url() {
        urls.push(media.to_string());
    }
    if let Some(thumbnail) = item.thumbnail_url() {
        if Some(thumbnail) != item.media_url() {
            urls.push(thumbnail.to_string());
        }
    }
    urls
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upcoming_indices_wrap_around() {
        assert_eq!(upcoming_indices(8, 10, 5), vec![9, 0, 1, 2, 3]);
        assert_eq!(upcoming_indices(0, 10, 2), vec![1, 2]);
    }

    #[test]
    fn test_upcoming_indices_never_include_current() {
        assert_eq!(upcoming_indices(1, 3, 5), vec![2, 0]);
        assert!(upcoming_indices(0, 1, 5).is_empty());
        assert!(upcoming_indices(0, 0, 5).is_empty());
        assert!(upcoming_indices(3, 10, 0).is_empty());
    }

    #[test]
    fn test_prefetch_urls_skip_duplicate_thumbnail() {
        let item = MediaItem::new("a", "a.jpg", "image/jpeg").with_link("/content/a.jpg");
        assert_eq!(prefetch_urls(&item), vec!["/content/a.jpg".to_string()]);

        let mut video = MediaItem::new("v", "v.mp4", "video/mp4").with_link("https://x/v.mp4");
        video.thumbnail_link = Some("https://x/v-thumb.jpg".into());
        assert_eq!(prefetch_urls(&video).len(), 2);

        let empty = MediaItem::new("e", "e.jpg", "image/jpeg");
        assert!(prefetch_urls(&empty).is_empty());
    }
}
