//! Quota management
//!
//! Keeps the store under its byte ceiling across writes. Before a write the
//! manager runs age-based eviction passes; if the host still rejects the
//! write, it frees space oldest-first and retries once.
//!
//! Growth past the ceiling after every pass is accepted: the item the user
//! is looking at right now always gets written.

use std::sync::Arc;
use std::time::Duration;

use bridge_traits::{BlobStore, CachedBlob, Clock};
use tracing::{debug, info, instrument, warn};

use crate::error::{CacheError, Result};

/// Result of a successful [`QuotaManager::write`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteOutcome {
    /// Entries removed to make room.
    pub evicted: usize,
    /// Whether the host rejected the first attempt.
    pub retried: bool,
}

pub struct QuotaManager {
    store: Arc<dyn BlobStore>,
    clock: Arc<dyn Clock>,
    max_bytes: u64,
    passes: Vec<Duration>,
}

impl QuotaManager {
    pub fn new(
        store: Arc<dyn BlobStore>,
        clock: Arc<dyn Clock>,
        max_bytes: u64,
        passes: Vec<Duration>,
    ) -> Self {
        Self {
            store,
            clock,
            max_bytes,
            passes,
        }
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Run the age-based eviction passes needed to fit `incoming` bytes.
    ///
    /// Returns the number of entries removed.
    #[instrument(skip(self), fields(max_bytes = self.max_bytes))]
    pub async fn make_room(&self, incoming: u64) -> Result<usize> {
        if incoming > self.max_bytes {
            warn!(incoming, "Blob larger than the cache ceiling, storing without eviction");
            return Ok(0);
        }

        let mut current = self.store.total_size().await?;
        if current.saturating_add(incoming) <= self.max_bytes {
            return Ok(0);
        }

        let now = self.clock.unix_timestamp_millis();
        let mut evicted = 0;
        for max_age in &self.passes {
            let cutoff = age_cutoff(now, *max_age);
            let removed = self.store.delete_older_than(cutoff).await?;
            evicted += removed;
            current = self.store.total_size().await?;
            debug!(?max_age, removed, current, "Eviction pass finished");

            if current.saturating_add(incoming) <= self.max_bytes {
                info!(evicted, current, "Made room in media cache");
                return Ok(evicted);
            }
        }

        warn!(
            current,
            incoming,
            evicted,
            "Media cache still over its ceiling after eviction, accepting growth"
        );
        Ok(evicted)
    }

    /// Make room for `entry` and store it.
    ///
    /// A `QuotaExceeded` rejection from the host triggers one oldest-first
    /// eviction pass and exactly one retry; a second rejection propagates.
    #[instrument(skip(self, entry), fields(url = %entry.url, size = entry.size()))]
    pub async fn write(&self, entry: CachedBlob) -> Result<WriteOutcome> {
        let mut outcome = WriteOutcome {
            evicted: self.make_room(entry.size()).await?,
            retried: false,
        };

        match self.store.put(entry.clone()).await {
            Ok(()) => Ok(outcome),
            Err(err) if err.is_quota_exceeded() => {
                warn!(error = %err, "Host rejected cache write, evicting oldest entries");
                outcome.evicted += self.evict_oldest(&entry.url, entry.size()).await?;
                outcome.retried = true;

                self.store.put(entry).await.map_err(CacheError::from)?;
                info!(evicted = outcome.evicted, "Cache write succeeded after eviction");
                Ok(outcome)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Delete oldest entries, never `keep`, until `needed` bytes are freed.
    async fn evict_oldest(&self, keep: &str, needed: u64) -> Result<usize> {
        let mut freed = 0;
        let mut evicted = 0;

        for entry in self.store.entries_by_age().await? {
            if freed >= needed {
                break;
            }
            if entry.url == keep {
                continue;
            }
            self.store.delete(&entry.url).await?;
            freed += entry.size;
            evicted += 1;
        }

        debug!(evicted, freed, needed, "Oldest-first eviction finished");
        Ok(evicted)
    }
}

/// Timestamp before which an entry is older than `max_age`.
///
/// Ages beyond the `i64` millisecond range clamp, so an oversized age matches
/// nothing instead of wrapping around to match everything.
pub(crate) fn age_cutoff(now_millis: i64, max_age: Duration) -> i64 {
    let age = i64::try_from(max_age.as_millis()).unwrap_or(i64::MAX);
    now_millis.saturating_sub(age)
}

impl std::fmt::Debug for QuotaManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuotaManager")
            .field("max_bytes", &self.max_bytes)
            .field("passes", &self.passes)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryBlobStore;
    use bridge_traits::ManualClock;
    use bytes::Bytes;

    const NOW: i64 = 1_714_557_600_000;
    const HOUR: i64 = 60 * 60 * 1000;

    fn manager(store: Arc<MemoryBlobStore>, max: u64) -> QuotaManager {
        QuotaManager::new(
            store,
            Arc::new(ManualClock::new(NOW)),
            max,
            vec![Duration::from_secs(72 * 3600), Duration::from_secs(24 * 3600)],
        )
    }

    fn blob(url: &str, len: usize, timestamp: i64) -> CachedBlob {
        CachedBlob::new(url, Bytes::from(vec![1u8; len]), "video/mp4", timestamp)
    }

    #[tokio::test]
    async fn test_no_eviction_under_ceiling() {
        let store = Arc::new(MemoryBlobStore::new());
        store.put(blob("old", 10, NOW - 100 * HOUR)).await.unwrap();

        let quota = manager(Arc::clone(&store), 100);
        assert_eq!(quota.make_room(50).await.unwrap(), 0);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_first_pass_stops_when_enough_room() {
        let store = Arc::new(MemoryBlobStore::new());
        store.put(blob("four-days", 50, NOW - 96 * HOUR)).await.unwrap();
        store.put(blob("two-days", 40, NOW - 48 * HOUR)).await.unwrap();

        let quota = manager(Arc::clone(&store), 100);
        assert_eq!(quota.make_room(20).await.unwrap(), 1);
        assert!(store.peek("two-days").is_some());
    }

    #[tokio::test]
    async fn test_oversized_blob_skips_eviction() {
        let store = Arc::new(MemoryBlobStore::new());
        store.put(blob("old", 10, NOW - 96 * HOUR)).await.unwrap();

        let quota = manager(Arc::clone(&store), 100);
        assert_eq!(quota.make_room(150).await.unwrap(), 0);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_oldest_first_eviction_skips_key_being_written() {
        let store = Arc::new(MemoryBlobStore::new());
        store.put(blob("target", 10, NOW - 10 * HOUR)).await.unwrap();
        store.put(blob("a", 10, NOW - 5 * HOUR)).await.unwrap();
        store.put(blob("b", 10, NOW - HOUR)).await.unwrap();

        let quota = manager(Arc::clone(&store), 100);
        assert_eq!(quota.evict_oldest("target", 15).await.unwrap(), 2);
        assert!(store.peek("target").is_some());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_age_cutoff_clamps_huge_ages() {
        assert_eq!(age_cutoff(NOW, Duration::from_millis(HOUR as u64)), NOW - HOUR);
        assert_eq!(age_cutoff(NOW, Duration::MAX), NOW.saturating_sub(i64::MAX));
        assert_eq!(age_cutoff(NOW, Duration::from_millis(1u64 << 63)), NOW.saturating_sub(i64::MAX));
        assert_eq!(age_cutoff(-5, Duration::MAX), i64::MIN);
    }

    #[tokio::test]
    async fn test_huge_eviction_pass_removes_nothing() {
        let store = Arc::new(MemoryBlobStore::new());
        store.put(blob("fresh", 60, NOW)).await.unwrap();

        let quota = QuotaManager::new(
            Arc::clone(&store) as Arc<dyn BlobStore>,
            Arc::new(ManualClock::new(NOW)),
            100,
            vec![Duration::MAX, Duration::from_millis(1u64 << 63)],
        );
        assert_eq!(quota.make_room(50).await.unwrap(), 0);
        assert!(store.peek("fresh").is_some());
    }
}
