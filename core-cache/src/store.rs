//! In-memory blob store
//!
//! A [`BlobStore`] kept in process memory. Hosts without durable storage use
//! it as a session cache; tests use the host limit to provoke
//! `QuotaExceeded` and the counters to observe store traffic.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use bridge_traits::error::{BridgeError, Result};
use bridge_traits::{BlobMetadata, BlobStore, CachedBlob};
use parking_lot::RwLock;

/// Store traffic observed since creation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreCallCounts {
    pub opens: usize,
    pub reads: usize,
    pub writes: usize,
    pub deletes: usize,
}

impl StoreCallCounts {
    pub fn total(&self) -> usize {
        self.opens + self.reads + self.writes + self.deletes
    }
}

/// Blob store backed by a `BTreeMap` keyed by URL.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    entries: RwLock<BTreeMap<String, CachedBlob>>,
    host_limit: Option<u64>,
    unavailable: AtomicBool,
    opens: AtomicUsize,
    reads: AtomicUsize,
    writes: AtomicUsize,
    deletes: AtomicUsize,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject any `put` that would push the stored total past `bytes`.
    pub fn with_host_limit(mut self, bytes: u64) -> Self {
        self.host_limit = Some(bytes);
        self
    }

    /// Make every subsequent operation fail with `StorageUnavailable`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn call_counts(&self) -> StoreCallCounts {
        StoreCallCounts {
            opens: self.opens.load(Ordering::SeqCst),
            reads: self.reads.load(Ordering::SeqCst),
            writes: self.writes.load(Ordering::SeqCst),
            deletes: self.deletes.load(Ordering::SeqCst),
        }
    }

    /// Synchronous snapshot of a stored entry.
    pub fn peek(&self, url: &str) -> Option<CachedBlob> {
        self.entries.read().get(url).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    fn ensure_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(BridgeError::StorageUnavailable(
                "memory blob store disabled".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl BlobStore for MemoryBlobStore {
    async fn open(&self) -> Result<()> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        self.ensure_available()
    }

    async fn get(&self, url: &str) -> Result<Option<CachedBlob>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.ensure_available()?;
        Ok(self.peek(url))
    }

    async fn put(&self, entry: CachedBlob) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.ensure_available()?;

        let mut entries = self.entries.write();
        if let Some(limit) = self.host_limit {
            let others: u64 = entries
                .values()
                .filter(|existing| existing.url != entry.url)
                .map(CachedBlob::size)
                .sum();
            if others + entry.size() > limit {
                return Err(BridgeError::QuotaExceeded(format!(
                    "{} bytes requested, {} of {} in use",
                    entry.size(),
                    others,
                    limit
                )));
            }
        }

        entries.insert(entry.url.clone(), entry);
        Ok(())
    }

    async fn delete(&self, url: &str) -> Result<()> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.ensure_available()?;
        self.entries.write().remove(url);
        Ok(())
    }

    async fn delete_older_than(&self, cutoff: i64) -> Result<usize> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.ensure_available()?;

        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, entry| entry.timestamp >= cutoff);
        Ok(before - entries.len())
    }

    async fn entries_by_age(&self) -> Result<Vec<BlobMetadata>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.ensure_available()?;

        let mut metadata: Vec<BlobMetadata> = self
            .entries
            .read()
            .values()
            .map(CachedBlob::metadata)
            .collect();
        metadata.sort_by_key(|entry| entry.timestamp);
        Ok(metadata)
    }

    async fn clear(&self) -> Result<()> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.ensure_available()?;
        self.entries.write().clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn blob(url: &str, len: usize, timestamp: i64) -> CachedBlob {
        CachedBlob::new(url, Bytes::from(vec![7u8; len]), "image/jpeg", timestamp)
    }

    #[tokio::test]
    async fn test_put_is_an_upsert() {
        let store = MemoryBlobStore::new();
        store.put(blob("https://x/a.jpg", 4, 1)).await.unwrap();
        store.put(blob("https://x/a.jpg", 9, 2)).await.unwrap();

        assert_eq!(store.len(), 1);
        let entry = store.get("https://x/a.jpg").await.unwrap().unwrap();
        assert_eq!(entry.size(), 9);
        assert_eq!(entry.timestamp, 2);
    }

    #[tokio::test]
    async fn test_delete_older_than_uses_strict_cutoff() {
        let store = MemoryBlobStore::new();
        store.put(blob("a", 1, 10)).await.unwrap();
        store.put(blob("b", 1, 20)).await.unwrap();
        store.put(blob("c", 1, 30)).await.unwrap();

        assert_eq!(store.delete_older_than(20).await.unwrap(), 1);
        let remaining: Vec<_> = store
            .entries_by_age()
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.url)
            .collect();
        assert_eq!(remaining, ["b", "c"]);
    }

    #[tokio::test]
    async fn test_host_limit_rejects_with_quota_exceeded() {
        let store = MemoryBlobStore::new().with_host_limit(10);
        store.put(blob("a", 6, 1)).await.unwrap();

        let err = store.put(blob("b", 6, 2)).await.unwrap_err();
        assert!(err.is_quota_exceeded());

        // Replacing an entry only counts the new payload.
        store.put(blob("a", 10, 3)).await.unwrap();
        assert_eq!(store.total_size().await.unwrap(), 10);
    }

    #[tokio::test]
    async fn test_unavailable_store_fails_every_operation() {
        let store = MemoryBlobStore::new();
        store.set_unavailable(true);

        assert!(matches!(
            store.open().await,
            Err(BridgeError::StorageUnavailable(_))
        ));
        assert!(store.get("a").await.is_err());
        assert!(store.put(blob("a", 1, 1)).await.is_err());
        assert_eq!(store.call_counts().total(), 3);
    }
}
