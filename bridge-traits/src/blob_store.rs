//! Persistent Blob Store Abstraction
//!
//! Durable key-value storage for downloaded media, keyed by source URL. Each
//! backend owns a single collection with `url` as primary key and a
//! non-unique secondary index on `timestamp` for age-ordered eviction.
//!
//! | Host | Implementation |
//! |------|----------------|
//! | Web | `bridge_wasm::IndexedDbBlobStore` (IndexedDB) |
//! | Desktop | `bridge_desktop::SqliteBlobStore` (SQLite via sqlx) |
//!
//! Every operation may fail with [`BridgeError::StorageUnavailable`];
//! [`BlobStore::put`] additionally fails with [`BridgeError::QuotaExceeded`]
//! when the host rejects the write for lack of space. Implementations never
//! swallow these conditions.
//!
//! [`BridgeError::StorageUnavailable`]: crate::error::BridgeError::StorageUnavailable
//! [`BridgeError::QuotaExceeded`]: crate::error::BridgeError::QuotaExceeded

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::platform::PlatformSendSync;

/// A stored cache entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedBlob {
    /// Source URL; primary key.
    pub url: String,
    /// Raw payload.
    pub blob: Bytes,
    /// Content type, informational only.
    pub mime_type: String,
    /// Insertion or refresh time, milliseconds since the Unix epoch.
    pub timestamp: i64,
}

impl CachedBlob {
    pub fn new(
        url: impl Into<String>,
        blob: Bytes,
        mime_type: impl Into<String>,
        timestamp: i64,
    ) -> Self {
        Self {
            url: url.into(),
            blob,
            mime_type: mime_type.into(),
            timestamp,
        }
    }

    /// Payload size in bytes.
    pub fn size(&self) -> u64 {
        self.blob.len() as u64
    }

    /// A zero-byte payload is never a usable hit.
    pub fn is_corrupt(&self) -> bool {
        self.blob.is_empty()
    }

    pub fn metadata(&self) -> BlobMetadata {
        BlobMetadata {
            url: self.url.clone(),
            size: self.size(),
            timestamp: self.timestamp,
            mime_type: self.mime_type.clone(),
        }
    }
}

/// Entry description without the payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlobMetadata {
    pub url: String,
    pub size: u64,
    pub timestamp: i64,
    pub mime_type: String,
}

/// Async key-value store for media blobs.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait BlobStore: PlatformSendSync {
    /// Open or create the underlying database and collection.
    ///
    /// Idempotent; other methods open lazily, so calling this first is only
    /// needed to surface storage failures early.
    async fn open(&self) -> Result<()>;

    /// Point lookup.
    async fn get(&self, url: &str) -> Result<Option<CachedBlob>>;

    /// Upsert by `url`.
    async fn put(&self, entry: CachedBlob) -> Result<()>;

    /// Remove a single entry. Missing keys are not an error.
    async fn delete(&self, url: &str) -> Result<()>;

    /// Remove every entry with `timestamp < cutoff`; returns how many were removed.
    async fn delete_older_than(&self, cutoff: i64) -> Result<usize>;

    /// All entries without payloads, oldest first.
    async fn entries_by_age(&self) -> Result<Vec<BlobMetadata>>;

    /// Remove every entry.
    async fn clear(&self) -> Result<()>;

    /// Sum of all payload sizes (full scan).
    async fn total_size(&self) -> Result<u64> {
        Ok(self
            .entries_by_age()
            .await?
            .iter()
            .map(|entry| entry.size)
            .sum())
    }

    /// Number of stored entries.
    async fn count(&self) -> Result<usize> {
        Ok(self.entries_by_age().await?.len())
    }
}
