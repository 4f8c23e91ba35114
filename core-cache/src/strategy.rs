//! Storage strategies
//!
//! The classifier picks one strategy per process:
//!
//! - [`PersistentCacheStrategy`]: blobs live in a [`BlobStore`] under a
//!   [`QuotaManager`].
//! - [`PassthroughStrategy`]: nothing is stored; the host HTTP cache is the
//!   only caching layer.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bridge_traits::platform::PlatformSendSync;
use bridge_traits::{BlobStore, CacheMode, CachedBlob, Clock, StorageManager};
use tracing::{debug, info, instrument, warn};

use crate::classifier::PlatformClass;
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};
use crate::fetch::{FetchedMedia, MediaFetcher};
use crate::quota::{age_cutoff, QuotaManager};
use crate::stats::CacheStats;

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait StorageStrategy: PlatformSendSync {
    /// Platform class this strategy serves.
    fn kind(&self) -> PlatformClass;

    /// Stored, non-corrupt entry for `url`.
    async fn lookup(&self, url: &str) -> Result<Option<CachedBlob>>;

    /// Download `url` and keep it if this strategy stores anything.
    ///
    /// Persistence failures are logged; the payload is still returned.
    async fn fetch_and_cache(&self, url: &str) -> Result<FetchedMedia>;

    /// Warm the cache for `url`.
    async fn prefetch(&self, url: &str) -> Result<()>;

    async fn clear_all(&self) -> Result<()>;

    /// Remove entries stored more than `max_age` ago.
    async fn clear_older_than(&self, max_age: Duration) -> Result<usize>;

    /// Usage figures, `None` when nothing is stored.
    async fn stats(&self) -> Result<Option<CacheStats>>;
}

// ============================================================================
// Persistent Strategy
// ============================================================================

pub struct PersistentCacheStrategy {
    store: Arc<dyn BlobStore>,
    quota: QuotaManager,
    fetcher: MediaFetcher,
    clock: Arc<dyn Clock>,
    storage_manager: Option<Arc<dyn StorageManager>>,
    config: CacheConfig,
    opened: AtomicBool,
    persistence_requested: AtomicBool,
}

impl PersistentCacheStrategy {
    pub fn new(
        store: Arc<dyn BlobStore>,
        fetcher: MediaFetcher,
        clock: Arc<dyn Clock>,
        storage_manager: Option<Arc<dyn StorageManager>>,
        config: CacheConfig,
    ) -> Self {
        let quota = QuotaManager::new(
            Arc::clone(&store),
            Arc::clone(&clock),
            config.max_cache_size_bytes,
            config.eviction_passes.clone(),
        );

        Self {
            store,
            quota,
            fetcher,
            clock,
            storage_manager,
            config,
            opened: AtomicBool::new(false),
            persistence_requested: AtomicBool::new(false),
        }
    }

    /// Open the store on first use and ask once for durable storage.
    async fn ensure_ready(&self) -> Result<()> {
        if !self.opened.load(Ordering::Acquire) {
            self.store.open().await?;
            self.opened.store(true, Ordering::Release);
        }

        if self.config.request_persistent_storage
            && !self.persistence_requested.swap(true, Ordering::AcqRel)
        {
            if let Some(manager) = &self.storage_manager {
                match manager.request_persistence().await {
                    Ok(true) => info!("Durable storage granted for media cache"),
                    Ok(false) => warn!("Durable storage denied, media cache may be evicted by the host"),
                    Err(e) => warn!(error = %e, "Durable storage request failed"),
                }
            }
        }

        Ok(())
    }

    async fn persist(&self, url: &str, media: &FetchedMedia) -> Result<()> {
        let entry = CachedBlob::new(
            url,
            media.data.clone(),
            media.mime_type.clone(),
            self.clock.unix_timestamp_millis(),
        );
        let outcome = self.quota.write(entry).await?;
        info!(
            size = media.size(),
            evicted = outcome.evicted,
            retried = outcome.retried,
            "Stored media in cache"
        );
        Ok(())
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl StorageStrategy for PersistentCacheStrategy {
    fn kind(&self) -> PlatformClass {
        PlatformClass::Permissive
    }

    async fn lookup(&self, url: &str) -> Result<Option<CachedBlob>> {
        self.ensure_ready().await?;

        match self.store.get(url).await? {
            Some(entry) if entry.is_corrupt() => {
                let err = CacheError::CorruptEntry {
                    url: url.to_string(),
                };
                debug!(%err, "Treating corrupt entry as a miss");
                Ok(None)
            }
            other => Ok(other),
        }
    }

    #[instrument(skip(self), fields(url = %core_runtime::logging::redact_url(url)))]
    async fn fetch_and_cache(&self, url: &str) -> Result<FetchedMedia> {
        let media = self
            .fetcher
            .fetch(url, self.config.fetch_timeout, CacheMode::Default)
            .await?;

        let stored = match self.ensure_ready().await {
            Ok(()) => self.persist(url, &media).await,
            Err(e) => Err(e),
        };
        if let Err(e) = stored {
            warn!(error = %e, "Could not store fetched media, serving from memory");
        }

        Ok(media)
    }

    #[instrument(skip(self), fields(url = %core_runtime::logging::redact_url(url)))]
    async fn prefetch(&self, url: &str) -> Result<()> {
        if self.lookup(url).await?.is_some() {
            debug!("Already cached");
            return Ok(());
        }

        let media = self
            .fetcher
            .fetch(url, self.config.prefetch_timeout, CacheMode::Default)
            .await?;
        self.persist(url, &media).await
    }

    async fn clear_all(&self) -> Result<()> {
        self.ensure_ready().await?;
        self.store.clear().await?;
        info!("Cleared media cache");
        Ok(())
    }

    async fn clear_older_than(&self, max_age: Duration) -> Result<usize> {
        self.ensure_ready().await?;
        let cutoff = age_cutoff(self.clock.unix_timestamp_millis(), max_age);
        let removed = self.store.delete_older_than(cutoff).await?;
        info!(removed, ?max_age, "Cleared old media cache entries");
        Ok(removed)
    }

    async fn stats(&self) -> Result<Option<CacheStats>> {
        self.ensure_ready().await?;
        let entries = self.store.entries_by_age().await?;
        Ok(Some(CacheStats::from_entries(
            &entries,
            self.quota.max_bytes(),
        )))
    }
}

impl std::fmt::Debug for PersistentCacheStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistentCacheStrategy")
            .field("quota", &self.quota)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Passthrough Strategy
// ============================================================================

#[derive(Debug)]
pub struct PassthroughStrategy {
    fetcher: MediaFetcher,
    config: CacheConfig,
}

impl PassthroughStrategy {
    pub fn new(fetcher: MediaFetcher, config: CacheConfig) -> Self {
        Self { fetcher, config }
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl StorageStrategy for PassthroughStrategy {
    fn kind(&self) -> PlatformClass {
        PlatformClass::Restricted
    }

    async fn lookup(&self, _url: &str) -> Result<Option<CachedBlob>> {
        Ok(None)
    }

    async fn fetch_and_cache(&self, url: &str) -> Result<FetchedMedia> {
        self.fetcher
            .fetch(url, self.config.fetch_timeout, CacheMode::Default)
            .await
    }

    #[instrument(skip(self), fields(url = %core_runtime::logging::redact_url(url)))]
    async fn prefetch(&self, url: &str) -> Result<()> {
        self.fetcher.warm(url, self.config.prefetch_timeout).await
    }

    async fn clear_all(&self) -> Result<()> {
        Ok(())
    }

    async fn clear_older_than(&self, _max_age: Duration) -> Result<usize> {
        Ok(0)
    }

    async fn stats(&self) -> Result<Option<CacheStats>> {
        Ok(None)
    }
}
