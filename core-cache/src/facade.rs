//! # Media Blob Cache
//!
//! The only path the UI uses to load media. Every public operation resolves
//! to a usable value; failures inside degrade to the original network URL
//! and are logged.
//!
//! ## Example
//!
//! ```ignore
//! use core_cache::{CacheConfig, CacheDependencies, MediaBlobCache, MediaSlot};
//!
//! let cache = MediaBlobCache::for_platform(&signals, deps, CacheConfig::default())?;
//! let mut slot = MediaSlot::new();
//! let src = slot.load(cache.fetch_and_cache(&item_url).await);
//! ```

use std::sync::Arc;
use std::time::Duration;

use bridge_traits::{
    BlobStore, Clock, HttpClient, ObjectUrlFactory, PlatformSignals, StorageManager,
};
use tracing::{debug, error, instrument, warn};

use crate::classifier::PlatformClass;
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};
use crate::fetch::MediaFetcher;
use crate::object_url::{MediaReference, ObjectUrlHandle};
use crate::stats::{CacheStats, StorageQuota};
use crate::strategy::{PassthroughStrategy, PersistentCacheStrategy, StorageStrategy};

/// Host capabilities the cache is built from.
#[derive(Clone)]
pub struct CacheDependencies {
    pub http: Arc<dyn HttpClient>,
    pub store: Arc<dyn BlobStore>,
    pub object_urls: Arc<dyn ObjectUrlFactory>,
    pub storage_manager: Option<Arc<dyn StorageManager>>,
    pub clock: Arc<dyn Clock>,
}

pub struct MediaBlobCache {
    strategy: Arc<dyn StorageStrategy>,
    object_urls: Arc<dyn ObjectUrlFactory>,
    storage_manager: Option<Arc<dyn StorageManager>>,
    config: CacheConfig,
}

impl MediaBlobCache {
    /// Classify the host and build the matching strategy.
    pub fn for_platform(
        signals: &PlatformSignals,
        deps: CacheDependencies,
        config: CacheConfig,
    ) -> Result<Self> {
        config.validate().map_err(CacheError::Config)?;

        let class = PlatformClass::classify(signals);
        let fetcher = MediaFetcher::new(Arc::clone(&deps.http));
        let strategy: Arc<dyn StorageStrategy> = match class {
            PlatformClass::Restricted => {
                Arc::new(PassthroughStrategy::new(fetcher, config.clone()))
            }
            PlatformClass::Permissive => Arc::new(PersistentCacheStrategy::new(
                Arc::clone(&deps.store),
                fetcher,
                Arc::clone(&deps.clock),
                deps.storage_manager.clone(),
                config.clone(),
            )),
        };
        debug!(?class, "Selected media cache strategy");

        Ok(Self::with_strategy(
            strategy,
            deps.object_urls,
            deps.storage_manager,
            config,
        ))
    }

    /// Build around an explicit strategy.
    pub fn with_strategy(
        strategy: Arc<dyn StorageStrategy>,
        object_urls: Arc<dyn ObjectUrlFactory>,
        storage_manager: Option<Arc<dyn StorageManager>>,
        config: CacheConfig,
    ) -> Self {
        Self {
            strategy,
            object_urls,
            storage_manager,
            config,
        }
    }

    pub fn is_restricted(&self) -> bool {
        self.strategy.kind().is_restricted()
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Items warmed ahead of the current one on this host.
    pub fn prefetch_fan_out(&self) -> usize {
        if self.is_restricted() {
            self.config.prefetch_fan_out_restricted
        } else {
            self.config.prefetch_fan_out_permissive
        }
    }

    /// Resolve `url` to something a media element can load.
    ///
    /// The returned reference is owned by the caller; a
    /// [`MediaReference::Local`] must be released when its slot moves on.
    #[instrument(skip(self), fields(url = %core_runtime::logging::redact_url(url)))]
    pub async fn fetch_and_cache(&self, url: &str) -> MediaReference {
        if self.is_restricted() {
            return MediaReference::Remote(url.to_string());
        }

        match self.strategy.lookup(url).await {
            Ok(Some(hit)) => {
                debug!(size = hit.size(), "Cache hit");
                return self.local_or_remote(url, &hit.blob, &hit.mime_type);
            }
            Ok(None) => debug!("Cache miss"),
            Err(e) => warn!(error = %e, "Cache lookup failed, going to network"),
        }

        match self.strategy.fetch_and_cache(url).await {
            Ok(media) => self.local_or_remote(url, &media.data, &media.mime_type),
            Err(e) => {
                warn!(error = %e, "Fetch failed, falling back to original URL");
                MediaReference::Remote(url.to_string())
            }
        }
    }

    /// Warm the cache for `url` in the background. Never fails.
    pub async fn prefetch(&self, url: &str) {
        if let Err(e) = self.strategy.prefetch(url).await {
            debug!(url = %core_runtime::logging::redact_url(url), error = %e, "Prefetch failed");
        }
    }

    pub async fn clear_all_cache(&self) {
        if let Err(e) = self.strategy.clear_all().await {
            error!(error = %e, "Failed to clear media cache");
        }
    }

    /// Remove entries older than `max_age` (default 7 days).
    pub async fn clear_old_cache(&self, max_age: Option<Duration>) {
        let max_age = max_age.unwrap_or(self.config.default_max_age);
        if let Err(e) = self.strategy.clear_older_than(max_age).await {
            error!(error = %e, "Failed to clear old media cache entries");
        }
    }

    /// Host storage usage, `None` when the host cannot tell.
    pub async fn storage_quota(&self) -> Option<StorageQuota> {
        let manager = self.storage_manager.as_ref()?;
        match manager.estimate().await {
            Ok(estimate) => estimate.map(StorageQuota::from),
            Err(e) => {
                warn!(error = %e, "Storage estimate failed");
                None
            }
        }
    }

    pub async fn stats(&self) -> Option<CacheStats> {
        match self.strategy.stats().await {
            Ok(stats) => stats,
            Err(e) => {
                warn!(error = %e, "Could not read media cache stats");
                None
            }
        }
    }

    fn local_or_remote(&self, url: &str, data: &bytes::Bytes, mime_type: &str) -> MediaReference {
        match ObjectUrlHandle::create(Arc::clone(&self.object_urls), data, mime_type) {
            Ok(handle) => MediaReference::Local(handle),
            Err(e) => {
                warn!(error = %e, "Falling back to original URL");
                MediaReference::Remote(url.to_string())
            }
        }
    }
}

impl std::fmt::Debug for MediaBlobCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaBlobCache")
            .field("kind", &self.strategy.kind())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
