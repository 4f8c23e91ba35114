//! Core service façade and bootstrap helpers.
//!
//! This crate wires host-provided bridge implementations (HTTP, blob store,
//! settings, object URLs, storage manager, platform probe) into the shared
//! reels core: the media blob cache, the prefetch scheduler, the manifest
//! loader and the likes store. Desktop apps typically enable the
//! `desktop-shims` feature (which fills missing bridges from
//! `bridge-desktop`), whereas WebAssembly builds enable the `wasm` feature and
//! rely on the adapters from `bridge-wasm`.

pub mod error;

pub use error::{CoreError, Result};

use std::sync::Arc;

use bridge_traits::{HttpClient, SettingsStore};
use core_cache::{CacheConfig, CacheDependencies, MediaBlobCache, PrefetchScheduler};
use core_library::{LikesStore, ManifestLoader, ManifestSnapshotStore, MediaItem};
use core_runtime::config::CoreConfig;
use provider_google_drive::GoogleDriveMediaSource;
use tracing::{info, warn};

#[cfg(feature = "wasm")]
pub use bridge_wasm::WasmBridgeConfig;
#[cfg(feature = "wasm")]
use bridge_wasm::{build_wasm_bridges, WasmBridgeSet};

/// Primary façade exposed to host applications.
#[derive(Clone)]
pub struct CoreService {
    config: Arc<CoreConfig>,
    cache: Arc<MediaBlobCache>,
    prefetcher: Arc<PrefetchScheduler>,
    manifest: Arc<ManifestLoader>,
    likes: Arc<LikesStore>,
}

impl CoreService {
    /// Create a new service from a validated configuration.
    ///
    /// The storage strategy is chosen once, here, from the platform probe.
    pub fn new(config: CoreConfig, cache_config: CacheConfig) -> Result<Self> {
        config.validate()?;

        let signals = config.platform.signals();
        let deps = CacheDependencies {
            http: Arc::clone(&config.http_client),
            store: Arc::clone(&config.blob_store),
            object_urls: Arc::clone(&config.object_urls),
            storage_manager: config.storage_manager.clone(),
            clock: Arc::clone(&config.clock),
        };
        let cache = Arc::new(MediaBlobCache::for_platform(&signals, deps, cache_config)?);
        let prefetcher = Arc::new(PrefetchScheduler::new(Arc::clone(&cache)));

        let snapshots = ManifestSnapshotStore::new(
            Arc::clone(&config.settings_store),
            Arc::clone(&config.clock),
            config.snapshot_ttl,
        );
        let manifest = Arc::new(ManifestLoader::new(
            Arc::clone(&config.http_client),
            snapshots,
            Arc::clone(&config.clock),
            config.manifest_url.clone(),
            config.content_base.clone(),
        ));
        let likes = Arc::new(LikesStore::new(
            Arc::clone(&config.settings_store),
            Arc::clone(&config.clock),
        ));

        info!(
            restricted = cache.is_restricted(),
            fan_out = prefetcher.fan_out(),
            "Core service initialized"
        );

        Ok(Self {
            config: Arc::new(config),
            cache,
            prefetcher,
            manifest,
            likes,
        })
    }

    /// Media cache the UI loads every item through.
    pub fn cache(&self) -> Arc<MediaBlobCache> {
        Arc::clone(&self.cache)
    }

    /// Prefetch scheduler for the current feed.
    pub fn prefetcher(&self) -> Arc<PrefetchScheduler> {
        Arc::clone(&self.prefetcher)
    }

    pub fn manifest(&self) -> &ManifestLoader {
        &self.manifest
    }

    pub fn likes(&self) -> &LikesStore {
        &self.likes
    }

    pub fn settings_store(&self) -> Arc<dyn SettingsStore> {
        Arc::clone(&self.config.settings_store)
    }

    /// Start-of-session housekeeping: drop cache entries past the default age.
    pub async fn start_session(&self) {
        self.cache.clear_old_cache(None).await;
    }

    /// Load the feed from the content manifest.
    ///
    /// The prefetch record is keyed by position, so it is reset whenever a
    /// new list replaces the old one.
    pub async fn load_feed(&self) -> Vec<MediaItem> {
        let items = self.manifest.load().await;
        self.prefetcher.reset();
        items
    }

    /// Drive media source authenticated with a host-supplied token.
    pub fn drive(&self, access_token: impl Into<String>) -> GoogleDriveMediaSource {
        GoogleDriveMediaSource::new(self.http_client(), access_token)
    }

    /// Load the feed from a named Drive folder, newest first.
    pub async fn load_drive_feed(
        &self,
        access_token: impl Into<String>,
        folder_name: &str,
    ) -> Result<Vec<MediaItem>> {
        let drive = self.drive(access_token);
        let folder_id = drive
            .find_folder(folder_name)
            .await?
            .ok_or_else(|| CoreError::FolderNotFound(folder_name.to_string()))?;

        let items = drive.fetch_all_media(&folder_id).await?;
        if items.is_empty() {
            warn!(folder = folder_name, "Drive folder has no media");
            return Err(CoreError::EmptyFolder(folder_name.to_string()));
        }

        info!(folder = folder_name, count = items.len(), "Loaded Drive feed");
        self.prefetcher.reset();
        Ok(items)
    }

    fn http_client(&self) -> Arc<dyn HttpClient> {
        Arc::clone(&self.config.http_client)
    }
}

/// Convenience bootstrapper for desktop hosts.
///
/// Every bridge is filled from `bridge-desktop`, backed by the default
/// SQLite database.
#[cfg(all(feature = "desktop-shims", not(target_arch = "wasm32")))]
pub fn bootstrap_desktop(cache_config: CacheConfig) -> Result<CoreService> {
    let config = CoreConfig::builder().build()?;
    CoreService::new(config, cache_config)
}

/// Convenience bootstrapper for WebAssembly hosts.
///
/// ```
/// # #[cfg(feature = "wasm")]
/// # async fn example() -> core_service::Result<()> {
/// use core_service::{bootstrap_wasm, WasmBridgeConfig};
///
/// let core = bootstrap_wasm(WasmBridgeConfig::default(), Default::default()).await?;
/// let feed = core.load_feed().await;
/// # Ok(())
/// # }
/// ```
#[cfg(feature = "wasm")]
pub async fn bootstrap_wasm(
    bridge_config: WasmBridgeConfig,
    cache_config: CacheConfig,
) -> Result<CoreService> {
    let bridges = build_wasm_bridges(bridge_config)
        .await
        .map_err(|err| CoreError::InitializationFailed(err.to_string()))?;
    CoreService::new(core_config_from(bridges)?, cache_config)
}

#[cfg(feature = "wasm")]
fn core_config_from(set: WasmBridgeSet) -> Result<CoreConfig> {
    Ok(CoreConfig::builder()
        .http_client(set.http_client)
        .blob_store(set.blob_store)
        .settings_store(set.settings_store)
        .object_urls(set.object_urls)
        .storage_manager(set.storage_manager)
        .platform(set.platform)
        .build()?)
}
