//! Convenience helpers for wiring all wasm bridge implementations together.
//!
//! Host shells can use [`build_wasm_bridges`] to construct every adapter the
//! media core needs (HTTP, blob store, settings, object URLs, storage manager,
//! platform probe) without repetitive glue code. The result mirrors the role
//! that `bridge-desktop` plays for native targets.

use std::sync::Arc;

use bridge_traits::{
    blob_store::BlobStore,
    error::Result as BridgeResult,
    http::HttpClient,
    object_url::ObjectUrlFactory,
    platform::PlatformProbe,
    storage::{SettingsStore, StorageManager},
};

use crate::{
    blob_store::{IndexedDbBlobStore, MEDIA_DB_NAME},
    http::WasmHttpClient,
    object_url::BrowserObjectUrls,
    platform::NavigatorPlatformProbe,
    storage::WasmSettingsStore,
    storage_manager::BrowserStorageManager,
};

/// Configuration for [`build_wasm_bridges`].
#[derive(Debug, Clone)]
pub struct WasmBridgeConfig {
    /// Namespace for `localStorage` keys; `None` stores keys verbatim.
    pub settings_namespace: Option<String>,
    /// IndexedDB database holding cached media.
    pub media_db_name: String,
}

impl WasmBridgeConfig {
    /// Create a config whose settings live under `namespace`.
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            settings_namespace: Some(namespace.into()),
            media_db_name: MEDIA_DB_NAME.to_string(),
        }
    }

    /// Keep settings keys unprefixed.
    pub fn unscoped_settings(mut self) -> Self {
        self.settings_namespace = None;
        self
    }

    /// Override the IndexedDB database name.
    pub fn with_media_db_name(mut self, name: impl Into<String>) -> Self {
        self.media_db_name = name.into();
        self
    }
}

impl Default for WasmBridgeConfig {
    fn default() -> Self {
        Self::new("reels").unscoped_settings()
    }
}

/// Fully constructed wasm bridge objects ready for injection into the core.
pub struct WasmBridgeSet {
    /// HTTP client powered by browser `fetch`.
    pub http_client: Arc<dyn HttpClient>,
    /// IndexedDB media blob store.
    pub blob_store: Arc<dyn BlobStore>,
    /// Plain settings store layered on `localStorage`.
    pub settings_store: Arc<dyn SettingsStore>,
    /// `URL.createObjectURL` wrapper.
    pub object_urls: Arc<dyn ObjectUrlFactory>,
    /// `navigator.storage` wrapper.
    pub storage_manager: Arc<dyn StorageManager>,
    /// `navigator` signal reader.
    pub platform: Arc<dyn PlatformProbe>,
}

/// Build the default wasm bridge stack.
///
/// The blob store is opened eagerly so that an unavailable IndexedDB is
/// reported here rather than on the first cache access.
pub async fn build_wasm_bridges(config: WasmBridgeConfig) -> BridgeResult<WasmBridgeSet> {
    let http_client: Arc<dyn HttpClient> = Arc::new(WasmHttpClient::new()?);

    let blob_store = IndexedDbBlobStore::with_name(config.media_db_name.clone());
    blob_store.open().await?;
    let blob_store: Arc<dyn BlobStore> = Arc::new(blob_store);

    let settings_store: Arc<dyn SettingsStore> = match &config.settings_namespace {
        Some(namespace) => Arc::new(WasmSettingsStore::new(namespace.clone())?),
        None => Arc::new(WasmSettingsStore::unscoped()?),
    };

    Ok(WasmBridgeSet {
        http_client,
        blob_store,
        settings_store,
        object_urls: Arc::new(BrowserObjectUrls::new()),
        storage_manager: Arc::new(BrowserStorageManager::new()),
        platform: Arc::new(NavigatorPlatformProbe::new()),
    })
}
