//! # Core Configuration Module
//!
//! Provides configuration management for the reels media core.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a `CoreConfig`
//! instance that holds all host bridges and app-level settings. It enforces
//! fail-fast validation so that a missing capability is reported at startup
//! instead of on the first cache access.
//!
//! ## Required Dependencies
//!
//! - `HttpClient` - media and manifest downloads
//! - `BlobStore` - persistent media cache
//! - `SettingsStore` - likes and manifest snapshot
//! - `ObjectUrlFactory` - turns cached payloads into displayable URLs
//!
//! ## Optional Dependencies
//!
//! - `StorageManager` - durable-storage requests and usage estimates
//! - `PlatformProbe` - runtime signals; defaults to empty signals (permissive)
//! - `Clock` - defaults to the system clock
//!
//! When the `desktop-shims` feature is enabled, `bridge-desktop` defaults are
//! injected for every bridge that was not provided.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//! use std::sync::Arc;
//!
//! let config = CoreConfig::builder()
//!     .http_client(Arc::new(MyHttpClient))
//!     .blob_store(Arc::new(MyBlobStore))
//!     .settings_store(Arc::new(MySettingsStore))
//!     .object_urls(Arc::new(MyObjectUrls))
//!     .content_base("/content")
//!     .build()?;
//! ```

use crate::error::{Error, Result};
use bridge_traits::{
    BlobStore, Clock, HttpClient, ObjectUrlFactory, PlatformProbe, PlatformSignals,
    SettingsStore, StaticPlatformProbe, StorageManager, SystemClock,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Default manifest location relative to the app origin.
pub const DEFAULT_MANIFEST_URL: &str = "/content/media-list.json";

/// Default prefix for manifest-relative media files.
pub const DEFAULT_CONTENT_BASE: &str = "/content";

/// Parsed manifests are reused for this long before refetching.
pub const DEFAULT_SNAPSHOT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Core configuration for the reels media core.
///
/// Use [`CoreConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct CoreConfig {
    /// Database file used by desktop defaults, if any
    pub database_path: Option<PathBuf>,

    /// HTTP client for media, manifest and drive requests
    pub http_client: Arc<dyn HttpClient>,

    /// Persistent blob store backing the media cache
    pub blob_store: Arc<dyn BlobStore>,

    /// Key-value settings (likes, manifest snapshot)
    pub settings_store: Arc<dyn SettingsStore>,

    /// Object URL factory for cached payloads
    pub object_urls: Arc<dyn ObjectUrlFactory>,

    /// Host storage manager (optional)
    pub storage_manager: Option<Arc<dyn StorageManager>>,

    /// Runtime signal source for storage strategy selection
    pub platform: Arc<dyn PlatformProbe>,

    /// Time source for cache timestamps and snapshot ages
    pub clock: Arc<dyn Clock>,

    /// Location of the content manifest
    pub manifest_url: String,

    /// Prefix joined with manifest `file` entries
    pub content_base: String,

    /// Maximum age of a reusable manifest snapshot
    pub snapshot_ttl: Duration,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("database_path", &self.database_path)
            .field("http_client", &"HttpClient { ... }")
            .field("blob_store", &"BlobStore { ... }")
            .field("settings_store", &"SettingsStore { ... }")
            .field("object_urls", &"ObjectUrlFactory { ... }")
            .field(
                "storage_manager",
                &self
                    .storage_manager
                    .as_ref()
                    .map(|_| "StorageManager { ... }"),
            )
            .field("platform", &self.platform.signals())
            .field("manifest_url", &self.manifest_url)
            .field("content_base", &self.content_base)
            .field("snapshot_ttl", &self.snapshot_ttl)
            .finish()
    }
}

impl CoreConfig {
    /// Creates a new builder for constructing a `CoreConfig`.
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if self.manifest_url.trim().is_empty() {
            return Err(Error::Config("Manifest URL cannot be empty".to_string()));
        }

        if self.content_base.ends_with('/') && self.content_base.len() > 1 {
            return Err(Error::Config(
                "Content base must not end with '/'; file names are joined with a separator"
                    .to_string(),
            ));
        }

        if self.snapshot_ttl.is_zero() {
            return Err(Error::Config(
                "Snapshot TTL must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

fn capability_missing(capability: &str, purpose: &str, web_hint: &str) -> Error {
    Error::CapabilityMissing {
        capability: capability.to_string(),
        message: format!(
            "{capability} implementation is required for {purpose}. \
             Desktop: enable the 'desktop-shims' feature to use the bridge-desktop default. \
             Web: {web_hint}."
        ),
    }
}

/// Bridges filled in when the builder was not given them.
struct DesktopDefaults {
    http_client: Option<Arc<dyn HttpClient>>,
    blob_store: Option<Arc<dyn BlobStore>>,
    settings_store: Option<Arc<dyn SettingsStore>>,
    object_urls: Option<Arc<dyn ObjectUrlFactory>>,
    storage_manager: Option<Arc<dyn StorageManager>>,
    platform: Option<Arc<dyn PlatformProbe>>,
}

#[cfg(all(feature = "desktop-shims", not(target_arch = "wasm32")))]
fn provide_desktop_defaults(
    builder: &CoreConfigBuilder,
    database_path: &std::path::Path,
) -> Result<DesktopDefaults> {
    use bridge_desktop::{
        desktop_platform_probe, DesktopStorageManager, ObjectUrlRegistry, ReqwestHttpClient,
        SqliteBlobStore, SqliteSettingsStore,
    };
    use std::thread;
    use tokio::runtime::{Handle, Runtime};

    let http_client: Arc<dyn HttpClient> = match &builder.http_client {
        Some(client) => Arc::clone(client),
        None => Arc::new(ReqwestHttpClient::new().map_err(|e| {
            Error::Internal(format!("Failed to create default HttpClient: {}", e))
        })?),
    };

    let need_blob_store = builder.blob_store.is_none();
    let need_settings = builder.settings_store.is_none();

    let init_stores = move |path: PathBuf| -> Result<(Option<SqliteBlobStore>, Option<SqliteSettingsStore>)> {
        let runtime = Runtime::new().map_err(|e| {
            Error::Internal(format!(
                "Failed to create Tokio runtime for default stores: {}",
                e
            ))
        })?;

        runtime.block_on(async move {
            let blob_store = if need_blob_store {
                Some(SqliteBlobStore::new(path.clone()).await.map_err(|e| {
                    Error::Internal(format!("Failed to initialize default BlobStore: {}", e))
                })?)
            } else {
                None
            };
            let settings = if need_settings {
                Some(SqliteSettingsStore::new(path).await.map_err(|e| {
                    Error::Internal(format!(
                        "Failed to initialize default SettingsStore: {}",
                        e
                    ))
                })?)
            } else {
                None
            };
            Ok((blob_store, settings))
        })
    };

    let (blob_store, settings) = if need_blob_store || need_settings {
        let path = database_path.to_path_buf();
        match Handle::try_current() {
            Ok(_) => thread::spawn(move || init_stores(path))
                .join()
                .map_err(|_| {
                    Error::Internal(
                        "Worker thread panicked while creating default stores".to_string(),
                    )
                })??,
            Err(_) => init_stores(path)?,
        }
    } else {
        (None, None)
    };

    Ok(DesktopDefaults {
        http_client: Some(http_client),
        blob_store: blob_store.map(|store| Arc::new(store) as Arc<dyn BlobStore>),
        settings_store: settings.map(|store| Arc::new(store) as Arc<dyn SettingsStore>),
        object_urls: Some(Arc::new(ObjectUrlRegistry::new())),
        storage_manager: Some(Arc::new(DesktopStorageManager::new(
            database_path.to_path_buf(),
        ))),
        platform: Some(Arc::new(desktop_platform_probe())),
    })
}

#[cfg(not(all(feature = "desktop-shims", not(target_arch = "wasm32"))))]
fn provide_desktop_defaults(
    _builder: &CoreConfigBuilder,
    _database_path: &std::path::Path,
) -> Result<DesktopDefaults> {
    Ok(DesktopDefaults {
        http_client: None,
        blob_store: None,
        settings_store: None,
        object_urls: None,
        storage_manager: None,
        platform: None,
    })
}

#[cfg(all(feature = "desktop-shims", not(target_arch = "wasm32")))]
fn default_database_path() -> Result<PathBuf> {
    bridge_desktop::default_database_path()
        .map_err(|e| Error::Config(format!("Cannot resolve default database path: {}", e)))
}

#[cfg(not(all(feature = "desktop-shims", not(target_arch = "wasm32"))))]
fn default_database_path() -> Result<PathBuf> {
    Ok(PathBuf::new())
}

/// Builder for constructing [`CoreConfig`] instances.
#[derive(Default)]
pub struct CoreConfigBuilder {
    database_path: Option<PathBuf>,
    http_client: Option<Arc<dyn HttpClient>>,
    blob_store: Option<Arc<dyn BlobStore>>,
    settings_store: Option<Arc<dyn SettingsStore>>,
    object_urls: Option<Arc<dyn ObjectUrlFactory>>,
    storage_manager: Option<Arc<dyn StorageManager>>,
    platform: Option<Arc<dyn PlatformProbe>>,
    clock: Option<Arc<dyn Clock>>,
    manifest_url: Option<String>,
    content_base: Option<String>,
    snapshot_ttl: Option<Duration>,
}

impl CoreConfigBuilder {
    /// Sets the database file used by desktop default stores.
    pub fn database_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.database_path = Some(path.into());
        self
    }

    /// Sets the HTTP client implementation.
    pub fn http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Sets the persistent blob store (required).
    pub fn blob_store(mut self, store: Arc<dyn BlobStore>) -> Self {
        self.blob_store = Some(store);
        self
    }

    /// Sets the settings store implementation (required).
    pub fn settings_store(mut self, store: Arc<dyn SettingsStore>) -> Self {
        self.settings_store = Some(store);
        self
    }

    /// Sets the object URL factory (required).
    pub fn object_urls(mut self, factory: Arc<dyn ObjectUrlFactory>) -> Self {
        self.object_urls = Some(factory);
        self
    }

    /// Sets the host storage manager (optional).
    pub fn storage_manager(mut self, manager: Arc<dyn StorageManager>) -> Self {
        self.storage_manager = Some(manager);
        self
    }

    /// Sets the platform signal source.
    pub fn platform(mut self, probe: Arc<dyn PlatformProbe>) -> Self {
        self.platform = Some(probe);
        self
    }

    /// Sets fixed platform signals.
    pub fn platform_signals(mut self, signals: PlatformSignals) -> Self {
        self.platform = Some(Arc::new(StaticPlatformProbe::new(signals)));
        self
    }

    /// Sets the clock.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Sets the manifest URL.
    ///
    /// Default: `/content/media-list.json`
    pub fn manifest_url(mut self, url: impl Into<String>) -> Self {
        self.manifest_url = Some(url.into());
        self
    }

    /// Sets the prefix for manifest-relative media files.
    ///
    /// Default: `/content`
    pub fn content_base(mut self, base: impl Into<String>) -> Self {
        self.content_base = Some(base.into());
        self
    }

    /// Sets how long a manifest snapshot stays valid.
    ///
    /// Default: 24 hours
    pub fn snapshot_ttl(mut self, ttl: Duration) -> Self {
        self.snapshot_ttl = Some(ttl);
        self
    }

    /// Builds the final `CoreConfig` instance.
    ///
    /// Returns an actionable [`Error::CapabilityMissing`] when a required
    /// bridge is neither provided nor available as a desktop default.
    pub fn build(self) -> Result<CoreConfig> {
        let database_path = match &self.database_path {
            Some(path) => path.clone(),
            None => default_database_path()?,
        };

        let defaults = provide_desktop_defaults(&self, &database_path)?;

        let http_client = self.http_client.or(defaults.http_client).ok_or_else(|| {
            capability_missing(
                "HttpClient",
                "media downloads",
                "inject the fetch-based WasmHttpClient",
            )
        })?;

        let blob_store = self.blob_store.or(defaults.blob_store).ok_or_else(|| {
            capability_missing(
                "BlobStore",
                "the persistent media cache",
                "inject the IndexedDB-backed store",
            )
        })?;

        let settings_store = self
            .settings_store
            .or(defaults.settings_store)
            .ok_or_else(|| {
                capability_missing(
                    "SettingsStore",
                    "likes and manifest snapshots",
                    "inject the localStorage-backed settings store",
                )
            })?;

        let object_urls = self.object_urls.or(defaults.object_urls).ok_or_else(|| {
            capability_missing(
                "ObjectUrlFactory",
                "displaying cached media",
                "inject the URL.createObjectURL wrapper",
            )
        })?;

        let platform = self
            .platform
            .or(defaults.platform)
            .unwrap_or_else(|| Arc::new(StaticPlatformProbe::new(PlatformSignals::default())));

        let config = CoreConfig {
            database_path: (!database_path.as_os_str().is_empty()).then_some(database_path),
            http_client,
            blob_store,
            settings_store,
            object_urls,
            storage_manager: self.storage_manager.or(defaults.storage_manager),
            platform,
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            manifest_url: self
                .manifest_url
                .unwrap_or_else(|| DEFAULT_MANIFEST_URL.to_string()),
            content_base: self
                .content_base
                .unwrap_or_else(|| DEFAULT_CONTENT_BASE.to_string()),
            snapshot_ttl: self.snapshot_ttl.unwrap_or(DEFAULT_SNAPSHOT_TTL),
        };

        config.validate()?;

        Ok(config)
    }
}
