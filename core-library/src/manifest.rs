//! Content manifest parsing and loading
//!
//! Locally hosted media is described by `media-list.json`:
//!
//! ```json
//! {
//!   "version": "2024-05-01",
//!   "lastModified": "2024-05-01T10:00:00Z",
//!   "items": [
//!     { "id": "a1", "name": "beach.jpg", "file": "beach.jpg",
//!       "mimeType": "image/jpeg", "createdTime": "...", "modifiedTime": "..." }
//!   ]
//! }
//! ```
//!
//! Older deployments publish the bare `items` array; both forms are accepted.
//! [`ManifestLoader::load`] never fails: when the manifest cannot be fetched
//! it falls back to the last snapshot saved by
//! [`ManifestSnapshotStore`](crate::snapshot::ManifestSnapshotStore).

use std::sync::Arc;
use std::time::Duration;

use bridge_traits::{CacheMode, Clock, HttpClient, HttpRequest};
use chrono::SecondsFormat;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use crate::error::{LibraryError, Result};
use crate::models::MediaItem;
use crate::snapshot::ManifestSnapshotStore;

const MANIFEST_TIMEOUT: Duration = Duration::from_secs(15);

/// One file listed in the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    pub id: String,
    pub name: String,
    pub file: String,
    pub mime_type: String,
    #[serde(default)]
    pub created_time: Option<String>,
    #[serde(default)]
    pub modified_time: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ManifestEnvelope {
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    last_modified: Option<String>,
    #[serde(default)]
    items: Vec<ManifestEntry>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ManifestDocument {
    Legacy(Vec<ManifestEntry>),
    Envelope(ManifestEnvelope),
}

/// A parsed manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentManifest {
    pub version: Option<String>,
    pub last_modified: Option<String>,
    pub entries: Vec<ManifestEntry>,
}

impl ContentManifest {
    /// Parse either manifest form.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let document: ManifestDocument = serde_json::from_slice(bytes)
            .map_err(|e| LibraryError::MalformedManifest(e.to_string()))?;

        Ok(match document {
            ManifestDocument::Legacy(entries) => Self {
                version: None,
                last_modified: None,
                entries,
            },
            ManifestDocument::Envelope(envelope) => Self {
                version: envelope.version,
                last_modified: envelope.last_modified,
                entries: envelope.items,
            },
        })
    }

    /// Version used to detect content changes.
    ///
    /// `version`, then `lastModified`, then `fallback` (the load's cache
    /// buster), so a manifest without either field always reads as new.
    pub fn content_version(&self, fallback: &str) -> String {
        self.version
            .clone()
            .or_else(|| self.last_modified.clone())
            .unwrap_or_else(|| fallback.to_string())
    }

    /// Map entries to feed items served from `content_base`.
    ///
    /// `loaded_at` fills in a missing `modifiedTime`.
    pub fn to_media_items(&self, content_base: &str, loaded_at: &str) -> Vec<MediaItem> {
        self.entries
            .iter()
            .map(|entry| {
                MediaItem::new(&entry.id, &entry.name, &entry.mime_type)
                    .with_link(content_url(content_base, &entry.file))
                    .with_modified_time(
                        entry
                            .modified_time
                            .clone()
                            .unwrap_or_else(|| loaded_at.to_string()),
                    )
                    .with_size("0")
            })
            .collect()
    }
}

/// Join a manifest `file` onto the content base.
pub fn content_url(content_base: &str, file: &str) -> String {
    format!(
        "{}/{}",
        content_base.trim_end_matches('/'),
        file.trim_start_matches('/')
    )
}

/// Fetches the manifest and keeps its snapshot current.
pub struct ManifestLoader {
    http: Arc<dyn HttpClient>,
    snapshots: ManifestSnapshotStore,
    clock: Arc<dyn Clock>,
    manifest_url: String,
    content_base: String,
}

impl ManifestLoader {
    pub fn new(
        http: Arc<dyn HttpClient>,
        snapshots: ManifestSnapshotStore,
        clock: Arc<dyn Clock>,
        manifest_url: impl Into<String>,
        content_base: impl Into<String>,
    ) -> Self {
        Self {
            http,
            snapshots,
            clock,
            manifest_url: manifest_url.into(),
            content_base: content_base.into(),
        }
    }

    pub fn snapshots(&self) -> &ManifestSnapshotStore {
        &self.snapshots
    }

    /// Fetch and parse the manifest, bypassing every HTTP cache layer.
    #[instrument(skip(self), fields(url = %self.manifest_url))]
    pub async fn fetch(&self, cache_buster: i64) -> Result<ContentManifest> {
        let separator = if self.manifest_url.contains('?') { '&' } else { '?' };
        let request = HttpRequest::get(format!(
            "{}{}t={}",
            self.manifest_url, separator, cache_buster
        ))
        .header("Cache-Control", "no-cache, no-store, must-revalidate")
        .header("Pragma", "no-cache")
        .cache_mode(CacheMode::NoStore)
        .timeout(MANIFEST_TIMEOUT);

        let response = self.http.execute(request).await?;
        if !response.is_success() {
            return Err(LibraryError::ManifestUnavailable {
                url: self.manifest_url.clone(),
                status: response.status,
            });
        }

        ContentManifest::parse(&response.body)
    }

    /// Current media list.
    ///
    /// On success the snapshot is refreshed (and dropped first if the content
    /// version changed). On failure the snapshot is served while it is
    /// younger than the configured TTL; otherwise the list is empty.
    #[instrument(skip(self))]
    pub async fn load(&self) -> Vec<MediaItem> {
        let now = self.clock.now();
        let cache_buster = now.timestamp_millis();

        let manifest = match self.fetch(cache_buster).await {
            Ok(manifest) => manifest,
            Err(err) => {
                warn!(error = %err, "Failed to load media list, using snapshot");
                return self.snapshot_or_empty().await;
            }
        };

        let version = manifest.content_version(&cache_buster.to_string());
        let loaded_at = now.to_rfc3339_opts(SecondsFormat::Millis, true);
        let items = manifest.to_media_items(&self.content_base, &loaded_at);

        info!(count = items.len(), version = %version, "Loaded media list");

        if let Err(err) = self.snapshots.save(&version, &items).await {
            warn!(error = %err, "Unable to persist media list snapshot");
        }

        items
    }

    async fn snapshot_or_empty(&self) -> Vec<MediaItem> {
        match self.snapshots.load_fresh().await {
            Ok(Some(items)) => {
                debug!(count = items.len(), "Serving media list snapshot");
                items
            }
            Ok(None) => Vec::new(),
            Err(err) => {
                warn!(error = %err, "Failed to read media list snapshot");
                Vec::new()
            }
        }
    }
}
