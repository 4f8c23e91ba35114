//! Last known media list, kept in the settings store
//!
//! Three keys hold the snapshot: the content version, the serialized item
//! list and the save time in milliseconds. The key names match what the web
//! app has always written to `localStorage`.

use std::sync::Arc;
use std::time::Duration;

use bridge_traits::{Clock, SettingsStore};
use tracing::{debug, info, instrument, warn};

use crate::error::Result;
use crate::models::MediaItem;

pub const SNAPSHOT_VERSION_KEY: &str = "media-cache-version";
pub const SNAPSHOT_DATA_KEY: &str = "media-cache-data";
pub const SNAPSHOT_TIMESTAMP_KEY: &str = "media-cache-timestamp";

/// Settings-backed manifest snapshot.
#[derive(Clone)]
pub struct ManifestSnapshotStore {
    settings: Arc<dyn SettingsStore>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl ManifestSnapshotStore {
    pub fn new(settings: Arc<dyn SettingsStore>, clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            settings,
            clock,
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn stored_version(&self) -> Result<Option<String>> {
        Ok(self.settings.get_string(SNAPSHOT_VERSION_KEY).await?)
    }

    /// Persist `items` as the snapshot for `version`.
    ///
    /// A snapshot of a different version is dropped first. If the write is
    /// rejected the snapshot is cleared and the write retried once.
    #[instrument(skip(self, items), fields(count = items.len()))]
    pub async fn save(&self, version: &str, items: &[MediaItem]) -> Result<()> {
        if let Some(previous) = self.stored_version().await? {
            if previous != version {
                info!(previous = %previous, current = %version, "Content version changed, clearing snapshot");
                self.clear().await?;
            }
        }

        let data = serde_json::to_string(items)?;
        if let Err(err) = self.write(version, &data).await {
            warn!(error = %err, "Snapshot write failed, clearing and retrying");
            self.clear().await?;
            self.write(version, &data).await?;
        }
        Ok(())
    }

    async fn write(&self, version: &str, data: &str) -> Result<()> {
        self.settings.set_string(SNAPSHOT_VERSION_KEY, version).await?;
        self.settings.set_string(SNAPSHOT_DATA_KEY, data).await?;
        self.settings
            .set_i64(SNAPSHOT_TIMESTAMP_KEY, self.clock.unix_timestamp_millis())
            .await?;
        Ok(())
    }

    /// Snapshot items if one exists and is younger than the TTL.
    ///
    /// An expired snapshot is cleared. An unreadable one is reported as
    /// absent.
    #[instrument(skip(self))]
    pub async fn load_fresh(&self) -> Result<Option<Vec<MediaItem>>> {
        let data = self.settings.get_string(SNAPSHOT_DATA_KEY).await?;
        let saved_at = self.settings.get_i64(SNAPSHOT_TIMESTAMP_KEY).await.ok().flatten();

        let (Some(data), Some(saved_at)) = (data, saved_at) else {
            return Ok(None);
        };

        let age_ms = self.clock.unix_timestamp_millis().saturating_sub(saved_at);
        if age_ms > self.ttl.as_millis() as i64 {
            debug!(age_ms, "Snapshot expired, clearing");
            self.clear().await?;
            return Ok(None);
        }

        match serde_json::from_str::<Vec<MediaItem>>(&data) {
            Ok(items) => Ok(Some(items)),
            Err(err) => {
                warn!(error = %err, "Discarding unreadable snapshot");
                Ok(None)
            }
        }
    }

    pub async fn clear(&self) -> Result<()> {
        self.settings.delete(SNAPSHOT_VERSION_KEY).await?;
        self.settings.delete(SNAPSHOT_DATA_KEY).await?;
        self.settings.delete(SNAPSHOT_TIMESTAMP_KEY).await?;
        Ok(())
    }
}
