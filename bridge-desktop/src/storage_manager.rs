//! Storage estimate for desktop hosts

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    storage::{StorageEstimate, StorageManager},
};
use std::path::PathBuf;
use tracing::debug;

/// Default quota reported when none is configured (2 GiB).
pub const DEFAULT_DESKTOP_QUOTA: u64 = 2 * 1024 * 1024 * 1024;

/// [`StorageManager`] that measures the database file on disk.
///
/// Desktop data directories are never evicted by the OS, so persistence is
/// always granted.
#[derive(Debug, Clone)]
pub struct DesktopStorageManager {
    db_path: Option<PathBuf>,
    quota: u64,
}

impl DesktopStorageManager {
    pub fn new(db_path: PathBuf) -> Self {
        Self {
            db_path: Some(db_path),
            quota: DEFAULT_DESKTOP_QUOTA,
        }
    }

    /// Manager for in-memory stores; estimates are unavailable.
    pub fn detached() -> Self {
        Self {
            db_path: None,
            quota: DEFAULT_DESKTOP_QUOTA,
        }
    }

    pub fn with_quota(mut self, quota: u64) -> Self {
        self.quota = quota;
        self
    }

    async fn file_len(path: PathBuf) -> Result<u64> {
        match tokio::fs::metadata(&path).await {
            Ok(metadata) => Ok(metadata.len()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(0),
            Err(e) => Err(BridgeError::Io(e)),
        }
    }
}

#[async_trait]
impl StorageManager for DesktopStorageManager {
    async fn request_persistence(&self) -> Result<bool> {
        Ok(true)
    }

    async fn estimate(&self) -> Result<Option<StorageEstimate>> {
        let Some(path) = &self.db_path else {
            return Ok(None);
        };

        let mut wal = path.clone().into_os_string();
        wal.push("-wal");

        let usage = Self::file_len(path.clone()).await? + Self::file_len(PathBuf::from(wal)).await?;
        debug!(usage, quota = self.quota, "Computed storage estimate");

        Ok(Some(StorageEstimate {
            usage,
            quota: self.quota,
        }))
    }
}
