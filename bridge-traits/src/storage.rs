//! Settings and Storage Capability Abstractions
//!
//! Key-value preferences storage plus the host storage manager used for
//! durable-storage requests and usage estimates.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::platform::PlatformSendSync;

/// Key-value settings storage trait
///
/// - Desktop: SQLite table
/// - Web: localStorage
///
/// # Example
///
/// ```ignore
/// use bridge_traits::storage::SettingsStore;
///
/// async fn save_likes(store: &dyn SettingsStore, json: &str) -> Result<()> {
///     store.set_string("drive-reels-liked-media", json).await
/// }
/// ```
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait SettingsStore: PlatformSendSync {
    /// Store a string value
    async fn set_string(&self, key: &str, value: &str) -> Result<()>;

    /// Retrieve a string value
    async fn get_string(&self, key: &str) -> Result<Option<String>>;

    /// Store an integer value
    async fn set_i64(&self, key: &str, value: i64) -> Result<()>;

    /// Retrieve an integer value
    async fn get_i64(&self, key: &str) -> Result<Option<i64>>;

    /// Delete a setting
    async fn delete(&self, key: &str) -> Result<()>;

    /// Check if a setting exists
    async fn has_key(&self, key: &str) -> Result<bool> {
        Ok(self.get_string(key).await?.is_some())
    }

    /// List all setting keys
    async fn list_keys(&self) -> Result<Vec<String>>;

    /// Clear all settings
    async fn clear_all(&self) -> Result<()>;
}

/// Storage usage as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StorageEstimate {
    /// Bytes currently used by this origin / application.
    pub usage: u64,
    /// Bytes the host is willing to grant.
    pub quota: u64,
}

/// Host storage manager.
///
/// Browsers back this with `navigator.storage`; desktop hosts compute usage
/// from the database file against a configured quota.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait StorageManager: PlatformSendSync {
    /// Ask the host to keep stored data out of automatic eviction.
    ///
    /// Returns whether the request was granted.
    async fn request_persistence(&self) -> Result<bool>;

    /// Current usage estimate, `None` when the host cannot provide one.
    async fn estimate(&self) -> Result<Option<StorageEstimate>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate_serializes() {
        let estimate = StorageEstimate {
            usage: 1024,
            quota: 4096,
        };
        let json = serde_json::to_string(&estimate).unwrap();
        assert_eq!(json, r#"{"usage":1024,"quota":4096}"#);
    }
}
