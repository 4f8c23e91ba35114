//! Cache statistics and storage quota reporting

use bridge_traits::{BlobMetadata, StorageEstimate};
use serde::{Deserialize, Serialize};

/// Statistics about the media cache.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Number of stored entries
    pub entry_count: usize,

    /// Total bytes used by stored payloads
    pub total_bytes: u64,

    /// Configured ceiling
    pub max_bytes: u64,

    /// Timestamp of the oldest entry (ms)
    pub oldest_timestamp: Option<i64>,

    /// Timestamp of the newest entry (ms)
    pub newest_timestamp: Option<i64>,
}

impl CacheStats {
    /// Build from entries sorted oldest first.
    pub fn from_entries(entries: &[BlobMetadata], max_bytes: u64) -> Self {
        Self {
            entry_count: entries.len(),
            total_bytes: entries.iter().map(|e| e.size).sum(),
            max_bytes,
            oldest_timestamp: entries.first().map(|e| e.timestamp),
            newest_timestamp: entries.last().map(|e| e.timestamp),
        }
    }

    /// Calculate cache usage as a percentage of the ceiling.
    pub fn usage_percentage(&self) -> f64 {
        if self.max_bytes == 0 {
            return 0.0;
        }

        (self.total_bytes as f64 / self.max_bytes as f64) * 100.0
    }

    /// Returns true if the cache is near capacity (>90%).
    pub fn is_near_capacity(&self) -> bool {
        self.usage_percentage() > 90.0
    }

    /// Returns true if the cache is full (>=100%).
    pub fn is_full(&self) -> bool {
        self.total_bytes >= self.max_bytes
    }

    /// Bytes over the ceiling.
    pub fn space_needed(&self) -> u64 {
        self.total_bytes.saturating_sub(self.max_bytes)
    }

    /// Returns average bytes per entry.
    pub fn average_entry_size(&self) -> u64 {
        if self.entry_count == 0 {
            0
        } else {
            self.total_bytes / self.entry_count as u64
        }
    }
}

/// Host storage usage as exposed to the UI.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageQuota {
    pub used: u64,
    pub available: u64,
    pub percent_used: f64,
}

impl From<StorageEstimate> for StorageQuota {
    fn from(estimate: StorageEstimate) -> Self {
        let percent_used = if estimate.quota == 0 {
            0.0
        } else {
            (estimate.usage as f64 / estimate.quota as f64) * 100.0
        };

        Self {
            used: estimate.usage,
            available: estimate.quota,
            percent_used,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(size: u64, timestamp: i64) -> BlobMetadata {
        BlobMetadata {
            url: format!("https://x/{timestamp}"),
            size,
            timestamp,
            mime_type: "image/jpeg".to_string(),
        }
    }

    #[test]
    fn test_usage_percentage() {
        let stats = CacheStats::from_entries(&[meta(300, 1), meta(200, 5)], 1000);
        assert_eq!(stats.entry_count, 2);
        assert_eq!(stats.usage_percentage(), 50.0);
        assert_eq!(stats.oldest_timestamp, Some(1));
        assert_eq!(stats.newest_timestamp, Some(5));
        assert_eq!(stats.average_entry_size(), 250);
    }

    #[test]
    fn test_capacity_checks() {
        let stats = CacheStats::from_entries(&[meta(950, 1)], 1000);
        assert!(stats.is_near_capacity());
        assert!(!stats.is_full());

        let stats = CacheStats::from_entries(&[meta(1100, 1)], 1000);
        assert!(stats.is_full());
        assert_eq!(stats.space_needed(), 100);
    }

    #[test]
    fn test_empty_stats() {
        let stats = CacheStats::from_entries(&[], 0);
        assert_eq!(stats.usage_percentage(), 0.0);
        assert_eq!(stats.oldest_timestamp, None);
    }

    #[test]
    fn test_storage_quota_from_estimate() {
        let quota = StorageQuota::from(StorageEstimate {
            usage: 25,
            quota: 100,
        });
        assert_eq!(quota.percent_used, 25.0);

        let json = serde_json::to_value(quota).unwrap();
        assert_eq!(json["percentUsed"], 25.0);

        let empty = StorageQuota::from(StorageEstimate { usage: 5, quota: 0 });
        assert_eq!(empty.percent_used, 0.0);
    }
}
