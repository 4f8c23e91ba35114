//! # Cache Error Types
//!
//! Failures inside the media cache. None of these escape the public
//! [`MediaBlobCache`](crate::MediaBlobCache) operations: each variant has a
//! defined fallback, and the variant decides which one.

use std::time::Duration;

use bridge_traits::error::BridgeError;
use thiserror::Error;

/// Errors that can occur inside the media cache.
#[derive(Error, Debug)]
pub enum CacheError {
    // ========================================================================
    // Store Errors
    // ========================================================================
    /// The persistent store cannot be opened or accessed.
    #[error("Cache storage unavailable: {0}")]
    StorageUnavailable(String),

    /// The host rejected a write for lack of space.
    #[error("Cache quota exceeded: {0}")]
    QuotaExceeded(String),

    /// A stored entry has an empty payload.
    #[error("Corrupt cache entry for {url}")]
    CorruptEntry { url: String },

    // ========================================================================
    // Network Errors
    // ========================================================================
    /// The fetch did not complete in time.
    #[error("Fetch of {url} timed out after {timeout:?}")]
    FetchTimeout { url: String, timeout: Duration },

    /// The fetch failed or returned a non-success status.
    #[error("Fetch of {url} failed{}: {message}", status.map(|s| format!(" with HTTP {s}")).unwrap_or_default())]
    FetchFailure {
        url: String,
        status: Option<u16>,
        message: String,
    },

    /// The response carried no payload.
    #[error("Fetch of {url} returned an empty body")]
    EmptyBody { url: String },

    // ========================================================================
    // Host Errors
    // ========================================================================
    /// Creating an object URL for a payload failed.
    #[error("Object URL creation failed: {0}")]
    ObjectUrl(String),

    /// Invalid cache configuration.
    #[error("Invalid cache configuration: {0}")]
    Config(String),
}

impl CacheError {
    /// Returns `true` when the cache can keep serving, possibly degraded.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, CacheError::Config(_))
    }

    /// Returns `true` if this error came from the network path.
    pub fn is_network_error(&self) -> bool {
        matches!(
            self,
            CacheError::FetchTimeout { .. }
                | CacheError::FetchFailure { .. }
                | CacheError::EmptyBody { .. }
        )
    }

    /// Returns `true` if this error came from the persistent store.
    pub fn is_storage_error(&self) -> bool {
        matches!(
            self,
            CacheError::StorageUnavailable(_) | CacheError::QuotaExceeded(_)
        )
    }
}

impl From<BridgeError> for CacheError {
    fn from(err: BridgeError) -> Self {
        match err {
            BridgeError::QuotaExceeded(msg) => CacheError::QuotaExceeded(msg),
            BridgeError::StorageUnavailable(msg) => CacheError::StorageUnavailable(msg),
            other => CacheError::StorageUnavailable(other.to_string()),
        }
    }
}

/// Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;
