//! Object URL Abstraction
//!
//! An object URL is a process-local reference that lets a media element read
//! an in-memory blob as if it were a network resource. Each created URL pins
//! its payload until revoked.
//!
//! - Web: `URL.createObjectURL` / `URL.revokeObjectURL`
//! - Desktop: an in-process registry handing out `blob:` URLs

use bytes::Bytes;

use crate::error::Result;
use crate::platform::PlatformSendSync;

/// Creates and revokes object URLs.
pub trait ObjectUrlFactory: PlatformSendSync {
    /// Create a URL backed by `data`.
    fn create(&self, data: &Bytes, mime_type: &str) -> Result<String>;

    /// Release a URL previously returned by [`ObjectUrlFactory::create`].
    ///
    /// Revoking an unknown or already-revoked URL is a no-op.
    fn revoke(&self, url: &str);

    /// Number of URLs currently alive, when the host can tell.
    fn live_count(&self) -> Option<usize> {
        None
    }
}
