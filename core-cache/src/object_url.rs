//! Object URL ownership
//!
//! Every object URL pins its payload until revoked. [`ObjectUrlHandle`] owns
//! exactly one URL and revokes it on [`release`](ObjectUrlHandle::release) or
//! drop, so a handle cannot outlive the slot that shows it.

use std::sync::Arc;

use bridge_traits::ObjectUrlFactory;
use bytes::Bytes;
use tracing::trace;

use crate::error::{CacheError, Result};
use crate::facade::MediaBlobCache;

/// Exclusive owner of one object URL.
pub struct ObjectUrlHandle {
    url: String,
    factory: Arc<dyn ObjectUrlFactory>,
    released: bool,
}

impl ObjectUrlHandle {
    /// Create an object URL for `data`.
    pub fn create(factory: Arc<dyn ObjectUrlFactory>, data: &Bytes, mime_type: &str) -> Result<Self> {
        let url = factory
            .create(data, mime_type)
            .map_err(|e| CacheError::ObjectUrl(e.to_string()))?;
        trace!(%url, "Object URL created");
        Ok(Self {
            url,
            factory,
            released: false,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Revoke the URL now.
    pub fn release(mut self) {
        self.revoke();
    }

    fn revoke(&mut self) {
        if !self.released {
            self.factory.revoke(&self.url);
            self.released = true;
            trace!(url = %self.url, "Object URL revoked");
        }
    }
}

impl Drop for ObjectUrlHandle {
    fn drop(&mut self) {
        self.revoke();
    }
}

impl std::fmt::Debug for ObjectUrlHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectUrlHandle")
            .field("url", &self.url)
            .field("released", &self.released)
            .finish()
    }
}

/// What a media element should load.
#[derive(Debug)]
pub enum MediaReference {
    /// Backed by a locally held payload.
    Local(ObjectUrlHandle),
    /// The original network URL.
    Remote(String),
}

impl MediaReference {
    pub fn as_str(&self) -> &str {
        match self {
            MediaReference::Local(handle) => handle.url(),
            MediaReference::Remote(url) => url,
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self, MediaReference::Local(_))
    }

    /// Revoke the object URL, if any.
    pub fn release(self) {
        if let MediaReference::Local(handle) = self {
            handle.release();
        }
    }
}

impl std::fmt::Display for MediaReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One logical display position holding at most one live reference.
#[derive(Debug, Default)]
pub struct MediaSlot {
    current: Option<MediaReference>,
}

impl MediaSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the shown reference, revoking the previous one first.
    pub fn load(&mut self, reference: MediaReference) -> &str {
        self.clear();
        self.current.insert(reference).as_str()
    }

    /// Revoke the shown reference, then resolve `url` through `cache`.
    ///
    /// The old handle is gone before the new one is created, so a slot never
    /// holds two live object URLs.
    pub async fn reload(&mut self, cache: &MediaBlobCache, url: &str) -> &str {
        self.clear();
        let reference = cache.fetch_and_cache(url).await;
        self.current.insert(reference).as_str()
    }

    pub fn clear(&mut self) {
        if let Some(previous) = self.current.take() {
            previous.release();
        }
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_ref().map(MediaReference::as_str)
    }
}
