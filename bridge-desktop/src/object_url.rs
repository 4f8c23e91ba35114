//! In-process object URL registry

use bridge_traits::{error::Result, object_url::ObjectUrlFactory};
use bytes::Bytes;
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone)]
struct RegisteredBlob {
    data: Bytes,
    mime_type: String,
}

/// Desktop stand-in for the browser's object URL table.
///
/// Hands out `blob:reels/<uuid>` URLs and keeps each payload alive until the
/// URL is revoked. Desktop media views resolve the URL back to bytes with
/// [`ObjectUrlRegistry::resolve`].
#[derive(Debug, Default)]
pub struct ObjectUrlRegistry {
    entries: RwLock<HashMap<String, RegisteredBlob>>,
}

impl ObjectUrlRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Payload and mime type for a live URL.
    pub fn resolve(&self, url: &str) -> Option<(Bytes, String)> {
        self.entries
            .read()
            .get(url)
            .map(|entry| (entry.data.clone(), entry.mime_type.clone()))
    }

    pub fn is_live(&self, url: &str) -> bool {
        self.entries.read().contains_key(url)
    }
}

impl ObjectUrlFactory for ObjectUrlRegistry {
    fn create(&self, data: &Bytes, mime_type: &str) -> Result<String> {
        let url = format!("blob:reels/{}", Uuid::new_v4());
        self.entries.write().insert(
            url.clone(),
            RegisteredBlob {
                data: data.clone(),
                mime_type: mime_type.to_string(),
            },
        );
        debug!(url = %url, size = data.len(), "Created object URL");
        Ok(url)
    }

    fn revoke(&self, url: &str) {
        if self.entries.write().remove(url).is_some() {
            debug!(url = %url, "Revoked object URL");
        }
    }

    fn live_count(&self) -> Option<usize> {
        Some(self.entries.read().len())
    }
}
