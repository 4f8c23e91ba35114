//! Object URLs via `URL.createObjectURL`.

use bridge_traits::{
    error::{BridgeError, Result as BridgeResult},
    object_url::ObjectUrlFactory,
};
use bytes::Bytes;
use js_sys::{Array, Uint8Array};
use std::cell::Cell;
use tracing::{debug, warn};
use web_sys::{Blob, BlobPropertyBag, Url};

use crate::error::describe;

/// Browser [`ObjectUrlFactory`].
///
/// Tracks how many URLs it has issued and not yet revoked so leaks show up in
/// diagnostics.
#[derive(Debug, Default)]
pub struct BrowserObjectUrls {
    live: Cell<usize>,
}

impl BrowserObjectUrls {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ObjectUrlFactory for BrowserObjectUrls {
    fn create(&self, data: &Bytes, mime_type: &str) -> BridgeResult<String> {
        let parts = Array::new();
        parts.push(&Uint8Array::from(data.as_ref()));
        let options = BlobPropertyBag::new();
        options.set_type(mime_type);

        let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &options).map_err(|e| {
            BridgeError::OperationFailed(format!("create Blob: {}", describe(&e)))
        })?;
        let url = Url::create_object_url_with_blob(&blob).map_err(|e| {
            BridgeError::OperationFailed(format!("createObjectURL: {}", describe(&e)))
        })?;

        self.live.set(self.live.get() + 1);
        debug!(size = data.len(), "Created object URL");
        Ok(url)
    }

    fn revoke(&self, url: &str) {
        match Url::revoke_object_url(url) {
            Ok(()) => self.live.set(self.live.get().saturating_sub(1)),
            Err(e) => warn!(error = %describe(&e), "revokeObjectURL failed"),
        }
    }

    fn live_count(&self) -> Option<usize> {
        Some(self.live.get())
    }
}
