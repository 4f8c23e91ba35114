//! `navigator.storage` bridge.

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result as BridgeResult},
    storage::{StorageEstimate, StorageManager},
};
use js_sys::Reflect;
use tracing::debug;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;

use crate::error::describe;

/// [`StorageManager`] backed by the browser Storage API.
///
/// Older browsers lack `navigator.storage`; persistence then reports `false`
/// and estimates are `None`.
#[derive(Debug, Default, Clone)]
pub struct BrowserStorageManager;

impl BrowserStorageManager {
    pub fn new() -> Self {
        Self
    }

    fn manager() -> Option<web_sys::StorageManager> {
        let navigator = web_sys::window()?.navigator();
        let storage = Reflect::get(&navigator, &JsValue::from_str("storage")).ok()?;
        if storage.is_undefined() || storage.is_null() {
            return None;
        }
        Some(navigator.storage())
    }
}

fn field_as_u64(value: &JsValue, field: &str) -> u64 {
    Reflect::get(value, &JsValue::from_str(field))
        .ok()
        .and_then(|v| v.as_f64())
        .map(|v| v.max(0.0) as u64)
        .unwrap_or(0)
}

#[async_trait(?Send)]
impl StorageManager for BrowserStorageManager {
    async fn request_persistence(&self) -> BridgeResult<bool> {
        let Some(manager) = Self::manager() else {
            return Ok(false);
        };
        let promise = manager
            .persist()
            .map_err(|e| BridgeError::OperationFailed(format!("persist: {}", describe(&e))))?;
        let granted = JsFuture::from(promise)
            .await
            .map_err(|e| BridgeError::OperationFailed(format!("persist: {}", describe(&e))))?;
        Ok(granted.as_bool().unwrap_or(false))
    }

    async fn estimate(&self) -> BridgeResult<Option<StorageEstimate>> {
        let Some(manager) = Self::manager() else {
            return Ok(None);
        };
        let promise = manager
            .estimate()
            .map_err(|e| BridgeError::OperationFailed(format!("estimate: {}", describe(&e))))?;
        let estimate = JsFuture::from(promise)
            .await
            .map_err(|e| BridgeError::OperationFailed(format!("estimate: {}", describe(&e))))?;

        let result = StorageEstimate {
            usage: field_as_u64(&estimate, "usage"),
            quota: field_as_u64(&estimate, "quota"),
        };
        debug!(usage = result.usage, quota = result.quota, "Storage estimate");
        Ok(Some(result))
    }
}
