//! `localStorage`-backed settings bridge.
//!
//! Keys are stored as `{namespace}::settings::{key}` so several host shells can
//! share an origin. [`WasmSettingsStore::unscoped`] writes keys verbatim, which
//! keeps data written by earlier versions of the web app readable (for
//! example the `drive-reels-liked-media` likes list).

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result as BridgeResult},
    storage::SettingsStore,
};
use wasm_bindgen::JsValue;

use crate::error::describe;

const SETTINGS_PREFIX: &str = "settings";

fn js_error(context: &str, err: JsValue) -> BridgeError {
    if let Some(exception) = wasm_bindgen::JsCast::dyn_ref::<web_sys::DomException>(&err) {
        if exception.name() == "QuotaExceededError" {
            return BridgeError::QuotaExceeded(format!("localStorage {context}"));
        }
    }
    BridgeError::OperationFailed(format!("wasm storage {context}: {}", describe(&err)))
}

fn local_storage() -> BridgeResult<web_sys::Storage> {
    let window = web_sys::window().ok_or_else(|| BridgeError::NotAvailable("window".into()))?;
    window
        .local_storage()
        .map_err(|err| js_error("localStorage", err))?
        .ok_or_else(|| BridgeError::NotAvailable("localStorage".into()))
}

#[derive(Clone)]
/// Plain settings store layered on `localStorage`.
pub struct WasmSettingsStore {
    storage: web_sys::Storage,
    prefix: String,
}

impl WasmSettingsStore {
    /// Construct a new settings store scoped to the provided namespace.
    pub fn new(namespace: impl Into<String>) -> BridgeResult<Self> {
        Ok(Self {
            storage: local_storage()?,
            prefix: format!("{}::{SETTINGS_PREFIX}::", namespace.into()),
        })
    }

    /// Settings store that uses keys as-is.
    pub fn unscoped() -> BridgeResult<Self> {
        Ok(Self {
            storage: local_storage()?,
            prefix: String::new(),
        })
    }

    fn key_for(&self, key: &str) -> String {
        format!("{}{key}", self.prefix)
    }
}

#[async_trait(?Send)]
impl SettingsStore for WasmSettingsStore {
    async fn set_string(&self, key: &str, value: &str) -> BridgeResult<()> {
        self.storage
            .set_item(&self.key_for(key), value)
            .map_err(|err| js_error("set setting", err))
    }

    async fn get_string(&self, key: &str) -> BridgeResult<Option<String>> {
        self.storage
            .get_item(&self.key_for(key))
            .map_err(|err| js_error("get setting", err))
    }

    async fn set_i64(&self, key: &str, value: i64) -> BridgeResult<()> {
        self.set_string(key, &value.to_string()).await
    }

    async fn get_i64(&self, key: &str) -> BridgeResult<Option<i64>> {
        match self.get_string(key).await? {
            Some(value) => value
                .parse::<i64>()
                .map(Some)
                .map_err(|err| BridgeError::OperationFailed(format!("parse i64: {err}"))),
            None => Ok(None),
        }
    }

    async fn delete(&self, key: &str) -> BridgeResult<()> {
        self.storage
            .remove_item(&self.key_for(key))
            .map_err(|err| js_error("remove setting", err))
    }

    async fn list_keys(&self) -> BridgeResult<Vec<String>> {
        let len = self
            .storage
            .length()
            .map_err(|err| js_error("storage length", err))?;
        let mut keys = Vec::new();
        for idx in 0..len {
            if let Some(entry) = self
                .storage
                .key(idx)
                .map_err(|err| js_error("storage key", err))?
            {
                if let Some(key) = entry.strip_prefix(&self.prefix) {
                    keys.push(key.to_string());
                }
            }
        }
        Ok(keys)
    }

    async fn clear_all(&self) -> BridgeResult<()> {
        let keys = self.list_keys().await?;
        for key in keys {
            self.storage
                .remove_item(&self.key_for(&key))
                .map_err(|err| js_error("clear setting", err))?;
        }
        Ok(())
    }
}
