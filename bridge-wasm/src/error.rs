//! Error types for WebAssembly bridge implementations

use bridge_traits::error::BridgeError;
use thiserror::Error;
use wasm_bindgen::{JsCast, JsValue};

/// Result type for WebAssembly bridge operations
pub type WasmResult<T> = Result<T, WasmError>;

/// Errors that can occur in WebAssembly bridge implementations
#[derive(Error, Debug)]
pub enum WasmError {
    /// A browser API is missing in this context
    #[error("Browser API not available: {0}")]
    NotAvailable(String),

    /// IndexedDB operation failed
    #[error("IndexedDB error: {0}")]
    IndexedDb(String),

    /// The browser rejected a write for lack of space
    #[error("Quota exceeded: {0}")]
    QuotaExceeded(String),

    /// JavaScript error from web-sys
    #[error("JavaScript error: {0}")]
    JavaScript(String),

    /// Value conversion between Rust and JS failed
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl WasmError {
    /// Classify a rejected IndexedDB request or transaction.
    ///
    /// `QuotaExceededError` DOM exceptions keep their identity so callers can
    /// run eviction and retry.
    pub fn from_idb(context: &str, value: JsValue) -> Self {
        if let Some(exception) = value.dyn_ref::<web_sys::DomException>() {
            let name = exception.name();
            if name == "QuotaExceededError" {
                return WasmError::QuotaExceeded(format!("{context}: {}", exception.message()));
            }
            return WasmError::IndexedDb(format!("{context}: {name}: {}", exception.message()));
        }
        WasmError::IndexedDb(format!("{context}: {}", describe(&value)))
    }
}

impl From<WasmError> for BridgeError {
    fn from(err: WasmError) -> Self {
        match err {
            WasmError::NotAvailable(msg) => BridgeError::NotAvailable(msg),
            WasmError::QuotaExceeded(msg) => BridgeError::QuotaExceeded(msg),
            WasmError::IndexedDb(msg) => BridgeError::StorageUnavailable(msg),
            other => BridgeError::OperationFailed(other.to_string()),
        }
    }
}

impl From<JsValue> for WasmError {
    fn from(js_value: JsValue) -> Self {
        WasmError::JavaScript(describe(&js_value))
    }
}

/// Human-readable text for an arbitrary thrown JS value.
pub(crate) fn describe(value: &JsValue) -> String {
    if let Some(text) = value.as_string() {
        text
    } else if let Some(error) = value.dyn_ref::<js_sys::Error>() {
        error.message().into()
    } else {
        format!("{:?}", value)
    }
}
