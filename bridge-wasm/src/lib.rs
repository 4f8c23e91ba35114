//! WebAssembly Bridge Implementations
//!
//! Browser implementations of the traits defined in `bridge-traits`, built on
//! `web-sys` and `wasm-bindgen`.
//!
//! # Platform Support
//!
//! This crate is designed exclusively for the `wasm32-unknown-unknown` target.
//! It compiles to an empty crate elsewhere.
//!
//! # Implementations
//!
//! - `IndexedDbBlobStore`: media blob cache in IndexedDB
//! - `WasmHttpClient`: `fetch` with abort-based timeouts and cache modes
//! - `WasmSettingsStore`: `localStorage` key-value settings
//! - `BrowserObjectUrls`: `URL.createObjectURL` / `URL.revokeObjectURL`
//! - `BrowserStorageManager`: `navigator.storage.persist()` / `estimate()`
//! - `NavigatorPlatformProbe`: user agent and touch signals
//!
//! # Examples
//!
//! ```ignore
//! use bridge_wasm::{build_wasm_bridges, WasmBridgeConfig};
//!
//! let bridges = build_wasm_bridges(WasmBridgeConfig::default()).await?;
//! let entry = bridges.blob_store.get("https://example.com/a.jpg").await?;
//! ```

#![cfg(target_arch = "wasm32")]
#![warn(missing_docs)]

pub mod blob_store;
pub mod bootstrap;
pub mod error;
pub mod http;
pub mod object_url;
pub mod platform;
pub mod storage;
pub mod storage_manager;

// Re-export commonly used types
pub use blob_store::IndexedDbBlobStore;
pub use bootstrap::{build_wasm_bridges, WasmBridgeConfig, WasmBridgeSet};
pub use error::{WasmError, WasmResult};
pub use http::WasmHttpClient;
pub use object_url::BrowserObjectUrls;
pub use platform::NavigatorPlatformProbe;
pub use storage::WasmSettingsStore;
pub use storage_manager::BrowserStorageManager;
