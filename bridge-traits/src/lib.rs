//! # Host Bridge Traits
//!
//! Platform abstraction traits that must be implemented by each host.
//!
//! ## Overview
//!
//! This crate defines the contract between the media core and host-specific
//! implementations. Each trait is a capability the core needs but that
//! differs per host (desktop shell vs. browser).
//!
//! ## Traits
//!
//! ### Networking
//! - [`HttpClient`](http::HttpClient) - Async HTTP with timeouts and cache modes
//!
//! ### Storage
//! - [`BlobStore`](blob_store::BlobStore) - Persistent media blob cache keyed by URL
//! - [`SettingsStore`](storage::SettingsStore) - Key-value preferences storage
//! - [`StorageManager`](storage::StorageManager) - Durable-storage requests and usage estimates
//!
//! ### Media
//! - [`ObjectUrlFactory`](object_url::ObjectUrlFactory) - Create/revoke object URLs for blobs
//!
//! ### Platform
//! - [`PlatformProbe`](platform::PlatformProbe) - Runtime signals for platform classification
//! - [`Clock`](time::Clock) - Time source for deterministic testing
//!
//! ## Platform Requirements
//!
//! | Host | Implementation Crate |
//! |------|---------------------|
//! | Desktop | `bridge-desktop` |
//! | Web | `bridge-wasm` |
//!
//! ## Error Handling
//!
//! All bridge traits use [`BridgeError`](error::BridgeError). Implementations
//! should convert host errors into it with actionable messages and must keep
//! `QuotaExceeded` distinct from other storage failures, since the cache
//! recovers from it.
//!
//! ## Thread Safety
//!
//! Traits are bounded by [`PlatformSendSync`](platform::PlatformSendSync):
//! `Send + Sync` on native targets, unbounded on `wasm32`.
//!
//! ## Examples
//!
//! ### Implementing HttpClient
//!
//! ```ignore
//! use bridge_traits::http::{HttpClient, HttpRequest, HttpResponse};
//! use bridge_traits::error::Result;
//! use async_trait::async_trait;
//!
//! pub struct MyHttpClient {
//!     client: reqwest::Client,
//! }
//!
//! #[async_trait]
//! impl HttpClient for MyHttpClient {
//!     async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
//!         todo!()
//!     }
//! }
//! ```

pub mod blob_store;
pub mod error;
pub mod http;
pub mod object_url;
pub mod platform;
pub mod storage;
pub mod time;

pub use error::BridgeError;

// Re-export commonly used types
pub use blob_store::{BlobMetadata, BlobStore, CachedBlob};
pub use http::{CacheMode, HttpClient, HttpMethod, HttpRequest, HttpResponse, RetryPolicy};
pub use object_url::ObjectUrlFactory;
pub use platform::{PlatformProbe, PlatformSignals, StaticPlatformProbe};
pub use storage::{SettingsStore, StorageEstimate, StorageManager};
pub use time::{Clock, ManualClock, SystemClock};
