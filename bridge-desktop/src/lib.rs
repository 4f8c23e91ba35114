//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop platforms
//! (macOS, Windows, Linux).
//!
//! ## Overview
//!
//! - `HttpClient` using `reqwest`
//! - `BlobStore` using a SQLite `media_blobs` table
//! - `SettingsStore` using a SQLite key-value table
//! - `ObjectUrlFactory` using an in-process registry of `blob:` URLs
//! - `StorageManager` measuring the database file against a configured quota
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{default_database_path, ReqwestHttpClient, SqliteBlobStore};
//!
//! #[tokio::main]
//! async fn main() -> bridge_traits::error::Result<()> {
//!     let http_client = ReqwestHttpClient::new()?;
//!     let blobs = SqliteBlobStore::new(default_database_path()?).await?;
//!     // Inject into CoreConfig
//!     Ok(())
//! }
//! ```

mod blob_store;
mod db;
mod http;
mod object_url;
mod platform;
mod settings;
mod storage_manager;

pub use blob_store::SqliteBlobStore;
pub use db::default_database_path;
pub use http::ReqwestHttpClient;
pub use object_url::ObjectUrlRegistry;
pub use platform::{desktop_platform_probe, desktop_platform_signals};
pub use settings::SqliteSettingsStore;
pub use storage_manager::{DesktopStorageManager, DEFAULT_DESKTOP_QUOTA};
