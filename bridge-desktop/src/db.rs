//! Shared SQLite connection helpers.

use bridge_traits::error::{BridgeError, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Default database file for desktop hosts: `<data dir>/reels-core/reels.db`.
pub fn default_database_path() -> Result<PathBuf> {
    dirs::data_dir()
        .map(|dir| dir.join("reels-core").join("reels.db"))
        .ok_or_else(|| {
            BridgeError::NotAvailable(
                "No platform data directory; pass an explicit database path".to_string(),
            )
        })
}

/// Open a pool on a database file, creating the file and its parent directory.
pub(crate) async fn connect_file(db_path: &Path) -> Result<SqlitePool> {
    if let Some(parent) = db_path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(BridgeError::Io)?;
    }

    let path_str = db_path.to_string_lossy().replace('\\', "/");
    let options = SqliteConnectOptions::from_str(&format!("sqlite://{}", path_str))
        .map_err(|e| BridgeError::StorageUnavailable(format!("Invalid database path: {}", e)))?
        .create_if_missing(true);

    SqlitePoolOptions::new()
        .max_connections(4)
        .connect_with(options)
        .await
        .map_err(|e| BridgeError::StorageUnavailable(format!("Failed to connect to DB: {}", e)))
}

/// Open a single-connection in-memory pool.
///
/// Each SQLite in-memory connection is its own database, so the pool must not
/// grow past one connection.
pub(crate) async fn connect_memory() -> Result<SqlitePool> {
    SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .map_err(|e| BridgeError::StorageUnavailable(format!("Failed to connect to DB: {}", e)))
}
