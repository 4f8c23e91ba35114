//! SQLite-backed [`SettingsStore`].
//!
//! Holds the small documents the core keeps between sessions: the liked media
//! list and the manifest snapshot (version, item JSON, save time).

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    storage::SettingsStore,
};
use sqlx::{sqlite::SqlitePool, Row};
use std::path::PathBuf;
use tracing::{debug, warn};

use crate::db;

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS settings (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL,
        kind TEXT NOT NULL,
        updated_at INTEGER NOT NULL
    )
"#;

/// Stored representation of a value; reading with the other accessor fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueKind {
    Text,
    Integer,
}

impl ValueKind {
    fn tag(self) -> &'static str {
        match self {
            ValueKind::Text => "text",
            ValueKind::Integer => "integer",
        }
    }
}

pub struct SqliteSettingsStore {
    pool: SqlitePool,
}

impl SqliteSettingsStore {
    pub async fn new(db_path: PathBuf) -> Result<Self> {
        let store = Self::with_pool(db::connect_file(&db_path).await?).await?;
        debug!(path = ?db_path, "Opened settings store");
        Ok(store)
    }

    /// Private in-memory database (tests, ephemeral sessions).
    pub async fn in_memory() -> Result<Self> {
        Self::with_pool(db::connect_memory().await?).await
    }

    /// Share a pool with other stores (e.g. the blob store on the same file).
    pub async fn with_pool(pool: SqlitePool) -> Result<Self> {
        sqlx::query(SCHEMA)
            .execute(&pool)
            .await
            .map_err(|e| BridgeError::StorageUnavailable(format!("settings schema: {}", e)))?;
        Ok(Self { pool })
    }

    async fn write(&self, key: &str, value: &str, kind: ValueKind) -> Result<()> {
        let updated_at = unix_now_secs();
        sqlx::query(
            "INSERT INTO settings (key, value, kind, updated_at) VALUES (?, ?, ?, ?) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, kind = excluded.kind, \
             updated_at = excluded.updated_at",
        )
        .bind(key)
        .bind(value)
        .bind(kind.tag())
        .bind(updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| sql_error("write", key, e))?;

        debug!(key, bytes = value.len(), "Saved setting");
        Ok(())
    }

    async fn read(&self, key: &str, kind: ValueKind) -> Result<Option<String>> {
        let Some(row) = sqlx::query("SELECT value, kind FROM settings WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| sql_error("read", key, e))?
        else {
            return Ok(None);
        };

        let stored: String = row.get("kind");
        if stored != kind.tag() {
            warn!(key, expected = kind.tag(), stored = %stored, "Setting read with wrong accessor");
            return Err(BridgeError::OperationFailed(format!(
                "setting '{}' holds {} but {} was requested",
                key,
                stored,
                kind.tag()
            )));
        }

        Ok(Some(row.get("value")))
    }
}

#[async_trait]
impl SettingsStore for SqliteSettingsStore {
    async fn set_string(&self, key: &str, value: &str) -> Result<()> {
        self.write(key, value, ValueKind::Text).await
    }

    async fn get_string(&self, key: &str) -> Result<Option<String>> {
        self.read(key, ValueKind::Text).await
    }

    async fn set_i64(&self, key: &str, value: i64) -> Result<()> {
        self.write(key, &value.to_string(), ValueKind::Integer).await
    }

    async fn get_i64(&self, key: &str) -> Result<Option<i64>> {
        self.read(key, ValueKind::Integer)
            .await?
            .map(|raw| {
                raw.parse().map_err(|e| {
                    BridgeError::OperationFailed(format!("setting '{}' is not an integer: {}", key, e))
                })
            })
            .transpose()
    }

    async fn delete(&self, key: &str) -> Result<()> {
        sqlx::query("DELETE FROM settings WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(|e| sql_error("delete", key, e))?;
        Ok(())
    }

    async fn has_key(&self, key: &str) -> Result<bool> {
        let found = sqlx::query("SELECT 1 FROM settings WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| sql_error("lookup", key, e))?;
        Ok(found.is_some())
    }

    async fn list_keys(&self) -> Result<Vec<String>> {
        let rows = sqlx::query("SELECT key FROM settings ORDER BY key")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| sql_error("list", "*", e))?;
        Ok(rows.into_iter().map(|row| row.get("key")).collect())
    }

    async fn clear_all(&self) -> Result<()> {
        sqlx::query("DELETE FROM settings")
            .execute(&self.pool)
            .await
            .map_err(|e| sql_error("clear", "*", e))?;
        debug!("Cleared settings");
        Ok(())
    }
}

fn unix_now_secs() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}

fn sql_error(op: &str, key: &str, error: sqlx::Error) -> BridgeError {
    BridgeError::OperationFailed(format!("settings {} '{}': {}", op, key, error))
}
