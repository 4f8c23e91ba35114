//! Media blob store using SQLite

use async_trait::async_trait;
use bridge_traits::{
    blob_store::{BlobMetadata, BlobStore, CachedBlob},
    error::{BridgeError, Result},
};
use bytes::Bytes;
use sqlx::{sqlite::SqlitePool, Row};
use std::path::PathBuf;
use tracing::{debug, info, instrument};

use crate::db;

/// SQLite result code for a full database or disk.
const SQLITE_FULL: &str = "13";

const SCHEMA: [&str; 2] = [
    r#"
    CREATE TABLE IF NOT EXISTS media_blobs (
        url TEXT PRIMARY KEY,
        blob BLOB NOT NULL,
        mime_type TEXT NOT NULL,
        timestamp INTEGER NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_media_blobs_timestamp ON media_blobs (timestamp)",
];

/// SQLite-backed [`BlobStore`].
///
/// Stores each payload in a single `media_blobs` row keyed by URL. An optional
/// byte limit makes `put` fail with [`BridgeError::QuotaExceeded`] once the
/// table would exceed it, which mirrors the host quota browsers enforce on
/// IndexedDB.
pub struct SqliteBlobStore {
    pool: SqlitePool,
    max_bytes: Option<u64>,
}

impl SqliteBlobStore {
    /// Open (or create) a blob store in the given database file.
    pub async fn new(db_path: PathBuf) -> Result<Self> {
        let pool = db::connect_file(&db_path).await?;
        let store = Self::with_pool(pool).await?;
        debug!(path = ?db_path, "Initialized blob store");
        Ok(store)
    }

    /// Create an in-memory blob store (for testing)
    pub async fn in_memory() -> Result<Self> {
        Self::with_pool(db::connect_memory().await?).await
    }

    /// Use an existing pool, creating the schema if needed.
    pub async fn with_pool(pool: SqlitePool) -> Result<Self> {
        let store = Self {
            pool,
            max_bytes: None,
        };
        store.ensure_schema().await?;
        Ok(store)
    }

    /// Reject writes that would grow the table past `max_bytes`.
    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = Some(max_bytes);
        self
    }

    async fn ensure_schema(&self) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    BridgeError::StorageUnavailable(format!("Failed to create schema: {}", e))
                })?;
        }
        Ok(())
    }

    fn map_write_error(error: sqlx::Error) -> BridgeError {
        if let sqlx::Error::Database(db_error) = &error {
            if db_error.code().as_deref() == Some(SQLITE_FULL) {
                return BridgeError::QuotaExceeded(db_error.message().to_string());
            }
        }
        BridgeError::StorageUnavailable(format!("Failed to write blob: {}", error))
    }

    fn map_read_error(error: sqlx::Error) -> BridgeError {
        BridgeError::StorageUnavailable(format!("Failed to query blobs: {}", error))
    }

    /// Bytes stored excluding the entry for `url`.
    async fn size_excluding(&self, url: &str) -> Result<u64> {
        let row = sqlx::query(
            "SELECT COALESCE(SUM(LENGTH(blob)), 0) FROM media_blobs WHERE url <> ?",
        )
        .bind(url)
        .fetch_one(&self.pool)
        .await
        .map_err(Self::map_read_error)?;

        let total: i64 = row.get(0);
        Ok(total.max(0) as u64)
    }
}

#[async_trait]
impl BlobStore for SqliteBlobStore {
    async fn open(&self) -> Result<()> {
        self.ensure_schema().await
    }

    #[instrument(skip(self))]
    async fn get(&self, url: &str) -> Result<Option<CachedBlob>> {
        let row = sqlx::query(
            "SELECT url, blob, mime_type, timestamp FROM media_blobs WHERE url = ?",
        )
        .bind(url)
        .fetch_optional(&self.pool)
        .await
        .map_err(Self::map_read_error)?;

        Ok(row.map(|row| {
            let blob: Vec<u8> = row.get(1);
            CachedBlob {
                url: row.get(0),
                blob: Bytes::from(blob),
                mime_type: row.get(2),
                timestamp: row.get(3),
            }
        }))
    }

    #[instrument(skip(self, entry), fields(url = %entry.url, size = entry.size()))]
    async fn put(&self, entry: CachedBlob) -> Result<()> {
        if let Some(limit) = self.max_bytes {
            let others = self.size_excluding(&entry.url).await?;
            if others + entry.size() > limit {
                return Err(BridgeError::QuotaExceeded(format!(
                    "storing {} bytes would exceed the {} byte limit",
                    entry.size(),
                    limit
                )));
            }
        }

        sqlx::query(
            r#"
            INSERT INTO media_blobs (url, blob, mime_type, timestamp)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(url) DO UPDATE SET
                blob = excluded.blob,
                mime_type = excluded.mime_type,
                timestamp = excluded.timestamp
            "#,
        )
        .bind(&entry.url)
        .bind(entry.blob.as_ref())
        .bind(&entry.mime_type)
        .bind(entry.timestamp)
        .execute(&self.pool)
        .await
        .map_err(Self::map_write_error)?;

        debug!("Stored blob");
        Ok(())
    }

    async fn delete(&self, url: &str) -> Result<()> {
        sqlx::query("DELETE FROM media_blobs WHERE url = ?")
            .bind(url)
            .execute(&self.pool)
            .await
            .map_err(Self::map_write_error)?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_older_than(&self, cutoff: i64) -> Result<usize> {
        let result = sqlx::query("DELETE FROM media_blobs WHERE timestamp < ?")
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(Self::map_write_error)?;

        let removed = result.rows_affected() as usize;
        if removed > 0 {
            info!(removed, "Deleted blobs older than cutoff");
        }
        Ok(removed)
    }

    async fn entries_by_age(&self) -> Result<Vec<BlobMetadata>> {
        let rows = sqlx::query(
            r#"
            SELECT url, LENGTH(blob), timestamp, mime_type
            FROM media_blobs
            ORDER BY timestamp ASC, url ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(Self::map_read_error)?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let size: i64 = row.get(1);
                BlobMetadata {
                    url: row.get(0),
                    size: size.max(0) as u64,
                    timestamp: row.get(2),
                    mime_type: row.get(3),
                }
            })
            .collect())
    }

    async fn clear(&self) -> Result<()> {
        sqlx::query("DELETE FROM media_blobs")
            .execute(&self.pool)
            .await
            .map_err(Self::map_write_error)?;
        info!("Cleared blob store");
        Ok(())
    }

    async fn total_size(&self) -> Result<u64> {
        let row = sqlx::query("SELECT COALESCE(SUM(LENGTH(blob)), 0) FROM media_blobs")
            .fetch_one(&self.pool)
            .await
            .map_err(Self::map_read_error)?;

        let total: i64 = row.get(0);
        Ok(total.max(0) as u64)
    }

    async fn count(&self) -> Result<usize> {
        let row = sqlx::query("SELECT COUNT(*) FROM media_blobs")
            .fetch_one(&self.pool)
            .await
            .map_err(Self::map_read_error)?;

        let count: i64 = row.get(0);
        Ok(count.max(0) as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blob(url: &str, bytes: &'static [u8], timestamp: i64) -> CachedBlob {
        CachedBlob::new(url, Bytes::from_static(bytes), "image/jpeg", timestamp)
    }

    #[tokio::test]
    async fn test_put_and_get() {
        let store = SqliteBlobStore::in_memory().await.unwrap();
        store.open().await.unwrap();

        store.put(blob("https://x/a.jpg", b"abc", 10)).await.unwrap();

        let entry = store.get("https://x/a.jpg").await.unwrap().unwrap();
        assert_eq!(entry.blob.as_ref(), b"abc");
        assert_eq!(entry.mime_type, "image/jpeg");
        assert_eq!(entry.timestamp, 10);
        assert!(store.get("https://x/missing.jpg").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_put_is_upsert() {
        let store = SqliteBlobStore::in_memory().await.unwrap();

        store.put(blob("https://x/a.jpg", b"old", 10)).await.unwrap();
        store.put(blob("https://x/a.jpg", b"newer", 20)).await.unwrap();

        assert_eq!(store.count().await.unwrap(), 1);
        let entry = store.get("https://x/a.jpg").await.unwrap().unwrap();
        assert_eq!(entry.blob.as_ref(), b"newer");
        assert_eq!(entry.timestamp, 20);
        assert_eq!(store.total_size().await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_delete_older_than_uses_strict_cutoff() {
        let store = SqliteBlobStore::in_memory().await.unwrap();

        store.put(blob("https://x/1", b"1", 100)).await.unwrap();
        store.put(blob("https://x/2", b"22", 200)).await.unwrap();
        store.put(blob("https://x/3", b"333", 300)).await.unwrap();

        let removed = store.delete_older_than(200).await.unwrap();
        assert_eq!(removed, 1);

        let remaining: Vec<String> = store
            .entries_by_age()
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.url)
            .collect();
        assert_eq!(remaining, vec!["https://x/2", "https://x/3"]);
    }

    #[tokio::test]
    async fn test_entries_by_age_reports_sizes() {
        let store = SqliteBlobStore::in_memory().await.unwrap();

        store.put(blob("https://x/new", b"newest", 300)).await.unwrap();
        store.put(blob("https://x/old", b"o", 100)).await.unwrap();

        let entries = store.entries_by_age().await.unwrap();
        assert_eq!(entries[0].url, "https://x/old");
        assert_eq!(entries[0].size, 1);
        assert_eq!(entries[1].size, 6);
    }

    #[tokio::test]
    async fn test_byte_limit_reports_quota_exceeded() {
        let store = SqliteBlobStore::in_memory()
            .await
            .unwrap()
            .with_max_bytes(8);

        store.put(blob("https://x/a", b"12345", 1)).await.unwrap();
        let err = store.put(blob("https://x/b", b"6789", 2)).await.unwrap_err();
        assert!(err.is_quota_exceeded());

        // Replacing an entry only counts the new payload.
        store.put(blob("https://x/a", b"12345678", 3)).await.unwrap();
    }

    #[tokio::test]
    async fn test_clear() {
        let store = SqliteBlobStore::in_memory().await.unwrap();
        store.put(blob("https://x/a", b"1", 1)).await.unwrap();
        store.clear().await.unwrap();
        assert_eq!(store.total_size().await.unwrap(), 0);
    }
}
