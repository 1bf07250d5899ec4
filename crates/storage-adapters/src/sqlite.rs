//! # SQLite store
//!
//! Durable implementation of `KeyValueStore` on a single SQLite table.
//! Each row is one entry of one namespace; the composite primary key
//! `(namespace, key)` gives per-namespace key ordering for free since SQLite
//! compares BLOBs with memcmp.

use std::str::FromStr;

use async_trait::async_trait;
use domains::{DomainError, KeyValueStore, Namespace, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use tracing::{debug, info};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS entries (
    namespace INTEGER NOT NULL,
    key       BLOB    NOT NULL,
    value     BLOB    NOT NULL,
    PRIMARY KEY (namespace, key)
) WITHOUT ROWID";

pub struct SqliteStore {
    pool: SqlitePool,
}

fn storage_err(e: sqlx::Error) -> DomainError {
    DomainError::unexpected(format!("sqlite: {e}"))
}

fn ns_param(ns: Namespace) -> i64 {
    i64::from(ns.id())
}

fn is_in_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

/// An in-memory database lives exactly as long as its one connection, so
/// that connection is never reaped for idleness or age.
fn pool_options(url: &str) -> SqlitePoolOptions {
    let options = SqlitePoolOptions::new().max_connections(1);
    if is_in_memory(url) {
        options.min_connections(1).idle_timeout(None).max_lifetime(None)
    } else {
        options
    }
}

impl SqliteStore {
    /// Opens (creating if missing) the database at `url` and applies the schema.
    ///
    /// # Developer Note
    /// The pool holds a single connection. Writes are serialized by SQLite
    /// anyway, and `sqlite::memory:` databases are per-connection, so a wider
    /// pool would silently split an in-memory store into several.
    pub async fn new(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(storage_err)?
            .create_if_missing(true);
        let pool = pool_options(url)
            .connect_with(options)
            .await
            .map_err(storage_err)?;

        sqlx::query(SCHEMA).execute(&pool).await.map_err(storage_err)?;
        info!(url, "sqlite store ready");
        Ok(Self { pool })
    }
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    async fn get(&self, ns: Namespace, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let row = sqlx::query("SELECT value FROM entries WHERE namespace = ? AND key = ?")
            .bind(ns_param(ns))
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_err)?;

        row.map(|r| r.try_get::<Vec<u8>, _>("value"))
            .transpose()
            .map_err(storage_err)
    }

    async fn insert(&self, ns: Namespace, key: &[u8], value: Vec<u8>) -> Result<()> {
        debug!(namespace = ns.name(), bytes = value.len(), "sqlite upsert");
        sqlx::query(
            "INSERT INTO entries (namespace, key, value) VALUES (?, ?, ?)
             ON CONFLICT (namespace, key) DO UPDATE SET value = excluded.value",
        )
        .bind(ns_param(ns))
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;
        Ok(())
    }

    async fn remove(&self, ns: Namespace, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let row = sqlx::query("DELETE FROM entries WHERE namespace = ? AND key = ? RETURNING value")
            .bind(ns_param(ns))
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_err)?;

        row.map(|r| r.try_get::<Vec<u8>, _>("value"))
            .transpose()
            .map_err(storage_err)
    }

    async fn contains_key(&self, ns: Namespace, key: &[u8]) -> Result<bool> {
        let row = sqlx::query(
            "SELECT EXISTS(SELECT 1 FROM entries WHERE namespace = ? AND key = ?) AS present",
        )
        .bind(ns_param(ns))
        .bind(key)
        .fetch_one(&self.pool)
        .await
        .map_err(storage_err)?;
        Ok(row.try_get::<i64, _>("present").map_err(storage_err)? != 0)
    }

    async fn items(&self, ns: Namespace) -> Result<Vec<(Vec<u8>, Vec<u8>)>> {
        let rows =
            sqlx::query("SELECT key, value FROM entries WHERE namespace = ? ORDER BY key ASC")
                .bind(ns_param(ns))
                .fetch_all(&self.pool)
                .await
                .map_err(storage_err)?;

        rows.into_iter()
            .map(|row| Ok((row.try_get("key")?, row.try_get("value")?)))
            .collect::<std::result::Result<Vec<_>, sqlx::Error>>()
            .map_err(storage_err)
    }

    async fn is_empty(&self, ns: Namespace) -> Result<bool> {
        let row = sqlx::query("SELECT EXISTS(SELECT 1 FROM entries WHERE namespace = ?) AS present")
            .bind(ns_param(ns))
            .fetch_one(&self.pool)
            .await
            .map_err(storage_err)?;
        Ok(row.try_get::<i64, _>("present").map_err(storage_err)? == 0)
    }
}
