//! Durable key-value storage holding page state as JSON text.

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use anyhow::Context;
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Row, Sqlite,
};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage backend failure: {0}")]
    Backend(#[from] sqlx::Error),
    #[error("value under '{key}' is not valid JSON for the expected shape: {source}")]
    Parse {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode value for '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

impl StorageError {
    pub fn is_parse(&self) -> bool {
        matches!(self, StorageError::Parse { .. })
    }
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Text values addressed by key, the shape of a browser's local storage.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> StorageResult<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> StorageResult<()>;
    async fn remove(&self, key: &str) -> StorageResult<()>;
}

/// Reads and decodes a JSON value.
///
/// Returns `Ok(None)` when nothing is stored, and `StorageError::Parse` when
/// something is stored but does not decode as `T`.
pub async fn read_json<T, S>(store: &S, key: &str) -> StorageResult<Option<T>>
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    let Some(raw) = store.get(key).await? else {
        return Ok(None);
    };
    if raw.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|source| StorageError::Parse {
            key: key.to_string(),
            source,
        })
}

pub async fn write_json<T, S>(store: &S, key: &str, value: &T) -> StorageResult<()>
where
    T: Serialize + ?Sized,
    S: KeyValueStore + ?Sized,
{
    let encoded = serde_json::to_string(value).map_err(|source| StorageError::Encode {
        key: key.to_string(),
        source,
    })?;
    store.set(key, &encoded).await
}

#[derive(Clone)]
pub struct SqliteKeyValueStore {
    pool: Pool<Sqlite>,
}

impl SqliteKeyValueStore {
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("invalid sqlite database url '{database_url}'"))?
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(connect_options)
            .await
            .with_context(|| format!("failed to open sqlite database '{database_url}'"))?;
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("failed to apply storage migrations")?;
        Ok(Self { pool })
    }

    pub async fn health_check(&self) -> anyhow::Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for SqliteKeyValueStore {
    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let row = sqlx::query("SELECT value FROM kv_entries WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|r| r.try_get::<String, _>(0))
            .transpose()
            .map_err(StorageError::from)
    }

    async fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        sqlx::query(
            "INSERT INTO kv_entries (key, value) VALUES (?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = CURRENT_TIMESTAMP",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;
        debug!(key, bytes = value.len(), "storage: value written");
        Ok(())
    }

    async fn remove(&self, key: &str) -> StorageResult<()> {
        sqlx::query("DELETE FROM kv_entries WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;
        debug!(key, "storage: value removed");
        Ok(())
    }
}

/// Process-local store; nothing survives the session.
#[derive(Default)]
pub struct MemoryKeyValueStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: RwLock::new(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> StorageResult<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

#[async_trait]
impl<T> KeyValueStore for std::sync::Arc<T>
where
    T: KeyValueStore + ?Sized,
{
    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        (**self).set(key, value).await
    }

    async fn remove(&self, key: &str) -> StorageResult<()> {
        (**self).remove(key).await
    }
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> anyhow::Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if database_url.starts_with("sqlite::memory:") || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
