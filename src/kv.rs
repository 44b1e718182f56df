//! Key-value persistence. Values are JSON documents stored whole under a
//! string key; callers own the schema of what they store.

use std::collections::HashMap;

use anyhow::Context;
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use sqlx::PgPool;
use tokio::sync::RwLock;

pub const HISTORY_KEY: &str = "macroplan_history_v1";
pub const PROFILE_KEY: &str = "macroplan_profile_v1";
const CACHE_PREFIX: &str = "macroplan_cache_v4_";

pub fn cache_key(content_hash: &str) -> String {
    format!("{CACHE_PREFIX}{content_hash}")
}

#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> anyhow::Result<Option<Value>>;
    async fn set(&self, key: &str, value: Value) -> anyhow::Result<()>;
    async fn delete(&self, key: &str) -> anyhow::Result<()>;
}

pub async fn get_json<T: DeserializeOwned>(kv: &dyn KvStore, key: &str) -> anyhow::Result<Option<T>> {
    match kv.get(key).await? {
        Some(value) => {
            let parsed = serde_json::from_value(value).with_context(|| format!("decode {key}"))?;
            Ok(Some(parsed))
        }
        None => Ok(None),
    }
}

pub async fn set_json<T: Serialize + ?Sized>(kv: &dyn KvStore, key: &str, value: &T) -> anyhow::Result<()> {
    let value = serde_json::to_value(value).with_context(|| format!("encode {key}"))?;
    kv.set(key, value).await
}

/// Postgres-backed store over the `kv_entries` table.
#[derive(Clone)]
pub struct PgKvStore {
    db: PgPool,
}

impl PgKvStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl KvStore for PgKvStore {
    async fn get(&self, key: &str) -> anyhow::Result<Option<Value>> {
        let row = sqlx::query_as::<_, (Value,)>(
            r#"
            SELECT value
              FROM kv_entries
             WHERE key = $1
            "#,
        )
        .bind(key)
        .fetch_optional(&self.db)
        .await
        .with_context(|| format!("kv get {key}"))?;
        Ok(row.map(|(v,)| v))
    }

    async fn set(&self, key: &str, value: Value) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO kv_entries (key, value, updated_at)
            VALUES ($1, $2, now())
            ON CONFLICT (key) DO UPDATE
               SET value = EXCLUDED.value,
                   updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.db)
        .await
        .with_context(|| format!("kv set {key}"))?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM kv_entries WHERE key = $1")
            .bind(key)
            .execute(&self.db)
            .await
            .with_context(|| format!("kv delete {key}"))?;
        Ok(())
    }
}

/// Process-local store, used by tests.
#[derive(Default)]
pub struct MemoryKvStore {
    entries: RwLock<HashMap<String, Value>>,
}

#[async_trait]
impl KvStore for MemoryKvStore {
    async fn get(&self, key: &str) -> anyhow::Result<Option<Value>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> anyhow::Result<()> {
        self.entries.write().await.insert(key.to_owned(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> anyhow::Result<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}
