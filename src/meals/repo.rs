use serde_json::Value;

use crate::kv::{self, KvStore, HISTORY_KEY};
use crate::meals::repo_types::MealAnalysis;

/// Meal history, newest first. Missing history reads as empty.
pub async fn load_history(kv: &dyn KvStore) -> anyhow::Result<Vec<MealAnalysis>> {
    Ok(kv::get_json(kv, HISTORY_KEY).await?.unwrap_or_default())
}

pub async fn save_history(kv: &dyn KvStore, meals: &[MealAnalysis]) -> anyhow::Result<()> {
    kv::set_json(kv, HISTORY_KEY, meals).await
}

pub async fn delete_history(kv: &dyn KvStore) -> anyhow::Result<()> {
    kv.delete(HISTORY_KEY).await
}

pub async fn cached_analysis(kv: &dyn KvStore, content_hash: &str) -> anyhow::Result<Option<Value>> {
    kv.get(&kv::cache_key(content_hash)).await
}

pub async fn cache_analysis(kv: &dyn KvStore, content_hash: &str, raw: &Value) -> anyhow::Result<()> {
    kv.set(&kv::cache_key(content_hash), raw.clone()).await
}
