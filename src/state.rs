use std::sync::Arc;

use anyhow::Context;
use tokio::sync::Mutex;

use crate::ai::{GeminiClient, NutritionAi};
use crate::config::AppConfig;
use crate::kv::{KvStore, PgKvStore};
use crate::storage::{PhotoBucket, StorageClient};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub kv: Arc<dyn KvStore>,
    pub storage: Arc<dyn StorageClient>,
    pub ai: Arc<dyn NutritionAi>,
    /// Serializes read-modify-write cycles on the meal history.
    pub history_lock: Arc<Mutex<()>>,
    /// Same, for the profile.
    pub profile_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let db = sqlx::postgres::PgPoolOptions::new()
            .max_connections(10)
            .connect(&config.database_url)
            .await
            .context("connect to database")?;

        if let Err(e) = sqlx::migrate!("./migrations").run(&db).await {
            tracing::warn!(error = %e, "migration failed; continuing");
        }

        let storage = Arc::new(PhotoBucket::connect(&config.storage).await?) as Arc<dyn StorageClient>;
        let ai = Arc::new(GeminiClient::new(&config.gemini)?) as Arc<dyn NutritionAi>;
        if config.gemini.api_key.is_none() {
            tracing::warn!("GEMINI_API_KEY is not set; analysis endpoints will answer 503");
        }

        Ok(Self::from_parts(config, Arc::new(PgKvStore::new(db)), storage, ai))
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        kv: Arc<dyn KvStore>,
        storage: Arc<dyn StorageClient>,
        ai: Arc<dyn NutritionAi>,
    ) -> Self {
        Self {
            config,
            kv,
            storage,
            ai,
            history_lock: Arc::new(Mutex::new(())),
            profile_lock: Arc::new(Mutex::new(())),
        }
    }
}
