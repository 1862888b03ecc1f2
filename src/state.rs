use std::sync::Arc;

use crate::config::AppConfig;
use crate::db::PgStore;
use crate::llm::{LanguageModel, OpenAiClient, RetryPolicy};
use crate::storage::{HealthStore, MemoryStore};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn HealthStore>,
    pub llm: Arc<dyn LanguageModel>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let store = match &config.database_url {
            Some(url) => {
                let pg = PgStore::connect(url).await?;
                if let Err(e) = pg.migrate().await {
                    tracing::warn!(error = %e, "migration failed; continuing");
                }
                Arc::new(pg) as Arc<dyn HealthStore>
            }
            None => {
                tracing::warn!("DATABASE_URL not set; using in-memory store, data is not persisted");
                Arc::new(MemoryStore::new()) as Arc<dyn HealthStore>
            }
        };

        if config.llm.api_key.is_none() {
            tracing::warn!("OPENAI_API_KEY not set; chat and food analysis will fail until configured");
        }
        let llm = Arc::new(OpenAiClient::new(&config.llm)?) as Arc<dyn LanguageModel>;

        Ok(Self::from_parts(config, store, llm))
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        store: Arc<dyn HealthStore>,
        llm: Arc<dyn LanguageModel>,
    ) -> Self {
        Self { config, store, llm }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::from_config(&self.config.llm)
    }
}
