use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

use crate::{
    auth::JwtKeys,
    config::AppConfig,
    db::Db,
    functions::{LlmClient, OpenAiClient, ScriptedLlm},
    storage::{MemoryStorage, S3Storage, StorageClient},
};

/// Shared handle passed to every handler, service and hook.
#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    pub jwt: Arc<JwtKeys>,
    pub storage: Arc<dyn StorageClient>,
    pub llm: Arc<dyn LlmClient>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let db = match &config.database_url {
            Some(url) => {
                let db = Db::connect(url).await?;
                if let Some(pool) = db.pool() {
                    sqlx::migrate!("./migrations")
                        .run(pool)
                        .await
                        .context("run migrations")?;
                    info!("migrations applied");
                }
                db
            }
            None => {
                warn!("DATABASE_URL not set; using in-memory store");
                Db::memory()
            }
        };

        let storage: Arc<dyn StorageClient> = match &config.storage {
            Some(cfg) => Arc::new(S3Storage::new(cfg).await.context("init object storage")?),
            None => {
                warn!("S3 storage not configured; keeping objects in memory");
                Arc::new(MemoryStorage::default())
            }
        };

        if config.llm.api_key.is_none() {
            warn!("OPENAI_API_KEY not set; edge functions will answer 500");
        }
        let llm = Arc::new(OpenAiClient::new(&config.llm).context("build llm client")?);

        Ok(Self {
            db,
            jwt: Arc::new(JwtKeys::from_config(&config.jwt)),
            storage,
            llm,
            config: Arc::new(config),
        })
    }

    /// In-memory everything and an LLM without an API key.
    pub fn fake() -> Self {
        let config = AppConfig::for_tests();
        Self {
            db: Db::memory(),
            jwt: Arc::new(JwtKeys::from_config(&config.jwt)),
            storage: Arc::new(MemoryStorage::default()),
            llm: Arc::new(ScriptedLlm::unconfigured()),
            config: Arc::new(config),
        }
    }

    pub fn with_llm(mut self, llm: Arc<dyn LlmClient>) -> Self {
        self.llm = llm;
        self
    }

    pub async fn shutdown(&self) {
        self.db.close().await;
        info!("state shut down");
    }
}
