//! Application state and shared resources.

use anyhow::{Context, Result};
use redis::aio::ConnectionManager;
use std::sync::Arc;
use std::time::Duration;

use crate::config::AppConfig;
use crate::generator::{ChallengeGenerator, SessionStore};
use crate::progress::ProgressStore;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,

    /// Redis connection manager (auto-reconnecting), challenge sessions
    pub redis: ConnectionManager,

    /// SQLite-backed progress store
    pub progress: ProgressStore,

    /// Upstream challenge generator
    pub generator: Arc<ChallengeGenerator>,

    /// Challenge session store
    pub sessions: Arc<SessionStore>,
}

impl AppState {
    /// Create new application state, connecting to SQLite and Redis
    pub async fn new(config: AppConfig) -> Result<Self> {
        let progress = ProgressStore::connect(
            &config.database_url,
            Duration::from_secs(config.storage.acquire_timeout_secs),
        )
        .await
        .context("Failed to open progress database")?;
        progress.init_schema().await.context("Failed to initialize schema")?;

        let client = redis::Client::open(config.redis_url.as_str())
            .context("Failed to create Redis client")?;
        let redis = ConnectionManager::new(client)
            .await
            .context("Failed to connect to Redis")?;

        let api_key = config.generator_api_key()?;
        let generator = Arc::new(
            ChallengeGenerator::new(
                config.generator.api_url.clone(),
                config.generator.model.clone(),
                api_key,
                Duration::from_secs(config.generator.request_timeout_secs),
            )
            .context("Failed to build generator client")?,
        );

        let sessions = Arc::new(SessionStore::new(config.generator.session_ttl_secs));

        Ok(Self {
            config,
            redis,
            progress,
            generator,
            sessions,
        })
    }
}
