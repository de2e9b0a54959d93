//! Configuration management for Gauntlet.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use sensei_common::constants::{
    DEFAULT_DATABASE_URL, DEFAULT_LISTEN_ADDR, DEFAULT_REDIS_URL, GENERATOR_TIMEOUT_SECS,
    SESSION_TTL_SECS,
};

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// SQLite database URL (profiles, attempts, leaderboard)
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// Redis connection URL (challenge sessions)
    #[serde(default = "default_redis_url")]
    pub redis_url: String,

    /// HTTP listen address
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Challenge generator configuration
    #[serde(default)]
    pub generator: GeneratorConfig,

    /// Storage tuning
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Upstream generator configuration
#[derive(Debug, Clone, Deserialize)]
pub struct GeneratorConfig {
    /// Base URL of the generative-language API
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Model identifier
    #[serde(default = "default_model")]
    pub model: String,

    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_generator_timeout")]
    pub request_timeout_secs: u64,

    /// Challenge session validity in seconds
    #[serde(default = "default_session_ttl")]
    pub session_ttl_secs: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            request_timeout_secs: default_generator_timeout(),
            session_ttl_secs: default_session_ttl(),
        }
    }
}

/// Storage tuning
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Pool acquire timeout in seconds
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,

    /// Per-request HTTP timeout in seconds (router layer)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            acquire_timeout_secs: default_acquire_timeout(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

// Default value functions
fn default_database_url() -> String { DEFAULT_DATABASE_URL.to_string() }
fn default_redis_url() -> String { DEFAULT_REDIS_URL.to_string() }
fn default_listen_addr() -> String { DEFAULT_LISTEN_ADDR.to_string() }
fn default_api_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}
fn default_model() -> String { "gemini-1.5-flash".to_string() }
fn default_api_key_env() -> String { "GEMINI_API_KEY".to_string() }
fn default_generator_timeout() -> u64 { GENERATOR_TIMEOUT_SECS }
fn default_session_ttl() -> u64 { SESSION_TTL_SECS }
fn default_acquire_timeout() -> u64 { 5 }
fn default_request_timeout() -> u64 { 60 }

impl AppConfig {
    /// Load configuration from file, with CLI overrides
    pub fn load(config_path: &str, args: &super::Args) -> Result<Self> {
        let mut config = if Path::new(config_path).exists() {
            let settings = config::Config::builder()
                .add_source(config::File::with_name(config_path))
                .build()
                .context("Failed to load config file")?;

            settings
                .try_deserialize()
                .context("Failed to parse config")?
        } else {
            // Use defaults if config file doesn't exist
            tracing::warn!("Config file not found, using defaults");
            Self::default()
        };

        // Apply CLI overrides
        if let Some(ref database_url) = args.database_url {
            config.database_url = database_url.clone();
        }
        if let Some(ref redis_url) = args.redis_url {
            config.redis_url = redis_url.clone();
        }
        if let Some(ref listen) = args.listen {
            config.listen_addr = listen.clone();
        }

        Ok(config)
    }

    /// Read the generator API key from the configured environment variable
    pub fn generator_api_key(&self) -> Result<String> {
        std::env::var(&self.generator.api_key_env).with_context(|| {
            format!(
                "Generator API key not set ({} is empty)",
                self.generator.api_key_env
            )
        })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            redis_url: default_redis_url(),
            listen_addr: default_listen_addr(),
            generator: GeneratorConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}
