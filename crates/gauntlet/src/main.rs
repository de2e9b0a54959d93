//! # Gauntlet - Sensei CTF Backend
//!
//! HTTP service behind the Sensei training frontend. Generates CTF
//! challenges through an external model, judges submitted answers, and
//! tracks per-user progress: points, achievements, streaks, and the
//! global leaderboard.
//!
//! ## Architecture
//! ```text
//! Frontend → Gauntlet → Gemini API (challenges, verdicts)
//!                ↓
//!         Redis (sessions) + SQLite (progress)
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod achievements;
mod config;
mod generator;
mod progress;
mod routes;
mod scoring;
mod state;

use config::AppConfig;
use state::AppState;

/// Sensei Gauntlet - CTF challenge backend
#[derive(Parser, Debug)]
#[command(name = "gauntlet")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config/gauntlet.toml")]
    pub config: String,

    /// SQLite database URL (overrides config)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Redis URL (overrides config)
    #[arg(long, env = "REDIS_URL")]
    pub redis_url: Option<String>,

    /// Listen address (overrides config)
    #[arg(short, long, env = "LISTEN_ADDR")]
    pub listen: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "LOG_LEVEL")]
    pub log_level: String,

    /// Enable JSON logging output
    #[arg(long, default_value = "false")]
    pub json_logs: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Pick up GEMINI_API_KEY and friends from .env in development
    dotenvy::dotenv().ok();

    let args = Args::parse();

    init_logging(&args.log_level, args.json_logs)?;

    info!("Starting Sensei Gauntlet v{}", env!("CARGO_PKG_VERSION"));

    let config = AppConfig::load(&args.config, &args)?;
    info!("Configuration loaded from {}", args.config);

    let state = AppState::new(config.clone()).await?;
    info!("Database ready: {}", config.database_url);
    info!("Redis connected: {}", config.redis_url);

    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    info!("Gauntlet listening on {}", config.listen_addr);

    let shutdown_signal = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
        info!("Shutdown signal received");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await
        .context("Server error")?;

    info!("Gauntlet shutdown complete");
    Ok(())
}

/// Initialize structured logging with tracing
fn init_logging(level: &str, json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_thread_ids(true))
            .init();
    }

    Ok(())
}
