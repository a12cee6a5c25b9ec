use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;

use localization_engine::compose::MessageCache;
use localization_engine::config::Config;
use localization_engine::http::{build_router, AppState};
use localization_engine::orchestrator::JobRegistry;
use localization_engine::provider::OpenAiTranslator;
use localization_engine::store::Store;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("localization_engine=info".parse()?),
        )
        .init();

    info!("Starting localization engine");

    let config = Config::from_env()?;

    if let Some(parent) = std::path::Path::new(&config.database_path).parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create data directory {}", parent.display()))?;
    }
    let store = Store::open(&config.database_path)?;
    info!("Opened store at {}", config.database_path);

    let base_template: serde_json::Value = {
        let raw = std::fs::read_to_string(&config.base_template_path).with_context(|| {
            format!("Failed to read base template {}", config.base_template_path)
        })?;
        serde_json::from_str(&raw).with_context(|| {
            format!("Base template {} is not valid JSON", config.base_template_path)
        })?
    };

    let state = AppState {
        store,
        provider: Arc::new(OpenAiTranslator::new(&config)),
        jobs: JobRegistry::new(),
        base_template: Arc::new(base_template),
        messages: MessageCache::new(),
        provider_timeout: Duration::from_secs(config.provider_timeout_secs),
    };

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on {}", addr);

    axum::serve(listener, build_router(state))
        .await
        .context("Server error")?;
    Ok(())
}
