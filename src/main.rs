mod api;
mod config;
mod errors;
mod models;
mod services;

use anyhow::{Context, Result};
use dotenv::dotenv;
use std::sync::Arc;

use api::server::create_router;
use config::{Config, Provider};
use services::{AIService, AnthropicService, CalorieEstimator, OpenRouterService};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables before the logger reads RUST_LOG
    dotenv().ok();
    env_logger::init();

    log::info!("🚀 Starting Calorie Estimation Service...");

    let config = Config::from_env()?;

    if config.estimator.api_key.is_none() {
        log::warn!(
            "⚠️ {} not set, estimation requests will fail until it is configured",
            config.estimator.provider.key_var()
        );
    }

    let ai: Arc<dyn AIService> = match config.estimator.provider {
        Provider::Anthropic => Arc::new(AnthropicService::new()),
        Provider::OpenRouter => Arc::new(OpenRouterService::new()),
    };
    log::info!(
        "✅ {} provider initialized with model: {} (max_tokens={})",
        config.estimator.provider,
        config.estimator.model,
        config.estimator.max_tokens
    );

    let estimator = Arc::new(CalorieEstimator::new(config.estimator.clone(), ai));
    let app = create_router(estimator);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;

    log::info!("🌐 Server listening on {}", config.bind_addr);
    log::info!("🎉 POST /estimateCalories is ready");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    log::info!("🛑 Shut down");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("❌ Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    log::info!("🛑 Shutting down...");
}
