use anyhow::Context;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crypto_vision::{
    AppState, build_router,
    config::Config,
    jobs::crypto_refresh::start_crypto_refresh_job,
    services::{
        coingecko::{CoinGeckoService, TRACKED_ASSETS},
        crypto_store::CryptoStore,
    },
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,crypto_vision=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    let coingecko = CoinGeckoService::new(config.request_timeout)
        .context("Failed to build CoinGecko client")?;
    let store = Arc::new(CryptoStore::new(Arc::new(coingecko), &TRACKED_ASSETS));

    // Lives as long as the server; dropped after shutdown so no tick outlives it.
    let refresh_job = start_crypto_refresh_job(store.clone());

    let app = build_router(AppState { store });

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;

    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    refresh_job.stop();
    tracing::info!("Shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
