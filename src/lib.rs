// src/lib.rs

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use services::crypto_store::CryptoStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<CryptoStore>,
}

pub mod services {
    pub mod coingecko;
    pub mod crypto_store;
    pub mod notifications;
    pub mod typewriter;
}

pub mod utils {
    pub mod format;
}

pub mod config;
pub mod error;
pub mod handlers;
pub mod jobs;
pub mod models;

async fn health() -> &'static str {
    "Hello from CryptoVision! 🚀"
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::page::dashboard))
        .route("/health", get(health))
        .route("/api/crypto", get(handlers::crypto::get_crypto_state))
        .route("/api/crypto/retry", post(handlers::crypto::retry_refresh))
        .route("/api/crypto/tracker", get(handlers::page::tracker_fragment))
        .route("/api/crypto/ws", get(handlers::crypto::notifications_websocket))
        .route("/api/hero/frames", get(handlers::hero::get_hero_frames))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
