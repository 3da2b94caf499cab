#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::oneshot;

use crypto_vision::{
    AppState,
    error::NetworkError,
    models::quote::AssetQuote,
    services::{
        coingecko::{QuoteFetcher, TRACKED_ASSETS},
        crypto_store::CryptoStore,
    },
};

pub type Outcome = Result<Vec<AssetQuote>, NetworkError>;

/// Fetcher that replays a script, then repeats `fallback` forever.
pub struct ScriptedFetcher {
    script: Mutex<VecDeque<Outcome>>,
    fallback: Outcome,
    calls: AtomicUsize,
}

impl ScriptedFetcher {
    pub fn new(script: Vec<Outcome>, fallback: Outcome) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            fallback,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn always(outcome: Outcome) -> Arc<Self> {
        Self::new(Vec::new(), outcome)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QuoteFetcher for ScriptedFetcher {
    async fn fetch_quotes(&self, _asset_ids: &[&str]) -> Outcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.script
            .lock()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone())
    }
}

/// Fetcher whose calls park until the test releases them, in call order.
#[derive(Default)]
pub struct GatedFetcher {
    gates: Mutex<VecDeque<oneshot::Receiver<Outcome>>>,
}

impl GatedFetcher {
    /// Queue the gate for the next call and return its release handle.
    pub fn gate(&self) -> oneshot::Sender<Outcome> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().push_back(rx);
        tx
    }
}

#[async_trait]
impl QuoteFetcher for GatedFetcher {
    async fn fetch_quotes(&self, _asset_ids: &[&str]) -> Outcome {
        let gate = self.gates.lock().pop_front();
        match gate {
            Some(gate) => gate
                .await
                .unwrap_or_else(|_| Err(NetworkError::Transport("gate dropped".to_string()))),
            None => Err(NetworkError::Transport("no gate queued".to_string())),
        }
    }
}

pub fn server_error() -> NetworkError {
    NetworkError::Status {
        status: 500,
        body: "Internal Server Error".to_string(),
    }
}

/// Ten quotes in market-cap order, ranks 1..=10, using the tracked ids.
pub fn sample_quotes() -> Vec<AssetQuote> {
    TRACKED_ASSETS
        .iter()
        .enumerate()
        .map(|(i, id)| {
            let rank = i as u32 + 1;
            AssetQuote {
                id: id.to_string(),
                symbol: id.chars().take(3).collect(),
                name: id.to_string(),
                image: Some(format!("https://assets.example.com/{id}.png")),
                current_price: 50_000.0 / rank as f64,
                market_cap: 1_000_000_000.0 / rank as f64,
                market_cap_rank: rank,
                total_volume: 10_000_000.0 / rank as f64,
                price_change_percentage_1h_in_currency: Some(0.25),
                price_change_percentage_24h_in_currency: Some(-1.5),
                price_change_percentage_7d_in_currency: Some(3.0),
                circulating_supply: 1_000_000.0,
                total_supply: 2_000_000.0,
                max_supply: if rank % 2 == 0 { None } else { Some(2_000_000.0) },
                last_updated: Some("2024-05-01T12:00:00.000Z".to_string()),
            }
        })
        .collect()
}

pub fn test_state(fetcher: Arc<dyn QuoteFetcher>) -> AppState {
    AppState {
        store: Arc::new(CryptoStore::new(fetcher, &TRACKED_ASSETS)),
    }
}

/// Serve `router` on an ephemeral local port.
pub async fn spawn_server(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    addr
}
