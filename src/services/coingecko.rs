use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::error::NetworkError;
use crate::models::quote::AssetQuote;

pub const COINGECKO_API_BASE: &str = "https://api.coingecko.com/api/v3";

/// Assets shown on the dashboard, in no particular order; the response comes
/// back sorted by market cap.
pub const TRACKED_ASSETS: [&str; 10] = [
    "bitcoin",
    "ethereum",
    "tether",
    "binancecoin",
    "ripple",
    "cardano",
    "solana",
    "polkadot",
    "dogecoin",
    "polygon",
];

const PAGE_SIZE: &str = "10";
const PRICE_CHANGE_WINDOWS: &str = "1h,24h,7d";
/// Upper bound on how much of an error body is kept on `NetworkError::Status`.
const ERROR_BODY_LIMIT: usize = 256;

/// Source of market quotes for the lifecycle store.
#[async_trait]
pub trait QuoteFetcher: Send + Sync {
    /// One request, no retry. Any failure is reported as a `NetworkError`.
    async fn fetch_quotes(&self, asset_ids: &[&str]) -> Result<Vec<AssetQuote>, NetworkError>;
}

#[derive(Clone)]
pub struct CoinGeckoService {
    client: Client,
    base_url: String,
}

impl CoinGeckoService {
    pub fn new(request_timeout: Duration) -> Result<Self, NetworkError> {
        Self::with_base_url(COINGECKO_API_BASE, request_timeout)
    }

    /// Point the service at another host serving the same API shape.
    pub fn with_base_url(
        base_url: impl Into<String>,
        request_timeout: Duration,
    ) -> Result<Self, NetworkError> {
        let client = Client::builder().timeout(request_timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Query string for `/coins/markets`: USD prices, market-cap ordering,
    /// a single page of ten, no sparkline, 1h/24h/7d change windows.
    pub fn markets_query(asset_ids: &[&str]) -> Vec<(&'static str, String)> {
        vec![
            ("vs_currency", "usd".to_string()),
            ("ids", asset_ids.join(",")),
            ("order", "market_cap_desc".to_string()),
            ("per_page", PAGE_SIZE.to_string()),
            ("page", "1".to_string()),
            ("sparkline", "false".to_string()),
            ("price_change_percentage", PRICE_CHANGE_WINDOWS.to_string()),
        ]
    }
}

#[async_trait]
impl QuoteFetcher for CoinGeckoService {
    async fn fetch_quotes(&self, asset_ids: &[&str]) -> Result<Vec<AssetQuote>, NetworkError> {
        tracing::info!("Fetching {} market quotes from CoinGecko", asset_ids.len());

        let url = format!("{}/coins/markets", self.base_url);

        let response = self
            .client
            .get(&url)
            .header("accept", "application/json")
            .query(&Self::markets_query(asset_ids))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            tracing::warn!("CoinGecko API error {}: {}", status, error_text);
            return Err(NetworkError::Status {
                status: status.as_u16(),
                body: truncate_chars(&error_text, ERROR_BODY_LIMIT),
            });
        }

        let body = response.text().await?;
        let quotes: Vec<AssetQuote> = serde_json::from_str(&body)?;

        tracing::debug!("Fetched {} quotes from CoinGecko", quotes.len());

        Ok(quotes)
    }
}

fn truncate_chars(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}
