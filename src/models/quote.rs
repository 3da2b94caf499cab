use serde::{Deserialize, Deserializer, Serialize};

/// One row of CoinGecko's `/coins/markets` response.
///
/// Values are kept exactly as the upstream sends them; nothing is normalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetQuote {
    pub id: String,
    pub symbol: String,
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub current_price: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub market_cap: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub market_cap_rank: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_volume: f64,
    #[serde(default)]
    pub price_change_percentage_1h_in_currency: Option<f64>,
    #[serde(default)]
    pub price_change_percentage_24h_in_currency: Option<f64>,
    #[serde(default)]
    pub price_change_percentage_7d_in_currency: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub circulating_supply: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_supply: f64,
    /// `None` means the asset has no supply cap.
    #[serde(default)]
    pub max_supply: Option<f64>,
    #[serde(default)]
    pub last_updated: Option<String>,
}

// CoinGecko sends `null` for unknown supply or rank on some assets.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
