use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::quote::AssetQuote;
use crate::services::crypto_store::{CryptoState, FetchStatus};

/// Response for GET /api/crypto and POST /api/crypto/retry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CryptoStateResponse {
    pub data: Vec<AssetQuote>,
    pub status: FetchStatus,
    pub error: Option<String>,
    pub last_updated: Option<DateTime<Utc>>,
    pub show_loading: bool,
}

impl From<CryptoState> for CryptoStateResponse {
    fn from(state: CryptoState) -> Self {
        let show_loading = state.show_loading();
        Self {
            data: state.data,
            status: state.status,
            error: state.error,
            last_updated: state.last_updated,
            show_loading,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
