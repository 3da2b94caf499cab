//! Error types for the price fetcher and startup configuration.

use thiserror::Error;

/// Failure of a single quote fetch.
///
/// Callers treat every variant the same way (the store collapses them into the
/// `failed` state); the variants only exist so the message says what went wrong.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NetworkError {
    /// Upstream answered with a non-2xx status. `body` holds the start of
    /// the response for logs and is kept out of the message.
    #[error("CoinGecko API error {status}")]
    Status { status: u16, body: String },

    /// Connection, TLS or timeout failure before a response arrived.
    #[error("Failed to fetch crypto data: {0}")]
    Transport(String),

    /// Response body was not the expected JSON array of quotes.
    #[error("Failed to parse crypto data: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for NetworkError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            NetworkError::Decode(err.to_string())
        } else {
            NetworkError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for NetworkError {
    fn from(err: serde_json::Error) -> Self {
        NetworkError::Decode(err.to_string())
    }
}

/// Invalid environment configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?} ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}
