//! Transient toast notifications emitted on every refresh outcome.
//!
//! The store only publishes; showing and timing out a toast is up to whoever
//! subscribes (the dashboard page over `/api/crypto/ws`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const SUCCESS_DURATION_MS: u64 = 3000;
pub const ERROR_DURATION_MS: u64 = 5000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationVariant {
    Default,
    Destructive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub variant: NotificationVariant,
    /// How long the toast stays up before dismissing itself.
    pub duration_ms: u64,
}

impl Notification {
    pub fn refreshed(at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: "Data updated".to_string(),
            description: format!("Crypto prices refreshed at {}", at.format("%H:%M:%S")),
            variant: NotificationVariant::Default,
            duration_ms: SUCCESS_DURATION_MS,
        }
    }

    pub fn fetch_failed(message: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: "Error fetching data".to_string(),
            description: message.to_string(),
            variant: NotificationVariant::Destructive,
            duration_ms: ERROR_DURATION_MS,
        }
    }
}
