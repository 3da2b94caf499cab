use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::{Duration, MissedTickBehavior, interval};

use crate::services::crypto_store::CryptoStore;

/// Fixed polling period for the dashboard.
pub const REFRESH_INTERVAL: Duration = Duration::from_secs(30);

/// Owns the periodic refresh task. Dropping the handle stops the timer.
pub struct RefreshJobHandle {
    task: JoinHandle<()>,
}

impl RefreshJobHandle {
    /// Stop the timer now. Refreshes already in flight run to completion.
    pub fn stop(self) {
        self.task.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for RefreshJobHandle {
    fn drop(&mut self) {
        if !self.task.is_finished() {
            tracing::info!("Stopping crypto refresh job");
        }
        self.task.abort();
    }
}

/// Refresh once immediately, then every 30 seconds, until the handle drops.
pub fn start_crypto_refresh_job(store: Arc<CryptoStore>) -> RefreshJobHandle {
    start_refresh_job_every(store, REFRESH_INTERVAL)
}

pub fn start_refresh_job_every(store: Arc<CryptoStore>, period: Duration) -> RefreshJobHandle {
    let task = tokio::spawn(async move {
        // First tick completes immediately. After a stall, wait a full period
        // instead of catching up with back-to-back refreshes.
        let mut interval = interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            "Starting crypto refresh job (every {} seconds)",
            period.as_secs()
        );

        loop {
            interval.tick().await;
            tracing::debug!("Scheduled crypto refresh tick");

            // A slow upstream must not hold back the next tick; overlapping
            // completions are ordered by the store.
            let store = store.clone();
            tokio::spawn(async move {
                store.request_refresh().await;
            });
        }
    });

    RefreshJobHandle { task }
}
