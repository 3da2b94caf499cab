//! Fetch Lifecycle Store
//!
//! Holds the latest market snapshot and the status of the refresh cycle
//! (idle -> loading -> succeeded | failed). Both the periodic job and the
//! manual retry endpoint call `request_refresh`; readers take a cloned
//! `CryptoState` or subscribe to the notification channel.
//!
//! Overlapping refreshes are ordered by a sequence number taken when the
//! attempt starts. A completion is applied only if no later attempt has been
//! applied already, so an old response arriving late never overwrites newer
//! data or moves `last_updated` backward.
//!
//! A refresh whose future is dropped before the fetch returns never completes.
//! When the last such attempt goes away, the status and error fall back to the
//! last settled outcome so the store cannot stay in `loading` forever.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::error::NetworkError;
use crate::models::quote::AssetQuote;
use crate::services::coingecko::QuoteFetcher;
use crate::services::notifications::Notification;

const NOTIFICATION_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchStatus {
    Idle,
    Loading,
    Succeeded,
    Failed,
}

/// Read-only view of the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CryptoState {
    /// Latest snapshot, in the order the upstream returned it.
    pub data: Vec<AssetQuote>,
    pub status: FetchStatus,
    /// Set only while `status` is `Failed`.
    pub error: Option<String>,
    /// Completion time of the last applied success. Kept through failures.
    pub last_updated: Option<DateTime<Utc>>,
}

impl Default for CryptoState {
    fn default() -> Self {
        Self {
            data: Vec::new(),
            status: FetchStatus::Idle,
            error: None,
            last_updated: None,
        }
    }
}

impl CryptoState {
    /// Loading indicator is only shown before the first snapshot arrives;
    /// later refreshes keep the table on screen.
    pub fn show_loading(&self) -> bool {
        self.status == FetchStatus::Loading && self.data.is_empty()
    }
}

struct Inner {
    state: CryptoState,
    /// Sequence number of the newest completion applied so far.
    applied_seq: u64,
    /// Attempts started but not yet completed or cancelled.
    in_flight: usize,
    /// Status and error of the last applied completion (`Idle` before any).
    settled_status: FetchStatus,
    settled_error: Option<String>,
}

/// Abandons the attempt if dropped before `complete` is called.
struct PendingRefresh<'a> {
    store: &'a CryptoStore,
    seq: u64,
    completed: bool,
}

impl Drop for PendingRefresh<'_> {
    fn drop(&mut self) {
        if !self.completed {
            self.store.abandon_refresh(self.seq);
        }
    }
}

pub struct CryptoStore {
    fetcher: Arc<dyn QuoteFetcher>,
    asset_ids: Vec<&'static str>,
    inner: RwLock<Inner>,
    next_seq: AtomicU64,
    notify_tx: broadcast::Sender<Notification>,
}

impl CryptoStore {
    pub fn new(fetcher: Arc<dyn QuoteFetcher>, asset_ids: &[&'static str]) -> Self {
        let (notify_tx, _) = broadcast::channel(NOTIFICATION_CAPACITY);
        Self {
            fetcher,
            asset_ids: asset_ids.to_vec(),
            inner: RwLock::new(Inner {
                state: CryptoState::default(),
                applied_seq: 0,
                in_flight: 0,
                settled_status: FetchStatus::Idle,
                settled_error: None,
            }),
            next_seq: AtomicU64::new(0),
            notify_tx,
        }
    }

    pub fn state(&self) -> CryptoState {
        self.inner.read().state.clone()
    }

    pub fn status(&self) -> FetchStatus {
        self.inner.read().state.status
    }

    /// Subscribe to refresh notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.notify_tx.subscribe()
    }

    /// Run one refresh cycle and return the status it leaves behind.
    ///
    /// Never fails: fetch errors become the `Failed` state plus a notification.
    /// Safe to cancel; see the module docs.
    pub async fn request_refresh(&self) -> FetchStatus {
        let mut pending = PendingRefresh {
            store: self,
            seq: self.begin_refresh(),
            completed: false,
        };
        let outcome = self.fetcher.fetch_quotes(&self.asset_ids).await;
        pending.completed = true;
        self.complete_refresh(pending.seq, outcome)
    }

    fn begin_refresh(&self) -> u64 {
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst) + 1;

        let mut inner = self.inner.write();
        inner.in_flight += 1;
        inner.state.status = FetchStatus::Loading;
        inner.state.error = None;
        drop(inner);

        info!("Starting crypto refresh #{}", seq);
        seq
    }

    fn complete_refresh(
        &self,
        seq: u64,
        outcome: Result<Vec<AssetQuote>, NetworkError>,
    ) -> FetchStatus {
        let mut inner = self.inner.write();
        inner.in_flight = inner.in_flight.saturating_sub(1);

        if seq < inner.applied_seq {
            let status = inner.state.status;
            drop(inner);
            debug!(
                "Discarding refresh #{} (superseded by a newer completed refresh)",
                seq
            );
            return status;
        }
        inner.applied_seq = seq;

        let notification = match outcome {
            Ok(quotes) => {
                let now = Utc::now();
                let completed_at = match inner.state.last_updated {
                    Some(prev) if prev > now => prev,
                    _ => now,
                };
                let count = quotes.len();

                inner.state.data = quotes;
                inner.state.status = FetchStatus::Succeeded;
                inner.state.error = None;
                inner.state.last_updated = Some(completed_at);

                info!("Crypto refresh #{} succeeded with {} quotes", seq, count);
                Notification::refreshed(completed_at)
            }
            Err(e) => {
                let message = e.to_string();

                inner.state.status = FetchStatus::Failed;
                inner.state.error = Some(message.clone());

                warn!("Crypto refresh #{} failed: {}", seq, message);
                Notification::fetch_failed(&message)
            }
        };

        inner.settled_status = inner.state.status;
        inner.settled_error = inner.state.error.clone();

        let status = inner.state.status;
        drop(inner);

        // No subscribers is fine.
        if let Ok(receivers) = self.notify_tx.send(notification) {
            debug!("Refresh notification delivered to {} subscribers", receivers);
        }

        status
    }

    fn abandon_refresh(&self, seq: u64) {
        let mut inner = self.inner.write();
        inner.in_flight = inner.in_flight.saturating_sub(1);

        if inner.in_flight == 0 && inner.state.status == FetchStatus::Loading {
            inner.state.status = inner.settled_status;
            inner.state.error = inner.settled_error.clone();
        }
        let status = inner.state.status;
        drop(inner);

        warn!(
            "Crypto refresh #{} cancelled before completing, status is {:?}",
            seq, status
        );
    }
}
