use axum::{
    Json,
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, error, info, warn};

use crate::{
    AppState,
    models::crypto::{CryptoStateResponse, ErrorResponse},
    services::crypto_store::{CryptoStore, FetchStatus},
};

/// Handler for GET /api/crypto
/// Current snapshot, status, error and last update time
pub async fn get_crypto_state(State(state): State<AppState>) -> Json<CryptoStateResponse> {
    Json(state.store.state().into())
}

/// Handler for POST /api/crypto/retry
/// Manual retry, only offered while the last refresh failed
pub async fn retry_refresh(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<CryptoStateResponse>), (StatusCode, Json<ErrorResponse>)> {
    let status = state.store.status();
    if status != FetchStatus::Failed {
        debug!("Rejecting manual retry while status is {:?}", status);
        return Err((
            StatusCode::CONFLICT,
            Json(ErrorResponse {
                error: "Retry is only available after a failed refresh".to_string(),
            }),
        ));
    }

    info!("Manual crypto refresh requested");

    // Detached so a client hanging up does not cancel the refresh.
    let store = state.store.clone();
    if let Err(e) = tokio::spawn(async move { store.request_refresh().await }).await {
        error!("Manual crypto refresh task failed: {}", e);
        return Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: "Manual refresh did not complete".to_string(),
            }),
        ));
    }

    Ok((StatusCode::OK, Json(state.store.state().into())))
}

/// GET /api/crypto/ws
///
/// Pushes every refresh notification as JSON:
/// ```json
/// {
///   "id": "2f0c...",
///   "title": "Data updated",
///   "description": "Crypto prices refreshed at 14:03:09",
///   "variant": "default",
///   "duration_ms": 3000
/// }
/// ```
pub async fn notifications_websocket(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state.store))
}

async fn handle_socket(socket: WebSocket, store: Arc<CryptoStore>) {
    let (mut sender, mut receiver) = socket.split();
    let mut notifications = store.subscribe();

    info!("New notification WebSocket connection");

    loop {
        tokio::select! {
            notification = notifications.recv() => {
                match notification {
                    Ok(notification) => {
                        let payload = match serde_json::to_string(&notification) {
                            Ok(payload) => payload,
                            Err(e) => {
                                error!("Failed to serialize notification: {}", e);
                                continue;
                            }
                        };
                        if let Err(e) = sender.send(Message::Text(payload.into())).await {
                            debug!("WebSocket send error: {}", e);
                            break;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("Notification subscriber lagged, skipped {} messages", skipped);
                    }
                    Err(RecvError::Closed) => break,
                }
            }

            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Ping(data))) => {
                        let _ = sender.send(Message::Pong(data)).await;
                    }
                    Some(Ok(Message::Close(_))) => {
                        info!("WebSocket closed by client");
                        break;
                    }
                    Some(Err(e)) => {
                        error!("WebSocket receive error: {}", e);
                        break;
                    }
                    None => {
                        debug!("WebSocket stream ended");
                        break;
                    }
                    _ => {}
                }
            }
        }
    }

    info!("Notification WebSocket connection closed");
}
