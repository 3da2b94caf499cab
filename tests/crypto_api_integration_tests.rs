mod common;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

use crypto_vision::{AppState, build_router, services::crypto_store::FetchStatus};

use crate::common::{GatedFetcher, ScriptedFetcher, sample_quotes, server_error, test_state};

async fn send(app: Router, method: &str, uri: &str) -> (StatusCode, Vec<u8>) {
    let response = app
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, body.to_vec())
}

async fn get_json(state: &AppState, uri: &str) -> (StatusCode, Value) {
    let (status, body) = send(build_router(state.clone()), "GET", uri).await;
    (status, serde_json::from_slice(&body).unwrap())
}

/// Before any refresh the store is idle and empty
#[tokio::test]
async fn test_initial_state_is_idle() {
    let state = test_state(ScriptedFetcher::always(Ok(sample_quotes())));

    let (status, json) = get_json(&state, "/api/crypto").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "idle");
    assert_eq!(json["data"].as_array().unwrap().len(), 0);
    assert!(json["error"].is_null());
    assert!(json["last_updated"].is_null());
    assert_eq!(json["show_loading"], false);
}

/// Ten quotes in rank order come back in the same order
#[tokio::test]
async fn test_success_exposes_snapshot_in_rank_order() {
    let state = test_state(ScriptedFetcher::always(Ok(sample_quotes())));
    state.store.request_refresh().await;

    let (status, json) = get_json(&state, "/api/crypto").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "succeeded");
    let ranks: Vec<u64> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|q| q["market_cap_rank"].as_u64().unwrap())
        .collect();
    assert_eq!(ranks, (1..=10).collect::<Vec<u64>>());
    assert!(json["error"].is_null());
    assert!(json["last_updated"].is_string());
}

/// Failure on the first attempt surfaces an error with an empty table
#[tokio::test]
async fn test_failure_exposes_error() {
    let state = test_state(ScriptedFetcher::always(Err(server_error())));
    state.store.request_refresh().await;

    let (_, json) = get_json(&state, "/api/crypto").await;

    assert_eq!(json["status"], "failed");
    assert!(!json["error"].as_str().unwrap().is_empty());
    assert_eq!(json["data"].as_array().unwrap().len(), 0);
}

/// Retry is rejected unless the last refresh failed
#[tokio::test]
async fn test_retry_rejected_when_not_failed() {
    let fetcher = ScriptedFetcher::always(Ok(sample_quotes()));
    let state = test_state(fetcher.clone());

    let (status, _) = send(build_router(state.clone()), "POST", "/api/crypto/retry").await;
    assert_eq!(status, StatusCode::CONFLICT);

    state.store.request_refresh().await;
    let (status, body) = send(build_router(state.clone()), "POST", "/api/crypto/retry").await;
    assert_eq!(status, StatusCode::CONFLICT);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert!(json["error"].is_string());

    // Only the explicit refresh reached the fetcher.
    assert_eq!(fetcher.calls(), 1);
}

/// Failed refresh, manual retry, then success clears the error
#[tokio::test]
async fn test_retry_after_failure_recovers() {
    let fetcher = ScriptedFetcher::new(vec![Err(server_error())], Ok(sample_quotes()));
    let state = test_state(fetcher.clone());

    state.store.request_refresh().await;
    assert!(state.store.state().last_updated.is_none());

    let before_retry = chrono::Utc::now();
    let (status, body) = send(build_router(state.clone()), "POST", "/api/crypto/retry").await;
    assert_eq!(status, StatusCode::OK);

    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "succeeded");
    assert!(json["error"].is_null());
    assert_eq!(json["data"].as_array().unwrap().len(), 10);

    let last_updated = state.store.state().last_updated.unwrap();
    assert!(last_updated >= before_retry);
    assert_eq!(fetcher.calls(), 2);
}

async fn wait_for_status(state: &AppState, want: FetchStatus) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while state.store.status() != want {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap_or_else(|_| panic!("store never reached {want:?}"));
}

/// Retry is refused while a periodic refresh is in flight, then accepted
/// once that refresh has failed
#[tokio::test]
async fn test_retry_gate_with_refresh_in_flight() {
    let fetcher = Arc::new(GatedFetcher::default());
    let state = test_state(fetcher.clone());

    let first = fetcher.gate();
    first.send(Err(server_error())).unwrap();
    state.store.request_refresh().await;
    assert_eq!(state.store.status(), FetchStatus::Failed);

    let tick = fetcher.gate();
    let periodic = tokio::spawn({
        let store = state.store.clone();
        async move { store.request_refresh().await }
    });
    wait_for_status(&state, FetchStatus::Loading).await;

    let (status, _) = send(build_router(state.clone()), "POST", "/api/crypto/retry").await;
    assert_eq!(status, StatusCode::CONFLICT);

    tick.send(Err(server_error())).unwrap();
    assert_eq!(periodic.await.unwrap(), FetchStatus::Failed);

    fetcher.gate().send(Ok(sample_quotes())).unwrap();
    let (status, body) = send(build_router(state.clone()), "POST", "/api/crypto/retry").await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "succeeded");
    assert_eq!(json["data"].as_array().unwrap().len(), 10);
}

/// A refresh cancelled mid-fetch does not lock out manual retry
#[tokio::test]
async fn test_cancelled_refresh_leaves_retry_available() {
    let fetcher = Arc::new(GatedFetcher::default());
    let state = test_state(fetcher.clone());

    fetcher.gate().send(Err(server_error())).unwrap();
    state.store.request_refresh().await;

    let _hang = fetcher.gate();
    let cancelled =
        tokio::time::timeout(Duration::from_millis(50), state.store.request_refresh()).await;
    assert!(cancelled.is_err());

    let (_, json) = get_json(&state, "/api/crypto").await;
    assert_eq!(json["status"], "failed");
    assert!(json["error"].is_string());

    fetcher.gate().send(Ok(sample_quotes())).unwrap();
    let (status, _) = send(build_router(state.clone()), "POST", "/api/crypto/retry").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(state.store.status(), FetchStatus::Succeeded);
}

/// Dropping the retry request mid-fetch still lets the refresh finish
#[tokio::test]
async fn test_abandoned_retry_request_still_completes() {
    let fetcher = Arc::new(GatedFetcher::default());
    let state = test_state(fetcher.clone());

    fetcher.gate().send(Err(server_error())).unwrap();
    state.store.request_refresh().await;

    let release = fetcher.gate();
    let request = build_router(state.clone()).oneshot(
        Request::builder()
            .method("POST")
            .uri("/api/crypto/retry")
            .body(Body::empty())
            .unwrap(),
    );
    let abandoned = tokio::time::timeout(Duration::from_millis(50), request).await;
    assert!(abandoned.is_err());
    assert_eq!(state.store.status(), FetchStatus::Loading);

    release.send(Ok(sample_quotes())).unwrap();
    wait_for_status(&state, FetchStatus::Succeeded).await;
    assert_eq!(state.store.state().data.len(), 10);
}

/// The tracker fragment carries the same table as the full page
#[tokio::test]
async fn test_tracker_fragment() {
    let state = test_state(ScriptedFetcher::always(Ok(sample_quotes())));
    state.store.request_refresh().await;

    let (status, body) = send(build_router(state), "GET", "/api/crypto/tracker").await;
    assert_eq!(status, StatusCode::OK);

    let html = String::from_utf8(body).unwrap();
    assert!(html.starts_with(r#"<section id="crypto-tracker">"#));
    assert!(!html.contains("CRYPTO VISION"));
    assert_eq!(html.matches(r#"<div class="row" data-id="#).count(), 10);
}

/// Stale data stays visible after a later failure
#[tokio::test]
async fn test_failure_after_success_keeps_table() {
    let fetcher = ScriptedFetcher::new(vec![Ok(sample_quotes())], Err(server_error()));
    let state = test_state(fetcher);

    state.store.request_refresh().await;
    let first_update = state.store.state().last_updated;
    state.store.request_refresh().await;

    let (_, json) = get_json(&state, "/api/crypto").await;
    assert_eq!(json["status"], "failed");
    assert_eq!(json["data"].as_array().unwrap().len(), 10);
    assert_eq!(state.store.state().last_updated, first_update);

    let (status, body) = send(build_router(state.clone()), "GET", "/").await;
    assert_eq!(status, StatusCode::OK);
    let html = String::from_utf8(body).unwrap();
    assert!(html.contains("Failed to load crypto data:"));
    assert!(html.contains(r#"data-id="bitcoin""#));
}

/// Dashboard page renders the hero and the tracker table
#[tokio::test]
async fn test_dashboard_page_renders() {
    let state = test_state(ScriptedFetcher::always(Ok(sample_quotes())));
    state.store.request_refresh().await;

    let (status, body) = send(build_router(state), "GET", "/").await;
    assert_eq!(status, StatusCode::OK);

    let html = String::from_utf8(body).unwrap();
    assert!(html.contains("CRYPTO VISION"));
    assert!(html.contains("Live Crypto Tracker"));
    assert!(html.contains("Last updated:"));
    assert_eq!(html.matches(r#"<div class="row" data-id="#).count(), 10);
    // Only odd ranks have a max supply in the sample.
    assert_eq!(html.matches(r#"<div class="supply-bar">"#).count(), 5);
}

#[tokio::test]
async fn test_hero_frames() {
    let state = test_state(ScriptedFetcher::always(Ok(sample_quotes())));

    let (status, json) = get_json(&state, "/api/hero/frames").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["prefix"], "CryptoVision: ");
    assert_eq!(json["phrases"].as_array().unwrap().len(), 5);
    let frames = json["frames"].as_array().unwrap();
    assert_eq!(frames[0]["text"], "T");
    assert_eq!(frames[0]["delay_ms"], 200);
}

#[tokio::test]
async fn test_health() {
    let state = test_state(ScriptedFetcher::always(Ok(sample_quotes())));
    let (status, body) = send(build_router(state), "GET", "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert!(!body.is_empty());
}
