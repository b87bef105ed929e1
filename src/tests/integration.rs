use crate::api::{AppState, router};
use crate::api_client::{HoldingsProvider, MockHoldingsProvider};
use crate::csv_store::FileCsvHoldingStore;
use crate::domain::models::Holding;
use crate::domain::repository::HoldingStore;
use crate::errors::SyncError;
use crate::infra::memory::InMemoryHoldingStore;
use crate::infra::sqlite::repo::SqliteHoldingStore;
use crate::usecases::sync_service::SyncEngine;
use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use sqlx::sqlite::SqlitePoolOptions;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Notify;
use tower::ServiceExt; // for `oneshot`

fn sample() -> Vec<Holding> {
    vec![
        Holding::new("TEST", 1, 100.0, 90.0, 100.0),
        Holding::new("ICICI", 100, 118.25, 110.0, 105.0),
    ]
}

// First fetch answers at once; later ones wait on `gate`.
struct HeldRefreshProvider {
    gate: Notify,
    calls: AtomicUsize,
}

#[async_trait]
impl HoldingsProvider for HeldRefreshProvider {
    async fn fetch_holdings(&self) -> Result<Vec<Holding>, SyncError> {
        if self.calls.fetch_add(1, Ordering::SeqCst) > 0 {
            self.gate.notified().await;
        }
        Ok(sample())
    }
}

async fn sqlite_store() -> Arc<SqliteHoldingStore> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("failed to connect to in-memory db");
    sqlx::migrate!("./migrations").run(&pool).await.expect("migrations");
    Arc::new(SqliteHoldingStore::new(pool))
}

fn app(provider: MockHoldingsProvider, store: Arc<dyn HoldingStore>) -> Router {
    let engine = Arc::new(SyncEngine::new(Arc::new(provider), store));
    router(AppState { engine })
}

async fn call(app: &Router, method: &str, uri: &str) -> (StatusCode, serde_json::Value) {
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn holdings_are_idle_until_first_refresh() {
    let app = app(MockHoldingsProvider::new(sample()), Arc::new(InMemoryHoldingStore::new()));
    let (status, json) = call(&app, "GET", "/api/holdings").await;
    assert!(status.is_success());
    assert_eq!(json["status"], "idle");
    assert!(json["holdings"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn refresh_then_read_with_mock_provider() {
    let app = app(MockHoldingsProvider::new(sample()), Arc::new(InMemoryHoldingStore::new()));

    let (status, json) = call(&app, "POST", "/api/holdings/refresh").await;
    assert!(status.is_success());
    assert_eq!(json["status"], "ready");
    assert_eq!(json["source"], "remote");
    assert_eq!(json["holdings"].as_array().unwrap().len(), 2);

    let (status, json) = call(&app, "GET", "/api/holdings").await;
    assert!(status.is_success());
    assert_eq!(json["holdings"][0]["symbol"], "TEST");
    assert_eq!(json["holdings"][0]["pnl_display"], "₹10.00");

    let (status, summary) = call(&app, "GET", "/api/summary").await;
    assert!(status.is_success());
    assert_eq!(summary["current_value"], 11925.0);
    assert_eq!(summary["total_investment"], 11090.0);
    assert_eq!(summary["total_pnl_display"], "₹835.00");
}

#[tokio::test]
async fn refresh_falls_back_to_sqlite_cache() {
    let store = sqlite_store().await;
    store.replace_all(&sample()).await.unwrap();

    let offline = MockHoldingsProvider::failing(SyncError::Network("dns error".to_string()));
    let app = app(offline, store);

    let (status, json) = call(&app, "POST", "/api/holdings/refresh").await;
    assert!(status.is_success());
    assert_eq!(json["source"], "cache");
    assert_eq!(json["holdings"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn refresh_without_cache_is_bad_gateway() {
    let offline = MockHoldingsProvider::failing(SyncError::Network("dns error".to_string()));
    let app = app(offline, Arc::new(InMemoryHoldingStore::new()));

    let (status, json) = call(&app, "POST", "/api/holdings/refresh").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json["error"], "No Internet Connection");

    let (_, json) = call(&app, "GET", "/api/holdings").await;
    assert_eq!(json["status"], "failed");
    assert_eq!(json["error"], "No Internet Connection");
}

#[tokio::test]
async fn summary_stays_populated_during_refresh() {
    let provider = Arc::new(HeldRefreshProvider {
        gate: Notify::new(),
        calls: AtomicUsize::new(0),
    });
    let engine = Arc::new(SyncEngine::new(provider.clone(), Arc::new(InMemoryHoldingStore::new())));
    let app = router(AppState { engine: engine.clone() });

    let (status, _) = call(&app, "POST", "/api/holdings/refresh").await;
    assert!(status.is_success());

    let refresh = tokio::spawn({
        let engine = engine.clone();
        async move { engine.sync().await }
    });
    while provider.calls.load(Ordering::SeqCst) < 2 {
        tokio::task::yield_now().await;
    }

    let (_, summary) = call(&app, "GET", "/api/summary").await;
    assert_eq!(summary["current_value"], 11925.0);
    let (_, view) = call(&app, "GET", "/api/holdings").await;
    assert_eq!(view["status"], "loading");
    assert_eq!(view["holdings"].as_array().unwrap().len(), 2);

    provider.gate.notify_one();
    assert!(refresh.await.unwrap().is_ok());
    let (_, view) = call(&app, "GET", "/api/holdings").await;
    assert_eq!(view["status"], "ready");
}

fn other() -> Vec<Holding> {
    vec![Holding::new("TCS", 2, 3400.0, 3100.0, 3380.0)]
}

fn latest() -> Vec<Holding> {
    vec![
        Holding::new("HDFC", 7, 1650.5, 1500.0, 1640.0),
        Holding::new("ITC", 40, 440.0, 390.25, 438.0),
        Holding::new("SBI", 10, 550.0, 500.0, 545.0),
    ]
}

#[tokio::test]
async fn abandoned_sync_leaves_sqlite_snapshot_whole() {
    let store = sqlite_store().await;
    store.replace_all(&sample()).await.unwrap();
    let provider = MockHoldingsProvider::scripted(vec![Ok(other()), Ok(latest())]);
    let engine = SyncEngine::new(Arc::new(provider), store.clone());

    // Dropped on its first pending poll, which is inside the store write.
    let _ = tokio::time::timeout(Duration::ZERO, engine.sync()).await;
    let rows = store.read_all().await.unwrap();
    assert!(rows == sample() || rows == other(), "partial snapshot: {:?}", rows);

    let snapshot = engine.sync().await.unwrap();
    assert_eq!(snapshot.holdings, latest());
    assert_eq!(store.read_all().await.unwrap(), latest());
}

#[tokio::test]
async fn abandoned_sync_does_not_clobber_later_csv_write() {
    let dir = std::env::temp_dir().join(format!("holdings_sync_cancel_{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    let store = Arc::new(FileCsvHoldingStore::new(dir.join("holdings.csv")));
    store.replace_all(&sample()).await.unwrap();
    let provider = MockHoldingsProvider::scripted(vec![Ok(other()), Ok(latest())]);
    let engine = SyncEngine::new(Arc::new(provider), store.clone());

    // The blocking write of `other()` keeps running after the sync is dropped.
    let _ = tokio::time::timeout(Duration::ZERO, engine.sync()).await;
    engine.sync().await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert_eq!(store.read_all().await.unwrap(), latest());
    let files: Vec<_> = std::fs::read_dir(&dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    assert_eq!(files, vec!["holdings.csv".to_string()]);
}
