use crate::usecases::metrics::summarize;
use crate::usecases::sync_service::{SyncEngine, SyncState};
use crate::view::{HoldingsView, SummaryView};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::error;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<SyncEngine>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/holdings", get(api_holdings))
        .route("/api/holdings/refresh", post(api_refresh))
        .route("/api/summary", get(api_summary))
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

async fn api_holdings(State(state): State<AppState>) -> Json<HoldingsView> {
    Json(HoldingsView::from_state(&state.engine.state()))
}

#[tracing::instrument(skip(state))]
async fn api_refresh(
    State(state): State<AppState>,
) -> Result<Json<HoldingsView>, (StatusCode, Json<serde_json::Value>)> {
    match state.engine.sync().await {
        Ok(snapshot) => Ok(Json(HoldingsView::from_state(&SyncState::Ready(snapshot)))),
        Err(e) => {
            error!(kind = e.kind(), error = %e, "Refresh failed");
            Err((StatusCode::BAD_GATEWAY, Json(json!({"error": e.user_message()}))))
        }
    }
}

async fn api_summary(State(state): State<AppState>) -> Json<SummaryView> {
    let current = state.engine.state();
    let holdings = current.snapshot().map(|s| s.holdings.as_slice()).unwrap_or(&[]);
    Json(summarize(holdings).into())
}
