use anyhow::Result;
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info, warn};

use holdings_portfolio::api::{AppState, router};
use holdings_portfolio::api_client::ReqwestHoldingsProvider;
use holdings_portfolio::config::AppConfig;
use holdings_portfolio::infra::open_store;
use holdings_portfolio::logging;
use holdings_portfolio::usecases::sync_service::SyncEngine;

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::from_env()?;
    logging::init();

    let store = open_store(&config.store)
        .await
        .map_err(|e| anyhow::anyhow!("failed to open holdings store: {}", e))?;
    let provider = Arc::new(ReqwestHoldingsProvider::new(&config.api_url));
    let engine = Arc::new(SyncEngine::new(provider, store));
    info!(api_url = %config.api_url, store = ?config.store, "Starting holdings service");

    // Initial load; the HTTP surface reports `loading` until it settles.
    let initial = engine.clone();
    tokio::spawn(async move {
        if let Err(e) = initial.sync().await {
            warn!(kind = e.kind(), error = %e, "Initial sync failed");
        }
    });

    let app = router(AppState { engine });
    serve(app, config.port).await;
    Ok(())
}

async fn serve(app: Router, port: u16) {
    // Try to bind to the requested port; if it's in use, try a few subsequent ports.
    let max_attempts = 10;
    for offset in 0..max_attempts {
        let try_port = port.saturating_add(offset);
        let addr = SocketAddr::from(([127, 0, 0, 1], try_port));
        match tokio::net::TcpListener::bind(&addr).await {
            Ok(listener) => {
                info!(%addr, "Listening");
                if let Err(e) = axum::serve(listener, app).await {
                    error!(error = %e, "Server failed while serving");
                }
                return;
            }
            Err(e) => {
                warn!(port = try_port, error = %e, "Port unavailable, trying next");
            }
        }
    }
    error!("Failed to bind to any port in range {}..{}", port, port.saturating_add(max_attempts - 1));
}
