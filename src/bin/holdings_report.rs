use anyhow::Result;
use std::sync::Arc;

use holdings_portfolio::api_client::ReqwestHoldingsProvider;
use holdings_portfolio::config::AppConfig;
use holdings_portfolio::domain::models::SnapshotSource;
use holdings_portfolio::infra::open_store;
use holdings_portfolio::logging;
use holdings_portfolio::usecases::sync_service::{SyncEngine, SyncState};
use holdings_portfolio::view::HoldingsView;

// One sync, then the portfolio printed as a table.
#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::from_env()?;
    logging::init();

    let store = open_store(&config.store)
        .await
        .map_err(|e| anyhow::anyhow!("failed to open holdings store: {}", e))?;
    let engine = SyncEngine::new(Arc::new(ReqwestHoldingsProvider::new(&config.api_url)), store);

    let snapshot = match engine.sync().await {
        Ok(snapshot) => snapshot,
        Err(e) => anyhow::bail!("{} ({})", e.user_message(), e),
    };
    if snapshot.source == SnapshotSource::Cache {
        println!("Offline: showing the last synced holdings");
    }

    let view = HoldingsView::from_state(&SyncState::Ready(snapshot));
    println!("{:<14} {:>8} {:>16} {:>16}", "SYMBOL", "QTY", "LTP", "P&L");
    for row in &view.holdings {
        println!(
            "{:<14} {:>8} {:>16} {:>16}",
            row.symbol, row.quantity, row.ltp_display, row.pnl_display
        );
    }
    let s = &view.summary;
    println!();
    println!("Current value     {:>16}", s.current_value_display);
    println!("Total investment  {:>16}", s.total_investment_display);
    println!("Today's P&L       {:>16}", s.todays_pnl_display);
    println!("Profit & Loss     {:>16} ({})", s.total_pnl_display, s.pnl_percent_display);
    Ok(())
}
