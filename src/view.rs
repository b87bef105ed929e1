use crate::domain::models::{Holding, PortfolioSummary, SnapshotSource};
use crate::format::{to_display_currency, to_display_percent};
use crate::usecases::metrics::summarize;
use crate::usecases::sync_service::SyncState;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewStatus {
    Idle,
    Loading,
    Ready,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct HoldingRow {
    pub symbol: String,
    pub quantity: i64,
    pub ltp: f64,
    pub pnl: f64,
    pub ltp_display: String,
    pub pnl_display: String,
}

impl From<&Holding> for HoldingRow {
    fn from(h: &Holding) -> Self {
        let pnl = h.pnl();
        Self {
            symbol: h.symbol.clone(),
            quantity: h.quantity,
            ltp: h.ltp,
            pnl,
            ltp_display: to_display_currency(h.ltp),
            pnl_display: to_display_currency(pnl),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryView {
    #[serde(flatten)]
    pub totals: PortfolioSummary,
    pub current_value_display: String,
    pub total_investment_display: String,
    pub total_pnl_display: String,
    pub todays_pnl_display: String,
    pub pnl_percent_display: String,
}

impl From<PortfolioSummary> for SummaryView {
    fn from(totals: PortfolioSummary) -> Self {
        Self {
            current_value_display: to_display_currency(totals.current_value),
            total_investment_display: to_display_currency(totals.total_investment),
            total_pnl_display: to_display_currency(totals.total_pnl),
            todays_pnl_display: to_display_currency(totals.todays_pnl),
            pnl_percent_display: to_display_percent(totals.pnl_percent),
            totals,
        }
    }
}

/// What a holdings screen renders: status, the rows, the portfolio totals and
/// an error message when the last attempt produced nothing.
#[derive(Debug, Clone, Serialize)]
pub struct HoldingsView {
    pub status: ViewStatus,
    pub source: Option<SnapshotSource>,
    pub retrieved_at: Option<DateTime<Utc>>,
    pub holdings: Vec<HoldingRow>,
    pub summary: SummaryView,
    pub error: Option<String>,
}

impl HoldingsView {
    pub fn from_state(state: &SyncState) -> Self {
        let status = match state {
            SyncState::Idle => ViewStatus::Idle,
            SyncState::Loading(_) => ViewStatus::Loading,
            SyncState::Ready(_) => ViewStatus::Ready,
            SyncState::Failed(_) => ViewStatus::Failed,
        };
        let snapshot = state.snapshot();
        let holdings: &[Holding] = snapshot.map(|s| s.holdings.as_slice()).unwrap_or(&[]);
        Self {
            status,
            source: snapshot.map(|s| s.source),
            retrieved_at: snapshot.map(|s| s.retrieved_at),
            holdings: holdings.iter().map(HoldingRow::from).collect(),
            summary: summarize(holdings).into(),
            error: match state {
                SyncState::Failed(err) => Some(err.user_message()),
                _ => None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::Snapshot;
    use crate::errors::SyncError;

    #[test]
    fn ready_state_renders_rows_and_totals() {
        let snapshot = Snapshot::remote(vec![Holding::new("TEST", 1, 100.0, 90.0, 100.0)]);
        let view = HoldingsView::from_state(&SyncState::Ready(snapshot));

        assert_eq!(view.status, ViewStatus::Ready);
        assert_eq!(view.source, Some(SnapshotSource::Remote));
        assert_eq!(view.holdings.len(), 1);
        assert_eq!(view.holdings[0].pnl_display, "₹10.00");
        assert_eq!(view.summary.current_value_display, "₹100.00");
        assert_eq!(view.summary.pnl_percent_display, "11.11%");
        assert!(view.error.is_none());
    }

    #[test]
    fn failed_state_has_message_and_no_rows() {
        let state = SyncState::Failed(SyncError::Network("timed out".to_string()));
        let view = HoldingsView::from_state(&state);

        assert_eq!(view.status, ViewStatus::Failed);
        assert!(view.holdings.is_empty());
        assert_eq!(view.error.as_deref(), Some("No Internet Connection"));
        assert_eq!(view.summary.totals, PortfolioSummary::default());
    }

    #[test]
    fn summary_serializes_flat() {
        let view = HoldingsView::from_state(&SyncState::Idle);
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["status"], "idle");
        assert_eq!(json["summary"]["current_value"], 0.0);
        assert_eq!(json["summary"]["pnl_percent_display"], "0.00%");
    }

    #[test]
    fn loading_state_keeps_previous_rows() {
        let snapshot = Snapshot::cached(vec![Holding::new("TEST", 1, 100.0, 90.0, 100.0)]);
        let view = HoldingsView::from_state(&SyncState::Loading(Some(snapshot)));

        assert_eq!(view.status, ViewStatus::Loading);
        assert_eq!(view.source, Some(SnapshotSource::Cache));
        assert_eq!(view.holdings.len(), 1);
        assert_eq!(view.summary.totals.current_value, 100.0);

        let first_load = HoldingsView::from_state(&SyncState::Loading(None));
        assert!(first_load.holdings.is_empty());
    }

    #[test]
    fn empty_totals_serialize_as_positive_zero() {
        let view = HoldingsView::from_state(&SyncState::Idle);
        let json = serde_json::to_string(&view.summary).unwrap();
        assert!(json.contains("\"current_value\":0.0"), "{}", json);
        assert!(json.contains("\"todays_pnl\":0.0"), "{}", json);
        assert!(!json.contains("-0.0"), "{}", json);
    }
}
