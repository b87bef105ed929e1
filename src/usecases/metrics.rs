use crate::domain::models::{Holding, PortfolioSummary};

/// Sum of `ltp * quantity`.
pub fn compute_current_value(holdings: &[Holding]) -> f64 {
    holdings.iter().fold(0.0, |acc, h| acc + h.ltp * h.quantity as f64)
}

/// Sum of `avg_price * quantity`.
pub fn compute_total_investment(holdings: &[Holding]) -> f64 {
    holdings
        .iter()
        .fold(0.0, |acc, h| acc + h.avg_price * h.quantity as f64)
}

pub fn compute_total_pnl(holdings: &[Holding]) -> f64 {
    compute_current_value(holdings) - compute_total_investment(holdings)
}

/// Sum of `(close - ltp) * quantity`.
pub fn compute_todays_pnl(holdings: &[Holding]) -> f64 {
    holdings
        .iter()
        .fold(0.0, |acc, h| acc + (h.close - h.ltp) * h.quantity as f64)
}

// Zero investment yields 0 rather than a division error.
pub fn compute_pnl_percent(total_pnl: f64, total_investment: f64) -> f64 {
    if total_investment != 0.0 {
        total_pnl / total_investment * 100.0
    } else {
        0.0
    }
}

pub fn summarize(holdings: &[Holding]) -> PortfolioSummary {
    let current_value = compute_current_value(holdings);
    let total_investment = compute_total_investment(holdings);
    let total_pnl = current_value - total_investment;
    PortfolioSummary {
        current_value,
        total_investment,
        total_pnl,
        todays_pnl: compute_todays_pnl(holdings),
        pnl_percent: compute_pnl_percent(total_pnl, total_investment),
    }
}
