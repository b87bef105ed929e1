use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::HashMap;

// One position as delivered by the holdings endpoint and as persisted locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    pub symbol: String,
    pub quantity: i64,
    pub ltp: f64,
    pub avg_price: f64,
    pub close: f64,
}

impl Holding {
    pub fn new(symbol: &str, quantity: i64, ltp: f64, avg_price: f64, close: f64) -> Self {
        Self {
            symbol: symbol.to_string(),
            quantity,
            ltp,
            avg_price,
            close,
        }
    }

    /// Row-level profit and loss: `(ltp - avg_price) * quantity`.
    pub fn pnl(&self) -> f64 {
        (self.ltp - self.avg_price) * self.quantity as f64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotSource {
    Remote,
    Cache,
}

/// All holdings as of one read, either straight from the endpoint or the
/// last persisted copy of it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub holdings: Vec<Holding>,
    pub source: SnapshotSource,
    pub retrieved_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn remote(holdings: Vec<Holding>) -> Self {
        Self {
            holdings,
            source: SnapshotSource::Remote,
            retrieved_at: Utc::now(),
        }
    }

    pub fn cached(holdings: Vec<Holding>) -> Self {
        Self {
            holdings,
            source: SnapshotSource::Cache,
            retrieved_at: Utc::now(),
        }
    }

    pub fn is_stale(&self) -> bool {
        self.source == SnapshotSource::Cache
    }
}

/// Keeps the last occurrence of every symbol. Survivors stay in the order of
/// their last occurrence.
pub fn dedupe_by_symbol(holdings: Vec<Holding>) -> Vec<Holding> {
    let last_index: HashMap<String, usize> = holdings
        .iter()
        .enumerate()
        .map(|(i, h)| (h.symbol.clone(), i))
        .collect();
    if last_index.len() == holdings.len() {
        return holdings;
    }
    holdings
        .into_iter()
        .enumerate()
        .filter(|(i, h)| last_index.get(&h.symbol) == Some(i))
        .map(|(_, h)| h)
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct PortfolioSummary {
    pub current_value: f64,
    pub total_investment: f64,
    pub total_pnl: f64,
    pub todays_pnl: f64,
    pub pnl_percent: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn holding_decodes_from_camel_case() {
        let raw = r#"{"symbol":"ASHOKLEY","quantity":3,"ltp":119.1,"avgPrice":115.0,"close":121.0}"#;
        let h: Holding = serde_json::from_str(raw).unwrap();
        assert_eq!(h, Holding::new("ASHOKLEY", 3, 119.1, 115.0, 121.0));
    }

    #[test]
    fn dedupe_keeps_last_occurrence() {
        let holdings = vec![
            Holding::new("A", 1, 10.0, 9.0, 10.0),
            Holding::new("B", 2, 20.0, 19.0, 20.0),
            Holding::new("A", 5, 11.0, 9.0, 10.0),
        ];
        let out = dedupe_by_symbol(holdings);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].symbol, "B");
        assert_eq!(out[1], Holding::new("A", 5, 11.0, 9.0, 10.0));
    }

    #[test]
    fn dedupe_without_duplicates_is_identity() {
        let holdings = vec![
            Holding::new("B", 2, 20.0, 19.0, 20.0),
            Holding::new("A", 1, 10.0, 9.0, 10.0),
        ];
        assert_eq!(dedupe_by_symbol(holdings.clone()), holdings);
    }
}
