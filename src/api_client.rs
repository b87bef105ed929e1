use crate::domain::models::Holding;
use crate::errors::SyncError;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Mutex;

#[async_trait]
pub trait HoldingsProvider: Send + Sync {
    async fn fetch_holdings(&self) -> Result<Vec<Holding>, SyncError>;
}

// Wire shape: { "data": { "userHolding": [ ... ] } }
#[derive(Deserialize, Debug)]
struct HoldingsResponse {
    data: DataWrapper,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct DataWrapper {
    user_holding: Vec<Holding>,
}

pub fn decode_holdings(body: &[u8]) -> Result<Vec<Holding>, SyncError> {
    let parsed: HoldingsResponse = serde_json::from_slice(body)?;
    Ok(parsed.data.user_holding)
}

pub struct ReqwestHoldingsProvider {
    client: Client,
    url: String,
}

impl ReqwestHoldingsProvider {
    pub fn new(url: &str) -> Self {
        Self {
            client: Client::new(),
            url: url.to_string(),
        }
    }
}

#[async_trait]
impl HoldingsProvider for ReqwestHoldingsProvider {
    async fn fetch_holdings(&self) -> Result<Vec<Holding>, SyncError> {
        let response = self
            .client
            .get(&self.url)
            .header("Accept", "application/json")
            .send()
            .await?
            .error_for_status()?;

        let body = response.bytes().await?;
        let holdings = decode_holdings(&body)?;
        tracing::debug!(url = %self.url, fetched = holdings.len(), "Fetched holdings");
        Ok(holdings)
    }
}

// Scripted provider for tests and offline wiring: replays the queued results
// in order, then repeats the last one.
pub struct MockHoldingsProvider {
    results: Mutex<Vec<Result<Vec<Holding>, SyncError>>>,
    calls: Mutex<usize>,
}

impl MockHoldingsProvider {
    pub fn new(data: Vec<Holding>) -> Self {
        Self::scripted(vec![Ok(data)])
    }

    pub fn failing(err: SyncError) -> Self {
        Self::scripted(vec![Err(err)])
    }

    pub fn scripted(results: Vec<Result<Vec<Holding>, SyncError>>) -> Self {
        Self {
            results: Mutex::new(results),
            calls: Mutex::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.lock().map(|c| *c).unwrap_or(0)
    }
}

#[async_trait]
impl HoldingsProvider for MockHoldingsProvider {
    async fn fetch_holdings(&self) -> Result<Vec<Holding>, SyncError> {
        if let Ok(mut calls) = self.calls.lock() {
            *calls += 1;
        }
        let mut results = self
            .results
            .lock()
            .map_err(|_| SyncError::Network("mock provider poisoned".to_string()))?;
        match results.len() {
            0 => Err(SyncError::Network("mock provider has no scripted result".to_string())),
            1 => results[0].clone(),
            _ => results.remove(0),
        }
    }
}
