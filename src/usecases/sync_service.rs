use crate::api_client::HoldingsProvider;
use crate::domain::models::{Snapshot, dedupe_by_symbol};
use crate::domain::repository::HoldingStore;
use crate::errors::SyncError;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{Mutex, watch};
use tracing::{debug, error, info, warn};

/// Last known state of the holdings, as published to subscribers.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncState {
    Idle,
    // Carries the previous snapshot, if any, so it stays visible during a refresh.
    Loading(Option<Snapshot>),
    Ready(Snapshot),
    Failed(SyncError),
}

impl SyncState {
    pub fn snapshot(&self) -> Option<&Snapshot> {
        match self {
            SyncState::Ready(snapshot) | SyncState::Loading(Some(snapshot)) => Some(snapshot),
            _ => None,
        }
    }
}

/// Fetches holdings from the remote source, writes them through to the store
/// and falls back to the stored copy when the fetch fails.
pub struct SyncEngine {
    provider: Arc<dyn HoldingsProvider>,
    store: Arc<dyn HoldingStore>,
    state: watch::Sender<SyncState>,
    in_flight: Mutex<()>,
    completed: AtomicU64,
}

impl SyncEngine {
    pub fn new(provider: Arc<dyn HoldingsProvider>, store: Arc<dyn HoldingStore>) -> Self {
        let (state, _) = watch::channel(SyncState::Idle);
        Self {
            provider,
            store,
            state,
            in_flight: Mutex::new(()),
            completed: AtomicU64::new(0),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SyncState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> SyncState {
        self.state.borrow().clone()
    }

    /// Runs one sync attempt. A call made while another attempt is in flight
    /// waits for it and returns its outcome instead of fetching again.
    #[tracing::instrument(skip(self))]
    pub async fn sync(&self) -> Result<Snapshot, SyncError> {
        let seen = self.completed.load(Ordering::Acquire);
        let _guard = self.in_flight.lock().await;
        if self.completed.load(Ordering::Acquire) != seen {
            match self.state() {
                SyncState::Ready(snapshot) => {
                    debug!("Merged into completed sync");
                    return Ok(snapshot);
                }
                SyncState::Failed(err) => {
                    debug!("Merged into completed sync");
                    return Err(err);
                }
                _ => {}
            }
        }

        let mut loading = LoadingMarker::start(&self.state);
        let outcome = self.attempt().await;
        loading.finish(match &outcome {
            Ok(snapshot) => SyncState::Ready(snapshot.clone()),
            Err(err) => SyncState::Failed(err.clone()),
        });
        self.completed.fetch_add(1, Ordering::AcqRel);
        outcome
    }

    async fn attempt(&self) -> Result<Snapshot, SyncError> {
        let fetch_err = match self.provider.fetch_holdings().await {
            Ok(holdings) => {
                let holdings = dedupe_by_symbol(holdings);
                if let Err(e) = self.store.replace_all(&holdings).await {
                    warn!(error = %e, "Failed to persist holdings, returning fresh data anyway");
                }
                info!(count = holdings.len(), "Synced holdings from remote");
                return Ok(Snapshot::remote(holdings));
            }
            Err(e) => e,
        };

        warn!(kind = fetch_err.kind(), error = %fetch_err, "Remote fetch failed, falling back to cache");
        match self.store.read_all().await {
            Ok(cached) if !cached.is_empty() => {
                info!(count = cached.len(), "Serving cached holdings");
                Ok(Snapshot::cached(cached))
            }
            Ok(_) => {
                error!(kind = fetch_err.kind(), "No cached holdings to fall back on");
                Err(fetch_err)
            }
            Err(e) => {
                error!(error = %e, "Failed reading cached holdings");
                Err(fetch_err)
            }
        }
    }
}

// Publishes `Loading` for the duration of an attempt, keeping whatever
// snapshot was on display. If the attempt is dropped before finishing, the
// previous state is restored.
struct LoadingMarker<'a> {
    state: &'a watch::Sender<SyncState>,
    previous: Option<SyncState>,
}

impl<'a> LoadingMarker<'a> {
    fn start(state: &'a watch::Sender<SyncState>) -> Self {
        let carried = state.borrow().snapshot().cloned();
        let previous = state.send_replace(SyncState::Loading(carried));
        Self {
            state,
            previous: Some(previous),
        }
    }

    fn finish(&mut self, outcome: SyncState) {
        self.previous = None;
        self.state.send_replace(outcome);
    }
}

impl Drop for LoadingMarker<'_> {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            self.state.send_replace(previous);
        }
    }
}
