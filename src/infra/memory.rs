use crate::domain::models::Holding;
use crate::domain::repository::{HoldingStore, StoreResult};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

/// Process-local store. Used when no persistence is configured and in tests.
#[derive(Default)]
pub struct InMemoryHoldingStore {
    holdings: RwLock<Vec<Holding>>,
    writes: AtomicUsize,
}

impl InMemoryHoldingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_holdings(holdings: Vec<Holding>) -> Self {
        Self {
            holdings: RwLock::new(holdings),
            writes: AtomicUsize::new(0),
        }
    }

    /// Number of completed `replace_all` calls.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::Acquire)
    }
}

#[async_trait]
impl HoldingStore for InMemoryHoldingStore {
    async fn read_all(&self) -> StoreResult<Vec<Holding>> {
        Ok(self.holdings.read().await.clone())
    }

    async fn replace_all(&self, holdings: &[Holding]) -> StoreResult<()> {
        *self.holdings.write().await = holdings.to_vec();
        self.writes.fetch_add(1, Ordering::AcqRel);
        Ok(())
    }
}
