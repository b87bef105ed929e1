use crate::domain::models::Holding;
use async_trait::async_trait;

pub type StoreResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Durable copy of the last successfully fetched holdings. Treated as a single
/// blob: it is only ever read whole or replaced whole.
#[async_trait]
pub trait HoldingStore: Send + Sync {
    // Empty when nothing was ever persisted.
    async fn read_all(&self) -> StoreResult<Vec<Holding>>;
    // Discards prior contents; either every row lands or none do.
    async fn replace_all(&self, holdings: &[Holding]) -> StoreResult<()>;
}
