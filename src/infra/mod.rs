pub mod memory;
pub mod sqlite;

use crate::config::StoreBackend;
use crate::csv_store::FileCsvHoldingStore;
use crate::domain::repository::{HoldingStore, StoreResult};
use memory::InMemoryHoldingStore;
use sqlite::repo::SqliteHoldingStore;
use std::sync::Arc;

pub async fn open_store(backend: &StoreBackend) -> StoreResult<Arc<dyn HoldingStore>> {
    let store: Arc<dyn HoldingStore> = match backend {
        StoreBackend::Sqlite { database_url } => {
            Arc::new(SqliteHoldingStore::connect(database_url).await?)
        }
        StoreBackend::Csv { path } => Arc::new(FileCsvHoldingStore::new(path)),
        StoreBackend::Memory => Arc::new(InMemoryHoldingStore::new()),
    };
    Ok(store)
}
