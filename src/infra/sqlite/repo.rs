use crate::domain::models::Holding;
use crate::domain::repository::{HoldingStore, StoreResult};
use async_trait::async_trait;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;

pub struct SqliteHoldingStore {
    pub pool: SqlitePool,
}

impl SqliteHoldingStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Opens (creating if missing) the database at `url` and applies migrations.
    pub async fn connect(url: &str) -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        if let Some(parent) = options.get_filename().parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let pool = SqlitePoolOptions::new().connect_with(options).await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self::new(pool))
    }
}

#[async_trait]
impl HoldingStore for SqliteHoldingStore {
    async fn read_all(&self) -> StoreResult<Vec<Holding>> {
        let rows = sqlx::query_as::<_, Holding>(
            "SELECT symbol, quantity, ltp, avg_price, close FROM holdings ORDER BY position ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    // The transaction rolls back if dropped before commit, so an abandoned
    // write leaves the previous snapshot in place.
    async fn replace_all(&self, holdings: &[Holding]) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM holdings").execute(&mut *tx).await?;
        for (position, h) in holdings.iter().enumerate() {
            sqlx::query(
                "INSERT OR REPLACE INTO holdings (symbol, quantity, ltp, avg_price, close, position) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )
            .bind(&h.symbol)
            .bind(h.quantity)
            .bind(h.ltp)
            .bind(h.avg_price)
            .bind(h.close)
            .bind(position as i64)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        tracing::debug!(rows = holdings.len(), "Replaced persisted holdings");
        Ok(())
    }
}
