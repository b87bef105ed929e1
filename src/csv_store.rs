use csv::{Reader, WriterBuilder};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;

use crate::domain::models::Holding;
use crate::domain::repository::{HoldingStore, StoreResult};
use async_trait::async_trait;

/// Holdings persisted as a CSV file with a `symbol,quantity,ltp,avgPrice,close`
/// header. Every write goes to its own temp file in the same directory, which
/// is then renamed over the existing file.
pub struct FileCsvHoldingStore {
    path: PathBuf,
    next_write: AtomicU64,
    // Sequence number of the write currently on disk.
    committed: Arc<Mutex<u64>>,
}

impl FileCsvHoldingStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            next_write: AtomicU64::new(0),
            committed: Arc::new(Mutex::new(0)),
        }
    }
}

fn read_file(path: &Path) -> StoreResult<Vec<Holding>> {
    if !path.exists() {
        return Ok(vec![]);
    }
    let mut rdr = Reader::from_path(path)?;
    let mut holdings = Vec::new();
    for result in rdr.deserialize() {
        let record: Holding = result?;
        holdings.push(record);
    }
    Ok(holdings)
}

// A write that outlives its caller (the blocking task is detached when the
// future is dropped) must not land on top of a newer one, so renames happen
// under `committed` and only in sequence order.
fn write_file(path: &Path, holdings: &[Holding], seq: u64, committed: &Mutex<u64>) -> StoreResult<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    {
        let mut wtr = WriterBuilder::new().has_headers(true).from_writer(tmp.as_file_mut());
        if holdings.is_empty() {
            wtr.write_record(["symbol", "quantity", "ltp", "avgPrice", "close"])?;
        }
        for h in holdings {
            wtr.serialize(h)?;
        }
        wtr.flush()?;
    }

    let mut last = committed.lock().map_err(|_| "csv store write lock poisoned")?;
    if *last > seq {
        tracing::debug!(seq, committed = *last, "Skipping superseded holdings write");
        return Ok(());
    }
    tmp.persist(path)?;
    *last = seq;
    Ok(())
}

#[async_trait]
impl HoldingStore for FileCsvHoldingStore {
    async fn read_all(&self) -> StoreResult<Vec<Holding>> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || read_file(&path)).await?
    }

    async fn replace_all(&self, holdings: &[Holding]) -> StoreResult<()> {
        let seq = self.next_write.fetch_add(1, Ordering::AcqRel) + 1;
        let path = self.path.clone();
        let committed = self.committed.clone();
        let rows = holdings.to_vec();
        tokio::task::spawn_blocking(move || write_file(&path, &rows, seq, &committed)).await?
    }
}
