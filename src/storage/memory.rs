//! In-memory storage backend for tests and embedding.

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::Result;
use crate::models::TenderRecord;
use crate::storage::{CycleTx, TenderStore};

/// Storage backend holding everything in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<Vec<TenderRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a preloaded record set.
    pub fn with_records(records: Vec<TenderRecord>) -> Self {
        Self {
            records: Mutex::new(records),
        }
    }
}

#[async_trait]
impl TenderStore for MemoryStore {
    async fn begin(&self) -> Result<CycleTx> {
        Ok(CycleTx::new(self.records.lock().await.clone()))
    }

    async fn commit(&self, tx: CycleTx) -> Result<()> {
        *self.records.lock().await = tx.into_records();
        Ok(())
    }

    async fn load(&self) -> Result<Vec<TenderRecord>> {
        Ok(self.records.lock().await.clone())
    }
}
