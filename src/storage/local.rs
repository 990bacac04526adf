//! Local filesystem storage backend.
//!
//! A single JSON snapshot file (`tenders.json`) holding the whole record
//! set. Writes go to a temp file first and are renamed into place, so a
//! failed commit leaves the previous snapshot intact.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::TenderRecord;
use crate::storage::{CycleTx, TenderStore};

const SNAPSHOT_FILE: &str = "tenders.json";

/// Snapshot file header.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SnapshotData {
    /// ISO 8601 timestamp of last commit
    updated_at: DateTime<Utc>,
    /// Total record count
    count: usize,
    /// The records, id-sorted
    tenders: Vec<TenderRecord>,
}

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct LocalStore {
    root_dir: PathBuf,
}

impl LocalStore {
    /// Create a new LocalStore rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    fn snapshot_path(&self) -> PathBuf {
        self.root_dir.join(SNAPSHOT_FILE)
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, bytes: &[u8]) -> Result<()> {
        let path = self.snapshot_path();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    /// Read the snapshot, returning None if no file exists yet.
    async fn read_snapshot(&self) -> Result<Option<SnapshotData>> {
        match tokio::fs::read(self.snapshot_path()).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }
}

#[async_trait]
impl TenderStore for LocalStore {
    async fn begin(&self) -> Result<CycleTx> {
        let records = self.load().await?;
        Ok(CycleTx::new(records))
    }

    async fn commit(&self, tx: CycleTx) -> Result<()> {
        let data = SnapshotData {
            updated_at: Utc::now(),
            count: tx.len(),
            tenders: tx.into_records(),
        };
        let bytes = serde_json::to_vec_pretty(&data)?;
        self.write_bytes(&bytes).await?;
        log::info!(
            "Snapshot written: {} tenders in {}",
            data.count,
            self.snapshot_path().display()
        );
        Ok(())
    }

    async fn load(&self) -> Result<Vec<TenderRecord>> {
        match self.read_snapshot().await? {
            Some(data) => Ok(data.tenders),
            None => Ok(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TenderDraft, TenderStatus};
    use tempfile::TempDir;

    fn draft(id: &str) -> TenderDraft {
        TenderDraft {
            id: id.to_string(),
            title: "Kanalbau".to_string(),
            authority: "Gemeinde".to_string(),
            location: "Linz".to_string(),
            deadline: "2026-08-28".to_string(),
            published_at: "2026-08-07".to_string(),
            budget: None,
            category: "Tiefbau".to_string(),
            description: "Kanalbauarbeiten".to_string(),
            source_url: format!("https://example.com/{}", id),
            source_portal: "example.com".to_string(),
        }
    }

    #[tokio::test]
    async fn test_begin_on_empty_dir() {
        let tmp = TempDir::new().unwrap();
        let store = LocalStore::new(tmp.path());

        let tx = store.begin().await.unwrap();
        assert!(tx.is_empty());
    }

    #[tokio::test]
    async fn test_commit_then_load_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let store = LocalStore::new(tmp.path());

        let mut tx = store.begin().await.unwrap();
        tx.insert(draft("t-1").into_record(Utc::now()));
        tx.insert(draft("t-2").into_record(Utc::now()));
        store.commit(tx).await.unwrap();

        let records = store.load().await.unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.status == TenderStatus::New));
    }

    #[tokio::test]
    async fn test_commit_replaces_snapshot() {
        let tmp = TempDir::new().unwrap();
        let store = LocalStore::new(tmp.path());

        let mut tx = store.begin().await.unwrap();
        tx.insert(draft("t-1").into_record(Utc::now()));
        store.commit(tx).await.unwrap();

        let mut tx = store.begin().await.unwrap();
        assert_eq!(tx.len(), 1);
        tx.demote_all_new();
        store.commit(tx).await.unwrap();

        let records = store.load().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, TenderStatus::Interesting);
    }
}
