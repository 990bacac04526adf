//! Storage abstractions for tender persistence.
//!
//! The reconciler works against a [`CycleTx`]: a snapshot of the whole
//! record set taken at cycle start, mutated in memory, and committed as one
//! unit. A commit either lands completely or leaves the store untouched —
//! that boundary is what makes the demote/merge sequence transactional.

pub mod local;
pub mod memory;

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::{TenderDraft, TenderRecord, TenderStatus};

// Re-export for convenience
pub use local::LocalStore;
pub use memory::MemoryStore;

/// One cycle's transaction over the record set.
#[derive(Debug, Default)]
pub struct CycleTx {
    records: HashMap<String, TenderRecord>,
}

impl CycleTx {
    /// Start a transaction from a snapshot of the stored records.
    pub fn new(records: Vec<TenderRecord>) -> Self {
        Self {
            records: records.into_iter().map(|r| (r.id.clone(), r)).collect(),
        }
    }

    /// Demote every `New` record to `Interesting`; returns how many changed.
    ///
    /// Runs before any merge, so the only way a record is `New` afterwards
    /// is a fresh insert in this very cycle.
    pub fn demote_all_new(&mut self) -> usize {
        let mut demoted = 0;
        for record in self.records.values_mut() {
            if record.status == TenderStatus::New {
                record.status = TenderStatus::Interesting;
                demoted += 1;
            }
        }
        demoted
    }

    /// Look up a record by id.
    pub fn find_by_id(&self, id: &str) -> Option<&TenderRecord> {
        self.records.get(id)
    }

    /// Overwrite an existing record's crawl-owned fields from a draft.
    /// Returns false when no record with that id exists.
    pub fn upsert_fields(&mut self, draft: &TenderDraft, now: DateTime<Utc>) -> bool {
        match self.records.get_mut(&draft.id) {
            Some(record) => {
                record.refresh_from(draft, now);
                true
            }
            None => false,
        }
    }

    /// Insert a new record.
    pub fn insert(&mut self, record: TenderRecord) {
        self.records.insert(record.id.clone(), record);
    }

    /// All records in the transaction.
    pub fn records(&self) -> impl Iterator<Item = &TenderRecord> {
        self.records.values()
    }

    /// Number of records in the transaction.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Consume into a stable, id-sorted record list for persistence.
    pub fn into_records(self) -> Vec<TenderRecord> {
        let mut records: Vec<_> = self.records.into_values().collect();
        records.sort_by(|a, b| a.id.cmp(&b.id));
        records
    }
}

/// Trait for tender storage backends.
#[async_trait]
pub trait TenderStore: Send + Sync {
    /// Snapshot the current record set into a transaction.
    async fn begin(&self) -> Result<CycleTx>;

    /// Persist a transaction atomically. On error nothing has changed.
    async fn commit(&self, tx: CycleTx) -> Result<()>;

    /// Read-only view of the stored records.
    async fn load(&self) -> Result<Vec<TenderRecord>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TenderDraft;

    fn draft(id: &str) -> TenderDraft {
        TenderDraft {
            id: id.to_string(),
            title: format!("Ausschreibung {}", id),
            authority: "Testvergabestelle".to_string(),
            location: "Graz".to_string(),
            deadline: "2026-08-28".to_string(),
            published_at: "2026-08-07".to_string(),
            budget: None,
            category: "Tiefbau".to_string(),
            description: "Beschreibung".to_string(),
            source_url: format!("https://example.com/{}", id),
            source_portal: "example.com".to_string(),
        }
    }

    #[test]
    fn test_demote_all_new_empties_new_set() {
        let now = Utc::now();
        let mut tx = CycleTx::new(vec![
            draft("t-1").into_record(now),
            draft("t-2").into_record(now),
        ]);

        assert_eq!(tx.demote_all_new(), 2);
        assert!(
            tx.records()
                .all(|r| r.status == TenderStatus::Interesting)
        );
        // second demotion is a no-op
        assert_eq!(tx.demote_all_new(), 0);
    }

    #[test]
    fn test_demotion_skips_operator_statuses() {
        let now = Utc::now();
        let mut applied = draft("t-1").into_record(now);
        applied.status = TenderStatus::Applied;
        let mut tx = CycleTx::new(vec![applied]);

        assert_eq!(tx.demote_all_new(), 0);
        assert_eq!(
            tx.find_by_id("t-1").unwrap().status,
            TenderStatus::Applied
        );
    }

    #[test]
    fn test_upsert_fields_requires_existing() {
        let now = Utc::now();
        let mut tx = CycleTx::new(vec![]);
        assert!(!tx.upsert_fields(&draft("t-1"), now));

        tx.insert(draft("t-1").into_record(now));
        let mut changed = draft("t-1");
        changed.title = "Neuer Titel".to_string();
        assert!(tx.upsert_fields(&changed, now));
        assert_eq!(tx.find_by_id("t-1").unwrap().title, "Neuer Titel");
    }

    #[test]
    fn test_into_records_sorted() {
        let now = Utc::now();
        let mut tx = CycleTx::new(vec![]);
        tx.insert(draft("t-b").into_record(now));
        tx.insert(draft("t-a").into_record(now));

        let records = tx.into_records();
        assert_eq!(records[0].id, "t-a");
        assert_eq!(records[1].id, "t-b");
    }
}
