// src/pipeline/reconcile.rs

//! Reconciliation: merge one cycle's drafts into the persisted store.
//!
//! Three steps inside one transaction:
//! 1. demote every `New` record to `Interesting`;
//! 2. merge drafts — known ids get their fields refreshed (status and
//!    analysis untouched), unknown ids are inserted as `New`;
//! 3. report the fresh inserts and counts.
//!
//! Any store fault aborts the whole reconciliation; the transaction is
//! dropped and nothing has changed.

use chrono::Utc;

use crate::error::{AppError, Result};
use crate::models::{TenderDraft, TenderRecord};
use crate::storage::TenderStore;

/// What one reconciliation did.
#[derive(Debug, Default)]
pub struct ReconcileOutcome {
    /// Drafts handed in this cycle
    pub found: usize,
    /// Freshly inserted records
    pub new: usize,
    /// Existing records refreshed
    pub updated: usize,
    /// Records demoted from New to Interesting at the cycle boundary
    pub demoted: usize,
    /// The fresh inserts, for notification
    pub new_records: Vec<TenderRecord>,
}

/// Run the per-cycle state machine over the store.
pub async fn reconcile(
    store: &dyn TenderStore,
    drafts: &[TenderDraft],
) -> Result<ReconcileOutcome> {
    let now = Utc::now();
    let mut tx = store.begin().await.map_err(reconciliation_fault)?;

    let demoted = tx.demote_all_new();
    if demoted > 0 {
        log::info!("{} previously NEW tenders demoted to INTERESTING", demoted);
    }

    let mut outcome = ReconcileOutcome {
        found: drafts.len(),
        demoted,
        ..ReconcileOutcome::default()
    };

    for draft in drafts {
        if tx.find_by_id(&draft.id).is_some() {
            tx.upsert_fields(draft, now);
            outcome.updated += 1;
        } else {
            let record = draft.clone().into_record(now);
            outcome.new_records.push(record.clone());
            tx.insert(record);
            outcome.new += 1;
        }
    }

    store.commit(tx).await.map_err(reconciliation_fault)?;

    log::info!(
        "Store updated: {} new, {} updated tenders",
        outcome.new,
        outcome.updated
    );
    Ok(outcome)
}

/// Store faults surface as reconciliation faults, the one error kind that
/// crosses the cycle boundary.
fn reconciliation_fault(e: AppError) -> AppError {
    match e {
        AppError::Reconciliation(_) => e,
        other => AppError::reconciliation(other),
    }
}
