//! Pipeline stages for one crawl cycle.
//!
//! - `extract`: drive one adapter through a session into finalized drafts
//! - `reconcile`: merge a cycle's drafts into the store under the status
//!   state machine
//! - `cycle`: orchestrate all portals and a single reconciliation

pub mod cycle;
pub mod extract;
pub mod reconcile;

pub use cycle::{CycleSummary, run_cycle};
pub use extract::{PortalOutcome, crawl_portal};
pub use reconcile::{ReconcileOutcome, reconcile};
