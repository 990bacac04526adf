// src/notify.rs

//! Notification seam for freshly discovered tenders.
//!
//! Dispatch transport (mail, push, webhooks) lives outside the core; the
//! cycle only hands over the new records. Notification failures are logged
//! and never affect the cycle outcome.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::TenderRecord;

/// Receiver for the records a cycle freshly inserted.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, new_records: &[TenderRecord]) -> Result<()>;
}

/// Notifier that only writes log lines.
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, new_records: &[TenderRecord]) -> Result<()> {
        log::info!("{} new tenders found", new_records.len());
        for record in new_records {
            log::info!(
                "  [{}] {} ({}, Frist {})",
                record.source_portal,
                record.title,
                record.category,
                record.deadline
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_log_notifier_never_fails() {
        assert!(LogNotifier.notify(&[]).await.is_ok());
    }
}
