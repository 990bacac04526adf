// src/pipeline/cycle.rs

//! Cycle orchestration: crawl every enabled portal, reconcile once.

use std::sync::Arc;

use futures::stream::{self, StreamExt};

use crate::adapters::{Adapter, PortalAdapter};
use crate::error::Result;
use crate::models::{Config, ExtractionConfig, TenderRecord};
use crate::notify::Notifier;
use crate::pipeline::extract::{PortalOutcome, crawl_portal};
use crate::pipeline::reconcile::reconcile;
use crate::storage::TenderStore;
use crate::utils::http::HostGate;

/// Summary of one crawl cycle.
#[derive(Debug, Default)]
pub struct CycleSummary {
    /// Records found across all portals
    pub found: usize,
    /// Freshly inserted records
    pub new: usize,
    /// Existing records refreshed
    pub updated: usize,
    /// Portals that sat the cycle out entirely
    pub portal_failures: usize,
    /// The fresh inserts
    pub new_records: Vec<TenderRecord>,
}

/// Run one full cycle over the configured portals.
///
/// Only a reconciliation fault surfaces as an error; portal failures reduce
/// the counts and a faultless-but-empty cycle succeeds with `found = 0`.
pub async fn run_cycle(
    config: &Config,
    store: &dyn TenderStore,
    notifier: &dyn Notifier,
) -> Result<CycleSummary> {
    let gate = Arc::new(HostGate::from_config(&config.crawler));

    let adapters: Vec<PortalAdapter> = config
        .portals
        .iter()
        .filter(|portal| {
            if !portal.enabled {
                log::info!("Portal '{}' disabled - skipping", portal.name);
            }
            portal.enabled
        })
        .map(|portal| PortalAdapter::from_config(config, portal, Arc::clone(&gate)))
        .collect();

    run_cycle_with(
        &adapters,
        &config.extraction,
        config.crawler.max_concurrent,
        store,
        notifier,
    )
    .await
}

/// Cycle body over prepared adapters. Portals run in a bounded worker pool;
/// reconciliation is the single fan-in stage afterwards.
pub async fn run_cycle_with<A>(
    adapters: &[A],
    extraction: &ExtractionConfig,
    max_concurrent: usize,
    store: &dyn TenderStore,
    notifier: &dyn Notifier,
) -> Result<CycleSummary>
where
    A: Adapter,
{
    log::info!("Starting crawl cycle over {} portals", adapters.len());

    let outcomes: Vec<PortalOutcome> = stream::iter(adapters)
        .map(|adapter| crawl_portal(adapter, extraction))
        .buffer_unordered(max_concurrent.max(1))
        .collect()
        .await;

    let portal_failures = outcomes.iter().filter(|o| o.aborted).count();
    let drafts: Vec<_> = outcomes.into_iter().flat_map(|o| o.drafts).collect();

    let outcome = reconcile(store, &drafts).await?;

    if !outcome.new_records.is_empty() {
        // fire-and-forget: a failed notification never fails the cycle
        if let Err(e) = notifier.notify(&outcome.new_records).await {
            log::warn!("Notification failed: {}", e);
        }
    }

    log::info!(
        "Cycle complete: {} found, {} new, {} updated, {} portal failures",
        outcome.found,
        outcome.new,
        outcome.updated,
        portal_failures
    );

    Ok(CycleSummary {
        found: outcome.found,
        new: outcome.new,
        updated: outcome.updated,
        portal_failures,
        new_records: outcome.new_records,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::ExtractionConfig;
    use crate::notify::LogNotifier;
    use crate::pipeline::testing::StubAdapter;
    use crate::storage::MemoryStore;
    use async_trait::async_trait;
    use tokio::sync::Mutex;

    fn stub(name: &str, count: usize) -> StubAdapter {
        let records = (0..count)
            .map(|i| {
                StubAdapter::raw(
                    &format!("Ausschreibung {} {}", name, i),
                    &format!("https://stub.example.com/{}/{}", name, i),
                )
            })
            .collect();
        StubAdapter::yielding(name, records)
    }

    #[tokio::test]
    async fn test_partial_failure_resilience() {
        // portal 3 of 5 aborts; the cycle still succeeds with the other four
        let adapters = vec![
            stub("eins", 2),
            stub("zwei", 3),
            StubAdapter::failing("drei"),
            stub("vier", 1),
            stub("fuenf", 4),
        ];

        let store = MemoryStore::new();
        let summary = run_cycle_with(
            &adapters,
            &ExtractionConfig::default(),
            2,
            &store,
            &LogNotifier,
        )
        .await
        .unwrap();

        assert_eq!(summary.found, 10);
        assert_eq!(summary.new, 10);
        assert_eq!(summary.portal_failures, 1);
    }

    #[tokio::test]
    async fn test_empty_cycle_is_success() {
        let adapters: Vec<StubAdapter> = vec![StubAdapter::failing("tot")];
        let store = MemoryStore::new();
        let summary = run_cycle_with(
            &adapters,
            &ExtractionConfig::default(),
            1,
            &store,
            &LogNotifier,
        )
        .await
        .unwrap();

        assert_eq!(summary.found, 0);
        assert_eq!(summary.portal_failures, 1);
    }

    #[tokio::test]
    async fn test_notifier_receives_only_new_records() {
        #[derive(Default)]
        struct CollectingNotifier {
            seen: Mutex<Vec<String>>,
        }

        #[async_trait]
        impl Notifier for CollectingNotifier {
            async fn notify(&self, new_records: &[TenderRecord]) -> crate::error::Result<()> {
                let mut seen = self.seen.lock().await;
                seen.extend(new_records.iter().map(|r| r.id.clone()));
                Ok(())
            }
        }

        let store = MemoryStore::new();
        let notifier = CollectingNotifier::default();

        let adapters = vec![stub("eins", 2)];
        run_cycle_with(&adapters, &ExtractionConfig::default(), 1, &store, &notifier)
            .await
            .unwrap();
        assert_eq!(notifier.seen.lock().await.len(), 2);

        // rediscovery: nothing new, nothing notified
        let adapters = vec![stub("eins", 2)];
        run_cycle_with(&adapters, &ExtractionConfig::default(), 1, &store, &notifier)
            .await
            .unwrap();
        assert_eq!(notifier.seen.lock().await.len(), 2);
    }

    #[tokio::test]
    async fn test_notification_failure_keeps_cycle_green() {
        struct ExplodingNotifier;

        #[async_trait]
        impl Notifier for ExplodingNotifier {
            async fn notify(&self, _: &[TenderRecord]) -> crate::error::Result<()> {
                Err(AppError::Notification("smtp down".to_string()))
            }
        }

        let store = MemoryStore::new();
        let adapters = vec![stub("eins", 1)];
        let summary = run_cycle_with(
            &adapters,
            &ExtractionConfig::default(),
            1,
            &store,
            &ExplodingNotifier,
        )
        .await
        .unwrap();

        assert_eq!(summary.new, 1);
    }
}
