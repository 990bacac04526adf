// src/pipeline/extract.rs

//! Extraction pipeline: one adapter, one session, finalized drafts out.
//!
//! The pipeline owns everything adapters must not duplicate: the
//! content-hash id, categorization, date fallbacks and description
//! truncation, applied uniformly after extraction.

use chrono::{DateTime, Utc};

use crate::adapters::Adapter;
use crate::categorize;
use crate::error::{AppError, Result};
use crate::models::{ExtractionConfig, PortalConfig, RawTender, TenderDraft};
use crate::utils::{date, hash, text};

/// Title length cap applied at finalization.
const TITLE_MAX_LEN: usize = 200;

/// What one portal contributed to the cycle.
#[derive(Debug, Default)]
pub struct PortalOutcome {
    /// Portal display name
    pub portal: String,
    /// Finalized drafts ready for reconciliation
    pub drafts: Vec<TenderDraft>,
    /// The session could not even open; the portal sat this cycle out
    pub aborted: bool,
    /// Candidates dropped by per-item validation
    pub discarded: usize,
}

/// Crawl one portal: open a session, discover candidates, extract each with
/// per-item failure isolation, finalize uniformly.
///
/// Never returns an error — a portal's total failure is an `aborted`
/// outcome, not a cycle fault.
pub async fn crawl_portal<A>(adapter: &A, extraction: &ExtractionConfig) -> PortalOutcome
where
    A: Adapter + ?Sized,
{
    let portal = adapter.portal().clone();
    let mut outcome = PortalOutcome {
        portal: portal.name.clone(),
        ..PortalOutcome::default()
    };

    let mut session = match adapter.open().await {
        Ok(session) => session,
        Err(e) => {
            log::error!("Portal '{}' aborted for this cycle: {}", portal.name, e);
            outcome.aborted = true;
            return outcome;
        }
    };

    let urls = adapter.discover(&mut session).await;
    let now = Utc::now();

    for url in urls {
        let Some(raw) = adapter.extract(&mut session, &url).await else {
            outcome.discarded += 1;
            log::debug!("{}: candidate {} yielded nothing", portal.name, url);
            continue;
        };

        match finalize(raw, &portal, extraction, now) {
            Ok(draft) => outcome.drafts.push(draft),
            Err(e) => {
                outcome.discarded += 1;
                log::warn!("{}: candidate discarded: {}", portal.name, e);
            }
        }
    }

    log::info!(
        "Portal '{}': {} tenders extracted, {} discarded",
        portal.name,
        outcome.drafts.len(),
        outcome.discarded
    );
    outcome
}

/// Normalize a raw record into a draft: bounded fields, canonical dates,
/// content-hash id, category.
pub(crate) fn finalize(
    raw: RawTender,
    portal: &PortalConfig,
    extraction: &ExtractionConfig,
    now: DateTime<Utc>,
) -> Result<TenderDraft> {
    let title = text::truncate(&text::normalize_whitespace(&raw.title), TITLE_MAX_LEN);
    if title.is_empty() {
        return Err(AppError::extraction("candidate without title"));
    }

    let description = text::truncate(
        &text::normalize_whitespace(&raw.description),
        extraction.max_description_len,
    );

    let today = now.date_naive();
    let published_at = date::parse_source_date(&raw.published_at)
        .map(date::canonical)
        .unwrap_or_else(|| date::canonical(today));
    // heuristic fallback, not a guess at the true deadline
    let deadline = date::parse_source_date(&raw.deadline)
        .map(date::canonical)
        .unwrap_or_else(|| date::offset(today, portal.fallback_deadline_days));

    let id = derive_id(&raw, portal, &title, &description);

    let mut category = categorize::categorize(&title, &description);
    if category == categorize::FALLBACK_CATEGORY && !portal.criteria.trim().is_empty() {
        // portal-level hint as a last resort before the fallback label
        category = categorize::categorize(&portal.criteria, "");
    }

    let authority = match raw.authority.trim() {
        "" => portal.name.clone(),
        a => a.to_string(),
    };
    let location = match raw.location.trim() {
        "" if portal.region.is_empty() => "Unbekannt".to_string(),
        "" => portal.region.clone(),
        l => l.to_string(),
    };
    let source_portal = match raw.source_portal.trim() {
        "" => portal.name.clone(),
        p => p.to_string(),
    };

    Ok(TenderDraft {
        id,
        title,
        authority,
        location,
        deadline,
        published_at,
        budget: raw.budget,
        category,
        description,
        source_url: raw.source_url,
        source_portal,
    })
}

/// Content-addressed id: hash of the source URL when the candidate has one
/// of its own, hash of the normalized text when the link fell back to the
/// portal root and cannot distinguish candidates.
fn derive_id(raw: &RawTender, portal: &PortalConfig, title: &str, description: &str) -> String {
    let url = raw.source_url.trim_end_matches('/');
    let root = portal.url.trim_end_matches('/');
    if !url.is_empty() && url != root {
        hash::content_id(url)
    } else {
        hash::content_id(&format!("{} {}", title, description))
    }
}
