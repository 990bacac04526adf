//! Tender record data structures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a stored tender record.
///
/// `New` and `Interesting` are owned by the crawl pipeline; `Applied` and
/// `Rejected` are operator decisions the pipeline never writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TenderStatus {
    #[serde(rename = "NEW")]
    New,
    #[serde(rename = "INTERESTING")]
    Interesting,
    #[serde(rename = "APPLIED")]
    Applied,
    #[serde(rename = "REJECTED")]
    Rejected,
}

/// Operator/automation-attached annotation.
///
/// Filled through the external API only; reconciliation carries it along
/// untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub summary: String,
    pub relevance_score: u8,
    pub key_risks: Vec<String>,
    pub recommendation: String,
}

/// A persisted tender record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TenderRecord {
    /// Stable content-addressed identifier
    pub id: String,

    /// Announcement title
    pub title: String,

    /// Contracting authority
    pub authority: String,

    /// Location, typically "City, Region"
    pub location: String,

    /// Submission deadline as `YYYY-MM-DD`
    pub deadline: String,

    /// Publication date as `YYYY-MM-DD`
    pub published_at: String,

    /// Free-text budget if the source exposes one
    pub budget: Option<String>,

    /// Categorizer output; never empty
    pub category: String,

    /// Announcement text, truncated to the configured maximum
    pub description: String,

    /// Lifecycle status
    pub status: TenderStatus,

    /// URL the record was extracted from
    pub source_url: String,

    /// Portal the record came from
    pub source_portal: String,

    /// Last successful reconciliation touch
    pub crawled_at: DateTime<Utc>,

    /// Optional operator annotation, never written by the pipeline
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<Analysis>,
}

impl TenderRecord {
    /// Overwrite the crawl-owned fields from a freshly extracted draft.
    ///
    /// `status` and `analysis` are preserved; the latest crawl is the source
    /// of truth for everything else.
    pub fn refresh_from(&mut self, draft: &TenderDraft, now: DateTime<Utc>) {
        self.title = draft.title.clone();
        self.authority = draft.authority.clone();
        self.location = draft.location.clone();
        self.deadline = draft.deadline.clone();
        self.published_at = draft.published_at.clone();
        self.budget = draft.budget.clone();
        self.category = draft.category.clone();
        self.description = draft.description.clone();
        self.source_url = draft.source_url.clone();
        self.source_portal = draft.source_portal.clone();
        self.crawled_at = now;
    }
}

/// Raw adapter output for one candidate announcement.
///
/// Field strings exactly as extracted; no id, no category, no status. Those
/// are assigned uniformly by the pipeline so the logic is never duplicated
/// per adapter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTender {
    pub title: String,
    pub authority: String,
    pub location: String,
    pub deadline: String,
    pub published_at: String,
    pub budget: Option<String>,
    pub description: String,
    pub source_url: String,
    pub source_portal: String,
}

/// A finalized candidate: raw fields plus pipeline-assigned id and category.
///
/// This is the unit handed to the reconciler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TenderDraft {
    pub id: String,
    pub title: String,
    pub authority: String,
    pub location: String,
    pub deadline: String,
    pub published_at: String,
    pub budget: Option<String>,
    pub category: String,
    pub description: String,
    pub source_url: String,
    pub source_portal: String,
}

impl TenderDraft {
    /// Build a brand-new record from this draft with `status = New`.
    pub fn into_record(self, now: DateTime<Utc>) -> TenderRecord {
        TenderRecord {
            id: self.id,
            title: self.title,
            authority: self.authority,
            location: self.location,
            deadline: self.deadline,
            published_at: self.published_at,
            budget: self.budget,
            category: self.category,
            description: self.description,
            status: TenderStatus::New,
            source_url: self.source_url,
            source_portal: self.source_portal,
            crawled_at: now,
            analysis: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_draft() -> TenderDraft {
        TenderDraft {
            id: "t-0123456789ab".to_string(),
            title: "Dachsanierung Rathaus".to_string(),
            authority: "Stadt Salzburg".to_string(),
            location: "Salzburg, Oesterreich".to_string(),
            deadline: "2026-08-28".to_string(),
            published_at: "2026-08-07".to_string(),
            budget: None,
            category: "Dacharbeiten".to_string(),
            description: "Erneuerung Flachdach mit Abdichtung".to_string(),
            source_url: "https://example.com/tender/1".to_string(),
            source_portal: "example.com".to_string(),
        }
    }

    #[test]
    fn test_into_record_starts_new() {
        let record = sample_draft().into_record(Utc::now());
        assert_eq!(record.status, TenderStatus::New);
        assert!(record.analysis.is_none());
    }

    #[test]
    fn test_refresh_keeps_status_and_analysis() {
        let now = Utc::now();
        let mut record = sample_draft().into_record(now);
        record.status = TenderStatus::Applied;
        record.analysis = Some(Analysis {
            summary: "solid fit".to_string(),
            relevance_score: 80,
            key_risks: vec!["tight deadline".to_string()],
            recommendation: "STRONG_BID".to_string(),
        });

        let mut updated = sample_draft();
        updated.description = "Neue Beschreibung".to_string();
        record.refresh_from(&updated, now);

        assert_eq!(record.status, TenderStatus::Applied);
        assert!(record.analysis.is_some());
        assert_eq!(record.description, "Neue Beschreibung");
    }

    #[test]
    fn test_status_serializes_as_screaming_case() {
        let json = serde_json::to_string(&TenderStatus::Interesting).unwrap();
        assert_eq!(json, "\"INTERESTING\"");
    }
}
