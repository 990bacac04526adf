// src/adapters/fixed.rs

//! Fixed adapters: pre-tuned selector profiles for known portals.
//!
//! Mechanical by design. Each built-in portal has a [`SiteProfile`] naming
//! where its listing lives and which selectors carve out rows, titles,
//! authorities and dates; one generic extraction routine drives all of
//! them. New portals mean new profile data, not new code.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::OnceLock;

use regex::Regex;
use scraper::{ElementRef, Html};

use crate::error::Result;
use crate::lexicon;
use crate::models::{CrawlerConfig, PortalConfig, RawTender};
use crate::utils::{date, text};

use super::{Adapter, Candidate, Session, element_href, join_location, parse_selector, resolve_href};

/// Detail-page description selectors, tried in order; first element with a
/// text longer than this many characters wins.
const DETAIL_SELECTORS: &[&str] = &[
    ".description",
    ".content",
    ".detail-text",
    ".ausschreibung-text",
    "article",
    ".tender-description",
    "#description",
    ".main-content",
    "p",
    ".text-content",
];

const MIN_DETAIL_TEXT_LEN: usize = 50;

/// Detail-page descriptions are capped like every stored description.
const DETAIL_MAX_LEN: usize = 2000;

/// Pre-tuned extraction profile for one known portal.
#[derive(Debug)]
pub struct SiteProfile {
    /// Key referenced by `PortalConfig::profile`
    pub key: &'static str,
    /// Listing page path appended to the portal root
    pub listing_path: &'static str,
    /// Selector for candidate rows/links on the listing page
    pub row_selector: &'static str,
    /// Title element within a row; row text when unset
    pub title_selector: Option<&'static str>,
    /// Authority element within a row; `authority` fallback when unset
    pub authority_selector: Option<&'static str>,
    /// Publication date element; the whole row text is scanned when unset
    pub date_selector: Option<&'static str>,
    /// Deadline element, when the listing exposes one
    pub deadline_selector: Option<&'static str>,
    /// Link element within a row; the row's own href otherwise
    pub link_selector: Option<&'static str>,
    /// Row text (or href) must contain one of these, lowercase; empty = all
    pub keyword_filter: &'static [&'static str],
    /// Rows with less text than this are noise
    pub min_text_len: usize,
    /// Rows with more text than this are page furniture, not entries (0 = no cap)
    pub max_text_len: usize,
    /// Title word cap for free-text rows (0 = character cap only)
    pub title_word_cap: usize,
    /// Default contracting authority
    pub authority: &'static str,
    /// Fetch each candidate's detail page for a fuller description
    pub fetch_detail: bool,
    /// Maximum candidates accepted per cycle
    pub max_items: usize,
}

/// Built-in portal profiles.
static PROFILES: &[SiteProfile] = &[
    SiteProfile {
        key: "ausschreibung_at",
        listing_path: "",
        row_selector: r#"a[href*="/Ausschreibung/"]"#,
        title_selector: None,
        authority_selector: None,
        date_selector: None,
        deadline_selector: None,
        link_selector: None,
        keyword_filter: &[],
        min_text_len: 11,
        max_text_len: 0,
        title_word_cap: 0,
        authority: "Vergabestelle Oesterreich",
        fetch_detail: true,
        max_items: 10,
    },
    SiteProfile {
        key: "staatsanzeiger",
        listing_path: "/sol-b.html",
        row_selector: "a[href]",
        title_selector: None,
        authority_selector: None,
        date_selector: None,
        deadline_selector: None,
        link_selector: None,
        keyword_filter: &["ausschreibung", "vergabe", "bauauftrag", "leistung", "lieferung"],
        min_text_len: 21,
        max_text_len: 0,
        title_word_cap: 0,
        authority: "Staatsanzeiger Baden-Wuerttemberg",
        fetch_detail: false,
        max_items: 10,
    },
    SiteProfile {
        key: "deutsche_evergabe",
        listing_path: "",
        row_selector: "a[href]",
        title_selector: None,
        authority_selector: None,
        date_selector: None,
        deadline_selector: None,
        link_selector: None,
        keyword_filter: &["ausschreibung", "vergabe", "projekt", "auftrag"],
        min_text_len: 16,
        max_text_len: 0,
        title_word_cap: 0,
        authority: "Deutsche eVergabe",
        fetch_detail: false,
        max_items: 20,
    },
    SiteProfile {
        key: "rib",
        listing_path: "/public/publications",
        row_selector: "table tr, .publication-item, .card, article",
        title_selector: None,
        authority_selector: None,
        date_selector: None,
        deadline_selector: None,
        link_selector: None,
        keyword_filter: &[],
        min_text_len: 31,
        max_text_len: 1000,
        title_word_cap: 15,
        authority: "RIB Vergabeplattform",
        fetch_detail: false,
        max_items: 20,
    },
    SiteProfile {
        key: "tender24",
        listing_path: "",
        row_selector: "table tr",
        title_selector: Some("td:nth-child(2)"),
        authority_selector: Some("td:nth-child(3)"),
        date_selector: Some("td:nth-child(1)"),
        deadline_selector: Some("td:nth-child(6)"),
        link_selector: Some("td:nth-child(2) a"),
        keyword_filter: &[],
        min_text_len: 15,
        max_text_len: 0,
        title_word_cap: 0,
        authority: "Diverse Vergabestellen",
        fetch_detail: true,
        max_items: 8,
    },
];

impl SiteProfile {
    /// Look up a built-in profile by key.
    pub fn find(key: &str) -> Option<&'static SiteProfile> {
        PROFILES.iter().find(|p| p.key == key)
    }

    /// All built-in profile keys.
    pub fn keys() -> Vec<&'static str> {
        PROFILES.iter().map(|p| p.key).collect()
    }
}

/// Remove a trailing "vom DD.MM.YYYY" marker from a listing title.
fn strip_date_suffix(title: &str) -> String {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN
        .get_or_init(|| Regex::new(r"\s*vom\s+\d{1,2}\.\d{1,2}\.\d{4}").expect("valid regex"));
    pattern.replace_all(title, "").trim().to_string()
}

/// Adapter driven by a pre-tuned site profile.
pub struct FixedAdapter {
    portal: PortalConfig,
    crawler: CrawlerConfig,
    profile: &'static SiteProfile,
    gate: Arc<crate::utils::http::HostGate>,
}

impl FixedAdapter {
    pub fn new(
        portal: PortalConfig,
        crawler: CrawlerConfig,
        profile: &'static SiteProfile,
        gate: Arc<crate::utils::http::HostGate>,
    ) -> Self {
        Self {
            portal,
            crawler,
            profile,
            gate,
        }
    }

    fn listing_url(&self) -> String {
        format!(
            "{}{}",
            self.portal.url.trim_end_matches('/'),
            self.profile.listing_path
        )
    }

    /// First matching sub-element's normalized text.
    fn select_text(row: &ElementRef<'_>, selector: &str) -> Option<String> {
        let sel = parse_selector(selector).ok()?;
        row.select(&sel)
            .next()
            .map(|el| text::normalize_whitespace(&el.text().collect::<String>()))
            .filter(|t| !t.is_empty())
    }

    /// Turn a listing page into candidates, per the profile.
    pub(crate) fn build_candidates(&self, page: &Html) -> Vec<Candidate> {
        let Ok(row_sel) = parse_selector(self.profile.row_selector) else {
            return Vec::new();
        };

        let mut seen_titles: HashSet<String> = HashSet::new();
        let mut candidates = Vec::new();

        for row in page.select(&row_sel) {
            if candidates.len() >= self.profile.max_items {
                break;
            }
            if let Some(candidate) = self.build_candidate(&row, &mut seen_titles) {
                candidates.push(candidate);
            }
        }

        candidates
    }

    fn build_candidate(
        &self,
        row: &ElementRef<'_>,
        seen_titles: &mut HashSet<String>,
    ) -> Option<Candidate> {
        let profile = self.profile;

        let row_text = text::normalize_whitespace(&row.text().collect::<String>());
        let row_len = row_text.chars().count();
        if row_len < profile.min_text_len {
            return None;
        }
        if profile.max_text_len > 0 && row_len > profile.max_text_len {
            return None;
        }

        let href = match profile.link_selector {
            Some(sel) => parse_selector(sel)
                .ok()
                .and_then(|sel| row.select(&sel).next())
                .and_then(|el| el.value().attr("href"))
                .map(str::to_string),
            None => element_href(row),
        };

        if !profile.keyword_filter.is_empty() {
            let haystack = format!(
                "{} {}",
                row_text.to_lowercase(),
                href.as_deref().unwrap_or_default().to_lowercase()
            );
            if !profile.keyword_filter.iter().any(|kw| haystack.contains(kw)) {
                return None;
            }
        }

        let mut title = match profile.title_selector {
            Some(sel) => Self::select_text(row, sel)?,
            None => row_text.clone(),
        };
        title = strip_date_suffix(&title);
        if profile.title_word_cap > 0 {
            title = title
                .split_whitespace()
                .take(profile.title_word_cap)
                .collect::<Vec<_>>()
                .join(" ");
        }
        title = text::truncate(&title, 200);
        if title.is_empty() {
            return None;
        }

        // one entry per distinct title; listing pages repeat links
        if !seen_titles.insert(title.clone()) {
            return None;
        }

        let authority = profile
            .authority_selector
            .and_then(|sel| Self::select_text(row, sel))
            .map(|a| text::truncate(&a, 150))
            .unwrap_or_else(|| profile.authority.to_string());

        let published = match profile.date_selector {
            Some(sel) => Self::select_text(row, sel).and_then(|t| date::find_date(&t)),
            None => date::find_date(&row_text),
        };
        let deadline = profile
            .deadline_selector
            .and_then(|sel| Self::select_text(row, sel))
            .and_then(|t| date::find_date(&t))
            .map(date::canonical)
            .or_else(|| {
                published.map(|p| date::offset(p, self.portal.fallback_deadline_days))
            })
            .unwrap_or_default();

        let url = resolve_href(&self.portal.url, href);
        let location = join_location(lexicon::find_city(&row_text), &self.portal.region);

        let description = if row_len > title.chars().count() + 20 {
            text::truncate(&row_text, 1000)
        } else {
            format!("Ausschreibung von {}: {}", self.portal.name, title)
        };

        Some(Candidate {
            url: url.clone(),
            raw: RawTender {
                title,
                authority,
                location,
                deadline,
                published_at: published.map(date::canonical).unwrap_or_default(),
                budget: None,
                description,
                source_url: url,
                source_portal: self.portal.name.clone(),
            },
            fetch_detail: profile.fetch_detail,
        })
    }

    /// Pull a fuller description (and maybe a city) from a detail page.
    async fn fetch_details(&self, session: &Session, url: &str) -> Option<(String, Option<String>)> {
        let page = match session.fetch_html(url).await {
            Ok(page) => page,
            Err(e) => {
                log::debug!("{}: detail page {} unreachable: {}", self.portal.name, url, e);
                return None;
            }
        };

        let body_text = text::normalize_whitespace(&page.root_element().text().collect::<String>());
        let city = lexicon::find_city(&body_text);

        for selector in DETAIL_SELECTORS {
            let Ok(sel) = parse_selector(selector) else {
                continue;
            };
            if let Some(el) = page.select(&sel).next() {
                let t = text::normalize_whitespace(&el.text().collect::<String>());
                if t.chars().count() > MIN_DETAIL_TEXT_LEN {
                    return Some((text::truncate(&t, DETAIL_MAX_LEN), city));
                }
            }
        }

        if body_text.is_empty() {
            None
        } else {
            Some((text::truncate(&body_text, DETAIL_MAX_LEN), city))
        }
    }
}

#[async_trait::async_trait]
impl Adapter for FixedAdapter {
    fn portal(&self) -> &PortalConfig {
        &self.portal
    }

    async fn open(&self) -> Result<Session> {
        // fixed profiles crawl public listings; no credential phase
        Session::open(&self.portal, &self.crawler, Arc::clone(&self.gate))
    }

    async fn discover(&self, session: &mut Session) -> Vec<String> {
        let url = self.listing_url();
        let page = match session.fetch_html(&url).await {
            Ok(page) => page,
            Err(e) => {
                log::warn!("{}: listing {} unreachable: {}", self.portal.name, url, e);
                return Vec::new();
            }
        };

        let candidates = self.build_candidates(&page);
        log::info!(
            "{}: {} candidates via profile '{}'",
            self.portal.name,
            candidates.len(),
            self.profile.key
        );
        let urls = candidates.iter().map(|c| c.url.clone()).collect();
        session.cache_candidates(candidates);
        urls
    }

    async fn extract(&self, session: &mut Session, url: &str) -> Option<RawTender> {
        let candidate = session.take_candidate(url)?;
        let mut raw = candidate.raw;

        if candidate.fetch_detail && url != self.portal.url {
            let row_city = lexicon::find_city(&raw.description);
            if let Some((description, city)) = self.fetch_details(session, url).await {
                raw.description = description;
                if row_city.is_none() {
                    if let Some(city) = city {
                        raw.location = join_location(Some(city), &self.portal.region);
                    }
                }
            }
        }

        Some(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::http::HostGate;
    use std::time::Duration;

    fn adapter(profile_key: &str, mut portal: PortalConfig) -> FixedAdapter {
        portal.profile = Some(profile_key.to_string());
        FixedAdapter::new(
            portal,
            CrawlerConfig::default(),
            SiteProfile::find(profile_key).unwrap(),
            Arc::new(HostGate::new(Duration::ZERO)),
        )
    }

    #[test]
    fn test_profile_lookup() {
        assert!(SiteProfile::find("ausschreibung_at").is_some());
        assert!(SiteProfile::find("rib").is_some());
        assert!(SiteProfile::find("unbekannt").is_none());
        assert_eq!(SiteProfile::keys().len(), 5);
    }

    #[test]
    fn test_strip_date_suffix() {
        assert_eq!(
            strip_date_suffix("Dachsanierung Rathaus vom 03.02.2026"),
            "Dachsanierung Rathaus"
        );
        assert_eq!(strip_date_suffix("Ohne Datum"), "Ohne Datum");
    }

    #[test]
    fn test_anchor_profile_with_published_date() {
        let mut portal = PortalConfig::new("Ausschreibung.at", "https://www.ausschreibung.at");
        portal.region = "Tirol".to_string();
        let adapter = adapter("ausschreibung_at", portal);

        let html = Html::parse_document(
            r#"<body>
            <a href="/Ausschreibung/4711">Kanalbau Innsbruck vom 03.02.2026</a>
            <a href="/Ausschreibung/4712">Dachsanierung Gemeindeamt Telfs</a>
            </body>"#,
        );

        let candidates = adapter.build_candidates(&html);
        assert_eq!(candidates.len(), 2);

        let first = &candidates[0].raw;
        assert_eq!(first.title, "Kanalbau Innsbruck");
        assert_eq!(first.published_at, "2026-02-03");
        // deadline = published + portal offset (21 days)
        assert_eq!(first.deadline, "2026-02-24");
        assert_eq!(first.source_url, "https://www.ausschreibung.at/Ausschreibung/4711");
        assert_eq!(first.location, "Innsbruck, Tirol");
        assert!(candidates[0].fetch_detail);

        let second = &candidates[1].raw;
        assert!(second.published_at.is_empty());
        assert!(second.deadline.is_empty());
    }

    #[test]
    fn test_keyword_filter_drops_unrelated_links() {
        let portal = PortalConfig::new(
            "Staatsanzeiger",
            "https://www.staatsanzeiger-eservices.de",
        );
        let adapter = adapter("staatsanzeiger", portal);

        let html = Html::parse_document(
            r#"<body>
            <a href="/impressum">Impressum und Datenschutzhinweise</a>
            <a href="/a/1">Ausschreibung Tiefbauarbeiten Ortsnetz Heidelberg</a>
            <a href="/a/2">Vergabe Schulsanierung, Los 3 Elektro</a>
            </body>"#,
        );

        let candidates = adapter.build_candidates(&html);
        assert_eq!(candidates.len(), 2);
        assert!(candidates[0].raw.title.contains("Tiefbauarbeiten"));
        assert_eq!(candidates[0].raw.authority, "Staatsanzeiger Baden-Wuerttemberg");
    }

    #[test]
    fn test_titles_deduplicated() {
        let portal = PortalConfig::new("Deutsche eVergabe", "https://www.deutsche-evergabe.de");
        let adapter = adapter("deutsche_evergabe", portal);

        let html = Html::parse_document(
            r#"<body>
            <a href="/p/1">Ausschreibung Aushubarbeiten Bauhof Dornbirn</a>
            <a href="/p/1">Ausschreibung Aushubarbeiten Bauhof Dornbirn</a>
            </body>"#,
        );

        assert_eq!(adapter.build_candidates(&html).len(), 1);
    }

    #[test]
    fn test_cell_profile_extracts_columns() {
        let mut portal = PortalConfig::new("Tender24", "https://www.tender24.de");
        portal.fallback_deadline_days = 14;
        let adapter = adapter("tender24", portal);

        let html = Html::parse_document(
            r#"<table>
            <tr>
              <td>05.08.2026</td>
              <td><a href="/t/99">Strassenbau Ortsdurchfahrt Reutlingen</a></td>
              <td>Stadt Reutlingen</td>
              <td>Offenes Verfahren</td>
              <td>VOB/A</td>
              <td>26.08.2026</td>
            </tr>
            </table>"#,
        );

        let candidates = adapter.build_candidates(&html);
        assert_eq!(candidates.len(), 1);
        let raw = &candidates[0].raw;
        assert_eq!(raw.title, "Strassenbau Ortsdurchfahrt Reutlingen");
        assert_eq!(raw.authority, "Stadt Reutlingen");
        assert_eq!(raw.published_at, "2026-08-05");
        assert_eq!(raw.deadline, "2026-08-26");
        assert_eq!(raw.source_url, "https://www.tender24.de/t/99");
    }

    #[test]
    fn test_word_cap_title() {
        let portal = PortalConfig::new("RIB Meinauftrag", "https://meinauftrag.rib.de");
        let adapter = adapter("rib", portal);

        let words: Vec<String> = (0..30).map(|i| format!("Wort{}", i)).collect();
        let html = Html::parse_document(&format!(
            "<table><tr><td>{}</td></tr></table>",
            words.join(" ")
        ));

        let candidates = adapter.build_candidates(&html);
        assert_eq!(candidates.len(), 1);
        assert_eq!(
            candidates[0].raw.title.split_whitespace().count(),
            15
        );
    }

    #[test]
    fn test_overlong_rows_rejected() {
        let portal = PortalConfig::new("RIB Meinauftrag", "https://meinauftrag.rib.de");
        let adapter = adapter("rib", portal);

        let html = Html::parse_document(&format!(
            "<table><tr><td>{}</td></tr></table>",
            "sehr viel Fliesstext ".repeat(100)
        ));

        assert!(adapter.build_candidates(&html).is_empty());
    }
}
