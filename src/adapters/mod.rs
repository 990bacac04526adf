// src/adapters/mod.rs

//! Portal adapters: one component per portal structure family.
//!
//! Adapters translate a portal's page structure into [`RawTender`] values.
//! There are exactly two families: [`FixedAdapter`] drives pre-tuned
//! per-site profiles, [`HeuristicAdapter`] copes with unknown sites through
//! ranked structural guesses. Both speak the same [`Adapter`] contract and
//! are dispatched through the closed [`PortalAdapter`] enum.
//!
//! Failure policy: `open` failing aborts that portal for the cycle;
//! `discover` and `extract` absorb their faults and degrade to nothing.

mod fixed;
mod heuristic;

pub use fixed::{FixedAdapter, SiteProfile};
pub use heuristic::HeuristicAdapter;

use std::sync::Arc;

use async_trait::async_trait;
use scraper::Html;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{Config, CrawlerConfig, PortalConfig, RawTender};
use crate::utils::http::{self, HostGate};

/// One candidate announcement located during discovery.
///
/// Adapters pre-extract what the listing page offers; `extract` consumes the
/// cached candidate and may enrich it from a detail page.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub url: String,
    pub raw: RawTender,
    pub fetch_detail: bool,
}

/// Per-portal crawl session: HTTP client with cookie jar, base URL, and the
/// candidates discovered so far.
pub struct Session {
    client: reqwest::Client,
    base: Url,
    gate: Arc<HostGate>,
    candidates: Vec<Candidate>,
    login_confirmed: bool,
}

impl Session {
    /// Open a session against a portal root.
    pub fn open(portal: &PortalConfig, crawler: &CrawlerConfig, gate: Arc<HostGate>) -> Result<Self> {
        let base = Url::parse(&portal.url)?;
        let client = http::create_client(crawler)?;
        Ok(Self {
            client,
            base,
            gate,
            candidates: Vec::new(),
            login_confirmed: false,
        })
    }

    /// Portal base URL.
    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Whether a login attempt was confirmed by a success keyword.
    pub fn login_confirmed(&self) -> bool {
        self.login_confirmed
    }

    pub(crate) fn set_login_confirmed(&mut self, confirmed: bool) {
        self.login_confirmed = confirmed;
    }

    /// Fetch a page politely (per-host spacing enforced) and parse it.
    ///
    /// Timeouts and network failures come back as navigation faults, which
    /// callers absorb per URL or path.
    pub async fn fetch_html(&self, url: &str) -> Result<Html> {
        self.gate.acquire(url).await;
        http::fetch_page(&self.client, url)
            .await
            .map_err(|e| AppError::navigation(url, e))
    }

    /// Fetch a page politely as raw text.
    pub async fn fetch_text(&self, url: &str) -> Result<String> {
        self.gate.acquire(url).await;
        http::fetch_text(&self.client, url)
            .await
            .map_err(|e| AppError::navigation(url, e))
    }

    /// POST a form politely and return the response body.
    pub async fn post_form(&self, url: &str, form: &[(String, String)]) -> Result<String> {
        self.gate.acquire(url).await;
        Ok(self
            .client
            .post(url)
            .form(form)
            .send()
            .await?
            .text()
            .await?)
    }

    /// Stash candidates discovered on a listing page.
    pub fn cache_candidates(&mut self, candidates: Vec<Candidate>) {
        self.candidates = candidates;
    }

    /// Consume the first cached candidate for a URL.
    ///
    /// Consumption order keeps candidates apart even when several fell back
    /// to the portal root as their URL.
    pub fn take_candidate(&mut self, url: &str) -> Option<Candidate> {
        let idx = self.candidates.iter().position(|c| c.url == url)?;
        Some(self.candidates.remove(idx))
    }
}

/// Capability contract every adapter variant implements.
#[async_trait]
pub trait Adapter: Send + Sync {
    /// The portal this adapter crawls.
    fn portal(&self) -> &PortalConfig;

    /// Open a session. An error here aborts the portal for this cycle.
    async fn open(&self) -> Result<Session>;

    /// Locate candidate announcement URLs. Never fails past this boundary;
    /// internal faults reduce to an empty list.
    async fn discover(&self, session: &mut Session) -> Vec<String>;

    /// Extract one candidate into a raw record. `None` discards the
    /// candidate; the pipeline continues with the rest.
    async fn extract(&self, session: &mut Session, url: &str) -> Option<RawTender>;
}

/// Closed set of adapter variants.
pub enum PortalAdapter {
    Fixed(FixedAdapter),
    Heuristic(HeuristicAdapter),
}

impl PortalAdapter {
    /// Build the right adapter variant for a portal: a fixed profile when
    /// one is bound and known, the heuristic adapter otherwise.
    pub fn from_config(config: &Config, portal: &PortalConfig, gate: Arc<HostGate>) -> Self {
        // merge the global keywords into the portal's own hint once, here
        let mut portal = portal.clone();
        portal.criteria = config.category_hint(&portal);

        match portal.profile.as_deref().and_then(SiteProfile::find) {
            Some(profile) => {
                Self::Fixed(FixedAdapter::new(portal, config.crawler.clone(), profile, gate))
            }
            None => {
                if portal.profile.is_some() {
                    log::warn!(
                        "Portal '{}' references unknown profile; using heuristic adapter",
                        portal.name
                    );
                }
                Self::Heuristic(HeuristicAdapter::new(
                    portal,
                    config.crawler.clone(),
                    config.extraction.clone(),
                    gate,
                ))
            }
        }
    }
}

#[async_trait]
impl Adapter for PortalAdapter {
    fn portal(&self) -> &PortalConfig {
        match self {
            Self::Fixed(a) => a.portal(),
            Self::Heuristic(a) => a.portal(),
        }
    }

    async fn open(&self) -> Result<Session> {
        match self {
            Self::Fixed(a) => a.open().await,
            Self::Heuristic(a) => a.open().await,
        }
    }

    async fn discover(&self, session: &mut Session) -> Vec<String> {
        match self {
            Self::Fixed(a) => a.discover(session).await,
            Self::Heuristic(a) => a.discover(session).await,
        }
    }

    async fn extract(&self, session: &mut Session, url: &str) -> Option<RawTender> {
        match self {
            Self::Fixed(a) => a.extract(session, url).await,
            Self::Heuristic(a) => a.extract(session, url).await,
        }
    }
}

/// Href carried by a candidate element: its own, or a descendant anchor's.
pub(crate) fn element_href(element: &scraper::ElementRef<'_>) -> Option<String> {
    if let Some(href) = element.value().attr("href").filter(|h| !h.is_empty()) {
        return Some(href.to_string());
    }
    let sel = parse_selector("a[href]").ok()?;
    element
        .select(&sel)
        .next()
        .and_then(|a| a.value().attr("href"))
        .map(str::to_string)
}

/// Resolve a candidate href: absolute URLs pass through, site-root-relative
/// paths attach to the portal root, anything else falls back to the portal
/// root itself.
pub(crate) fn resolve_href(portal_url: &str, href: Option<String>) -> String {
    match href {
        Some(h) if h.starts_with("http://") || h.starts_with("https://") => h,
        Some(h) if h.starts_with('/') => {
            format!("{}{}", portal_url.trim_end_matches('/'), h)
        }
        _ => portal_url.to_string(),
    }
}

/// Combine an extracted city with the portal's region hint.
pub(crate) fn join_location(city: Option<String>, region: &str) -> String {
    match city {
        Some(city) if !region.is_empty() => format!("{}, {}", city, region),
        Some(city) => city,
        None if !region.is_empty() => region.to_string(),
        None => "Unbekannt".to_string(),
    }
}

/// Parse a CSS selector, mapping parse failures into the error taxonomy.
pub(crate) fn parse_selector(s: &str) -> Result<scraper::Selector> {
    scraper::Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_location() {
        assert_eq!(join_location(Some("Graz".into()), "Steiermark"), "Graz, Steiermark");
        assert_eq!(join_location(Some("Graz".into()), ""), "Graz");
        assert_eq!(join_location(None, "Tirol"), "Tirol");
        assert_eq!(join_location(None, ""), "Unbekannt");
    }

    #[test]
    fn test_parse_selector_invalid() {
        assert!(parse_selector("[[nope").is_err());
        assert!(parse_selector("table tr").is_ok());
    }

    #[test]
    fn test_take_candidate_consumes_in_order() {
        let gate = Arc::new(HostGate::new(std::time::Duration::ZERO));
        let portal = PortalConfig::new("Test", "https://example.com");
        let crawler = CrawlerConfig::default();
        let mut session = Session::open(&portal, &crawler, gate).unwrap();

        let mk = |text: &str| Candidate {
            url: "https://example.com/".to_string(),
            raw: RawTender {
                description: text.to_string(),
                ..RawTender::default()
            },
            fetch_detail: false,
        };
        session.cache_candidates(vec![mk("erste"), mk("zweite")]);

        let first = session.take_candidate("https://example.com/").unwrap();
        assert_eq!(first.raw.description, "erste");
        let second = session.take_candidate("https://example.com/").unwrap();
        assert_eq!(second.raw.description, "zweite");
        assert!(session.take_candidate("https://example.com/").is_none());
    }
}
