// src/adapters/heuristic.rs

//! Heuristic adapter for portals with unknown page structure.
//!
//! Works through ranked guesses: login path and field selectors, listing
//! path suffixes, then structural candidate selectors. Every phase degrades
//! to "produce nothing" — the failure mode of this adapter is silence, never
//! an error that aborts the cycle.

use std::sync::Arc;

use scraper::{ElementRef, Html};

use crate::error::Result;
use crate::lexicon;
use crate::models::{CrawlerConfig, ExtractionConfig, PortalConfig, RawTender};
use crate::utils::{resolve_url, text};

use super::{Adapter, Candidate, Session, join_location, parse_selector};

/// Login page path guesses, tried in order.
const LOGIN_PATHS: &[&str] = &[
    "/login",
    "/anmelden",
    "/signin",
    "/auth",
    "/user/login",
    "/Account/Login",
];

/// Username field guesses, first match wins.
const USERNAME_SELECTORS: &[&str] = &[
    r#"input[name="username"]"#,
    r#"input[name="email"]"#,
    r#"input[name="user"]"#,
    r#"input[name="login"]"#,
    r#"input[name="Email"]"#,
    r#"input[name="Username"]"#,
    r#"input[id="username"]"#,
    r#"input[id="email"]"#,
    r#"input[id="user"]"#,
    r#"input[type="email"]"#,
    r#"input[type="text"]:first-of-type"#,
];

/// Password field guesses.
const PASSWORD_SELECTORS: &[&str] = &[
    r#"input[type="password"]"#,
    r#"input[name="password"]"#,
    r#"input[name="Password"]"#,
    r#"input[id="password"]"#,
];

/// A page containing one of these (lowercase) counts as a confirmed login.
const SUCCESS_KEYWORDS: &[&str] = &["logout", "abmelden", "willkommen", "dashboard", "mein konto"];

/// Listing page path suffixes, tried in order until one yields candidates.
const LISTING_PATHS: &[&str] = &[
    "",
    "/ausschreibungen",
    "/tenders",
    "/vergaben",
    "/public",
    "/search",
    "/suche",
    "/bekanntmachungen",
];

/// Structural candidate selectors in priority order: domain-keyword link
/// patterns first, generic row/card/article patterns after.
const CANDIDATE_SELECTORS: &[&str] = &[
    r#"a[href*="ausschreibung"]"#,
    r#"a[href*="tender"]"#,
    r#"a[href*="vergabe"]"#,
    r#"a[href*="projekt"]"#,
    "table tr",
    ".tender-item",
    ".ausschreibung",
    "article",
    ".list-item",
    ".result-item",
];

/// Candidate snippet length cap.
const SNIPPET_MAX_LEN: usize = 500;

/// Title slice taken from the snippet.
const TITLE_MAX_LEN: usize = 150;

/// Best-effort adapter for sites without a tuned profile.
pub struct HeuristicAdapter {
    portal: PortalConfig,
    crawler: CrawlerConfig,
    extraction: ExtractionConfig,
    gate: Arc<crate::utils::http::HostGate>,
}

impl HeuristicAdapter {
    pub fn new(
        portal: PortalConfig,
        crawler: CrawlerConfig,
        extraction: ExtractionConfig,
        gate: Arc<crate::utils::http::HostGate>,
    ) -> Self {
        Self {
            portal,
            crawler,
            extraction,
            gate,
        }
    }

    /// Root URL without a trailing slash, for path suffix probing.
    fn root(&self) -> String {
        self.portal.url.trim_end_matches('/').to_string()
    }

    // --- Credential phase ---

    /// Try to log in. `Ok(true)` means a success keyword confirmed the
    /// session; anything else is "not confirmed" and extraction proceeds
    /// regardless (public pages may still be readable).
    async fn try_login(&self, session: &Session) -> Result<bool> {
        let (Some(username), Some(password)) =
            (self.portal.username.clone(), self.portal.password.clone())
        else {
            return Ok(false);
        };

        for path in LOGIN_PATHS {
            let url = format!("{}{}", self.root(), path);
            // parsed page stays inside this block; only the owned form
            // survives to the POST below
            let form_data = {
                let page = match session.fetch_html(&url).await {
                    Ok(page) => page,
                    Err(e) => {
                        log::debug!("Login path {} unreachable: {}", url, e);
                        continue;
                    }
                };
                self.build_login_form(&page, &url, &username, &password)
            };

            let Some((action, form)) = form_data else {
                continue;
            };

            let body = session
                .post_form(&action, &form)
                .await
                .map_err(|e| crate::error::AppError::auth(&self.portal.name, e))?;
            let body_lower = body.to_lowercase();
            let confirmed = SUCCESS_KEYWORDS.iter().any(|kw| body_lower.contains(kw));
            return Ok(confirmed);
        }

        log::info!("Login fields not found on {}", self.portal.name);
        Ok(false)
    }

    /// Locate the login form on a page and assemble the POST payload: all
    /// named inputs with their defaults, credentials filled in, plus the
    /// submit button's own pair when it carries one. Submitting the form
    /// directly is the HTTP analogue of click-or-Enter.
    fn build_login_form(
        &self,
        page: &Html,
        page_url: &str,
        username: &str,
        password: &str,
    ) -> Option<(String, Vec<(String, String)>)> {
        let username_field = self.find_field(
            page,
            self.portal.selectors.username.as_deref(),
            USERNAME_SELECTORS,
        )?;
        let password_field = self.find_field(
            page,
            self.portal.selectors.password.as_deref(),
            PASSWORD_SELECTORS,
        )?;

        let form_el = password_field
            .ancestors()
            .filter_map(ElementRef::wrap)
            .find(|el| el.value().name() == "form");

        let username_name = username_field.value().attr("name").unwrap_or("username");
        let password_name = password_field.value().attr("name").unwrap_or("password");

        let mut fields: Vec<(String, String)> = Vec::new();
        if let Some(form) = form_el {
            let input_sel = parse_selector("input[name]").ok()?;
            for input in form.select(&input_sel) {
                let name = input.value().attr("name").unwrap_or_default();
                if name == username_name || name == password_name {
                    continue;
                }
                let value = input.value().attr("value").unwrap_or_default();
                fields.push((name.to_string(), value.to_string()));
            }
        }
        fields.push((username_name.to_string(), username.to_string()));
        fields.push((password_name.to_string(), password.to_string()));

        let button_scope = form_el.unwrap_or_else(|| page.root_element());
        if let Some(button) = self.find_submit_button(button_scope) {
            if let Some(name) = button.value().attr("name") {
                let value = button.value().attr("value").unwrap_or_default();
                fields.push((name.to_string(), value.to_string()));
            }
        }

        let action = form_el
            .and_then(|f| f.value().attr("action"))
            .filter(|a| !a.is_empty());
        let action_url = match (action, url::Url::parse(page_url)) {
            (Some(action), Ok(base)) => resolve_url(&base, action),
            _ => page_url.to_string(),
        };

        Some((action_url, fields))
    }

    /// First matching element for an override selector or a guess list.
    fn find_field<'a>(
        &self,
        page: &'a Html,
        override_sel: Option<&str>,
        guesses: &[&str],
    ) -> Option<ElementRef<'a>> {
        if let Some(sel) = override_sel {
            return match parse_selector(sel) {
                Ok(sel) => page.select(&sel).next(),
                Err(e) => {
                    log::warn!("Invalid selector override on {}: {}", self.portal.name, e);
                    None
                }
            };
        }
        guesses.iter().find_map(|guess| {
            let sel = parse_selector(guess).ok()?;
            page.select(&sel).next()
        })
    }

    fn find_submit_button<'a>(&self, scope: ElementRef<'a>) -> Option<ElementRef<'a>> {
        if let Some(sel) = self.portal.selectors.login_button.as_deref() {
            if let Ok(sel) = parse_selector(sel) {
                if let Some(el) = scope.select(&sel).next() {
                    return Some(el);
                }
            }
        }
        let sel = parse_selector(r#"button[type="submit"], input[type="submit"]"#).ok()?;
        scope.select(&sel).next()
    }

    // --- Listing discovery ---

    /// Pick the candidate elements of a listing page.
    ///
    /// An explicit `tender_list` override is used as-is; otherwise the
    /// priority list applies, and a selector is accepted only when it
    /// matches at least `min_selector_matches` elements — a genuine
    /// repeating list rather than a stray link.
    fn select_elements<'a>(&self, page: &'a Html) -> Vec<ElementRef<'a>> {
        if let Some(override_sel) = self.portal.selectors.tender_list.as_deref() {
            return match parse_selector(override_sel) {
                Ok(sel) => page.select(&sel).collect(),
                Err(e) => {
                    log::warn!("Invalid tender_list override on {}: {}", self.portal.name, e);
                    Vec::new()
                }
            };
        }

        for guess in CANDIDATE_SELECTORS {
            let Ok(sel) = parse_selector(guess) else {
                continue;
            };
            let matched: Vec<_> = page.select(&sel).collect();
            if matched.len() >= self.extraction.min_selector_matches {
                log::debug!(
                    "{}: selector '{}' accepted with {} matches",
                    self.portal.name,
                    guess,
                    matched.len()
                );
                return matched;
            }
        }
        Vec::new()
    }

    /// Turn a listing page into candidates.
    pub(crate) fn build_candidates(&self, page: &Html) -> Vec<Candidate> {
        let elements = self.select_elements(page);
        let mut candidates = Vec::new();

        for element in elements.into_iter().take(self.extraction.max_candidates) {
            let raw_text: String = element.text().collect();
            let raw_text = raw_text.trim();
            if raw_text.chars().count() < self.extraction.min_candidate_len {
                continue;
            }

            let snippet = text::truncate(&text::normalize_whitespace(raw_text), SNIPPET_MAX_LEN);
            let url = self.resolve_candidate_link(&element);
            let location = join_location(lexicon::find_city(&snippet), &self.portal.region);

            candidates.push(Candidate {
                url: url.clone(),
                raw: RawTender {
                    title: text::truncate(&snippet, TITLE_MAX_LEN),
                    authority: self.portal.name.clone(),
                    location,
                    deadline: String::new(),
                    published_at: String::new(),
                    budget: None,
                    description: snippet,
                    source_url: url,
                    source_portal: self.portal.name.clone(),
                },
                fetch_detail: false,
            });
        }

        candidates
    }

    /// Outgoing link of a candidate: its own href, a descendant anchor's
    /// href, or the portal root.
    fn resolve_candidate_link(&self, element: &ElementRef<'_>) -> String {
        super::resolve_href(&self.portal.url, super::element_href(element))
    }
}

#[async_trait::async_trait]
impl Adapter for HeuristicAdapter {
    fn portal(&self) -> &PortalConfig {
        &self.portal
    }

    async fn open(&self) -> Result<Session> {
        let mut session = Session::open(&self.portal, &self.crawler, Arc::clone(&self.gate))?;

        if self.portal.has_credentials() {
            match self.try_login(&session).await {
                Ok(true) => {
                    log::info!("Login confirmed on {}", self.portal.name);
                    session.set_login_confirmed(true);
                }
                Ok(false) => {
                    log::info!(
                        "Login not confirmed on {}; continuing without session",
                        self.portal.name
                    );
                }
                Err(e) => {
                    log::warn!("Login attempt failed on {}: {}", self.portal.name, e);
                }
            }
        }

        Ok(session)
    }

    async fn discover(&self, session: &mut Session) -> Vec<String> {
        for path in LISTING_PATHS {
            let url = format!("{}{}", self.root(), path);
            let page = match session.fetch_html(&url).await {
                Ok(page) => page,
                Err(e) => {
                    log::debug!("Listing path {} unreachable: {}", url, e);
                    continue;
                }
            };

            let candidates = self.build_candidates(&page);
            if !candidates.is_empty() {
                log::info!(
                    "{}: {} candidates on {}",
                    self.portal.name,
                    candidates.len(),
                    url
                );
                let urls = candidates.iter().map(|c| c.url.clone()).collect();
                session.cache_candidates(candidates);
                return urls;
            }
        }

        log::info!("{}: no listing path yielded candidates", self.portal.name);
        Vec::new()
    }

    async fn extract(&self, session: &mut Session, url: &str) -> Option<RawTender> {
        match session.take_candidate(url) {
            Some(candidate) => Some(candidate.raw),
            None => {
                log::warn!("{}: no cached candidate for {}", self.portal.name, url);
                None
            }
        }
    }
}
