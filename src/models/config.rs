//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP and crawling behavior settings
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// Extraction thresholds and bounds
    #[serde(default)]
    pub extraction: ExtractionConfig,

    /// Keywords appended to every portal's category hint
    #[serde(default)]
    pub global_keywords: String,

    /// Monitored portals
    #[serde(default)]
    pub portals: Vec<PortalConfig>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.crawler.user_agent.trim().is_empty() {
            return Err(AppError::validation("crawler.user_agent is empty"));
        }
        if self.crawler.timeout_secs == 0 {
            return Err(AppError::validation("crawler.timeout_secs must be > 0"));
        }
        if self.crawler.max_concurrent == 0 {
            return Err(AppError::validation("crawler.max_concurrent must be > 0"));
        }
        if self.extraction.max_description_len == 0 {
            return Err(AppError::validation(
                "extraction.max_description_len must be > 0",
            ));
        }
        if self.extraction.min_selector_matches == 0 {
            return Err(AppError::validation(
                "extraction.min_selector_matches must be > 0",
            ));
        }
        if self.portals.is_empty() {
            return Err(AppError::validation("No portals defined"));
        }
        for portal in &self.portals {
            if portal.name.trim().is_empty() {
                return Err(AppError::validation("portal with empty name"));
            }
            if url::Url::parse(&portal.url).is_err() {
                return Err(AppError::validation(format!(
                    "portal '{}' has invalid url '{}'",
                    portal.name, portal.url
                )));
            }
        }
        Ok(())
    }

    /// Effective category hint for a portal: its own criteria plus the
    /// global keywords.
    pub fn category_hint(&self, portal: &PortalConfig) -> String {
        match (
            portal.criteria.trim().is_empty(),
            self.global_keywords.trim().is_empty(),
        ) {
            (false, false) => format!("{}, {}", portal.criteria, self.global_keywords),
            (false, true) => portal.criteria.clone(),
            (true, false) => self.global_keywords.clone(),
            (true, true) => String::new(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            crawler: CrawlerConfig::default(),
            extraction: ExtractionConfig::default(),
            global_keywords: String::new(),
            portals: defaults::default_portals(),
        }
    }
}

/// HTTP client and crawling behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Minimum spacing between requests to the same host, in milliseconds.
    /// A hard lower bound, not a suggestion.
    #[serde(default = "defaults::request_delay")]
    pub request_delay_ms: u64,

    /// Maximum portals crawled concurrently
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            request_delay_ms: defaults::request_delay(),
            max_concurrent: defaults::max_concurrent(),
        }
    }
}

/// Extraction thresholds and bounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Stored description length cap, in characters
    #[serde(default = "defaults::max_description_len")]
    pub max_description_len: usize,

    /// Candidate texts shorter than this are treated as noise
    #[serde(default = "defaults::min_candidate_len")]
    pub min_candidate_len: usize,

    /// Maximum candidates taken from one listing page
    #[serde(default = "defaults::max_candidates")]
    pub max_candidates: usize,

    /// A structural selector is accepted only with at least this many
    /// matches; fewer is likely a stray element, not a listing.
    #[serde(default = "defaults::min_selector_matches")]
    pub min_selector_matches: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            max_description_len: defaults::max_description_len(),
            min_candidate_len: defaults::min_candidate_len(),
            max_candidates: defaults::max_candidates(),
            min_selector_matches: defaults::min_selector_matches(),
        }
    }
}

/// One monitored portal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalConfig {
    /// Display name, also used as `source_portal` provenance
    pub name: String,

    /// Portal root URL
    pub url: String,

    /// Region hint, mixed into extracted locations
    #[serde(default)]
    pub region: String,

    /// Category/criteria hint text
    #[serde(default)]
    pub criteria: String,

    /// Login credentials, if the portal needs them
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,

    /// Name of a built-in site profile; unset portals use the heuristic
    /// adapter
    #[serde(default)]
    pub profile: Option<String>,

    /// Explicit selector overrides for the heuristic adapter
    #[serde(default)]
    pub selectors: SelectorOverrides,

    /// Offset for the synthetic deadline when the source exposes none
    #[serde(default = "defaults::fallback_deadline_days")]
    pub fallback_deadline_days: i64,

    /// Disabled portals are skipped by the cycle
    #[serde(default = "defaults::enabled")]
    pub enabled: bool,
}

impl PortalConfig {
    /// Portal with just a name and URL; everything else defaulted.
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            region: String::new(),
            criteria: String::new(),
            username: None,
            password: None,
            profile: None,
            selectors: SelectorOverrides::default(),
            fallback_deadline_days: defaults::fallback_deadline_days(),
            enabled: true,
        }
    }

    /// True when both credentials are configured and non-empty.
    pub fn has_credentials(&self) -> bool {
        matches!(
            (self.username.as_deref(), self.password.as_deref()),
            (Some(u), Some(p)) if !u.is_empty() && !p.is_empty()
        )
    }
}

/// Explicit selector overrides. A set field bypasses auto-discovery for
/// that one concern.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SelectorOverrides {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub login_button: Option<String>,
    #[serde(default)]
    pub tender_list: Option<String>,
}

mod defaults {
    use super::PortalConfig;

    // Crawler defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; TenderScout/1.0)".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn request_delay() -> u64 {
        2000
    }
    pub fn max_concurrent() -> usize {
        2
    }

    // Extraction defaults
    pub fn max_description_len() -> usize {
        2000
    }
    pub fn min_candidate_len() -> usize {
        15
    }
    pub fn max_candidates() -> usize {
        20
    }
    pub fn min_selector_matches() -> usize {
        3
    }

    // Portal defaults
    pub fn fallback_deadline_days() -> i64 {
        21
    }
    pub fn enabled() -> bool {
        true
    }

    pub fn default_portals() -> Vec<PortalConfig> {
        vec![
            PortalConfig {
                region: "Tirol".to_string(),
                criteria: "Tiefbau".to_string(),
                profile: Some("ausschreibung_at".to_string()),
                ..PortalConfig::new("Ausschreibung.at", "https://www.ausschreibung.at")
            },
            PortalConfig {
                region: "Salzburg".to_string(),
                criteria: "Leitungsbau".to_string(),
                profile: Some("staatsanzeiger".to_string()),
                ..PortalConfig::new(
                    "Staatsanzeiger",
                    "https://www.staatsanzeiger-eservices.de",
                )
            },
            PortalConfig {
                region: "Vorarlberg".to_string(),
                criteria: "Aushubarbeiten".to_string(),
                profile: Some("deutsche_evergabe".to_string()),
                ..PortalConfig::new("Deutsche eVergabe", "https://www.deutsche-evergabe.de")
            },
            PortalConfig {
                region: "Bayern".to_string(),
                criteria: "Erdarbeiten".to_string(),
                profile: Some("rib".to_string()),
                fallback_deadline_days: 14,
                ..PortalConfig::new("RIB Meinauftrag", "https://meinauftrag.rib.de")
            },
            PortalConfig {
                region: "Baden-Württemberg".to_string(),
                criteria: "Straßenbau".to_string(),
                profile: Some("tender24".to_string()),
                fallback_deadline_days: 14,
                ..PortalConfig::new("Tender24", "https://www.tender24.de")
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_default_config_ok() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_user_agent() {
        let mut config = Config::default();
        config.crawler.user_agent = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_concurrency() {
        let mut config = Config::default();
        config.crawler.max_concurrent = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_bad_portal_url() {
        let mut config = Config::default();
        config.portals.push(PortalConfig::new("Broken", "not a url"));
        assert!(config.validate().is_err());
    }

    #[test]
    fn default_portals_carry_profiles() {
        let config = Config::default();
        assert_eq!(config.portals.len(), 5);
        assert!(config.portals.iter().all(|p| p.profile.is_some()));
    }

    #[test]
    fn category_hint_merges_global_keywords() {
        let mut config = Config::default();
        config.global_keywords = "Sanierung".to_string();
        let hint = config.category_hint(&config.portals[0]);
        assert_eq!(hint, "Tiefbau, Sanierung");

        let bare = PortalConfig::new("X", "https://example.com");
        assert_eq!(config.category_hint(&bare), "Sanierung");
    }

    #[test]
    fn has_credentials_requires_both() {
        let mut portal = PortalConfig::new("X", "https://example.com");
        assert!(!portal.has_credentials());
        portal.username = Some("user".to_string());
        assert!(!portal.has_credentials());
        portal.password = Some("secret".to_string());
        assert!(portal.has_credentials());
    }
}
