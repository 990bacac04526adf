// src/utils/http.rs

//! HTTP client utilities and per-host politeness.

use std::collections::HashMap;
use std::time::Duration;

use scraper::Html;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::error::Result;
use crate::models::CrawlerConfig;

/// Create a configured asynchronous HTTP client.
///
/// The cookie store keeps a login session alive across requests within one
/// portal session.
pub fn create_client(config: &CrawlerConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .cookie_store(true)
        .build()?;
    Ok(client)
}

/// Fetch a page and parse it as HTML.
pub async fn fetch_page(client: &reqwest::Client, url: &str) -> Result<Html> {
    let text = client.get(url).send().await?.text().await?;
    Ok(Html::parse_document(&text))
}

/// Fetch a page as raw text.
pub async fn fetch_text(client: &reqwest::Client, url: &str) -> Result<String> {
    Ok(client.get(url).send().await?.text().await?)
}

/// Per-host request spacing.
///
/// `acquire` reserves the next request slot for the URL's host and sleeps
/// until it is due, so two requests to the same host are never closer than
/// the configured interval, regardless of which portal worker issues them.
#[derive(Debug)]
pub struct HostGate {
    min_interval: Duration,
    next_slot: Mutex<HashMap<String, Instant>>,
}

impl HostGate {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            next_slot: Mutex::new(HashMap::new()),
        }
    }

    /// Build a gate from the crawler configuration.
    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self::new(Duration::from_millis(config.request_delay_ms))
    }

    /// Wait until a request to `url`'s host is allowed.
    pub async fn acquire(&self, url: &str) {
        if self.min_interval.is_zero() {
            return;
        }
        let host = super::get_domain(url).unwrap_or_default();

        let due = {
            let mut slots = self.next_slot.lock().await;
            let now = Instant::now();
            let due = match slots.get(&host) {
                Some(slot) if *slot > now => *slot,
                _ => now,
            };
            slots.insert(host, due + self.min_interval);
            due
        };

        tokio::time::sleep_until(due).await;
    }
}
