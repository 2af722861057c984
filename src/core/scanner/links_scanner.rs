// src/core/scanner/links_scanner.rs

use crate::config::ReconConfig;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use tracing::{debug, info, warn};

static ANCHOR_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());

/// Samples the anchor links of a single page.
pub struct LinksScanner {
    client: reqwest::Client,
    cap: usize,
}

impl LinksScanner {
    pub fn new(config: &ReconConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.links_timeout)
            .build()?;
        Ok(Self { client, cap: config.links_cap })
    }

    /// Fetches `url` and returns the raw `href` of every anchor, in document
    /// order, keeping at most the configured number of links.
    ///
    /// Anything other than a `200 OK` with a readable body yields no links.
    pub async fn run_links_scan(&self, url: &str) -> Vec<String> {
        info!(url, "Fetching page links.");
        let response = match self.client.get(url).send().await {
            Ok(res) => res,
            Err(e) => {
                warn!(url, error = %e, "Page request failed.");
                return Vec::new();
            }
        };

        if response.status() != reqwest::StatusCode::OK {
            warn!(url, status = %response.status(), "Page did not answer 200, skipping links.");
            return Vec::new();
        }

        let body = match response.text().await {
            Ok(text) => text,
            Err(e) => {
                warn!(url, error = %e, "Failed to read page body.");
                return Vec::new();
            }
        };

        let mut links = extract_anchor_links(&body);
        links.truncate(self.cap);
        info!(url, count = links.len(), "Page links collected.");
        links
    }
}

/// Returns every anchor `href` exactly as written in the document.
pub fn extract_anchor_links(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let links: Vec<String> = document
        .select(&ANCHOR_SELECTOR)
        .filter_map(|el| el.value().attr("href"))
        .map(String::from)
        .collect();
    debug!(count = links.len(), "Extracted anchor links.");
    links
}
