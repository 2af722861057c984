// src/core/scanner/mod.rs

// This file acts as the public interface for the `scanner` module.
// It declares and makes all sub-scanner modules public.
pub mod archive_scanner;
pub mod dns_scanner;
pub mod external_tool;
pub mod links_scanner;
pub mod liveness_scanner;

use std::collections::BTreeMap;

use tracing::info;

use crate::config::ReconConfig;
use crate::core::models::{ExternalRecord, ReconReport};
use crate::core::report::assemble_report;
use self::archive_scanner::ArchiveScanner;
use self::dns_scanner::DnsScanner;
use self::external_tool::run_external_tool;
use self::links_scanner::LinksScanner;
use self::liveness_scanner::{probe_targets, LivenessChecker};

/// What to do for one run, as chosen on the command line.
#[derive(Debug, Clone)]
pub struct ReconRequest {
    pub domain: String,
    pub use_archive_tool: bool,
    pub run_dig: bool,
    pub max_archive_urls: usize,
}

/// Every collaborator of a run, built once from the configuration.
pub struct ReconScanner {
    config: ReconConfig,
    dns: DnsScanner,
    archive: ArchiveScanner,
    liveness: LivenessChecker<liveness_scanner::HttpProber>,
    links: LinksScanner,
}

impl ReconScanner {
    pub fn new(config: ReconConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            dns: DnsScanner::new(&config),
            archive: ArchiveScanner::new(&config)?,
            liveness: LivenessChecker::from_config(&config)?,
            links: LinksScanner::new(&config)?,
            config,
        })
    }

    /// Runs every step in sequence and assembles the report.
    ///
    /// Only the liveness checks run concurrently. No step can fail the run:
    /// each one degrades to empty data and logs why.
    pub async fn run_full_recon(&self, request: &ReconRequest) -> ReconReport {
        let domain = request.domain.as_str();

        info!(target = %domain, "DNS enumeration.");
        let dns = self.dns.run_dns_scan(domain).await;

        let mut external = BTreeMap::new();
        if request.run_dig {
            info!(target = %domain, "Running dig +short A.");
            let run = run_external_tool(&["dig", "+short", domain], self.config.tool_timeout).await;
            external.insert("dig_A".to_string(), ExternalRecord::Run(run));
        }

        let harvest = self
            .archive
            .harvest(domain, request.max_archive_urls, request.use_archive_tool)
            .await;
        info!(count = harvest.urls.len(), source = ?harvest.origin, "Collected wayback URLs.");

        let targets = probe_targets(&harvest.urls);
        let wayback_check = if targets.is_empty() {
            Vec::new()
        } else {
            info!(count = targets.len(), concurrency = self.liveness.concurrency(), "Checking URLs for liveness.");
            self.liveness.check_all(targets).await
        };

        info!(target = %domain, "Fetching basic HTML links from homepage.");
        let links = self.links.run_links_scan(&format!("https://{domain}")).await;

        assemble_report(domain, dns, harvest, wayback_check, external, links)
    }
}
