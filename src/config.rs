// src/config.rs

use std::time::Duration;

/// Default User-Agent sent with every outbound HTTP request.
pub const DEFAULT_USER_AGENT: &str = "ReconStarter/1.0 (+https://example.com/)";
/// Default number of probes allowed in flight at once.
pub const DEFAULT_CONCURRENCY: usize = 25;
/// Default per-request probe timeout, in seconds.
pub const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 15;
/// Public Wayback Machine CDX index.
pub const DEFAULT_CDX_ENDPOINT: &str = "http://web.archive.org/cdx/search/cdx";

/// Run-wide settings handed to every scanner when it is constructed.
///
/// Built once in `main` from the defaults and the command-line overrides,
/// then shared read-only for the rest of the run.
#[derive(Debug, Clone)]
pub struct ReconConfig {
    pub user_agent: String,
    /// Concurrency budget for the liveness checker.
    pub concurrency: usize,
    /// Upper bound for a single HEAD or GET probe.
    pub probe_timeout: Duration,
    /// Ceiling applied by the HTTP client itself.
    pub client_timeout: Duration,
    pub max_redirects: usize,
    pub cdx_endpoint: String,
    pub cdx_timeout: Duration,
    pub dns_timeout: Duration,
    pub tool_timeout: Duration,
    pub archive_tool: String,
    pub archive_tool_timeout: Duration,
    pub links_timeout: Duration,
    pub links_cap: usize,
}

impl Default for ReconConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            concurrency: DEFAULT_CONCURRENCY,
            probe_timeout: Duration::from_secs(DEFAULT_PROBE_TIMEOUT_SECS),
            client_timeout: Duration::from_secs(DEFAULT_PROBE_TIMEOUT_SECS + 5),
            max_redirects: 10,
            cdx_endpoint: DEFAULT_CDX_ENDPOINT.to_string(),
            cdx_timeout: Duration::from_secs(10),
            dns_timeout: Duration::from_secs(5),
            tool_timeout: Duration::from_secs(60),
            archive_tool: "waybackurls".to_string(),
            archive_tool_timeout: Duration::from_secs(120),
            links_timeout: Duration::from_secs(8),
            links_cap: 200,
        }
    }
}

impl ReconConfig {
    /// Overrides the concurrency budget. Values below one are clamped to one.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Overrides the probe timeout and keeps the client ceiling five seconds above it.
    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self.client_timeout = timeout + Duration::from_secs(5);
        self
    }

    pub fn with_cdx_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.cdx_endpoint = endpoint.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = ReconConfig::default();
        assert_eq!(config.concurrency, 25);
        assert_eq!(config.probe_timeout, Duration::from_secs(15));
        assert_eq!(config.client_timeout, Duration::from_secs(20));
        assert_eq!(config.cdx_timeout, Duration::from_secs(10));
        assert_eq!(config.links_cap, 200);
    }

    #[test]
    fn zero_concurrency_is_clamped() {
        let config = ReconConfig::default().with_concurrency(0);
        assert_eq!(config.concurrency, 1);
    }

    #[test]
    fn probe_timeout_moves_client_ceiling() {
        let config = ReconConfig::default().with_probe_timeout(Duration::from_secs(3));
        assert_eq!(config.client_timeout, Duration::from_secs(8));
    }
}
