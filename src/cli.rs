// src/cli.rs

use clap::Parser;
use url::Url;

use crate::config::{DEFAULT_CONCURRENCY, DEFAULT_PROBE_TIMEOUT_SECS};

/// Recon starter: DNS, Wayback URLs and concurrent URL liveness checks.
#[derive(Parser, Debug)]
#[command(name = "vanguard-recon", version, about)]
pub struct Args {
    /// Target domain (in-scope only!)
    pub domain: String,

    /// Use the installed waybackurls binary before the CDX API
    #[arg(long)]
    pub use_wayback_bin: bool,

    /// Run `dig +short` and keep its output in the report
    #[arg(long)]
    pub run_dig: bool,

    /// Output JSON filename
    #[arg(long, default_value = "recon_result.json")]
    pub out: String,

    /// Max number of wayback URLs to consider
    #[arg(long, default_value_t = 500, value_parser = clap::value_parser!(u64).range(1..))]
    pub max_wayback: u64,

    /// Number of URLs probed at the same time
    #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    /// Per-request probe timeout, in seconds
    #[arg(long, default_value_t = DEFAULT_PROBE_TIMEOUT_SECS, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: u64,
}

/// Turns whatever was typed into a bare host name.
///
/// `example.com`, `https://example.com/` and `http://example.com/path` all
/// give `example.com`. Input that does not parse is returned trimmed.
pub fn normalize_domain(raw: &str) -> String {
    let trimmed = raw.trim();
    let with_scheme = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    Url::parse(&with_scheme)
        .ok()
        .and_then(|url| url.host_str().map(String::from))
        .unwrap_or_else(|| trimmed.to_string())
}
