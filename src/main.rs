// src/main.rs

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use vanguard_recon::cli::{normalize_domain, Args};
use vanguard_recon::config::ReconConfig;
use vanguard_recon::core::report::write_report;
use vanguard_recon::core::scanner::{ReconRequest, ReconScanner};
use vanguard_recon::logging;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    logging::initialize_logging()?;

    let config = ReconConfig::default()
        .with_concurrency(args.concurrency)
        .with_probe_timeout(Duration::from_secs(args.timeout));

    let request = ReconRequest {
        domain: normalize_domain(&args.domain),
        use_archive_tool: args.use_wayback_bin,
        run_dig: args.run_dig,
        max_archive_urls: usize::try_from(args.max_wayback).unwrap_or(usize::MAX),
    };

    let scanner = ReconScanner::new(config).wrap_err("failed to build HTTP clients")?;
    let report = scanner.run_full_recon(&request).await;

    // Persisting the report is the one step allowed to fail the run.
    write_report(&report, Path::new(&args.out))?;
    info!(path = %args.out, "Results written.");
    Ok(())
}
