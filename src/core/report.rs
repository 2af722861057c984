// src/core/report.rs

use crate::core::error::ReportError;
use crate::core::models::{
    ArchiveHarvest, DnsRecords, ExternalRecord, ProbeOutcome, ReconReport,
};
use chrono::Utc;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

/// Merges the collaborators' results into one report stamped with the
/// current UTC time. Every input has already been normalised, so this
/// cannot fail.
pub fn assemble_report(
    domain: &str,
    dns: DnsRecords,
    harvest: ArchiveHarvest,
    wayback_check: Vec<ProbeOutcome>,
    mut external: BTreeMap<String, ExternalRecord>,
    basic_links_https: Vec<String>,
) -> ReconReport {
    if let Some(summary) = harvest.tool_summary {
        external.insert("wayback_binary".to_string(), ExternalRecord::ArchiveTool(summary));
    }

    ReconReport {
        domain: domain.to_string(),
        timestamp: Utc::now(),
        dns,
        wayback: harvest.urls,
        wayback_source: harvest.origin,
        wayback_check,
        external,
        basic_links_https,
    }
}

/// Writes the report as pretty-printed JSON, replacing any existing file.
pub fn write_report(report: &ReconReport, path: &Path) -> Result<(), ReportError> {
    let io_err = |source| ReportError::Io { path: path.to_path_buf(), source };

    let file = File::create(path).map_err(io_err)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, report)?;
    writer.write_all(b"\n").map_err(io_err)?;
    writer.flush().map_err(io_err)?;

    info!(path = %path.display(), "Report written.");
    Ok(())
}
