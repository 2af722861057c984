// src/core/models.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;

// --- Reusable Result Types ---

/// Outcome of one DNS lookup: the record strings, or the resolver error text.
pub type LookupResult = Result<Vec<String>, String>;

/// Record type name (e.g. `"MX"`) to the record values found for it.
pub type DnsRecords = BTreeMap<String, Vec<String>>;

// --- Liveness Models ---

/// HTTP method a probe outcome was obtained with.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProbeMethod {
    Head,
    Get,
}

/// What a server answered to a single probe request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResponse {
    pub status: u16,
    /// URL at the end of the redirect chain.
    pub final_url: String,
}

/// Result of checking one URL. Immutable once built by the checker.
///
/// `status` is absent only when `error` is present; both are present when
/// the transport reported an error together with a status code.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProbeOutcome {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub method: ProbeMethod,
}

impl ProbeOutcome {
    pub fn answered(url: String, method: ProbeMethod, response: ProbeResponse) -> Self {
        Self {
            url,
            status: Some(response.status),
            final_url: Some(response.final_url),
            error: None,
            method,
        }
    }

    pub fn failed(url: String, method: ProbeMethod, status: Option<u16>, error: String) -> Self {
        Self { url, status, final_url: None, error: Some(error), method }
    }

    /// True when the URL produced any HTTP response at all.
    pub fn is_live(&self) -> bool {
        self.status.is_some()
    }
}

// --- External Tool Models ---

/// How an external command ended. Every variant other than `Exited` means
/// the command produced nothing usable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolStatus {
    Exited(i32),
    NotFound,
    TimedOut,
    /// Killed by a signal before reporting an exit code.
    Signalled,
    SpawnFailed(String),
}

impl ToolStatus {
    /// Numeric code kept in the report: the exit code, `-1` for a missing
    /// binary, `-2` for a timeout and `-3` for anything else.
    pub fn rc(&self) -> i32 {
        match self {
            ToolStatus::Exited(code) => *code,
            ToolStatus::NotFound => -1,
            ToolStatus::TimedOut => -2,
            ToolStatus::Signalled | ToolStatus::SpawnFailed(_) => -3,
        }
    }
}

/// Captured run of an external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolRun {
    pub status: ToolStatus,
    pub stdout: String,
    pub stderr: String,
}

impl ToolRun {
    /// The command ran to completion and printed something.
    pub fn has_output(&self) -> bool {
        self.status.rc() >= 0 && !self.stdout.trim().is_empty()
    }
}

impl Serialize for ToolRun {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Flat<'a> {
            rc: i32,
            stdout: &'a str,
            stderr: &'a str,
        }

        Flat { rc: self.status.rc(), stdout: &self.stdout, stderr: &self.stderr }.serialize(serializer)
    }
}

/// Summary of an accepted archive tool run.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ArchiveToolSummary {
    pub rc: i32,
    pub count: usize,
}

/// Entry of the report's `external` section.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum ExternalRecord {
    Run(ToolRun),
    ArchiveTool(ArchiveToolSummary),
}

// --- Archive Models ---

/// Where the archive URL list came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ArchiveOrigin {
    Tool,
    CdxApi,
}

/// Deduplicated, capped list of archived URLs for a domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveHarvest {
    pub urls: Vec<String>,
    pub origin: ArchiveOrigin,
    /// Set only when the local tool was used.
    pub tool_summary: Option<ArchiveToolSummary>,
}

// --- Main Report ---

/// The single artifact of a run, written once as pretty JSON.
#[derive(Debug, Clone, Serialize)]
pub struct ReconReport {
    pub domain: String,
    pub timestamp: DateTime<Utc>,
    pub dns: DnsRecords,
    pub wayback: Vec<String>,
    pub wayback_source: ArchiveOrigin,
    pub wayback_check: Vec<ProbeOutcome>,
    pub external: BTreeMap<String, ExternalRecord>,
    pub basic_links_https: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_run_serializes_with_legacy_codes() {
        let run = ToolRun {
            status: ToolStatus::NotFound,
            stdout: String::new(),
            stderr: "Command not found: dig".to_string(),
        };
        let json = serde_json::to_value(&run).unwrap();
        assert_eq!(json["rc"], -1);
        assert_eq!(json["stderr"], "Command not found: dig");

        let timed_out = ToolRun { status: ToolStatus::TimedOut, stdout: String::new(), stderr: "Timeout".into() };
        assert_eq!(serde_json::to_value(&timed_out).unwrap()["rc"], -2);
    }

    #[test]
    fn failed_run_never_has_output() {
        let run = ToolRun { status: ToolStatus::TimedOut, stdout: "partial".into(), stderr: String::new() };
        assert!(!run.has_output());

        let empty = ToolRun { status: ToolStatus::Exited(0), stdout: "  \n".into(), stderr: String::new() };
        assert!(!empty.has_output());

        let non_zero = ToolRun { status: ToolStatus::Exited(1), stdout: "http://a/\n".into(), stderr: String::new() };
        assert!(non_zero.has_output());
    }

    #[test]
    fn outcome_omits_absent_fields() {
        let outcome = ProbeOutcome::failed("http://a/".into(), ProbeMethod::Get, None, "boom".into());
        let json = serde_json::to_value(&outcome).unwrap();
        assert!(json.get("status").is_none());
        assert!(json.get("final_url").is_none());
        assert_eq!(json["method"], "get");
        assert!(!outcome.is_live());
    }

    #[test]
    fn archive_origin_uses_report_names() {
        assert_eq!(serde_json::to_value(ArchiveOrigin::CdxApi).unwrap(), "cdx_api");
        assert_eq!(serde_json::to_value(ArchiveOrigin::Tool).unwrap(), "tool");
    }
}
