// src/core/scanner/external_tool.rs

use crate::core::models::{ToolRun, ToolStatus};
use std::io::ErrorKind;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Runs an external command and captures its output.
///
/// A missing binary, a timeout, a signal and a spawn failure are reported as
/// distinct `ToolStatus` variants; none of them is returned as an error. The
/// child is killed if the timeout fires.
///
/// # Arguments
/// * `argv` - The program followed by its arguments.
/// * `timeout` - How long the command may run before it is abandoned.
pub async fn run_external_tool(argv: &[&str], timeout: Duration) -> ToolRun {
    let Some((program, args)) = argv.split_first() else {
        return ToolRun {
            status: ToolStatus::SpawnFailed("empty command".to_string()),
            stdout: String::new(),
            stderr: "empty command".to_string(),
        };
    };

    debug!(program, ?args, "Spawning external tool.");
    let child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn();

    let child = match child {
        Ok(child) => child,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!(program, "External tool not found.");
            return ToolRun {
                status: ToolStatus::NotFound,
                stdout: String::new(),
                stderr: format!("Command not found: {program}"),
            };
        }
        Err(e) => {
            warn!(program, error = %e, "External tool could not be started.");
            return ToolRun {
                status: ToolStatus::SpawnFailed(e.to_string()),
                stdout: String::new(),
                stderr: e.to_string(),
            };
        }
    };

    // Dropping the pending future on timeout drops the child, which kills it.
    match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(Ok(output)) => {
            let status = match output.status.code() {
                Some(code) => ToolStatus::Exited(code),
                None => ToolStatus::Signalled,
            };
            info!(program, rc = status.rc(), bytes = output.stdout.len(), "External tool finished.");
            ToolRun {
                status,
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            }
        }
        Ok(Err(e)) => {
            warn!(program, error = %e, "Failed to collect external tool output.");
            ToolRun {
                status: ToolStatus::SpawnFailed(e.to_string()),
                stdout: String::new(),
                stderr: e.to_string(),
            }
        }
        Err(_) => {
            warn!(program, timeout_secs = timeout.as_secs(), "External tool timed out.");
            ToolRun { status: ToolStatus::TimedOut, stdout: String::new(), stderr: "Timeout".to_string() }
        }
    }
}

/// Splits newline-delimited tool output into URLs, dropping blank lines.
pub fn parse_url_lines(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}
