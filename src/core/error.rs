// src/core/error.rs

use std::path::PathBuf;
use thiserror::Error;

/// Why a single HEAD or GET probe did not produce a response.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    #[error("request timed out")]
    Timeout,
    /// The client gave up but still knew the status of the last response.
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("request failed: {0}")]
    Request(String),
    #[error("probe task failed: {0}")]
    Task(String),
}

impl ProbeError {
    /// Status carried by the failure, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ProbeError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ProbeError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ProbeError::Timeout
        } else if let Some(status) = e.status() {
            ProbeError::Status { status: status.as_u16(), message: e.to_string() }
        } else if e.is_connect() {
            ProbeError::Connect(e.to_string())
        } else {
            ProbeError::Request(e.to_string())
        }
    }
}

/// Failure of a remote URL source. Callers log it and carry on with no URLs.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("archive request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("archive answered with HTTP {0}")]
    UnexpectedStatus(u16),
    #[error("archive response is not a JSON array of records")]
    Decode,
}

/// The only fatal condition of a run: the report could not be persisted.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("cannot write report to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}
