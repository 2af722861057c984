// src/core/mod.rs

// The `core` module holds everything that is not command-line plumbing:
// data models, error types, the scanners and the report writer.

/// Data structures shared by the scanners and the report, such as
/// `ProbeOutcome`, `ToolRun` and `ReconReport`.
pub mod models;

/// Typed failures of probes, URL sources and the report writer.
pub mod error;

/// DNS, archive, liveness and link scanners plus the run orchestrator.
pub mod scanner;

/// Report assembly and the single persisting write of a run.
pub mod report;
