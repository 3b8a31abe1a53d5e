// crates/lfs-conformance-core/src/audit.rs
// ============================================================================
// Module: Run Audit Logging
// Description: Structured audit events for conformance runs.
// Purpose: Emit JSON-lines run records without hard logging dependencies.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! This module defines the audit event payload and sinks for conformance run
//! logging. Events are serialized as one JSON object per line so operators can
//! route them to their preferred pipeline. Sinks never fail the run: write
//! errors are swallowed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

use crate::registry::CheckOutcome;
use crate::runner::RunPhase;
use crate::runner::RunSummary;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Conformance run audit event payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Endpoint under test when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// Runner phase for phase transitions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<RunPhase>,
    /// Check name for check results.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check: Option<String>,
    /// Check outcome label (`ok` or `failed`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<&'static str>,
    /// Failure message for failed checks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Number of passing checks at run end.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub passed: Option<usize>,
    /// Number of failing checks at run end.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed: Option<usize>,
}

impl RunAuditEvent {
    /// Builds an empty event with the current timestamp.
    fn base(event: &'static str) -> Self {
        Self {
            event,
            timestamp_ms: now_millis(),
            endpoint: None,
            phase: None,
            check: None,
            outcome: None,
            message: None,
            passed: None,
            failed: None,
        }
    }

    /// Event emitted once before any identifiers are acquired.
    #[must_use]
    pub fn run_started(endpoint: &str) -> Self {
        Self {
            endpoint: Some(endpoint.to_string()),
            ..Self::base("run_started")
        }
    }

    /// Event emitted on each runner phase transition.
    #[must_use]
    pub fn phase_entered(phase: RunPhase) -> Self {
        Self {
            phase: Some(phase),
            ..Self::base("phase_entered")
        }
    }

    /// Event emitted after every check, including setup.
    #[must_use]
    pub fn check_finished(check: &str, outcome: &CheckOutcome) -> Self {
        let (label, message) = match outcome {
            Ok(()) => ("ok", None),
            Err(failure) => ("failed", Some(failure.message().to_string())),
        };
        Self {
            check: Some(check.to_string()),
            outcome: Some(label),
            message,
            ..Self::base("check_finished")
        }
    }

    /// Event emitted after every registered check has been attempted.
    #[must_use]
    pub fn run_finished(summary: &RunSummary) -> Self {
        Self {
            passed: Some(summary.passed()),
            failed: Some(summary.failed()),
            ..Self::base("run_finished")
        }
    }
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Audit sink for conformance run events.
pub trait RunAuditSink {
    /// Records a run audit event.
    fn record(&self, event: &RunAuditEvent);
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrRunAuditSink;

impl RunAuditSink for StderrRunAuditSink {
    fn record(&self, event: &RunAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Audit sink that logs JSON lines to a file.
pub struct FileRunAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileRunAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl RunAuditSink for FileRunAuditSink {
    fn record(&self, event: &RunAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

/// No-op audit sink.
pub struct NoopRunAuditSink;

impl RunAuditSink for NoopRunAuditSink {
    fn record(&self, _event: &RunAuditEvent) {}
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns the current wall-clock time in milliseconds since the epoch.
fn now_millis() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).map_or(0, |duration| duration.as_millis())
}
