// crates/lfs-conformance-core/src/report.rs
// ============================================================================
// Module: Check Reporter
// Description: Fixed-width, in-place status lines for conformance checks.
// Purpose: Render run progress and per-check pass/fail to a console stream.
// Dependencies: Standard library I/O.
// ============================================================================

//! ## Overview
//! [`ConsoleReporter`] prints each check name padded or truncated to a fixed
//! column width followed by a `...` running marker and a carriage return, then
//! overwrites the line with `OK` or `FAILED` when the check returns. Failure
//! detail goes on the following line. Labels are injectable so callers can
//! localize them.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io;
use std::io::Write;

use crate::registry::CheckOutcome;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default width of the check name column.
pub const DEFAULT_NAME_WIDTH: usize = 70;

// ============================================================================
// SECTION: Reporter Trait
// ============================================================================

/// Receives run progress from the [`crate::Runner`].
pub trait CheckReporter {
    /// Announces how identifiers were acquired.
    ///
    /// # Errors
    ///
    /// Returns [`io::Error`] when output fails.
    fn identifiers_acquired(&mut self, synthetic: bool) -> io::Result<()>;

    /// Announces the number of registered checks about to run.
    ///
    /// # Errors
    ///
    /// Returns [`io::Error`] when output fails.
    fn run_started(&mut self, total: usize) -> io::Result<()>;

    /// Marks a check as running.
    ///
    /// # Errors
    ///
    /// Returns [`io::Error`] when output fails.
    fn check_started(&mut self, name: &str) -> io::Result<()>;

    /// Records the outcome of a check.
    ///
    /// # Errors
    ///
    /// Returns [`io::Error`] when output fails.
    fn check_finished(&mut self, name: &str, outcome: &CheckOutcome) -> io::Result<()>;
}

// ============================================================================
// SECTION: Labels
// ============================================================================

/// User-facing strings rendered by [`ConsoleReporter`].
///
/// # Invariants
/// - `running` contains a `{count}` placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleLabels {
    /// Banner printed when identifiers were read from files.
    pub files_banner: String,
    /// Banner printed when identifiers were synthesized.
    pub synthetic_banner: String,
    /// Template announcing the check count.
    pub running: String,
    /// Status word for a passing check.
    pub ok: String,
    /// Status word for a failing check.
    pub failed: String,
}

impl Default for ConsoleLabels {
    fn default() -> Self {
        Self {
            files_banner: "Reading test data from files (no server content changes)".to_string(),
            synthetic_banner: "Creating test data (will modify server contents)".to_string(),
            running: "Running {count} tests...".to_string(),
            ok: "OK".to_string(),
            failed: "FAILED".to_string(),
        }
    }
}

// ============================================================================
// SECTION: Console Reporter
// ============================================================================

/// Reporter writing fixed-width status lines to a stream.
#[derive(Debug)]
pub struct ConsoleReporter<W: Write> {
    /// Destination stream (normally stdout).
    out: W,
    /// Width of the name column.
    width: usize,
    /// Rendered labels.
    labels: ConsoleLabels,
}

impl<W: Write> ConsoleReporter<W> {
    /// Creates a reporter with the default width and English labels.
    pub fn new(out: W) -> Self {
        Self {
            out,
            width: DEFAULT_NAME_WIDTH,
            labels: ConsoleLabels::default(),
        }
    }

    /// Overrides the name column width.
    #[must_use]
    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    /// Overrides the rendered labels.
    #[must_use]
    pub fn with_labels(mut self, labels: ConsoleLabels) -> Self {
        self.labels = labels;
        self
    }

    /// Consumes the reporter and returns the underlying stream.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> CheckReporter for ConsoleReporter<W> {
    fn identifiers_acquired(&mut self, synthetic: bool) -> io::Result<()> {
        let banner =
            if synthetic { &self.labels.synthetic_banner } else { &self.labels.files_banner };
        writeln!(self.out, "{banner}")
    }

    fn run_started(&mut self, total: usize) -> io::Result<()> {
        let line = self.labels.running.replace("{count}", &total.to_string());
        writeln!(self.out, "{line}")
    }

    fn check_started(&mut self, name: &str) -> io::Result<()> {
        let field = format_name_field(name, self.width);
        write!(self.out, "{field}...\r")?;
        self.out.flush()
    }

    fn check_finished(&mut self, name: &str, outcome: &CheckOutcome) -> io::Result<()> {
        let field = format_name_field(name, self.width);
        match outcome {
            Ok(()) => writeln!(self.out, "{field} {}", self.labels.ok)?,
            Err(failure) => {
                writeln!(self.out, "{field} {}", self.labels.failed)?;
                writeln!(self.out, "{failure}")?;
            }
        }
        self.out.flush()
    }
}

// ============================================================================
// SECTION: Formatting
// ============================================================================

/// Left-justifies `name` in a field of exactly `width` characters.
///
/// Longer names are truncated on a character boundary.
#[must_use]
pub fn format_name_field(name: &str, width: usize) -> String {
    let mut field: String = name.chars().take(width).collect();
    let used = field.chars().count();
    field.extend(std::iter::repeat_n(' ', width - used));
    field
}
