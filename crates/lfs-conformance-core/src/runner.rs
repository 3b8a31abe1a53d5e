// crates/lfs-conformance-core/src/runner.rs
// ============================================================================
// Module: Conformance Runner
// Description: Mode selection, identifier acquisition, setup, and sequential execution.
// Purpose: Drive registered checks against one endpoint and collect their outcomes.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! A run moves through fixed phases:
//! `ModeSelection -> IdentifierAcquisition -> [Setup] -> Execution -> Done`.
//! [`RunPlan::select`] validates the operator's endpoint and file choices
//! before anything executes. [`Runner::run`] then resolves the endpoint,
//! acquires identifiers, runs the setup check when identifiers were
//! synthesized, and executes every registered check in order.
//!
//! ## Invariants
//! - Configuration errors surface before any check runs.
//! - Setup runs exactly once, first, and only for synthesized identifiers.
//! - A setup failure prevents every registered check from running.
//! - Registered checks all run, in order, regardless of earlier failures.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::audit::RunAuditEvent;
use crate::audit::RunAuditSink;
use crate::endpoint::Endpoint;
use crate::endpoint::EndpointError;
use crate::identifiers::IdentifierError;
use crate::identifiers::IdentifierSet;
use crate::identifiers::IdentifierSource;
use crate::registry::CheckFailure;
use crate::registry::CheckOutcome;
use crate::registry::CheckRegistry;
use crate::registry::ConformanceCheck;
use crate::registry::setup_test_data_check;
use crate::report::CheckReporter;

// ============================================================================
// SECTION: Phases
// ============================================================================

/// Runner phases in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    /// Endpoint and identifier mode are being resolved.
    ModeSelection,
    /// Identifiers are being read or synthesized.
    IdentifierAcquisition,
    /// The fixture setup check is running.
    Setup,
    /// Registered checks are running.
    Execution,
    /// Every registered check has been attempted.
    Done,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Invalid endpoint or positional argument selection.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    /// Neither or both of the API URL and clone URL were supplied.
    #[error("must supply either an API URL or a clone URL (and not both)")]
    EndpointSelection,
    /// A positional file count other than zero or two was supplied.
    #[error(
        "must supply either no file arguments or both the exists and missing file (got {count})"
    )]
    FileArguments {
        /// Number of positional file arguments received.
        count: usize,
    },
}

/// Fatal run errors; no further checks run once one is returned.
#[derive(Debug, Error)]
pub enum RunError {
    /// Endpoint or file selection was invalid.
    #[error(transparent)]
    Selection(#[from] SelectionError),
    /// The endpoint could not be resolved.
    #[error(transparent)]
    Endpoint(#[from] EndpointError),
    /// Identifier files could not be read.
    #[error(transparent)]
    Identifiers(#[from] IdentifierError),
    /// The setup check failed; registered checks were skipped.
    #[error("failed to set up test data, aborting: {0}")]
    SetupFailed(CheckFailure),
    /// Reporter output could not be written.
    #[error("failed to write report output: {0}")]
    Output(#[from] io::Error),
}

// ============================================================================
// SECTION: Run Plan
// ============================================================================

/// Operator's endpoint choice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndpointSelection {
    /// Direct LFS API base URL.
    ApiUrl(String),
    /// Repository clone URL from which the API URL is derived.
    CloneUrl(String),
}

impl EndpointSelection {
    /// Resolves the selection into an endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`EndpointError`] when the URL cannot be resolved.
    pub fn resolve(&self) -> Result<Endpoint, EndpointError> {
        match self {
            Self::ApiUrl(url) => Endpoint::from_api_url(url),
            Self::CloneUrl(url) => Endpoint::from_clone_url(url),
        }
    }

    /// Returns the raw URL as supplied.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::ApiUrl(url) | Self::CloneUrl(url) => url,
        }
    }
}

/// Validated run inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPlan {
    /// Endpoint selection.
    selection: EndpointSelection,
    /// Identifier source.
    source: IdentifierSource,
}

impl RunPlan {
    /// Validates the endpoint choice and positional file arguments.
    ///
    /// Empty URL strings count as absent. With no files, identifiers are
    /// synthesized using `count`.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError`] when exactly one of `api_url` / `clone_url`
    /// is not supplied or when `files` holds neither zero nor two paths.
    pub fn select(
        api_url: Option<&str>,
        clone_url: Option<&str>,
        files: &[PathBuf],
        count: usize,
    ) -> Result<Self, SelectionError> {
        let api_url = api_url.filter(|value| !value.is_empty());
        let clone_url = clone_url.filter(|value| !value.is_empty());
        let selection = match (api_url, clone_url) {
            (Some(url), None) => EndpointSelection::ApiUrl(url.to_string()),
            (None, Some(url)) => EndpointSelection::CloneUrl(url.to_string()),
            _ => return Err(SelectionError::EndpointSelection),
        };
        let source = match files {
            [] => IdentifierSource::Synthetic {
                count,
            },
            [present, missing] => IdentifierSource::Files {
                present: present.clone(),
                missing: missing.clone(),
            },
            _ => {
                return Err(SelectionError::FileArguments {
                    count: files.len(),
                });
            }
        };
        Ok(Self {
            selection,
            source,
        })
    }

    /// Returns the endpoint selection.
    #[must_use]
    pub const fn selection(&self) -> &EndpointSelection {
        &self.selection
    }

    /// Returns the identifier source.
    #[must_use]
    pub const fn source(&self) -> &IdentifierSource {
        &self.source
    }
}

// ============================================================================
// SECTION: Summary
// ============================================================================

/// Outcomes of every registered check, in execution order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Check names paired with their outcomes.
    results: Vec<(String, CheckOutcome)>,
}

impl RunSummary {
    /// Returns check names paired with outcomes.
    #[must_use]
    pub fn results(&self) -> &[(String, CheckOutcome)] {
        &self.results
    }

    /// Returns the number of passing checks.
    #[must_use]
    pub fn passed(&self) -> usize {
        self.results.iter().filter(|(_, outcome)| outcome.is_ok()).count()
    }

    /// Returns the number of failing checks.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.results.len() - self.passed()
    }

    /// Returns true when no registered check failed.
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failed() == 0
    }
}

// ============================================================================
// SECTION: Runner
// ============================================================================

/// Sequential conformance runner.
pub struct Runner<'a> {
    /// Registered checks.
    registry: &'a CheckRegistry,
    /// Fixture setup check, run only for synthesized identifiers.
    setup: ConformanceCheck,
    /// Audit sink for run events.
    audit: &'a dyn RunAuditSink,
}

impl<'a> Runner<'a> {
    /// Creates a runner using the built-in setup check.
    #[must_use]
    pub fn new(registry: &'a CheckRegistry, audit: &'a dyn RunAuditSink) -> Self {
        Self {
            registry,
            setup: setup_test_data_check(),
            audit,
        }
    }

    /// Replaces the setup check.
    #[must_use]
    pub fn with_setup(mut self, setup: ConformanceCheck) -> Self {
        self.setup = setup;
        self
    }

    /// Executes a validated plan.
    ///
    /// # Errors
    ///
    /// Returns [`RunError`] for endpoint or identifier errors, setup failure,
    /// or reporter output failure. Individual check failures are returned in
    /// the [`RunSummary`] instead.
    pub fn run(
        &self,
        plan: &RunPlan,
        reporter: &mut dyn CheckReporter,
    ) -> Result<RunSummary, RunError> {
        self.enter(RunPhase::ModeSelection);
        let endpoint = plan.selection().resolve()?;
        self.audit.record(&RunAuditEvent::run_started(endpoint.as_str()));

        self.enter(RunPhase::IdentifierAcquisition);
        let identifiers = plan.source().acquire()?;

        self.execute(&endpoint, &identifiers, plan.source().requires_setup(), reporter)
    }

    /// Runs setup (when required) and every registered check.
    ///
    /// # Errors
    ///
    /// Returns [`RunError::SetupFailed`] when setup fails and
    /// [`RunError::Output`] when the reporter cannot write.
    pub fn execute(
        &self,
        endpoint: &Endpoint,
        identifiers: &IdentifierSet,
        setup_required: bool,
        reporter: &mut dyn CheckReporter,
    ) -> Result<RunSummary, RunError> {
        reporter.identifiers_acquired(setup_required)?;
        if setup_required {
            self.enter(RunPhase::Setup);
            if let Err(failure) = self.run_check(&self.setup, endpoint, identifiers, reporter)? {
                return Err(RunError::SetupFailed(failure));
            }
        }

        self.enter(RunPhase::Execution);
        reporter.run_started(self.registry.len())?;
        let mut results = Vec::with_capacity(self.registry.len());
        for check in self.registry.iter() {
            let outcome = self.run_check(check, endpoint, identifiers, reporter)?;
            results.push((check.name().to_string(), outcome));
        }
        let summary = RunSummary {
            results,
        };

        self.enter(RunPhase::Done);
        self.audit.record(&RunAuditEvent::run_finished(&summary));
        Ok(summary)
    }

    /// Runs one check through the reporter and audit sink.
    fn run_check(
        &self,
        check: &ConformanceCheck,
        endpoint: &Endpoint,
        identifiers: &IdentifierSet,
        reporter: &mut dyn CheckReporter,
    ) -> Result<CheckOutcome, RunError> {
        reporter.check_started(check.name())?;
        let outcome = check.run(endpoint, identifiers);
        reporter.check_finished(check.name(), &outcome)?;
        self.audit.record(&RunAuditEvent::check_finished(check.name(), &outcome));
        Ok(outcome)
    }

    /// Records a phase transition.
    fn enter(&self, phase: RunPhase) {
        self.audit.record(&RunAuditEvent::phase_entered(phase));
    }
}
