// crates/lfs-conformance-core/src/registry.rs
// ============================================================================
// Module: Conformance Check Registry
// Description: Named check procedures and the frozen, ordered registry.
// Purpose: Replace ambient global check tables with an explicit startup-built list.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! A [`ConformanceCheck`] pairs a display name with a procedure taking the
//! endpoint and both identifier lists. Checks are appended to a
//! [`CheckRegistryBuilder`] at startup; [`CheckRegistryBuilder::build`]
//! freezes them into a read-only [`CheckRegistry`].
//!
//! ## Invariants
//! - Registration order is execution order.
//! - A built registry exposes no mutation API.
//! - The setup check is never registered; the runner invokes it separately.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use thiserror::Error;

use crate::endpoint::Endpoint;
use crate::identifiers::ContentId;
use crate::identifiers::IdentifierSet;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Display name of the fixture setup check.
pub const SETUP_CHECK_NAME: &str = "Set up test data";

// ============================================================================
// SECTION: Outcomes
// ============================================================================

/// Descriptive failure returned by a conformance check.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct CheckFailure {
    /// Human-readable failure detail.
    message: String,
}

impl CheckFailure {
    /// Creates a failure with the provided message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Returns the failure message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Result of a single check: success or a descriptive failure.
pub type CheckOutcome = Result<(), CheckFailure>;

/// Procedure signature shared by every check.
type CheckProcedure = Box<dyn Fn(&Endpoint, &[ContentId], &[ContentId]) -> CheckOutcome>;

// ============================================================================
// SECTION: Conformance Check
// ============================================================================

/// Named conformance check procedure.
pub struct ConformanceCheck {
    /// Display name rendered by the reporter.
    name: String,
    /// Check procedure.
    procedure: CheckProcedure,
}

impl ConformanceCheck {
    /// Creates a named check from a procedure.
    pub fn new<F>(name: impl Into<String>, procedure: F) -> Self
    where
        F: Fn(&Endpoint, &[ContentId], &[ContentId]) -> CheckOutcome + 'static,
    {
        Self {
            name: name.into(),
            procedure: Box::new(procedure),
        }
    }

    /// Returns the check display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Runs the check against the endpoint and identifier set.
    ///
    /// # Errors
    ///
    /// Returns [`CheckFailure`] when the endpoint does not conform.
    pub fn run(&self, endpoint: &Endpoint, identifiers: &IdentifierSet) -> CheckOutcome {
        (self.procedure)(endpoint, identifiers.present(), identifiers.missing())
    }
}

impl fmt::Debug for ConformanceCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConformanceCheck").field("name", &self.name).finish_non_exhaustive()
    }
}

/// Returns the fixture setup check.
///
/// Fixture creation is not implemented yet; the check reserves its slot in
/// the run and always succeeds.
#[must_use]
pub fn setup_test_data_check() -> ConformanceCheck {
    ConformanceCheck::new(SETUP_CHECK_NAME, |_endpoint, _present, _missing| Ok(()))
}

// ============================================================================
// SECTION: Registry
// ============================================================================

/// Append-only builder used during startup.
#[derive(Debug, Default)]
pub struct CheckRegistryBuilder {
    /// Checks in registration order.
    checks: Vec<ConformanceCheck>,
}

impl CheckRegistryBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a check.
    #[must_use]
    pub fn register(mut self, check: ConformanceCheck) -> Self {
        self.checks.push(check);
        self
    }

    /// Appends a check built from a name and procedure.
    #[must_use]
    pub fn check<F>(self, name: impl Into<String>, procedure: F) -> Self
    where
        F: Fn(&Endpoint, &[ContentId], &[ContentId]) -> CheckOutcome + 'static,
    {
        self.register(ConformanceCheck::new(name, procedure))
    }

    /// Freezes the registry.
    #[must_use]
    pub fn build(self) -> CheckRegistry {
        CheckRegistry {
            checks: self.checks,
        }
    }
}

/// Frozen, ordered list of conformance checks.
///
/// # Invariants
/// - Contents never change after [`CheckRegistryBuilder::build`].
#[derive(Debug, Default)]
pub struct CheckRegistry {
    /// Checks in registration order.
    checks: Vec<ConformanceCheck>,
}

impl CheckRegistry {
    /// Returns the number of registered checks.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.checks.len()
    }

    /// Returns true when no checks are registered.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    /// Iterates checks in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &ConformanceCheck> {
        self.checks.iter()
    }

    /// Returns check names in registration order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.checks.iter().map(ConformanceCheck::name).collect()
    }
}
