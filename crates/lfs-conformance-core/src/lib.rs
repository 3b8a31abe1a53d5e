// crates/lfs-conformance-core/src/lib.rs
// ============================================================================
// Module: LFS Conformance Core Library
// Description: Identifier sources, endpoint resolution, and the sequential check runner.
// Purpose: Provide the transport-agnostic pieces of the LFS API conformance harness.
// Dependencies: rand, serde, serde_json, sha2, thiserror, url
// ============================================================================

//! ## Overview
//! `lfs-conformance-core` assembles the two identifier lists a conformance run
//! needs (objects known to exist on the server and objects known to be
//! absent), resolves the API [`Endpoint`] under test, and drives an ordered
//! [`CheckRegistry`] through the [`Runner`], rendering one status line per
//! check via [`ConsoleReporter`].
//! Invariants:
//! - Synthetic identifiers are byte-for-byte reproducible for a given count.
//! - The registry is frozen before the runner starts.
//! - Checks execute sequentially in registration order and never short-circuit.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod endpoint;
pub mod identifiers;
pub mod registry;
pub mod report;
pub mod runner;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::FileRunAuditSink;
pub use audit::NoopRunAuditSink;
pub use audit::RunAuditEvent;
pub use audit::RunAuditSink;
pub use audit::StderrRunAuditSink;
pub use endpoint::Endpoint;
pub use endpoint::EndpointError;
pub use endpoint::SshMetadata;
pub use identifiers::ContentId;
pub use identifiers::DEFAULT_IDENTIFIER_COUNT;
pub use identifiers::IdentifierError;
pub use identifiers::IdentifierSet;
pub use identifiers::IdentifierSource;
pub use identifiers::MAX_IDENTIFIER_FILE_BYTES;
pub use identifiers::parse_identifiers;
pub use identifiers::read_identifiers;
pub use identifiers::synthesize_identifiers;
pub use registry::CheckFailure;
pub use registry::CheckOutcome;
pub use registry::CheckRegistry;
pub use registry::CheckRegistryBuilder;
pub use registry::ConformanceCheck;
pub use registry::SETUP_CHECK_NAME;
pub use registry::setup_test_data_check;
pub use report::CheckReporter;
pub use report::ConsoleLabels;
pub use report::ConsoleReporter;
pub use report::DEFAULT_NAME_WIDTH;
pub use report::format_name_field;
pub use runner::EndpointSelection;
pub use runner::RunError;
pub use runner::RunPhase;
pub use runner::RunPlan;
pub use runner::RunSummary;
pub use runner::Runner;
pub use runner::SelectionError;
