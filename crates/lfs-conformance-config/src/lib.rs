// crates/lfs-conformance-config/src/lib.rs
// ============================================================================
// Module: LFS Conformance Config Library
// Description: Canonical config model and validation.
// Purpose: Single source of truth for lfs-conformance.toml semantics.
// Dependencies: lfs-conformance-core, serde, toml
// ============================================================================

//! ## Overview
//! `lfs-conformance-config` defines the configuration model for the
//! conformance harness. Loading is strict and fail-closed: unknown fields,
//! oversized files, and out-of-range values are rejected.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
