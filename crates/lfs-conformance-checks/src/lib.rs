// crates/lfs-conformance-checks/src/lib.rs
// ============================================================================
// Module: LFS Conformance Checks Library
// Description: Batch API client and the built-in conformance check registry.
// Purpose: Supply the checks the runner executes against a live server.
// Dependencies: lfs-conformance-core, reqwest, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! `lfs-conformance-checks` implements read-only conformance checks against
//! the Git LFS batch API. [`builtin_registry`] returns them in their fixed
//! execution order; each check shares one [`BatchClient`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod batch;
pub mod checks;


// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use batch::BatchClient;
pub use batch::BatchError;
pub use batch::BatchRequest;
pub use batch::BatchResponse;
pub use batch::LFS_MEDIA_TYPE;
pub use batch::ObjectAction;
pub use batch::ObjectError;
pub use batch::ObjectResult;
pub use batch::Operation;
pub use checks::DOWNLOAD_ALL_MISSING;
pub use checks::DOWNLOAD_ALL_PRESENT;
pub use checks::DOWNLOAD_MIXED;
pub use checks::UPLOAD_ALL_MISSING;
pub use checks::UPLOAD_ALL_PRESENT;
pub use checks::builtin_registry;
