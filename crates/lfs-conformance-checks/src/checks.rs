// crates/lfs-conformance-checks/src/checks.rs
// ============================================================================
// Module: Built-in Conformance Checks
// Description: Read-only batch API checks registered in a fixed order.
// Purpose: Judge server responses against the known present/missing lists.
// Dependencies: lfs-conformance-core
// ============================================================================

//! ## Overview
//! Each check posts one batch request and inspects every requested object in
//! the response. Present objects must be downloadable and must not be offered
//! for upload; missing objects must report a 404 on download and be offered
//! for upload. A response that omits a requested object fails the check. A
//! check whose input list is empty passes without contacting the server.

// ============================================================================
// SECTION: Imports
// ============================================================================

use lfs_conformance_core::CheckFailure;
use lfs_conformance_core::CheckOutcome;
use lfs_conformance_core::CheckRegistry;
use lfs_conformance_core::CheckRegistryBuilder;
use lfs_conformance_core::ContentId;
use lfs_conformance_core::Endpoint;

use crate::batch::BatchClient;
use crate::batch::BatchResponse;
use crate::batch::ObjectResult;
use crate::batch::Operation;

// ============================================================================
// SECTION: Check Names
// ============================================================================

/// Download of objects known to exist.
pub const DOWNLOAD_ALL_PRESENT: &str = "Test download: all present";
/// Download of objects known to be absent.
pub const DOWNLOAD_ALL_MISSING: &str = "Test download: all missing";
/// Download of an interleaved present/missing request.
pub const DOWNLOAD_MIXED: &str = "Test download: mixed present and missing";
/// Upload of objects known to be absent.
pub const UPLOAD_ALL_MISSING: &str = "Test upload: all missing";
/// Upload of objects known to exist.
pub const UPLOAD_ALL_PRESENT: &str = "Test upload: all present";

/// Error code servers report for absent objects.
const NOT_FOUND: u16 = 404;

// ============================================================================
// SECTION: Registry
// ============================================================================

/// Builds the built-in registry in its fixed execution order.
#[must_use]
pub fn builtin_registry(client: &BatchClient) -> CheckRegistry {
    let present_client = client.clone();
    let missing_client = client.clone();
    let mixed_client = client.clone();
    let upload_missing_client = client.clone();
    let upload_present_client = client.clone();
    CheckRegistryBuilder::new()
        .check(DOWNLOAD_ALL_PRESENT, move |endpoint, present, _missing| {
            download_all_present(&present_client, endpoint, present)
        })
        .check(DOWNLOAD_ALL_MISSING, move |endpoint, _present, missing| {
            download_all_missing(&missing_client, endpoint, missing)
        })
        .check(DOWNLOAD_MIXED, move |endpoint, present, missing| {
            download_mixed(&mixed_client, endpoint, present, missing)
        })
        .check(UPLOAD_ALL_MISSING, move |endpoint, _present, missing| {
            upload_all_missing(&upload_missing_client, endpoint, missing)
        })
        .check(UPLOAD_ALL_PRESENT, move |endpoint, present, _missing| {
            upload_all_present(&upload_present_client, endpoint, present)
        })
        .build()
}

// ============================================================================
// SECTION: Checks
// ============================================================================

/// Every present object has a download action and no error.
///
/// # Errors
///
/// Returns [`CheckFailure`] describing the first non-conforming object.
pub fn download_all_present(
    client: &BatchClient,
    endpoint: &Endpoint,
    present: &[ContentId],
) -> CheckOutcome {
    let expected: Vec<Expectation<'_>> = present.iter().map(Expectation::downloadable).collect();
    verify(client, endpoint, Operation::Download, &expected)
}

/// Every missing object reports error 404 and carries no actions.
///
/// # Errors
///
/// Returns [`CheckFailure`] describing the first non-conforming object.
pub fn download_all_missing(
    client: &BatchClient,
    endpoint: &Endpoint,
    missing: &[ContentId],
) -> CheckOutcome {
    let expected: Vec<Expectation<'_>> = missing.iter().map(Expectation::not_found).collect();
    verify(client, endpoint, Operation::Download, &expected)
}

/// An interleaved request is judged object by object.
///
/// # Errors
///
/// Returns [`CheckFailure`] describing the first non-conforming object.
pub fn download_mixed(
    client: &BatchClient,
    endpoint: &Endpoint,
    present: &[ContentId],
    missing: &[ContentId],
) -> CheckOutcome {
    let mut expected = Vec::with_capacity(present.len() + missing.len());
    let mut present_iter = present.iter();
    let mut missing_iter = missing.iter();
    loop {
        let next_present = present_iter.next();
        let next_missing = missing_iter.next();
        if next_present.is_none() && next_missing.is_none() {
            break;
        }
        expected.extend(next_present.map(Expectation::downloadable));
        expected.extend(next_missing.map(Expectation::not_found));
    }
    verify(client, endpoint, Operation::Download, &expected)
}

/// Every missing object is offered an upload action.
///
/// # Errors
///
/// Returns [`CheckFailure`] describing the first non-conforming object.
pub fn upload_all_missing(
    client: &BatchClient,
    endpoint: &Endpoint,
    missing: &[ContentId],
) -> CheckOutcome {
    let expected: Vec<Expectation<'_>> = missing.iter().map(Expectation::uploadable).collect();
    verify(client, endpoint, Operation::Upload, &expected)
}

/// Present objects are not offered an upload action.
///
/// # Errors
///
/// Returns [`CheckFailure`] describing the first non-conforming object.
pub fn upload_all_present(
    client: &BatchClient,
    endpoint: &Endpoint,
    present: &[ContentId],
) -> CheckOutcome {
    let expected: Vec<Expectation<'_>> = present.iter().map(Expectation::already_stored).collect();
    verify(client, endpoint, Operation::Upload, &expected)
}

// ============================================================================
// SECTION: Verification
// ============================================================================

/// Expected server treatment of one object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expected {
    /// Download action, no error.
    Downloadable,
    /// Error 404, no actions.
    NotFound,
    /// Upload action, no error.
    Uploadable,
    /// No upload action, no error.
    AlreadyStored,
}

/// Identifier paired with its expected treatment.
#[derive(Debug, Clone, Copy)]
struct Expectation<'a> {
    /// Requested identifier.
    oid: &'a ContentId,
    /// Expected treatment.
    expected: Expected,
}

impl<'a> Expectation<'a> {
    /// Expects a download action.
    const fn downloadable(oid: &'a ContentId) -> Self {
        Self {
            oid,
            expected: Expected::Downloadable,
        }
    }

    /// Expects a 404 object error.
    const fn not_found(oid: &'a ContentId) -> Self {
        Self {
            oid,
            expected: Expected::NotFound,
        }
    }

    /// Expects an upload action.
    const fn uploadable(oid: &'a ContentId) -> Self {
        Self {
            oid,
            expected: Expected::Uploadable,
        }
    }

    /// Expects no upload action.
    const fn already_stored(oid: &'a ContentId) -> Self {
        Self {
            oid,
            expected: Expected::AlreadyStored,
        }
    }

    /// Judges the server's result for this object.
    fn judge(&self, object: &ObjectResult) -> Result<(), String> {
        let oid = self.oid;
        match self.expected {
            Expected::Downloadable | Expected::Uploadable | Expected::AlreadyStored => {
                if let Some(error) = &object.error {
                    return Err(format!(
                        "object {oid}: unexpected error {} {}",
                        error.code, error.message
                    ));
                }
            }
            Expected::NotFound => match &object.error {
                Some(error) if error.code == NOT_FOUND => {}
                Some(error) => {
                    return Err(format!(
                        "object {oid}: expected error {NOT_FOUND}, got {} {}",
                        error.code, error.message
                    ));
                }
                None => return Err(format!("object {oid}: expected error {NOT_FOUND}, got none")),
            },
        }
        match self.expected {
            Expected::Downloadable if !object.has_action("download") => {
                Err(format!("object {oid}: no download action"))
            }
            Expected::NotFound if !object.actions.is_empty() => {
                Err(format!("object {oid}: missing object returned actions"))
            }
            Expected::Uploadable if !object.has_action("upload") => {
                Err(format!("object {oid}: no upload action"))
            }
            Expected::AlreadyStored if object.has_action("upload") => {
                Err(format!("object {oid}: present object offered for upload"))
            }
            _ => Ok(()),
        }
    }
}

/// Sends one batch request and judges every expected object.
fn verify(
    client: &BatchClient,
    endpoint: &Endpoint,
    operation: Operation,
    expected: &[Expectation<'_>],
) -> CheckOutcome {
    if expected.is_empty() {
        return Ok(());
    }
    let oids: Vec<&ContentId> = expected.iter().map(|expectation| expectation.oid).collect();
    let response = client
        .request(endpoint, operation, &oids)
        .map_err(|err| CheckFailure::new(err.to_string()))?;
    judge_response(&response, expected)
}

/// Collects per-object problems and reports the first with a count of the rest.
fn judge_response(response: &BatchResponse, expected: &[Expectation<'_>]) -> CheckOutcome {
    let problems: Vec<String> = expected
        .iter()
        .filter_map(|expectation| match response.object(expectation.oid) {
            Some(object) => expectation.judge(object).err(),
            None => Some(format!("object {} missing from batch response", expectation.oid)),
        })
        .collect();
    match problems.split_first() {
        None => Ok(()),
        Some((first, [])) => Err(CheckFailure::new(first.clone())),
        Some((first, rest)) => {
            Err(CheckFailure::new(format!("{first} (and {} more objects)", rest.len())))
        }
    }
}
