// crates/lfs-conformance-checks/src/batch.rs
// ============================================================================
// Module: LFS Batch API Client
// Description: Blocking client for the Git LFS batch endpoint.
// Purpose: Issue bounded batch requests and decode per-object responses.
// Dependencies: lfs-conformance-core, reqwest, serde, serde_json
// ============================================================================

//! ## Overview
//! [`BatchClient`] posts `application/vnd.git-lfs+json` requests to
//! `<endpoint>/objects/batch` and decodes the per-object actions and errors
//! the server returns. Redirects are not followed and response bodies are
//! size-limited. Non-2xx statuses are errors; per-object errors are data.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::io::Read;
use std::time::Duration;

use lfs_conformance_core::ContentId;
use lfs_conformance_core::Endpoint;
use reqwest::blocking::Client;
use reqwest::blocking::Response;
use reqwest::header::ACCEPT;
use reqwest::header::CONTENT_TYPE;
use reqwest::redirect::Policy;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Git LFS media type for batch requests and responses.
pub const LFS_MEDIA_TYPE: &str = "application/vnd.git-lfs+json";
/// Transfer adapter advertised in every request.
pub const BASIC_TRANSFER: &str = "basic";
/// Default upper bound on batch response bodies.
pub const DEFAULT_MAX_RESPONSE_BYTES: usize = 16 * 1024 * 1024;
/// User agent sent with every request.
const USER_AGENT: &str = concat!("lfs-conformance/", env!("CARGO_PKG_VERSION"));

// ============================================================================
// SECTION: Wire Types
// ============================================================================

/// Batch operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// Request download actions.
    Download,
    /// Request upload actions.
    Upload,
}

/// Batch request body.
#[derive(Debug, Clone, Serialize)]
pub struct BatchRequest<'a> {
    /// Requested operation.
    pub operation: Operation,
    /// Supported transfer adapters.
    pub transfers: Vec<&'static str>,
    /// Objects to resolve.
    pub objects: Vec<ObjectSpec<'a>>,
}

impl<'a> BatchRequest<'a> {
    /// Builds a request for the given identifiers using the basic transfer.
    ///
    /// Sizes are unknown for opaque identifiers and are sent as zero.
    #[must_use]
    pub fn new(operation: Operation, oids: &[&'a ContentId]) -> Self {
        Self {
            operation,
            transfers: vec![BASIC_TRANSFER],
            objects: oids
                .iter()
                .map(|oid| ObjectSpec {
                    oid: oid.as_str(),
                    size: 0,
                })
                .collect(),
        }
    }
}

/// Object reference inside a batch request.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ObjectSpec<'a> {
    /// Object identifier.
    pub oid: &'a str,
    /// Object size in bytes.
    pub size: u64,
}

/// Batch response body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BatchResponse {
    /// Transfer adapter selected by the server.
    #[serde(default)]
    pub transfer: Option<String>,
    /// Per-object results.
    #[serde(default)]
    pub objects: Vec<ObjectResult>,
}

impl BatchResponse {
    /// Returns the first result for the given identifier.
    #[must_use]
    pub fn object(&self, oid: &ContentId) -> Option<&ObjectResult> {
        self.objects.iter().find(|object| object.oid == oid.as_str())
    }
}

/// Per-object batch result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ObjectResult {
    /// Object identifier.
    pub oid: String,
    /// Object size reported by the server.
    #[serde(default)]
    pub size: Option<u64>,
    /// Actions keyed by name (`download`, `upload`, `verify`).
    #[serde(default)]
    pub actions: BTreeMap<String, ObjectAction>,
    /// Per-object error.
    #[serde(default)]
    pub error: Option<ObjectError>,
}

impl ObjectResult {
    /// Returns true when the named action is present.
    #[must_use]
    pub fn has_action(&self, name: &str) -> bool {
        self.actions.contains_key(name)
    }
}

/// Transfer action returned for an object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ObjectAction {
    /// Target URL.
    pub href: String,
    /// Extra request headers.
    #[serde(default)]
    pub header: BTreeMap<String, String>,
    /// Lifetime in seconds.
    #[serde(default)]
    pub expires_in: Option<i64>,
    /// Absolute expiry timestamp.
    #[serde(default)]
    pub expires_at: Option<String>,
}

/// Per-object error returned by the server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ObjectError {
    /// HTTP-style status code (404 for missing objects).
    pub code: u16,
    /// Server-provided message.
    #[serde(default)]
    pub message: String,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Batch request errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BatchError {
    /// HTTP client construction failed.
    #[error("http client build failed: {0}")]
    Client(String),
    /// Request body encoding failed.
    #[error("batch request encoding failed: {0}")]
    Encode(String),
    /// Transport-level failure.
    #[error("batch request failed: {0}")]
    Transport(String),
    /// Server returned a non-success status.
    #[error("batch request returned status {0}")]
    Status(u16),
    /// Response body exceeded the size limit.
    #[error("batch response exceeds size limit")]
    TooLarge,
    /// Response body was not a valid batch response.
    #[error("batch response is not valid json: {0}")]
    Decode(String),
}

// ============================================================================
// SECTION: Client
// ============================================================================

/// Blocking Git LFS batch API client.
///
/// # Invariants
/// - Redirects are not followed.
/// - Response bodies larger than `max_response_bytes` fail closed.
#[derive(Debug, Clone)]
pub struct BatchClient {
    /// HTTP client used for outbound requests.
    client: Client,
    /// Maximum response size allowed, in bytes.
    max_response_bytes: usize,
}

impl BatchClient {
    /// Creates a client with the given per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`BatchError::Client`] when the HTTP client cannot be created.
    pub fn new(timeout: Duration) -> Result<Self, BatchError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .redirect(Policy::none())
            .build()
            .map_err(|err| BatchError::Client(err.to_string()))?;
        Ok(Self {
            client,
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
        })
    }

    /// Overrides the response size limit.
    #[must_use]
    pub const fn with_max_response_bytes(mut self, max_response_bytes: usize) -> Self {
        self.max_response_bytes = max_response_bytes;
        self
    }

    /// Posts a batch request for the given identifiers.
    ///
    /// # Errors
    ///
    /// Returns [`BatchError`] on transport failure, non-2xx status, oversized
    /// bodies, or undecodable responses.
    pub fn request(
        &self,
        endpoint: &Endpoint,
        operation: Operation,
        oids: &[&ContentId],
    ) -> Result<BatchResponse, BatchError> {
        let body = serde_json::to_vec(&BatchRequest::new(operation, oids))
            .map_err(|err| BatchError::Encode(err.to_string()))?;
        let mut response = self
            .client
            .post(endpoint.batch_url())
            .header(ACCEPT, LFS_MEDIA_TYPE)
            .header(CONTENT_TYPE, LFS_MEDIA_TYPE)
            .body(body)
            .send()
            .map_err(|err| BatchError::Transport(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(BatchError::Status(status.as_u16()));
        }
        let bytes = read_response_limited(&mut response, self.max_response_bytes)?;
        serde_json::from_slice(&bytes).map_err(|err| BatchError::Decode(err.to_string()))
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads a response body, failing when it exceeds `max_bytes`.
fn read_response_limited(response: &mut Response, max_bytes: usize) -> Result<Vec<u8>, BatchError> {
    let max_bytes_u64 = u64::try_from(max_bytes).map_err(|_| BatchError::TooLarge)?;
    if let Some(expected) = response.content_length()
        && expected > max_bytes_u64
    {
        return Err(BatchError::TooLarge);
    }
    let mut buf = Vec::new();
    let mut handle = response.take(max_bytes_u64.saturating_add(1));
    handle.read_to_end(&mut buf).map_err(|err| BatchError::Transport(err.to_string()))?;
    if buf.len() > max_bytes {
        return Err(BatchError::TooLarge);
    }
    Ok(buf)
}
