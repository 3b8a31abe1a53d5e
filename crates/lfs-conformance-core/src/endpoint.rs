// crates/lfs-conformance-core/src/endpoint.rs
// ============================================================================
// Module: LFS API Endpoint
// Description: Resolves the LFS API base URL from an API URL or a clone URL.
// Purpose: Provide the single immutable endpoint handle shared by every check.
// Dependencies: thiserror, url
// ============================================================================

//! ## Overview
//! An [`Endpoint`] is constructed once per run, either directly from the API
//! base URL or derived from a repository clone URL using the Git LFS
//! convention (`<repo>.git/info/lfs`). SSH and scp-style clone URLs map to
//! the HTTPS API on the same host; the SSH coordinates are kept alongside for
//! reference.
//!
//! ## Invariants
//! - The base URL is absolute `http`/`https` without a trailing slash.
//! - Endpoints are never mutated after construction.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use thiserror::Error;
use url::Url;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Path appended to a repository URL to reach its LFS API.
const LFS_API_SUFFIX: &str = "info/lfs";
/// Repository suffix enforced before the LFS API path.
const GIT_SUFFIX: &str = ".git";
/// Path of the batch API relative to the endpoint base.
const BATCH_PATH: &str = "objects/batch";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while resolving an endpoint.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EndpointError {
    /// The URL could not be parsed.
    #[error("invalid url {url}: {reason}")]
    InvalidUrl {
        /// Raw URL as supplied.
        url: String,
        /// Parser failure description.
        reason: String,
    },
    /// The URL scheme cannot address an LFS API.
    #[error("unsupported url scheme: {0}")]
    UnsupportedScheme(String),
    /// The URL has no host component.
    #[error("url has no host: {0}")]
    MissingHost(String),
}

// ============================================================================
// SECTION: SSH Metadata
// ============================================================================

/// SSH coordinates captured from an SSH or scp-style clone URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SshMetadata {
    /// `user@host` (or bare host) used for SSH authentication.
    pub user_and_host: String,
    /// Repository path on the remote host.
    pub path: String,
    /// Explicit SSH port when present.
    pub port: Option<u16>,
}

// ============================================================================
// SECTION: Endpoint
// ============================================================================

/// Resolved LFS API endpoint.
///
/// # Invariants
/// - `base` parses as an absolute `http`/`https` URL without a trailing slash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// LFS API base URL.
    base: String,
    /// SSH coordinates when derived from an SSH clone URL.
    ssh: Option<SshMetadata>,
}

impl Endpoint {
    /// Builds an endpoint from an explicit API base URL.
    ///
    /// # Errors
    ///
    /// Returns [`EndpointError`] when the URL is malformed or not `http`/`https`.
    pub fn from_api_url(raw: &str) -> Result<Self, EndpointError> {
        let url = parse_http_url(raw.trim())?;
        Ok(Self {
            base: trim_base(&url),
            ssh: None,
        })
    }

    /// Derives an endpoint from a repository clone URL.
    ///
    /// # Errors
    ///
    /// Returns [`EndpointError`] when the clone URL cannot be mapped to an API URL.
    pub fn from_clone_url(raw: &str) -> Result<Self, EndpointError> {
        let raw = raw.trim();
        if raw.contains("://") {
            let mut url = Url::parse(raw).map_err(|err| EndpointError::InvalidUrl {
                url: raw.to_string(),
                reason: err.to_string(),
            })?;
            match url.scheme() {
                "http" | "https" => {
                    url.set_query(None);
                    url.set_fragment(None);
                    let repo = trim_base(&url);
                    let api = parse_http_url(&lfs_api_for(&repo))?;
                    Ok(Self {
                        base: trim_base(&api),
                        ssh: None,
                    })
                }
                "ssh" | "git+ssh" | "ssh+git" => {
                    let host =
                        url.host_str().ok_or_else(|| EndpointError::MissingHost(raw.to_string()))?;
                    let user_and_host = if url.username().is_empty() {
                        host.to_string()
                    } else {
                        format!("{}@{host}", url.username())
                    };
                    let path = url.path().trim_start_matches('/').to_string();
                    Self::from_ssh(host, SshMetadata {
                        user_and_host,
                        path,
                        port: url.port(),
                    })
                }
                scheme => Err(EndpointError::UnsupportedScheme(scheme.to_string())),
            }
        } else {
            let (user_and_host, path) =
                raw.split_once(':').ok_or_else(|| EndpointError::InvalidUrl {
                    url: raw.to_string(),
                    reason: "expected [user@]host:path".to_string(),
                })?;
            let host = user_and_host.rsplit_once('@').map_or(user_and_host, |(_, host)| host);
            if host.is_empty() || host.contains('/') {
                return Err(EndpointError::MissingHost(raw.to_string()));
            }
            Self::from_ssh(host, SshMetadata {
                user_and_host: user_and_host.to_string(),
                path: path.trim_start_matches('/').to_string(),
                port: None,
            })
        }
    }

    /// Maps SSH coordinates to the HTTPS API on the same host.
    fn from_ssh(host: &str, ssh: SshMetadata) -> Result<Self, EndpointError> {
        let repo = format!("https://{host}/{}", ssh.path.trim_end_matches('/'));
        let api = parse_http_url(&lfs_api_for(&repo))?;
        Ok(Self {
            base: trim_base(&api),
            ssh: Some(ssh),
        })
    }

    /// Returns the LFS API base URL.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.base
    }

    /// Returns SSH coordinates when the endpoint came from an SSH clone URL.
    #[must_use]
    pub const fn ssh(&self) -> Option<&SshMetadata> {
        self.ssh.as_ref()
    }

    /// Returns the batch API URL for this endpoint.
    #[must_use]
    pub fn batch_url(&self) -> String {
        format!("{}/{BATCH_PATH}", self.base)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.base)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Parses an absolute `http`/`https` URL with a host.
fn parse_http_url(raw: &str) -> Result<Url, EndpointError> {
    let url = Url::parse(raw).map_err(|err| EndpointError::InvalidUrl {
        url: raw.to_string(),
        reason: err.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => {}
        scheme => return Err(EndpointError::UnsupportedScheme(scheme.to_string())),
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(EndpointError::MissingHost(raw.to_string()));
    }
    Ok(url)
}

/// Serializes a URL with trailing slashes removed.
fn trim_base(url: &Url) -> String {
    url.as_str().trim_end_matches('/').to_string()
}

/// Appends the LFS API path to a repository URL.
fn lfs_api_for(repo: &str) -> String {
    if repo.ends_with(GIT_SUFFIX) {
        format!("{repo}/{LFS_API_SUFFIX}")
    } else {
        format!("{repo}{GIT_SUFFIX}/{LFS_API_SUFFIX}")
    }
}
