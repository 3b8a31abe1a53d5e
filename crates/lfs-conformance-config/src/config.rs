// crates/lfs-conformance-config/src/config.rs
// ============================================================================
// Module: LFS Conformance Configuration
// Description: Configuration loading and validation for the conformance harness.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: lfs-conformance-core, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from an optional TOML file. An explicitly named
//! file (flag or environment variable) must exist; the default
//! `lfs-conformance.toml` in the working directory is used only when present.
//! Command-line flags override file values in the CLI.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use lfs_conformance_core::DEFAULT_IDENTIFIER_COUNT;
use lfs_conformance_core::DEFAULT_NAME_WIDTH;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
pub const DEFAULT_CONFIG_NAME: &str = "lfs-conformance.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "LFS_CONFORMANCE_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum length of a configured URL.
pub(crate) const MAX_URL_LENGTH: usize = 2048;
/// Minimum identifiers per list.
pub const MIN_IDENTIFIER_COUNT: usize = 1;
/// Maximum identifiers per list.
pub const MAX_IDENTIFIER_COUNT: usize = 10_000;
/// Default HTTP request timeout in milliseconds.
pub const DEFAULT_HTTP_TIMEOUT_MS: u64 = 30_000;
/// Minimum HTTP request timeout in milliseconds.
pub const MIN_HTTP_TIMEOUT_MS: u64 = 100;
/// Maximum HTTP request timeout in milliseconds.
pub const MAX_HTTP_TIMEOUT_MS: u64 = 300_000;
/// Minimum reporter name column width.
pub const MIN_NAME_WIDTH: usize = 10;
/// Maximum reporter name column width.
pub const MAX_NAME_WIDTH: usize = 200;

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Conformance harness configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConformanceConfig {
    /// Endpoint selection defaults.
    #[serde(default)]
    pub endpoint: EndpointConfig,
    /// Synthetic identifier settings.
    #[serde(default)]
    pub identifiers: IdentifiersConfig,
    /// HTTP client settings.
    #[serde(default)]
    pub http: HttpConfig,
    /// Console report settings.
    #[serde(default)]
    pub report: ReportConfig,
    /// Audit log settings.
    #[serde(default)]
    pub audit: AuditConfig,
}

impl ConformanceConfig {
    /// Loads configuration using the default resolution rules.
    ///
    /// Returns defaults when no path was named and the default file is absent.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (resolved, explicit) = resolve_path(path)?;
        if !explicit && !resolved.exists() {
            return Ok(Self::default());
        }
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml_str(content)
    }

    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.endpoint.validate()?;
        self.identifiers.validate()?;
        self.http.validate()?;
        self.report.validate()?;
        self.audit.validate()?;
        Ok(())
    }
}

/// Endpoint selection defaults.
///
/// Both may be set in the file; the CLI enforces mutual exclusion after
/// merging its flags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EndpointConfig {
    /// Direct LFS API base URL.
    #[serde(default)]
    pub url: Option<String>,
    /// Repository clone URL.
    #[serde(default)]
    pub clone: Option<String>,
}

impl EndpointConfig {
    /// Validates URL lengths.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(url) = &self.url {
            validate_url_string("endpoint.url", url)?;
        }
        if let Some(clone) = &self.clone {
            validate_url_string("endpoint.clone", clone)?;
        }
        Ok(())
    }
}

/// Synthetic identifier settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IdentifiersConfig {
    /// Identifiers per list; also seeds the generator.
    #[serde(default = "default_identifier_count")]
    pub count: usize,
}

impl Default for IdentifiersConfig {
    fn default() -> Self {
        Self {
            count: DEFAULT_IDENTIFIER_COUNT,
        }
    }
}

impl IdentifiersConfig {
    /// Validates the identifier count range.
    fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_IDENTIFIER_COUNT ..= MAX_IDENTIFIER_COUNT).contains(&self.count) {
            return Err(ConfigError::Invalid(format!(
                "identifiers.count must be between {MIN_IDENTIFIER_COUNT} and \
                 {MAX_IDENTIFIER_COUNT}"
            )));
        }
        Ok(())
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HttpConfig {
    /// Per-request timeout in milliseconds.
    #[serde(default = "default_http_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_HTTP_TIMEOUT_MS,
        }
    }
}

impl HttpConfig {
    /// Returns the request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Validates the timeout range.
    fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_HTTP_TIMEOUT_MS ..= MAX_HTTP_TIMEOUT_MS).contains(&self.timeout_ms) {
            return Err(ConfigError::Invalid(format!(
                "http.timeout_ms must be between {MIN_HTTP_TIMEOUT_MS} and {MAX_HTTP_TIMEOUT_MS}"
            )));
        }
        Ok(())
    }
}

/// Console report settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReportConfig {
    /// Width of the check name column.
    #[serde(default = "default_name_width")]
    pub name_width: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            name_width: DEFAULT_NAME_WIDTH,
        }
    }
}

impl ReportConfig {
    /// Validates the column width range.
    fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_NAME_WIDTH ..= MAX_NAME_WIDTH).contains(&self.name_width) {
            return Err(ConfigError::Invalid(format!(
                "report.name_width must be between {MIN_NAME_WIDTH} and {MAX_NAME_WIDTH}"
            )));
        }
        Ok(())
    }
}

/// Audit sink selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditSinkKind {
    /// Audit events are discarded.
    #[default]
    None,
    /// Audit events are written to stderr as JSON lines.
    Stderr,
    /// Audit events are appended to `audit.path` as JSON lines.
    File,
}

/// Audit log settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuditConfig {
    /// Selected sink.
    #[serde(default)]
    pub sink: AuditSinkKind,
    /// Audit log path (required for the file sink).
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl AuditConfig {
    /// Validates sink and path consistency.
    fn validate(&self) -> Result<(), ConfigError> {
        match (&self.sink, &self.path) {
            (AuditSinkKind::File, None) => Err(ConfigError::Invalid(
                "audit.path is required when audit.sink = \"file\"".to_string(),
            )),
            (_, Some(path)) => validate_path_string("audit.path", &path.to_string_lossy()),
            (_, None) => Ok(()),
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Serde default for [`IdentifiersConfig::count`].
const fn default_identifier_count() -> usize {
    DEFAULT_IDENTIFIER_COUNT
}

/// Serde default for [`HttpConfig::timeout_ms`].
const fn default_http_timeout_ms() -> u64 {
    DEFAULT_HTTP_TIMEOUT_MS
}

/// Serde default for [`ReportConfig::name_width`].
const fn default_name_width() -> usize {
    DEFAULT_NAME_WIDTH
}

/// Resolves the config path from CLI or environment defaults.
///
/// The flag reports whether the path was named explicitly.
fn resolve_path(path: Option<&Path>) -> Result<(PathBuf, bool), ConfigError> {
    if let Some(path) = path {
        return Ok((path.to_path_buf(), true));
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok((PathBuf::from(env_path), true));
    }
    Ok((PathBuf::from(DEFAULT_CONFIG_NAME), false))
}

/// Validates the resolved path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    let path = Path::new(trimmed);
    for component in path.components() {
        let component_value = component.as_os_str().to_string_lossy();
        if component_value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Validates a URL string is non-empty and bounded.
fn validate_url_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_URL_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    Ok(())
}
