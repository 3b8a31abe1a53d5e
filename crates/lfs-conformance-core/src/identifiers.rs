// crates/lfs-conformance-core/src/identifiers.rs
// ============================================================================
// Module: Content Identifier Sources
// Description: Loads or synthesizes the present/missing object identifier lists.
// Purpose: Give every conformance run a reproducible pair of identifier sequences.
// Dependencies: rand, rand_chacha, serde, sha2, thiserror
// ============================================================================

//! ## Overview
//! A conformance run needs two ordered lists of content identifiers: objects
//! that exist on the server and objects that never did. They are either read
//! from two newline-delimited files or synthesized from a seeded byte stream
//! folded into a running SHA-256 accumulator.
//!
//! ## Invariants
//! - File mode trims surrounding whitespace per line and performs no format checks.
//! - Blank lines are preserved as empty identifiers.
//! - Synthetic mode is seeded with the identifier count and is reproducible.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::fs::File;
use std::io;
use std::io::BufRead;
use std::io::BufReader;
use std::path::Path;
use std::path::PathBuf;

use rand::RngCore;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Deserialize;
use serde::Serialize;
use sha2::Digest;
use sha2::Sha256;
use thiserror::Error;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Default number of identifiers synthesized per list.
pub const DEFAULT_IDENTIFIER_COUNT: usize = 50;

/// Maximum size of an identifier input file.
pub const MAX_IDENTIFIER_FILE_BYTES: u64 = 16 * 1024 * 1024;

// ============================================================================
// SECTION: Content Identifier
// ============================================================================

/// Opaque content identifier (normally a lowercase hex SHA-256 digest).
///
/// # Invariants
/// - Opaque UTF-8 string; no normalization or validation is applied by this type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentId(String);

impl ContentId {
    /// Creates a new content identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// SECTION: Identifier Set
// ============================================================================

/// The present and missing identifier sequences for one run.
///
/// # Invariants
/// - Never mutated once acquired; checks only receive shared slices.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentifierSet {
    /// Identifiers expected to exist on the server.
    present: Vec<ContentId>,
    /// Identifiers expected to be absent from the server.
    missing: Vec<ContentId>,
}

impl IdentifierSet {
    /// Builds an identifier set from the two sequences.
    #[must_use]
    pub const fn new(present: Vec<ContentId>, missing: Vec<ContentId>) -> Self {
        Self {
            present,
            missing,
        }
    }

    /// Returns identifiers expected to exist on the server.
    #[must_use]
    pub fn present(&self) -> &[ContentId] {
        &self.present
    }

    /// Returns identifiers expected to be absent from the server.
    #[must_use]
    pub fn missing(&self) -> &[ContentId] {
        &self.missing
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while acquiring identifiers.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum IdentifierError {
    /// The identifier file could not be opened.
    #[error("error opening file {}: {error}", path.display())]
    Open {
        /// Path that failed to open.
        path: PathBuf,
        /// Underlying I/O error.
        error: io::Error,
    },
    /// The identifier file could not be read.
    #[error("error reading file {}: {error}", path.display())]
    Read {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying I/O error.
        error: io::Error,
    },
    /// The identifier file exceeds the size limit.
    #[error("identifier file {} is {size} bytes (limit {limit})", path.display())]
    TooLarge {
        /// Offending path.
        path: PathBuf,
        /// Actual file size in bytes.
        size: u64,
        /// Maximum allowed size in bytes.
        limit: u64,
    },
}

// ============================================================================
// SECTION: Identifier Source
// ============================================================================

/// Where a run gets its identifiers from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentifierSource {
    /// Read both lists from files; the server is never modified.
    Files {
        /// File listing identifiers that exist on the server.
        present: PathBuf,
        /// File listing identifiers that are absent from the server.
        missing: PathBuf,
    },
    /// Synthesize `count` identifiers per list; requires the setup check.
    Synthetic {
        /// Number of identifiers per list (also the generator seed).
        count: usize,
    },
}

impl IdentifierSource {
    /// Returns true when identifiers are synthesized and fixtures must be set up.
    #[must_use]
    pub const fn requires_setup(&self) -> bool {
        matches!(self, Self::Synthetic { .. })
    }

    /// Acquires the identifier set from this source.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifierError`] when an input file cannot be opened or read.
    pub fn acquire(&self) -> Result<IdentifierSet, IdentifierError> {
        match self {
            Self::Files {
                present,
                missing,
            } => Ok(IdentifierSet::new(read_identifiers(present)?, read_identifiers(missing)?)),
            Self::Synthetic {
                count,
            } => Ok(synthesize_identifiers(*count)),
        }
    }
}

// ============================================================================
// SECTION: File Mode
// ============================================================================

/// Reads newline-delimited identifiers from `path`.
///
/// The file handle is closed before this function returns.
///
/// # Errors
///
/// Returns [`IdentifierError`] when the file cannot be opened, is too large,
/// or is not valid UTF-8.
pub fn read_identifiers(path: &Path) -> Result<Vec<ContentId>, IdentifierError> {
    let file = File::open(path).map_err(|error| IdentifierError::Open {
        path: path.to_path_buf(),
        error,
    })?;
    let size = file
        .metadata()
        .map_err(|error| IdentifierError::Read {
            path: path.to_path_buf(),
            error,
        })?
        .len();
    if size > MAX_IDENTIFIER_FILE_BYTES {
        return Err(IdentifierError::TooLarge {
            path: path.to_path_buf(),
            size,
            limit: MAX_IDENTIFIER_FILE_BYTES,
        });
    }
    parse_identifiers(BufReader::new(file)).map_err(|error| IdentifierError::Read {
        path: path.to_path_buf(),
        error,
    })
}

/// Parses newline-delimited identifiers from a reader.
///
/// Every newline-terminated line yields one identifier, including blank
/// lines. A final unterminated line is kept only when it is non-blank, unlike
/// the Go harness, which drops any unterminated tail.
///
/// # Errors
///
/// Returns [`io::Error`] when reading fails or a line is not valid UTF-8.
pub fn parse_identifiers<R: BufRead>(mut reader: R) -> io::Result<Vec<ContentId>> {
    let mut identifiers = Vec::new();
    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            break;
        }
        let terminated = line.ends_with('\n');
        let trimmed = line.trim();
        if terminated || !trimmed.is_empty() {
            identifiers.push(ContentId::new(trimmed));
        }
    }
    Ok(identifiers)
}

// ============================================================================
// SECTION: Synthetic Mode
// ============================================================================

/// Deterministically synthesizes `count` present and `count` missing identifiers.
///
/// One pseudo-random byte at a time is folded into a running SHA-256 state;
/// the digest after each byte becomes the next identifier, alternating
/// between the present and missing lists. The generator is a ChaCha8 stream
/// seeded with `count`, so the output is identical across platforms.
#[must_use]
pub fn synthesize_identifiers(count: usize) -> IdentifierSet {
    let seed = u64::try_from(count).unwrap_or(u64::MAX);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut running = Sha256::new();
    let mut present = Vec::with_capacity(count);
    let mut missing = Vec::with_capacity(count);
    for _ in 0 .. count {
        present.push(next_identifier(&mut rng, &mut running));
        missing.push(next_identifier(&mut rng, &mut running));
    }
    IdentifierSet::new(present, missing)
}

/// Feeds one generator byte into the running hash and returns the current digest.
fn next_identifier(rng: &mut ChaCha8Rng, running: &mut Sha256) -> ContentId {
    let mut byte = [0_u8; 1];
    rng.fill_bytes(&mut byte);
    running.update(byte);
    let digest = running.clone().finalize();
    ContentId::new(hex_encode(&digest))
}

// ============================================================================
// SECTION: Hex Encoding
// ============================================================================

/// Encodes bytes as a lowercase hex string.
pub(crate) fn hex_encode(bytes: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        out.push(HEX[(byte >> 4) as usize] as char);
        out.push(HEX[(byte & 0x0f) as usize] as char);
    }
    out
}
