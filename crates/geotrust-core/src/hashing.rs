// crates/geotrust-core/src/hashing.rs
// ============================================================================
// Module: GeoTrust Canonical Hashing
// Description: Canonical JSON serialization and content hashing.
// Purpose: Make projection writes content-addressable so idempotence is observable.
// Dependencies: serde, serde_jcs, serde_json, sha2, thiserror
// ============================================================================

//! ## Overview
//! Projections are persisted as canonical JSON (RFC 8785 JCS) together with a
//! SHA-256 content hash. Re-running a rebuild against an unchanged registry
//! therefore produces byte-identical payloads and identical hashes, which is
//! how the store counts `rows_updated` without diffing rows field by field.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;
use sha2::Digest;
use sha2::Sha256;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default hash algorithm label stored alongside hashed payloads.
pub const DEFAULT_HASH_ALGORITHM: &str = "sha-256";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Canonicalization failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HashError {
    /// The value could not be canonicalized to JCS JSON.
    #[error("canonical json serialization failed: {0}")]
    Canonicalize(String),
}

// ============================================================================
// SECTION: Digest
// ============================================================================

/// Content hash with its algorithm label.
///
/// # Invariants
/// - `value` is lowercase hex of the digest bytes.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct HashDigest {
    /// Algorithm label (see [`DEFAULT_HASH_ALGORITHM`]).
    pub algorithm: String,
    /// Lowercase hex digest.
    pub value: String,
}

// ============================================================================
// SECTION: Functions
// ============================================================================

/// Serializes a value to canonical (JCS) JSON bytes.
///
/// # Errors
///
/// Returns [`HashError`] when the value cannot be serialized.
pub fn canonical_json_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, HashError> {
    serde_jcs::to_vec(value).map_err(|err| HashError::Canonicalize(err.to_string()))
}

/// Hashes bytes with SHA-256 and returns the labeled digest.
#[must_use]
pub fn hash_bytes(bytes: &[u8]) -> HashDigest {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let digest = hasher.finalize();
    let mut value = String::with_capacity(digest.len() * 2);
    for byte in digest {
        value.push_str(&format!("{byte:02x}"));
    }
    HashDigest {
        algorithm: DEFAULT_HASH_ALGORITHM.to_string(),
        value,
    }
}

/// Canonicalizes and hashes a serializable value in one step.
///
/// # Errors
///
/// Returns [`HashError`] when the value cannot be serialized.
pub fn hash_canonical_json<T: Serialize>(value: &T) -> Result<HashDigest, HashError> {
    let bytes = canonical_json_bytes(value)?;
    Ok(hash_bytes(&bytes))
}
