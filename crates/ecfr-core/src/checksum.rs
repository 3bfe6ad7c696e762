//! # Content Checksums
//!
//! Every stored record carries a `checksum`: lowercase hex SHA-256 over the
//! canonical serialization of the source record it was derived from.
//!
//! ## Invariant
//!
//! [`checksum()`] accepts only `&CanonicalBytes`, so a record checksum can
//! only be computed over key-sorted, whitespace-free bytes. Identical source
//! input always yields the identical checksum, across runs and processes.
//!
//! Checksums are computed and stored as metadata. They are not compared
//! against a previously stored value; every ingest writes unconditionally.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::canonical::CanonicalBytes;
use crate::error::CanonicalizationError;

/// Compute the SHA-256 hex checksum of canonical bytes.
pub fn checksum(data: &CanonicalBytes) -> String {
    hex(&Sha256::digest(data.as_bytes()))
}

/// Canonicalize a value and return its checksum.
///
/// Convenience wrapper for the common `CanonicalBytes::new` + [`checksum()`]
/// pair used by every upsert.
pub fn checksum_of(value: &impl Serialize) -> Result<String, CanonicalizationError> {
    Ok(checksum(&CanonicalBytes::new(value)?))
}

/// SHA-256 hex checksum over raw UTF-8 text.
///
/// Used only for legacy snapshot rows, whose checksum is defined over the
/// snapshot payload text as written rather than over a canonical record.
pub fn text_checksum(text: &str) -> String {
    hex(&Sha256::digest(text.as_bytes()))
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
