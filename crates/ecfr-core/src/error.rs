//! # Error Types
//!
//! Errors raised while building keys, records, and checksums. All errors
//! use `thiserror` for derive-based `Display` and `Error` implementations.

use thiserror::Error;

/// Top-level error type for the core data model.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Canonicalization failed.
    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    /// A value could not be parsed into a domain type.
    #[error("invalid {kind}: {value:?}")]
    Invalid {
        /// What was being parsed (e.g. "entity type", "date").
        kind: &'static str,
        /// The rejected input.
        value: String,
    },
}

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}
