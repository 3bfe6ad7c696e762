//! Ingestion error types.

use ecfr_client::EcfrApiError;
use ecfr_core::CanonicalizationError;
use ecfr_store::StoreError;
use thiserror::Error;

/// Fatal ingestion failures. A run that returns one of these stopped early;
/// rows written before the failure stay in the store.
#[derive(Error, Debug)]
pub enum IngestError {
    /// Agency or title list could not be fetched.
    #[error("upstream fetch failed: {0}")]
    Upstream(#[from] EcfrApiError),

    /// The store rejected a write.
    #[error("store write failed: {0}")]
    Store(#[from] StoreError),

    /// A source record could not be canonicalized for its checksum.
    #[error("checksum computation failed: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    /// An `INGEST_*` variable or option is malformed.
    #[error("invalid ingest configuration: {0}")]
    Config(String),
}
