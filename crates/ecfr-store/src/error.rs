//! Store error types.

use thiserror::Error;

/// Errors from an [`ItemStore`](crate::ItemStore) backend.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The backing database rejected or failed a statement.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Embedded migrations could not be applied at startup.
    #[error("migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A record could not be serialized for storage.
    #[error("failed to encode record {key}: {source}")]
    Encode {
        key: String,
        source: serde_json::Error,
    },

    /// A stored row does not deserialize into a known record shape.
    #[error("failed to decode row {key}: {source}")]
    Decode {
        key: String,
        source: serde_json::Error,
    },
}
