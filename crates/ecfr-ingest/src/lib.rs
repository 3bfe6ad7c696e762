//! # ecfr-ingest: Ingestion Component
//!
//! Pulls agencies, titles and title structure from the eCFR API and upserts
//! normalized rows into an [`ItemStore`](ecfr_store::ItemStore).
//!
//! - [`upsert`]: pure row builders and the per-entity write operations.
//! - [`run`]: the bounded orchestration ([`Ingestor::run`]).
//!
//! The component holds no state between runs. Concurrent runs race as
//! independent idempotent writers; last writer wins per key.

pub mod error;
pub mod run;
pub mod upsert;

pub use error::IngestError;
pub use run::{IngestOptions, IngestReport, Ingestor, SkippedTitle};
pub use upsert::{
    derive_mappings, store_agency, store_snapshot, store_title, store_title_structure,
};
