//! # ecfr-core: Foundational Types for the eCFR Stack
//!
//! This crate defines the data model shared by the ingestion and query
//! sides of the stack. Both sides communicate only through store contents,
//! so every key and record shape lives here, in one place.
//!
//! ## Key Design Principles
//!
//! 1. **Typed composite keys.** A stored row is addressed by a partition key
//!    and a sort key built from typed prefixes (`AGENCY#`, `TITLE#`, ...).
//!    `PartitionKey` and `SortKey` have private fields; the only way to get
//!    one is through a prefix-specific constructor.
//!
//! 2. **`CanonicalBytes` newtype.** ALL checksum computation flows through
//!    `CanonicalBytes::new()` (RFC 8785, sorted keys, no whitespace), so the
//!    same source record always yields the same checksum.
//!
//! 3. **One `Record` enum.** Every row carries an `entity_type` tag; adding
//!    an entity forces every consumer to handle it.
//!
//! 4. **Write dates are wall-clock.** `UpdatedDate` is stamped at write time
//!    and never sourced from upstream data.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `ecfr-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canonical;
pub mod checksum;
pub mod error;
pub mod keys;
pub mod records;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use canonical::CanonicalBytes;
pub use checksum::{checksum, checksum_of, text_checksum};
pub use error::{CanonicalizationError, CoreError};
pub use keys::{ItemKey, PartitionKey, SortKey};
pub use records::{
    AgencyRecord, AgencyTitleRecord, CfrReference, EntityType, Record, SnapshotRecord,
    StructureNodeRecord, TitleRecord,
};
pub use temporal::UpdatedDate;
