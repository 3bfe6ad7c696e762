//! # API Route Modules
//!
//! - `home`: HTML landing page with navigation forms.
//! - `agencies`: agency listing, CFR coverage, legacy snapshot history and
//!   latest checksum.
//! - `titles`: title listing and chapter/part structure.
//! - `search`: filtered lookup across entity types.
//! - `ingest`: trigger for one ingestion run.
//!
//! Every read route answers in JSON, CSV or HTML per `?format=`.

pub mod agencies;
pub mod home;
pub mod ingest;
pub mod search;
pub mod titles;
