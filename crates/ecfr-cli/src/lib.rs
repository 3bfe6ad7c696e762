//! # ecfr-cli: Command-Line Tool for the eCFR Stack
//!
//! Provides the `ecfr` binary:
//!
//! ```bash
//! ecfr ingest --max-agencies 10 --max-titles 5 --structure-titles 1,40
//! ecfr coverage environmental-protection-agency
//! ecfr structure 40
//! ecfr search --title 40 --entity-type structure --limit 50
//! ecfr history PROTECTI --from 2025-01-01
//! ```
//!
//! The store is chosen the same way as for the API server: `DATABASE_URL`
//! selects PostgreSQL, otherwise an in-memory store that lives only for
//! the duration of the command. Every command prints JSON to stdout.

pub mod ingest;
pub mod query;

use std::io::Write;

use anyhow::{Context, Result};
use serde::Serialize;

/// Write `value` as pretty JSON followed by a newline.
pub fn print_json(out: &mut impl Write, value: &impl Serialize) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value).context("failed to serialize output")?;
    writeln!(out).context("failed to write output")?;
    Ok(())
}
