//! # `ecfr ingest`
//!
//! Runs one bounded ingestion pass and prints the report. Flags override
//! the `INGEST_*` environment variables.

use std::io::Write;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use ecfr_client::EcfrClient;
use ecfr_ingest::{IngestOptions, Ingestor};
use ecfr_store::ItemStore;

use crate::print_json;

/// Ingest subcommand arguments.
#[derive(Args, Debug, Default)]
pub struct IngestArgs {
    /// Agencies to take from the head of the upstream list.
    #[arg(long)]
    pub max_agencies: Option<usize>,

    /// Titles to take from the head of the upstream list.
    #[arg(long)]
    pub max_titles: Option<usize>,

    /// Comma-separated title numbers whose structure is fetched.
    #[arg(long, value_delimiter = ',')]
    pub structure_titles: Option<Vec<u32>>,

    /// Also write legacy per-agency snapshot rows.
    #[arg(long)]
    pub legacy_snapshots: bool,
}

impl IngestArgs {
    /// Apply these flags on top of `base`.
    pub fn apply(&self, base: IngestOptions) -> IngestOptions {
        IngestOptions {
            max_agencies: self.max_agencies.unwrap_or(base.max_agencies),
            max_titles: self.max_titles.unwrap_or(base.max_titles),
            structure_titles: self
                .structure_titles
                .clone()
                .unwrap_or(base.structure_titles),
            legacy_snapshots: self.legacy_snapshots || base.legacy_snapshots,
        }
    }
}

/// Execute one run with `client` against `store`. A fatal run failure is
/// an error; skipped structure titles are reported, not failed.
pub async fn run_ingest(
    args: &IngestArgs,
    client: EcfrClient,
    store: Arc<dyn ItemStore>,
    out: &mut impl Write,
) -> Result<u8> {
    let base = IngestOptions::from_env().context("invalid INGEST_* environment")?;
    let options = args.apply(base);
    tracing::info!(?options, backend = store.backend(), "starting ingestion run");

    let report = Ingestor::new(client, store, options)
        .run()
        .await
        .context("ingestion run failed")?;
    print_json(out, &report)?;
    Ok(0)
}

/// Build the upstream client from the environment and run.
pub async fn run_ingest_from_env(
    args: &IngestArgs,
    store: Arc<dyn ItemStore>,
    out: &mut impl Write,
) -> Result<u8> {
    let client = EcfrClient::from_env().context("failed to configure eCFR client")?;
    run_ingest(args, client, store, out).await
}
