//! # Ingestion Run
//!
//! One bounded, best-effort synchronization pass:
//!
//! 1. Fetch the agency list and the title list. Either failing aborts the
//!    run before anything is written.
//! 2. Upsert the first `max_agencies` agencies (plus their mapping rows).
//! 3. Upsert the first `max_titles` titles.
//! 4. For each title number on the structure allow-list, fetch and upsert
//!    its structure tree. A failed fetch is logged and skipped.
//! 5. Optionally write legacy snapshot rows for the capped titles.
//!
//! The caps bound the work of one run; they are not a pagination cursor.

use std::sync::Arc;

use ecfr_client::{EcfrClient, Title};
use ecfr_core::UpdatedDate;
use ecfr_store::ItemStore;
use serde::{Deserialize, Serialize};

use crate::error::IngestError;
use crate::upsert::{
    legacy_agency_code, store_agency, store_snapshot, store_title, store_title_structure,
};

/// Bounds and switches for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestOptions {
    /// Agencies taken from the head of the upstream list.
    pub max_agencies: usize,
    /// Titles taken from the head of the upstream list.
    pub max_titles: usize,
    /// Title numbers whose structure tree is fetched. Independent of
    /// `max_titles`.
    pub structure_titles: Vec<u32>,
    /// Also write `AGENCY#<code>` / `SNAPSHOT#<date>` rows.
    pub legacy_snapshots: bool,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            max_agencies: 10,
            max_titles: 5,
            structure_titles: vec![1, 40],
            legacy_snapshots: false,
        }
    }
}

impl IngestOptions {
    /// Load options from the environment, falling back to defaults.
    ///
    /// Variables:
    /// - `INGEST_MAX_AGENCIES` (default: 10)
    /// - `INGEST_MAX_TITLES` (default: 5)
    /// - `INGEST_STRUCTURE_TITLES` comma-separated title numbers (default: `1,40`)
    /// - `INGEST_LEGACY_SNAPSHOTS` `true`/`1` to enable (default: off)
    pub fn from_env() -> Result<Self, IngestError> {
        let defaults = Self::default();
        Ok(Self {
            max_agencies: env_parse("INGEST_MAX_AGENCIES")?.unwrap_or(defaults.max_agencies),
            max_titles: env_parse("INGEST_MAX_TITLES")?.unwrap_or(defaults.max_titles),
            structure_titles: match std::env::var("INGEST_STRUCTURE_TITLES") {
                Ok(raw) => parse_title_list(&raw)?,
                Err(_) => defaults.structure_titles,
            },
            legacy_snapshots: std::env::var("INGEST_LEGACY_SNAPSHOTS")
                .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(defaults.legacy_snapshots),
        })
    }
}

fn env_parse(var: &str) -> Result<Option<usize>, IngestError> {
    match std::env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| {
                IngestError::Config(format!("{var} must be a non-negative integer, got {raw:?}"))
            }),
        Err(_) => Ok(None),
    }
}

/// Parse a comma-separated list of title numbers. Blank entries are ignored.
pub fn parse_title_list(raw: &str) -> Result<Vec<u32>, IngestError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<u32>()
                .map_err(|_| IngestError::Config(format!("invalid title number {s:?}")))
        })
        .collect()
}

/// A structure title that was not ingested, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedTitle {
    pub title: u32,
    pub reason: String,
}

/// Rows written by one run, per entity type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestReport {
    pub run_date: Option<UpdatedDate>,
    pub agencies: usize,
    pub agency_titles: usize,
    pub titles: usize,
    pub structure_nodes: usize,
    pub snapshots: usize,
    pub skipped: Vec<SkippedTitle>,
}

impl IngestReport {
    /// Total rows written.
    pub fn rows_written(&self) -> usize {
        self.agencies + self.agency_titles + self.titles + self.structure_nodes + self.snapshots
    }
}

/// Runs ingestion passes against one upstream client and one store.
#[derive(Clone)]
pub struct Ingestor {
    client: EcfrClient,
    store: Arc<dyn ItemStore>,
    options: IngestOptions,
}

impl std::fmt::Debug for Ingestor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ingestor")
            .field("store", &self.store.backend())
            .field("options", &self.options)
            .finish()
    }
}

impl Ingestor {
    pub fn new(client: EcfrClient, store: Arc<dyn ItemStore>, options: IngestOptions) -> Self {
        Self {
            client,
            store,
            options,
        }
    }

    /// Run one pass stamped with today's UTC date.
    pub async fn run(&self) -> Result<IngestReport, IngestError> {
        self.run_at(UpdatedDate::today()).await
    }

    /// Run one pass with every row stamped `date`.
    pub async fn run_at(&self, date: UpdatedDate) -> Result<IngestReport, IngestError> {
        let result = self.run_inner(date).await;
        let outcome = match &result {
            Ok(report) => {
                tracing::info!(
                    rows = report.rows_written(),
                    skipped = report.skipped.len(),
                    run_date = %date,
                    "ingestion run complete"
                );
                "success"
            }
            Err(e) => {
                tracing::error!(error = %e, run_date = %date, "ingestion run failed");
                "failure"
            }
        };
        metrics::counter!("ecfr_ingest_runs_total", "outcome" => outcome).increment(1);
        result
    }

    async fn run_inner(&self, date: UpdatedDate) -> Result<IngestReport, IngestError> {
        let store = self.store.as_ref();
        let opts = &self.options;

        let agencies = self.client.fetch_agencies().await?;
        let titles = self.client.fetch_titles().await?;
        tracing::info!(
            agencies = agencies.len(),
            titles = titles.len(),
            "fetched upstream lists"
        );

        let mut report = IngestReport {
            run_date: Some(date),
            ..IngestReport::default()
        };

        for agency in agencies.iter().take(opts.max_agencies) {
            let rows = store_agency(store, agency, date).await?;
            report.agencies += 1;
            report.agency_titles += rows.len() - 1;
        }

        for title in titles.iter().take(opts.max_titles) {
            store_title(store, title, date).await?;
            report.titles += 1;
        }

        for &number in &opts.structure_titles {
            let as_of = structure_as_of(&titles, number, date);
            match self.client.fetch_title_structure(number, &as_of).await {
                Ok(root) => {
                    let rows = store_title_structure(store, number, &root, date).await?;
                    report.structure_nodes += rows.len();
                }
                Err(e) => {
                    tracing::warn!(
                        title = number,
                        as_of = %as_of,
                        error = %e,
                        "structure fetch failed, skipping title"
                    );
                    report.skipped.push(SkippedTitle {
                        title: number,
                        reason: e.to_string(),
                    });
                }
            }
        }

        if opts.legacy_snapshots {
            for title in titles.iter().take(opts.max_titles) {
                // Compact text of the upstream object, not the typed struct.
                let payload = serde_json::to_string(&title.raw)
                    .map_err(ecfr_core::CanonicalizationError::from)?;
                store_snapshot(store, &legacy_agency_code(&title.name), &payload, date).await?;
                report.snapshots += 1;
            }
        }

        Ok(report)
    }
}

/// The date to request title `number`'s structure for: its currency date
/// from the title list, else its latest issue date, else the run date.
pub fn structure_as_of(titles: &[Title], number: u32, run_date: UpdatedDate) -> String {
    titles
        .iter()
        .find(|t| t.number == number)
        .and_then(Title::structure_date)
        .map(str::to_string)
        .unwrap_or_else(|| run_date.to_string())
}
