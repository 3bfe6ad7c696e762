//! # Read-Only Query Commands
//!
//! `coverage`, `structure`, `search` and `history` print the same JSON the
//! API returns for the matching route.

use std::io::Write;

use anyhow::{Context, Result};
use clap::builder::TypedValueParser;
use clap::Args;
use ecfr_api::query::{self, SearchRequest, DEFAULT_LIMIT, MAX_LIMIT};
use ecfr_core::{EntityType, UpdatedDate};
use ecfr_store::ItemStore;

use crate::print_json;

/// `ecfr coverage <slug>`
#[derive(Args, Debug)]
pub struct CoverageArgs {
    /// Agency slug, e.g. `environmental-protection-agency`.
    pub slug: String,
}

/// `ecfr structure <title>`
#[derive(Args, Debug)]
pub struct StructureArgs {
    /// CFR title number.
    pub title: u32,
}

/// `ecfr search`
#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Restrict to one entity type (agency, agency_title, title, structure, snapshot).
    #[arg(long)]
    pub entity_type: Option<EntityType>,

    /// Restrict to one title partition.
    #[arg(long)]
    pub title: Option<u32>,

    /// Restrict to one agency partition.
    #[arg(long)]
    pub agency: Option<String>,

    /// Maximum rows.
    #[arg(long, default_value_t = DEFAULT_LIMIT,
          value_parser = clap::value_parser!(u64).range(1..=MAX_LIMIT as u64).map(|n| n as usize))]
    pub limit: usize,
}

/// `ecfr history <code>`
#[derive(Args, Debug)]
pub struct HistoryArgs {
    /// Legacy agency code, e.g. `PROTECTI`.
    pub code: String,

    /// Earliest snapshot date, `YYYY-MM-DD`.
    #[arg(long, value_parser = parse_date)]
    pub from: Option<UpdatedDate>,
}

fn parse_date(s: &str) -> Result<UpdatedDate, String> {
    UpdatedDate::parse(s).map_err(|e| e.to_string())
}

pub async fn run_coverage(
    args: &CoverageArgs,
    store: &dyn ItemStore,
    out: &mut impl Write,
) -> Result<u8> {
    let coverage = query::get_agency_cfr_coverage(store, &args.slug)
        .await
        .with_context(|| format!("coverage lookup for {:?} failed", args.slug))?;
    print_json(out, &coverage)?;
    Ok(0)
}

pub async fn run_structure(
    args: &StructureArgs,
    store: &dyn ItemStore,
    out: &mut impl Write,
) -> Result<u8> {
    let structure = query::get_title_structure(store, args.title)
        .await
        .with_context(|| format!("structure lookup for title {} failed", args.title))?;
    print_json(out, &structure)?;
    Ok(0)
}

pub async fn run_search(
    args: &SearchArgs,
    store: &dyn ItemStore,
    out: &mut impl Write,
) -> Result<u8> {
    let req = SearchRequest {
        entity_type: args.entity_type,
        title: args.title,
        agency: args.agency.clone(),
        limit: args.limit,
    };
    let results = query::search(store, &req).await.context("search failed")?;
    print_json(out, &results)?;
    Ok(0)
}

pub async fn run_history(
    args: &HistoryArgs,
    store: &dyn ItemStore,
    out: &mut impl Write,
) -> Result<u8> {
    let history = query::agency_history(store, &args.code, args.from)
        .await
        .with_context(|| format!("history lookup for {:?} failed", args.code))?;
    print_json(out, &history)?;
    Ok(0)
}
