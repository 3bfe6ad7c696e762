//! # Agency Routes
//!
//! `{agency}` is a slug for coverage (`environmental-protection-agency`)
//! and a legacy snapshot code for history and checksum (`PROTECTI`).

use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use ecfr_core::UpdatedDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AppError;
use crate::extractors::{
    extract_path, extract_validated_query, FormatParams, HistoryParams, ListParams,
};
use crate::query::{self, AgencyCoverage};
use crate::render::{path_segment, Table, View};
use crate::state::AppState;

/// Latest legacy snapshot checksum of one agency.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ChecksumResponse {
    pub agency: String,
    #[schema(value_type = String, format = Date)]
    pub date: UpdatedDate,
    pub checksum: String,
    pub word_count: u64,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/agencies", get(list_agencies))
        .route("/v1/agencies/{agency}/coverage", get(agency_coverage))
        .route("/v1/agencies/{agency}/history", get(agency_history))
        .route("/v1/agencies/{agency}/checksum", get(agency_checksum))
}

/// GET /v1/agencies: Agency rows, bounded by `limit`.
#[utoipa::path(
    get,
    path = "/v1/agencies",
    params(ListParams),
    responses(
        (status = 200, description = "Agency rows as JSON array, CSV or HTML"),
        (status = 401, description = "Missing or invalid API key", body = crate::error::ErrorBody),
        (status = 422, description = "limit or format out of range", body = crate::error::ErrorBody),
    ),
    tag = "agencies"
)]
async fn list_agencies(
    State(state): State<AppState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Response, AppError> {
    let params = extract_validated_query(params)?;
    let limit = params.limit();
    let rows = query::list_agencies(state.store.as_ref(), limit).await?;
    let table = Table::from_rows(&rows);
    let shown = rows.len();
    View::new("Agencies", rows, table)
        .summary("Agencies shown", shown)
        .summary("Limit", limit)
        .filename("agencies.csv")
        .export_href(format!("/v1/agencies?limit={limit}&format=csv"))
        .render(params.format(), &state.config.project_env)
}

/// GET /v1/agencies/{agency}/coverage: An agency and its mapped titles.
#[utoipa::path(
    get,
    path = "/v1/agencies/{agency}/coverage",
    params(("agency" = String, Path, description = "Agency slug"), FormatParams),
    responses(
        (status = 200, description = "Agency with title mappings", body = AgencyCoverage),
        (status = 404, description = "No such agency", body = crate::error::ErrorBody),
    ),
    tag = "agencies"
)]
async fn agency_coverage(
    State(state): State<AppState>,
    slug: Result<Path<String>, PathRejection>,
    params: Result<Query<FormatParams>, QueryRejection>,
) -> Result<Response, AppError> {
    let slug = extract_path(slug)?;
    let params = extract_validated_query(params)?;
    let coverage = query::get_agency_cfr_coverage(state.store.as_ref(), &slug).await?;
    let table = Table::from_rows(&coverage.titles);
    let heading = format!("CFR coverage: {}", coverage.agency.name);
    let references = coverage.agency.cfr_references.len();
    let mapped = coverage.titles.len();
    let short_name = coverage.agency.short_name.clone().unwrap_or_default();
    View::new(heading, coverage, table)
        .summary("Slug", &slug)
        .summary("Short name", short_name)
        .summary("CFR references", references)
        .summary("Mapped titles", mapped)
        .filename(format!("coverage-{slug}.csv"))
        .export_href(format!(
            "/v1/agencies/{}/coverage?format=csv",
            path_segment(&slug)
        ))
        .render(params.format(), &state.config.project_env)
}

/// GET /v1/agencies/{agency}/history: Legacy snapshots in date order.
#[utoipa::path(
    get,
    path = "/v1/agencies/{agency}/history",
    params(("agency" = String, Path, description = "Legacy agency code"), HistoryParams),
    responses(
        (status = 200, description = "Snapshots as JSON array, CSV or HTML"),
        (status = 422, description = "from or format invalid", body = crate::error::ErrorBody),
    ),
    tag = "agencies"
)]
async fn agency_history(
    State(state): State<AppState>,
    code: Result<Path<String>, PathRejection>,
    params: Result<Query<HistoryParams>, QueryRejection>,
) -> Result<Response, AppError> {
    let code = extract_path(code)?.to_uppercase();
    let params = extract_validated_query(params)?;
    let history = query::agency_history(state.store.as_ref(), &code, params.from_date()).await?;

    let total: u64 = history.iter().map(|s| s.word_count).sum();
    let average = if history.is_empty() {
        0.0
    } else {
        total as f64 / history.len() as f64
    };
    let count = history.len();
    let table = Table::from_rows(&history);
    View::new(format!("Snapshot history: {code}"), history, table)
        .summary("Snapshots", count)
        .summary("Total word count", total)
        .summary("Average word count", format!("{average:.1}"))
        .filename(format!("history-{code}.csv"))
        .export_href(format!(
            "/v1/agencies/{}/history?format=csv",
            path_segment(&code)
        ))
        .render(params.format(), &state.config.project_env)
}

/// GET /v1/agencies/{agency}/checksum: Checksum of the latest snapshot.
#[utoipa::path(
    get,
    path = "/v1/agencies/{agency}/checksum",
    params(("agency" = String, Path, description = "Legacy agency code"), FormatParams),
    responses(
        (status = 200, description = "Latest snapshot checksum", body = ChecksumResponse),
        (status = 404, description = "No snapshot for this agency", body = crate::error::ErrorBody),
    ),
    tag = "agencies"
)]
async fn agency_checksum(
    State(state): State<AppState>,
    code: Result<Path<String>, PathRejection>,
    params: Result<Query<FormatParams>, QueryRejection>,
) -> Result<Response, AppError> {
    let code = extract_path(code)?;
    let params = extract_validated_query(params)?;
    let latest = query::latest_snapshot(state.store.as_ref(), &code).await?;
    let table = Table::from_rows(std::slice::from_ref(&latest));
    let body = ChecksumResponse {
        agency: latest.agency,
        date: latest.date,
        checksum: latest.checksum,
        word_count: latest.word_count,
    };
    View::new(format!("Latest checksum: {}", body.agency), body, table)
        .filename(format!("checksum-{}.csv", code.to_uppercase()))
        .render(params.format(), &state.config.project_env)
}
