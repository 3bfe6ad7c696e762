//! # Title Routes

use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::response::Response;
use axum::routing::get;
use axum::Router;

use crate::error::AppError;
use crate::extractors::{extract_path, extract_validated_query, FormatParams, ListParams};
use crate::query::{self, TitleStructure};
use crate::render::{Table, ToTable, View};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/titles", get(list_titles))
        .route("/v1/titles/{number}/structure", get(title_structure))
}

/// GET /v1/titles: Title rows in numeric order.
#[utoipa::path(
    get,
    path = "/v1/titles",
    params(ListParams),
    responses(
        (status = 200, description = "Title rows as JSON array, CSV or HTML"),
        (status = 422, description = "limit or format out of range", body = crate::error::ErrorBody),
    ),
    tag = "titles"
)]
async fn list_titles(
    State(state): State<AppState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Response, AppError> {
    let params = extract_validated_query(params)?;
    let limit = params.limit();
    let rows = query::list_titles(state.store.as_ref(), limit).await?;
    let table = Table::from_rows(&rows);
    let shown = rows.len();
    View::new("CFR Titles", rows, table)
        .summary("Titles shown", shown)
        .filename("titles.csv")
        .export_href(format!("/v1/titles?limit={limit}&format=csv"))
        .render(params.format(), &state.config.project_env)
}

/// GET /v1/titles/{number}/structure: First chapters and parts of a title.
#[utoipa::path(
    get,
    path = "/v1/titles/{number}/structure",
    params(("number" = u32, Path, description = "CFR title number"), FormatParams),
    responses(
        (status = 200, description = "Chapters and parts", body = TitleStructure),
        (status = 400, description = "Title number is not an integer", body = crate::error::ErrorBody),
    ),
    tag = "titles"
)]
async fn title_structure(
    State(state): State<AppState>,
    number: Result<Path<u32>, PathRejection>,
    params: Result<Query<FormatParams>, QueryRejection>,
) -> Result<Response, AppError> {
    let number = extract_path(number)?;
    let params = extract_validated_query(params)?;
    let structure = query::get_title_structure(state.store.as_ref(), number).await?;

    let mut table = Table::from_rows(&structure.chapters);
    table.rows.extend(structure.parts.iter().map(ToTable::row));
    let chapters = structure.chapters.len();
    let parts = structure.parts.len();
    View::new(format!("Title {number} structure"), structure, table)
        .summary("Chapters", chapters)
        .summary("Parts", parts)
        .filename(format!("title-{number}-structure.csv"))
        .export_href(format!("/v1/titles/{number}/structure?format=csv"))
        .render(params.format(), &state.config.project_env)
}
