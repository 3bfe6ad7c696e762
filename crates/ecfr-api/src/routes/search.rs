//! # Search Route

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use ecfr_core::Record;
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::AppError;
use crate::extractors::{extract_validated_query, SearchParams};
use crate::query;
use crate::render::{Table, View};
use crate::state::AppState;

/// Search results.
#[derive(Debug, Serialize, ToSchema)]
pub struct SearchResponse {
    pub count: usize,
    #[schema(value_type = Vec<Object>)]
    pub results: Vec<Record>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/v1/search", get(search))
}

/// GET /v1/search: Rows matching the given filters.
///
/// With exactly one of `title` or `agency` the lookup is a partition query
/// on that key. Otherwise it is a scan filtered by `entity_type`.
#[utoipa::path(
    get,
    path = "/v1/search",
    params(SearchParams),
    responses(
        (status = 200, description = "Matching rows", body = SearchResponse),
        (status = 422, description = "Filter out of range", body = crate::error::ErrorBody),
    ),
    tag = "search"
)]
async fn search(
    State(state): State<AppState>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Response, AppError> {
    let params = extract_validated_query(params)?;
    let req = params.to_request();
    let results = query::search(state.store.as_ref(), &req).await?;
    let table = Table::from_rows(&results);

    let mut view = View::new(
        "Search",
        SearchResponse {
            count: results.len(),
            results,
        },
        table,
    )
    .filename("search.csv");
    if let Some(t) = req.entity_type {
        view = view.summary("Entity type", t);
    }
    if let Some(n) = req.title {
        view = view.summary("Title", n);
    }
    if let Some(a) = &req.agency {
        view = view.summary("Agency", a);
    }
    let count = view.data.count;
    view.summary("Results", count)
        .render(params.format(), &state.config.project_env)
}
