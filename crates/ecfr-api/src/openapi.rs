//! # OpenAPI Document
//!
//! Assembles the utoipa-annotated routes into one OpenAPI 3.1 document,
//! served at `/openapi.json` behind the same API key as the data routes.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "eCFR Analytics API",
        version = "0.1.0",
        description = "Read API over ingested eCFR agencies, titles and title structure, with JSON, CSV and HTML output.",
        license(name = "AGPL-3.0-or-later")
    ),
    paths(
        crate::routes::home::home,
        crate::routes::agencies::list_agencies,
        crate::routes::agencies::agency_coverage,
        crate::routes::agencies::agency_history,
        crate::routes::agencies::agency_checksum,
        crate::routes::titles::list_titles,
        crate::routes::titles::title_structure,
        crate::routes::search::search,
        crate::routes::ingest::trigger_ingest,
    ),
    components(schemas(
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
        crate::render::OutputFormat,
        crate::query::TitleStructure,
        crate::query::AgencyCoverage,
        crate::routes::agencies::ChecksumResponse,
        crate::routes::search::SearchResponse,
        crate::routes::ingest::IngestAccepted,
    )),
    tags(
        (name = "pages", description = "Server-rendered HTML pages"),
        (name = "agencies", description = "Agencies, CFR coverage and snapshot history"),
        (name = "titles", description = "CFR titles and structure"),
        (name = "search", description = "Filtered lookup across entity types"),
        (name = "ingest", description = "Ingestion trigger"),
    )
)]
pub struct ApiDoc;

pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        for expected in [
            "/",
            "/v1/agencies",
            "/v1/agencies/{agency}/coverage",
            "/v1/agencies/{agency}/history",
            "/v1/agencies/{agency}/checksum",
            "/v1/titles",
            "/v1/titles/{number}/structure",
            "/v1/search",
            "/v1/ingest",
        ] {
            assert!(
                paths.iter().any(|p| p.as_str() == expected),
                "missing {expected}"
            );
        }
    }

    #[test]
    fn document_serializes() {
        let json = serde_json::to_value(ApiDoc::openapi()).unwrap();
        assert_eq!(json["info"]["title"], "eCFR Analytics API");
        assert!(json["components"]["schemas"]["ErrorBody"].is_object());
    }
}
