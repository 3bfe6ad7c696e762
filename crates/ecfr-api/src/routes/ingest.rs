//! # Ingestion Trigger
//!
//! `POST /v1/ingest` starts one ingestion run in the background and answers
//! 202 immediately. Overlapping triggers are not queued; each starts its
//! own run and the runs race as idempotent writers.
//!
//! `?wait=true` runs in the request instead and returns the report.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use ecfr_ingest::Ingestor;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::error::AppError;
use crate::extractors::extract_query;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct IngestParams {
    /// Run to completion before responding.
    pub wait: Option<bool>,
}

/// Body of a 202 response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct IngestAccepted {
    pub status: String,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/v1/ingest", post(trigger_ingest))
}

fn require_ingestor(state: &AppState) -> Result<&Ingestor, AppError> {
    state.ingestor.as_ref().ok_or_else(|| {
        AppError::service_unavailable(
            "eCFR client not configured. Check ECFR_BASE_URL and INGEST_* settings.",
        )
    })
}

/// POST /v1/ingest: Start one ingestion run.
#[utoipa::path(
    post,
    path = "/v1/ingest",
    params(IngestParams),
    responses(
        (status = 202, description = "Run started", body = IngestAccepted),
        (status = 200, description = "Run finished (wait=true); body is the ingest report"),
        (status = 502, description = "Upstream fetch failed (wait=true)", body = crate::error::ErrorBody),
        (status = 503, description = "No upstream client configured", body = crate::error::ErrorBody),
    ),
    tag = "ingest"
)]
async fn trigger_ingest(
    State(state): State<AppState>,
    params: Result<Query<IngestParams>, QueryRejection>,
) -> Result<Response, AppError> {
    let params = extract_query(params)?;
    let ingestor = require_ingestor(&state)?.clone();

    if params.wait.unwrap_or(false) {
        let report = ingestor.run().await?;
        return Ok(Json(report).into_response());
    }

    tokio::spawn(async move {
        // Outcome is logged by the run itself.
        let outcome = ingestor.run().await;
        tracing::debug!(ok = outcome.is_ok(), "background ingestion run finished");
    });

    Ok((
        StatusCode::ACCEPTED,
        Json(IngestAccepted {
            status: "accepted".to_string(),
        }),
    )
        .into_response())
}
