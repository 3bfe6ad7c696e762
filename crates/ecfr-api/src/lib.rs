//! # ecfr-api: Query & Presentation Service
//!
//! Reads rows written by `ecfr-ingest` and serves them as JSON, CSV or
//! HTML. The service never writes to the store except through
//! `POST /v1/ingest`, which runs the ingestion component.
//!
//! ## API Surface
//!
//! | Route | Module | Auth |
//! |-------|--------|------|
//! | `GET /` | [`routes::home`] | key |
//! | `GET /v1/agencies[/{agency}/coverage\|history\|checksum]` | [`routes::agencies`] | key |
//! | `GET /v1/titles[/{number}/structure]` | [`routes::titles`] | key |
//! | `GET /v1/search` | [`routes::search`] | key |
//! | `POST /v1/ingest` | [`routes::ingest`] | key |
//! | `GET /openapi.json` | [`openapi`] | key |
//! | `GET /health`, `/health/liveness`, `/health/readiness` | here | none |
//! | `GET /metrics` | here | none |
//!
//! `/health/readiness` is the one unauthenticated route that touches the
//! store: it calls [`ecfr_store::ItemStore::health_check`] (`SELECT 1` on
//! PostgreSQL) and reads no rows.
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → MetricsMiddleware → AuthMiddleware → CatchPanic → Handler
//! ```

pub mod auth;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod query;
pub mod render;
pub mod routes;
pub mod state;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::middleware::from_fn;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

use crate::auth::AuthConfig;
use crate::error::AppError;
use crate::middleware::metrics::ApiMetrics;
use crate::state::AppState;

/// Assemble the full application router.
///
/// Health and metrics endpoints are mounted outside the auth middleware.
pub fn app(state: AppState) -> Router {
    app_with_metrics(state, ApiMetrics::new())
}

/// [`app`] with caller-supplied request counters.
pub fn app_with_metrics(state: AppState, metrics: ApiMetrics) -> Router {
    let auth_config = AuthConfig {
        token: state.config.auth_token.clone(),
    };

    let api = Router::new()
        .merge(routes::home::router())
        .merge(routes::agencies::router())
        .merge(routes::titles::router())
        .merge(routes::search::router())
        .merge(routes::ingest::router())
        .merge(openapi::router())
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(from_fn(auth::auth_middleware))
        .layer(from_fn(middleware::metrics::metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(axum::Extension(auth_config))
        .layer(axum::Extension(metrics))
        .with_state(state.clone());

    let public = Router::new()
        .route("/health", get(health))
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness))
        .route("/metrics", get(prometheus_metrics))
        .with_state(state);

    Router::new().merge(public).merge(api)
}

fn panic_response(_: Box<dyn std::any::Any + Send + 'static>) -> Response {
    AppError::Internal("handler panicked".to_string()).into_response()
}

/// Body of `GET /health`.
#[derive(Debug, Serialize)]
struct HealthStatus {
    status: &'static str,
    environment: String,
    store: &'static str,
    timestamp: String,
}

async fn health(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        environment: state.config.project_env.clone(),
        store: state.store.backend(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// Liveness probe: 200 while the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe: 200 once the store answers.
async fn readiness(State(state): State<AppState>) -> Result<&'static str, AppError> {
    state.store.health_check().await.map_err(|e| {
        tracing::warn!(error = %e, "readiness check failed");
        AppError::service_unavailable("store unavailable")
    })?;
    Ok("ready")
}

/// Prometheus text exposition of every `metrics` counter.
async fn prometheus_metrics(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(handle) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => (StatusCode::SERVICE_UNAVAILABLE, "metrics recorder not installed").into_response(),
    }
}
