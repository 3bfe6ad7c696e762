//! # ecfr-api: Binary Entry Point
//!
//! Starts the Axum HTTP server. Binds to `PORT` (default 8080).

use std::sync::Arc;

use ecfr_api::state::{AppConfig, AppState};
use ecfr_client::EcfrClient;
use ecfr_ingest::{IngestOptions, Ingestor};
use metrics_exporter_prometheus::PrometheusBuilder;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env();
    if config.auth_token.is_none() {
        tracing::warn!("API_AUTH_TOKEN not set. Every protected endpoint will answer 401.");
    }

    let store = ecfr_store::connect_from_env().await.map_err(|e| {
        tracing::error!("Store initialization failed: {e}");
        e
    })?;
    tracing::info!(backend = store.backend(), "item store ready");

    let mut state = AppState::new(Arc::clone(&store), config.clone());

    match EcfrClient::from_env() {
        Ok(client) => {
            let options = IngestOptions::from_env().map_err(|e| {
                tracing::error!("Invalid ingest configuration: {e}");
                e
            })?;
            tracing::info!(?options, "eCFR client configured");
            state = state.with_ingestor(Ingestor::new(client, store, options));
        }
        Err(e) => {
            tracing::warn!("eCFR client not configured: {e}. POST /v1/ingest will return 503.");
        }
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => state = state.with_metrics(handle),
        Err(e) => tracing::warn!("Prometheus recorder not installed: {e}"),
    }

    let app = ecfr_api::app(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!(env = %config.project_env, "eCFR API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
