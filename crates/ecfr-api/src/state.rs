//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers via
//! the `State` extractor. The item store is the only data the server
//! touches; it holds no in-process copy of any record.

use std::sync::Arc;

use ecfr_ingest::Ingestor;
use ecfr_store::ItemStore;
use metrics_exporter_prometheus::PrometheusHandle;

/// Default value of `PROJECT_ENV`.
pub const DEFAULT_PROJECT_ENV: &str = "dev";

/// Server configuration read from the environment.
#[derive(Clone)]
pub struct AppConfig {
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Shared secret expected in `x-api-key`. `None` rejects every
    /// protected request.
    pub auth_token: Option<String>,
    /// Deployment label shown in HTML pages and `/health` output.
    pub project_env: String,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("port", &self.port)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "[REDACTED]"))
            .field("project_env", &self.project_env)
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            auth_token: None,
            project_env: DEFAULT_PROJECT_ENV.to_string(),
        }
    }
}

impl AppConfig {
    /// Read `PORT`, `API_AUTH_TOKEN` and `PROJECT_ENV`.
    ///
    /// An unparseable `PORT` falls back to 8080; an empty token counts as
    /// unset.
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);
        let auth_token = std::env::var("API_AUTH_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty());
        let project_env = std::env::var("PROJECT_ENV")
            .ok()
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_PROJECT_ENV.to_string());
        Self {
            port,
            auth_token,
            project_env,
        }
    }
}

/// Handles shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ItemStore>,
    /// Present when an upstream client could be built; `POST /v1/ingest`
    /// answers 503 without it.
    pub ingestor: Option<Ingestor>,
    pub config: AppConfig,
    /// Prometheus recorder handle rendered at `/metrics`.
    pub metrics: Option<PrometheusHandle>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("store", &self.store.backend())
            .field("ingestor", &self.ingestor.is_some())
            .field("config", &self.config)
            .field("metrics", &self.metrics.is_some())
            .finish()
    }
}

impl AppState {
    /// State over `store` with no ingestor and no metrics recorder.
    pub fn new(store: Arc<dyn ItemStore>, config: AppConfig) -> Self {
        Self {
            store,
            ingestor: None,
            config,
            metrics: None,
        }
    }

    pub fn with_ingestor(mut self, ingestor: Ingestor) -> Self {
        self.ingestor = Some(ingestor);
        self
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}
