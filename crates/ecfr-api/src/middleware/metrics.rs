//! # Request Metrics
//!
//! Two views of the same counts: in-process atomics in [`ApiMetrics`] for
//! tests and diagnostics, and `metrics` facade counters exported by the
//! Prometheus recorder at `/metrics`:
//!
//! - `ecfr_api_requests_total{method}`
//! - `ecfr_api_errors_total{status}` for every 4xx and 5xx response

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;

/// Shared request counters.
#[derive(Debug, Clone)]
pub struct ApiMetrics {
    pub request_count: Arc<AtomicU64>,
    pub error_count: Arc<AtomicU64>,
}

impl ApiMetrics {
    pub fn new() -> Self {
        Self {
            request_count: Arc::new(AtomicU64::new(0)),
            error_count: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn requests(&self) -> u64 {
        self.request_count.load(Ordering::Relaxed)
    }

    pub fn errors(&self) -> u64 {
        self.error_count.load(Ordering::Relaxed)
    }
}

impl Default for ApiMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Count every request and every error response.
pub async fn metrics_middleware(request: Request, next: Next) -> Response {
    let api_metrics = request.extensions().get::<ApiMetrics>().cloned();
    let method = request.method().to_string();

    let response = next.run(request).await;
    let status = response.status();
    let is_error = status.is_client_error() || status.is_server_error();

    metrics::counter!("ecfr_api_requests_total", "method" => method).increment(1);
    if is_error {
        metrics::counter!("ecfr_api_errors_total", "status" => status.as_u16().to_string())
            .increment(1);
    }

    if let Some(m) = api_metrics {
        m.request_count.fetch_add(1, Ordering::Relaxed);
        if is_error {
            m.error_count.fetch_add(1, Ordering::Relaxed);
        }
    }

    response
}
