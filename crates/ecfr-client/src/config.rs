//! eCFR client configuration.
//!
//! Defaults point at the public production API. Override via environment
//! variables or explicit construction for staging and tests.

use url::Url;

const DEFAULT_BASE_URL: &str = "https://www.ecfr.gov/api";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for connecting to the eCFR API.
#[derive(Debug, Clone)]
pub struct EcfrConfig {
    /// API root; service paths such as `/versioner/v1/...` are appended.
    pub base_url: Url,
    /// Per-request timeout in seconds. Applies to every call, no retries.
    pub timeout_secs: u64,
}

impl EcfrConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `ECFR_BASE_URL` (default: `https://www.ecfr.gov/api`)
    /// - `ECFR_TIMEOUT_SECS` (default: 30)
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: env_url("ECFR_BASE_URL", DEFAULT_BASE_URL)?,
            timeout_secs: std::env::var("ECFR_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        })
    }

    /// Configuration pointing at a local mock server (for testing).
    pub fn local_mock(uri: &str) -> Result<Self, ConfigError> {
        let base_url = Url::parse(uri)
            .map_err(|e| ConfigError::InvalidUrl("mock".to_string(), e.to_string()))?;
        Ok(Self {
            base_url,
            timeout_secs: 5,
        })
    }

    /// Join a service path onto the base URL, keeping any base path segment.
    pub(crate) fn endpoint_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

fn env_url(var: &str, default: &str) -> Result<Url, ConfigError> {
    let raw = std::env::var(var).unwrap_or_else(|_| default.to_string());
    Url::parse(&raw).map_err(|e| ConfigError::InvalidUrl(var.to_string(), e.to_string()))
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
}
