//! eCFR client error types.

/// Errors from eCFR API calls. Every variant names the failing endpoint.
#[derive(Debug, thiserror::Error)]
pub enum EcfrApiError {
    /// HTTP transport error, including timeouts.
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        endpoint: String,
        source: reqwest::Error,
    },
    /// The API returned a non-2xx status.
    #[error("eCFR API {endpoint} returned {status}: {body}")]
    ApiError {
        endpoint: String,
        status: u16,
        body: String,
    },
    /// Response body did not match the expected shape.
    #[error("failed to deserialize response from {endpoint}: {source}")]
    Deserialization {
        endpoint: String,
        source: reqwest::Error,
    },
    /// One entry of a list response did not match the expected shape.
    #[error("failed to decode entry from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        source: serde_json::Error,
    },
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

impl EcfrApiError {
    /// The endpoint the failing call was made against, if any.
    pub fn endpoint(&self) -> Option<&str> {
        match self {
            Self::Http { endpoint, .. }
            | Self::ApiError { endpoint, .. }
            | Self::Deserialization { endpoint, .. }
            | Self::Decode { endpoint, .. } => Some(endpoint),
            Self::Config(_) => None,
        }
    }
}
