//! # ecfr-client -- Typed Rust client for the eCFR API
//!
//! Provides typed access to the three upstream endpoints the ingestion
//! pipeline consumes:
//! - **Agencies** via the admin service
//! - **Titles** via the versioner service
//! - **Structure** trees via the versioner service, per title and date
//!
//! ## Call Semantics
//!
//! Each call is exactly one HTTP GET with the configured timeout. There is
//! no retry: a transport error, non-2xx status or unexpected body is
//! returned to the caller as an [`EcfrApiError`] carrying the endpoint.

pub mod agencies;
pub mod config;
pub mod error;
pub mod titles;

pub use agencies::{Agency, CfrReference};
pub use config::EcfrConfig;
pub use error::EcfrApiError;
pub use titles::{StructureNode, Title};

use std::time::Duration;

use serde::de::DeserializeOwned;

/// Top-level eCFR API client. Holds sub-clients for each service.
#[derive(Debug, Clone)]
pub struct EcfrClient {
    agencies: agencies::AgencyClient,
    titles: titles::TitleClient,
}

impl EcfrClient {
    /// Create a new client from configuration.
    pub fn new(config: EcfrConfig) -> Result<Self, EcfrApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("ecfr-stack/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| EcfrApiError::Http {
                endpoint: "client_init".into(),
                source: e,
            })?;

        Ok(Self {
            agencies: agencies::AgencyClient::new(http.clone(), config.clone()),
            titles: titles::TitleClient::new(http, config),
        })
    }

    /// Build a client from `ECFR_*` environment variables.
    pub fn from_env() -> Result<Self, EcfrApiError> {
        Self::new(EcfrConfig::from_env()?)
    }

    /// Fetch the full agency list.
    pub async fn fetch_agencies(&self) -> Result<Vec<Agency>, EcfrApiError> {
        self.agencies.list().await
    }

    /// Fetch the full title list.
    pub async fn fetch_titles(&self) -> Result<Vec<Title>, EcfrApiError> {
        self.titles.list().await
    }

    /// Fetch one title's structure tree as of `as_of`.
    pub async fn fetch_title_structure(
        &self,
        number: u32,
        as_of: &str,
    ) -> Result<StructureNode, EcfrApiError> {
        self.titles.structure(number, as_of).await
    }
}

/// Single GET, status check, JSON decode.
pub(crate) async fn get_json<T: DeserializeOwned>(
    http: &reqwest::Client,
    endpoint: &str,
    url: &str,
) -> Result<T, EcfrApiError> {
    tracing::debug!(endpoint, url, "calling eCFR API");

    let resp = http.get(url).send().await.map_err(|e| EcfrApiError::Http {
        endpoint: endpoint.into(),
        source: e,
    })?;

    if !resp.status().is_success() {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        return Err(EcfrApiError::ApiError {
            endpoint: endpoint.into(),
            status,
            body,
        });
    }

    resp.json().await.map_err(|e| EcfrApiError::Deserialization {
        endpoint: endpoint.into(),
        source: e,
    })
}
