//! Typed client for the eCFR admin service (agency list).
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | GET | `/admin/v1/agencies.json` | All agencies with their CFR references |

use serde::{Deserialize, Serialize};

use crate::error::EcfrApiError;

const AGENCIES_PATH: &str = "admin/v1/agencies.json";

/// A `{title, chapter, ...}` entry of an agency's CFR references.
///
/// Upstream also uses `subtitle`, `subchapter` and `part` for agencies that
/// own only a slice of a chapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CfrReference {
    pub title: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chapter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subchapter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part: Option<String>,
}

/// Agency as returned by the admin service.
///
/// Optional fields default so that schema additions or omissions upstream
/// do not break ingestion. Unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agency {
    pub name: String,
    #[serde(default)]
    pub short_name: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub sortable_name: Option<String>,
    pub slug: String,
    #[serde(default)]
    pub children: Vec<Agency>,
    #[serde(default)]
    pub cfr_references: Vec<CfrReference>,
}

#[derive(Debug, Deserialize)]
struct AgenciesResponse {
    #[serde(default)]
    agencies: Vec<Agency>,
}

/// Client for the eCFR admin service.
#[derive(Debug, Clone)]
pub struct AgencyClient {
    http: reqwest::Client,
    config: crate::EcfrConfig,
}

impl AgencyClient {
    pub(crate) fn new(http: reqwest::Client, config: crate::EcfrConfig) -> Self {
        Self { http, config }
    }

    /// Fetch every top-level agency in upstream order.
    ///
    /// Calls `GET {base_url}/admin/v1/agencies.json`.
    pub async fn list(&self) -> Result<Vec<Agency>, EcfrApiError> {
        let url = self.config.endpoint_url(AGENCIES_PATH);
        let body: AgenciesResponse =
            crate::get_json(&self.http, "GET /admin/v1/agencies.json", &url).await?;
        Ok(body.agencies)
    }
}
