//! Typed client for the eCFR versioner service (titles and structure).
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | GET | `/versioner/v1/titles.json` | Title list with currency dates |
//! | GET | `/versioner/v1/structure/{date}/title-{n}.json` | Structure tree of one title as of a date |

use serde::{Deserialize, Serialize};

use crate::error::EcfrApiError;

const TITLES_PATH: &str = "versioner/v1/titles.json";

/// CFR title as returned by the versioner service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Title {
    pub number: u32,
    pub name: String,
    #[serde(default)]
    pub latest_amended_on: Option<String>,
    #[serde(default)]
    pub latest_issue_date: Option<String>,
    #[serde(default)]
    pub up_to_date_as_of: Option<String>,
    #[serde(default)]
    pub reserved: bool,
    /// The upstream object as received, in upstream key order.
    #[serde(skip)]
    pub raw: serde_json::Value,
}

impl Title {
    /// Decode one upstream title object, keeping the object itself in `raw`.
    pub fn from_raw(raw: serde_json::Value) -> Result<Self, serde_json::Error> {
        let mut title: Title = serde_json::from_value(raw.clone())?;
        title.raw = raw;
        Ok(title)
    }

    /// The date to request this title's structure for: the upstream
    /// currency date if present, otherwise the latest issue date.
    pub fn structure_date(&self) -> Option<&str> {
        self.up_to_date_as_of
            .as_deref()
            .or(self.latest_issue_date.as_deref())
            .filter(|d| !d.trim().is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct TitlesResponse {
    #[serde(default)]
    titles: Vec<serde_json::Value>,
}

/// One node of a title's structure tree.
///
/// The root is the title itself (`type = "title"`); descendants are
/// chapters, subchapters, parts, subparts, sections and so on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureNode {
    #[serde(default)]
    pub identifier: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub label_level: Option<String>,
    #[serde(default)]
    pub label_description: Option<String>,
    #[serde(default)]
    pub reserved: bool,
    #[serde(rename = "type", default)]
    pub node_type: String,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub volumes: Vec<String>,
    #[serde(default)]
    pub children: Vec<StructureNode>,
}

impl StructureNode {
    /// Number of nodes in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(StructureNode::node_count).sum::<usize>()
    }
}

/// Client for the eCFR versioner service.
#[derive(Debug, Clone)]
pub struct TitleClient {
    http: reqwest::Client,
    config: crate::EcfrConfig,
}

impl TitleClient {
    pub(crate) fn new(http: reqwest::Client, config: crate::EcfrConfig) -> Self {
        Self { http, config }
    }

    /// Fetch every title in upstream order.
    ///
    /// Calls `GET {base_url}/versioner/v1/titles.json`.
    pub async fn list(&self) -> Result<Vec<Title>, EcfrApiError> {
        const ENDPOINT: &str = "GET /versioner/v1/titles.json";
        let url = self.config.endpoint_url(TITLES_PATH);
        let body: TitlesResponse = crate::get_json(&self.http, ENDPOINT, &url).await?;
        body.titles
            .into_iter()
            .map(|raw| {
                Title::from_raw(raw).map_err(|e| EcfrApiError::Decode {
                    endpoint: ENDPOINT.into(),
                    source: e,
                })
            })
            .collect()
    }

    /// Fetch the structure tree of title `number` as of `as_of` (`YYYY-MM-DD`).
    ///
    /// Calls `GET {base_url}/versioner/v1/structure/{as_of}/title-{number}.json`.
    pub async fn structure(
        &self,
        number: u32,
        as_of: &str,
    ) -> Result<StructureNode, EcfrApiError> {
        let path = format!("versioner/v1/structure/{as_of}/title-{number}.json");
        let endpoint = format!("GET /{path}");
        let url = self.config.endpoint_url(&path);
        crate::get_json(&self.http, &endpoint, &url).await
    }
}
