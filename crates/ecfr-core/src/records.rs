//! # Stored Record Types
//!
//! One struct per row shape, plus the [`Record`] enum that the store reads
//! and writes. Each record carries its own `pk`/`sk` so a row is
//! self-describing when scanned, and serializes with an `entity_type` tag:
//!
//! ```json
//! {"entity_type":"title","pk":"TITLE#40","sk":"METADATA","number":40, ...}
//! ```

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::keys::{ItemKey, PartitionKey, SortKey};
use crate::temporal::UpdatedDate;

/// A `{title, chapter}` pair from an agency's CFR references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CfrReference {
    pub title: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chapter: Option<String>,
}

/// Agency metadata row (`AGENCY#<slug>` / `METADATA`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgencyRecord {
    pub pk: PartitionKey,
    pub sk: SortKey,
    pub name: String,
    #[serde(default)]
    pub short_name: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    pub slug: String,
    #[serde(default)]
    pub cfr_references: Vec<CfrReference>,
    pub updated_date: UpdatedDate,
    pub checksum: String,
}

/// Agency↔Title mapping row (`AGENCY#<slug>` / `TITLE#<number>`).
///
/// Derived from one entry of the owning agency's `cfr_references`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgencyTitleRecord {
    pub pk: PartitionKey,
    pub sk: SortKey,
    pub agency_slug: String,
    pub agency_name: String,
    pub title_number: u32,
    #[serde(default)]
    pub chapter: Option<String>,
    pub updated_date: UpdatedDate,
}

/// Title metadata row (`TITLE#<number>` / `METADATA`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleRecord {
    pub pk: PartitionKey,
    pub sk: SortKey,
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
    pub updated_date: UpdatedDate,
    pub checksum: String,
}

/// One flattened node of a title's structure tree
/// (`TITLE#<number>` / `<TYPE>#<path>`).
///
/// `path` is the slash-joined chain of identifiers from the tree root down
/// to this node, so it is unique within the title and encodes ancestry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureNodeRecord {
    pub pk: PartitionKey,
    pub sk: SortKey,
    pub title_number: u32,
    /// Upstream node type, e.g. `title`, `chapter`, `subchapter`, `part`.
    pub node_type: String,
    pub identifier: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub label_level: Option<String>,
    #[serde(default)]
    pub label_description: Option<String>,
    #[serde(default)]
    pub reserved: bool,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub volumes: Vec<String>,
    pub path: String,
    pub updated_date: UpdatedDate,
    pub checksum: String,
}

/// Legacy per-agency snapshot row (`AGENCY#<code>` / `SNAPSHOT#<date>`).
///
/// Superseded by the agency/title rows but still written on request and
/// still queryable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotRecord {
    pub pk: PartitionKey,
    pub sk: SortKey,
    pub agency: String,
    pub date: UpdatedDate,
    pub checksum: String,
    pub word_count: u64,
}

/// Any row in the store, tagged by `entity_type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "entity_type", rename_all = "snake_case")]
pub enum Record {
    Agency(AgencyRecord),
    AgencyTitle(AgencyTitleRecord),
    Title(TitleRecord),
    Structure(StructureNodeRecord),
    Snapshot(SnapshotRecord),
}

impl Record {
    /// The discriminant of this row.
    pub fn entity_type(&self) -> EntityType {
        match self {
            Self::Agency(_) => EntityType::Agency,
            Self::AgencyTitle(_) => EntityType::AgencyTitle,
            Self::Title(_) => EntityType::Title,
            Self::Structure(_) => EntityType::Structure,
            Self::Snapshot(_) => EntityType::Snapshot,
        }
    }

    pub fn pk(&self) -> &PartitionKey {
        match self {
            Self::Agency(r) => &r.pk,
            Self::AgencyTitle(r) => &r.pk,
            Self::Title(r) => &r.pk,
            Self::Structure(r) => &r.pk,
            Self::Snapshot(r) => &r.pk,
        }
    }

    pub fn sk(&self) -> &SortKey {
        match self {
            Self::Agency(r) => &r.sk,
            Self::AgencyTitle(r) => &r.sk,
            Self::Title(r) => &r.sk,
            Self::Structure(r) => &r.sk,
            Self::Snapshot(r) => &r.sk,
        }
    }

    /// The composite primary key of this row.
    pub fn key(&self) -> ItemKey {
        ItemKey::new(self.pk().clone(), self.sk().clone())
    }
}

impl From<AgencyRecord> for Record {
    fn from(r: AgencyRecord) -> Self {
        Self::Agency(r)
    }
}

impl From<AgencyTitleRecord> for Record {
    fn from(r: AgencyTitleRecord) -> Self {
        Self::AgencyTitle(r)
    }
}

impl From<TitleRecord> for Record {
    fn from(r: TitleRecord) -> Self {
        Self::Title(r)
    }
}

impl From<StructureNodeRecord> for Record {
    fn from(r: StructureNodeRecord) -> Self {
        Self::Structure(r)
    }
}

impl From<SnapshotRecord> for Record {
    fn from(r: SnapshotRecord) -> Self {
        Self::Snapshot(r)
    }
}

/// The `entity_type` discriminant, usable as a scan filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Agency,
    AgencyTitle,
    Title,
    Structure,
    Snapshot,
}

impl EntityType {
    /// Every entity type, in declaration order.
    pub const ALL: [EntityType; 5] = [
        Self::Agency,
        Self::AgencyTitle,
        Self::Title,
        Self::Structure,
        Self::Snapshot,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Agency => "agency",
            Self::AgencyTitle => "agency_title",
            Self::Title => "title",
            Self::Structure => "structure",
            Self::Snapshot => "snapshot",
        }
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EntityType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CoreError::Invalid {
                kind: "entity type",
                value: s.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> UpdatedDate {
        UpdatedDate::parse("2025-08-01").unwrap()
    }

    fn title_record() -> TitleRecord {
        TitleRecord {
            pk: PartitionKey::title(40),
            sk: SortKey::metadata(),
            number: 40,
            name: "Protection of Environment".into(),
            latest_amended_on: Some("2025-07-30".into()),
            latest_issue_date: Some("2025-07-30".into()),
            up_to_date_as_of: Some("2025-07-31".into()),
            reserved: false,
            updated_date: date(),
            checksum: "abc".into(),
        }
    }

    #[test]
    fn record_serializes_with_entity_type_tag() {
        let record = Record::from(title_record());
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["entity_type"], "title");
        assert_eq!(json["pk"], "TITLE#40");
        assert_eq!(json["sk"], "METADATA");
        assert_eq!(json["number"], 40);
        assert_eq!(json["updated_date"], "2025-08-01");
    }

    #[test]
    fn record_deserializes_by_tag() {
        let json = serde_json::json!({
            "entity_type": "agency_title",
            "pk": "AGENCY#epa",
            "sk": "TITLE#40",
            "agency_slug": "epa",
            "agency_name": "Environmental Protection Agency",
            "title_number": 40,
            "chapter": "I",
            "updated_date": "2025-08-01"
        });
        let record: Record = serde_json::from_value(json).unwrap();
        assert_eq!(record.entity_type(), EntityType::AgencyTitle);
        assert_eq!(record.key(), ItemKey::new(PartitionKey::agency("epa"), SortKey::title(40)));
    }

    #[test]
    fn unknown_entity_type_rejected() {
        let json = serde_json::json!({"entity_type": "widget", "pk": "X", "sk": "Y"});
        assert!(serde_json::from_value::<Record>(json).is_err());
    }

    #[test]
    fn snapshot_record_keys() {
        let record = Record::from(SnapshotRecord {
            pk: PartitionKey::agency("PROTECTI"),
            sk: SortKey::snapshot(date()),
            agency: "PROTECTI".into(),
            date: date(),
            checksum: "c".into(),
            word_count: 3,
        });
        assert_eq!(record.pk().as_str(), "AGENCY#PROTECTI");
        assert_eq!(record.sk().as_str(), "SNAPSHOT#2025-08-01");
        assert_eq!(record.entity_type(), EntityType::Snapshot);
    }

    #[test]
    fn entity_type_parses_case_insensitively() {
        assert_eq!("Agency".parse::<EntityType>().unwrap(), EntityType::Agency);
        assert_eq!(" structure ".parse::<EntityType>().unwrap(), EntityType::Structure);
        assert!("chapter".parse::<EntityType>().is_err());
    }

    #[test]
    fn entity_type_str_matches_serde_tag() {
        for t in EntityType::ALL {
            let json = serde_json::to_value(t).unwrap();
            assert_eq!(json, t.as_str());
        }
    }
}
