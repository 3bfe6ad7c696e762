//! # Composite Store Keys
//!
//! Every row in the store is addressed by a two-part key: a partition key
//! grouping related rows and a sort key distinguishing rows within the
//! partition. Both are strings assembled from a typed prefix and an
//! identifier.
//!
//! | Row | Partition key | Sort key |
//! |-----|---------------|----------|
//! | Agency | `AGENCY#<slug>` | `METADATA` |
//! | Agency↔Title mapping | `AGENCY#<slug>` | `TITLE#<number>` |
//! | Title | `TITLE#<number>` | `METADATA` |
//! | Structure node | `TITLE#<number>` | `<TYPE>#<path>` |
//! | Snapshot (legacy) | `AGENCY#<code>` | `SNAPSHOT#<date>` |
//!
//! `PartitionKey` and `SortKey` keep their inner string private; code that
//! writes rows can only obtain one through the constructors below, so a
//! misspelled prefix cannot reach the store. Deserialization accepts any
//! string because rows read back from a store are trusted as written.

use serde::{Deserialize, Serialize};

use crate::temporal::UpdatedDate;

/// Partition prefix for agency-owned rows.
pub const AGENCY_PREFIX: &str = "AGENCY#";
/// Prefix for title partitions and for mapping sort keys.
pub const TITLE_PREFIX: &str = "TITLE#";
/// Sort key of the single metadata row in a partition.
pub const METADATA: &str = "METADATA";
/// Sort-key prefix of chapter structure nodes.
pub const CHAPTER_PREFIX: &str = "CHAPTER#";
/// Sort-key prefix of part structure nodes.
pub const PART_PREFIX: &str = "PART#";
/// Sort-key prefix of legacy snapshot rows.
pub const SNAPSHOT_PREFIX: &str = "SNAPSHOT#";

/// Partition component of an [`ItemKey`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartitionKey(String);

impl PartitionKey {
    /// `AGENCY#<slug>`. Also used with legacy agency codes.
    pub fn agency(slug: &str) -> Self {
        Self(format!("{AGENCY_PREFIX}{slug}"))
    }

    /// `TITLE#<number>`.
    pub fn title(number: u32) -> Self {
        Self(format!("{TITLE_PREFIX}{number}"))
    }

    /// The raw key string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PartitionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Sort component of an [`ItemKey`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SortKey(String);

impl SortKey {
    /// `METADATA`.
    pub fn metadata() -> Self {
        Self(METADATA.to_string())
    }

    /// `TITLE#<number>`, the sort key of an agency↔title mapping row.
    pub fn title(number: u32) -> Self {
        Self(format!("{TITLE_PREFIX}{number}"))
    }

    /// `<NODE_TYPE>#<path>` for a structure node, with the node type
    /// uppercased (`chapter` → `CHAPTER#40/I`).
    pub fn structure(node_type: &str, path: &str) -> Self {
        Self(format!("{}#{path}", node_type.to_ascii_uppercase()))
    }

    /// `SNAPSHOT#<YYYY-MM-DD>`.
    pub fn snapshot(date: UpdatedDate) -> Self {
        Self(format!("{SNAPSHOT_PREFIX}{date}"))
    }

    /// The raw key string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this sort key begins with `prefix`.
    pub fn begins_with(&self, prefix: &str) -> bool {
        self.0.starts_with(prefix)
    }
}

impl std::fmt::Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The full composite primary key. Unique per row; writing an existing
/// key overwrites the row in place.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ItemKey {
    pub pk: PartitionKey,
    pub sk: SortKey,
}

impl ItemKey {
    pub fn new(pk: PartitionKey, sk: SortKey) -> Self {
        Self { pk, sk }
    }

    /// Key of an agency metadata row.
    pub fn agency(slug: &str) -> Self {
        Self::new(PartitionKey::agency(slug), SortKey::metadata())
    }

    /// Key of a title metadata row.
    pub fn title(number: u32) -> Self {
        Self::new(PartitionKey::title(number), SortKey::metadata())
    }
}

impl std::fmt::Display for ItemKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.pk, self.sk)
    }
}
