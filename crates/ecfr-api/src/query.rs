//! # Query Operations
//!
//! Read paths over the item store, independent of HTTP and of output
//! format. Handlers call these and hand the result to [`crate::render`].
//!
//! | Operation | Store access |
//! |-----------|--------------|
//! | [`list_agencies`] | filtered scan, bounded |
//! | [`list_titles`] | filtered scan, sorted by number, truncated |
//! | [`get_title_structure`] | two partition queries (`CHAPTER#`, `PART#`) |
//! | [`get_agency_cfr_coverage`] | exact get + partition query (`TITLE#`) |
//! | [`search`] | partition query when a natural key is given, else scan |
//! | [`agency_history`] / [`latest_snapshot`] | partition query (`SNAPSHOT#`) |

use ecfr_core::keys::{CHAPTER_PREFIX, PART_PREFIX, SNAPSHOT_PREFIX, TITLE_PREFIX};
use ecfr_core::{
    AgencyRecord, AgencyTitleRecord, EntityType, ItemKey, PartitionKey, Record, SnapshotRecord,
    StructureNodeRecord, TitleRecord, UpdatedDate,
};
use ecfr_store::{ItemStore, ScanFilter, StoreError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Default page size when a request gives no `limit`.
pub const DEFAULT_LIMIT: usize = 25;
/// Largest accepted `limit`.
pub const MAX_LIMIT: usize = 200;
/// Chapters returned by [`get_title_structure`].
pub const CHAPTER_LIMIT: usize = 50;
/// Parts returned by [`get_title_structure`].
pub const PART_LIMIT: usize = 20;

/// Query failures.
#[derive(Error, Debug)]
pub enum QueryError {
    /// The requested row does not exist.
    #[error("{0} not found")]
    NotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Chapters and parts of one title, as two flat lists.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TitleStructure {
    pub title_number: u32,
    #[schema(value_type = Vec<Object>)]
    pub chapters: Vec<StructureNodeRecord>,
    #[schema(value_type = Vec<Object>)]
    pub parts: Vec<StructureNodeRecord>,
}

/// An agency and the titles it is mapped to.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AgencyCoverage {
    #[schema(value_type = Object)]
    pub agency: AgencyRecord,
    #[schema(value_type = Vec<Object>)]
    pub titles: Vec<AgencyTitleRecord>,
}

/// Filters for [`search`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchRequest {
    pub entity_type: Option<EntityType>,
    pub title: Option<u32>,
    pub agency: Option<String>,
    pub limit: usize,
}

fn agencies(rows: Vec<Record>) -> Vec<AgencyRecord> {
    rows.into_iter()
        .filter_map(|r| match r {
            Record::Agency(a) => Some(a),
            _ => None,
        })
        .collect()
}

fn structure_nodes(rows: Vec<Record>) -> Vec<StructureNodeRecord> {
    rows.into_iter()
        .filter_map(|r| match r {
            Record::Structure(s) => Some(s),
            _ => None,
        })
        .collect()
}

fn snapshots(rows: Vec<Record>) -> Vec<SnapshotRecord> {
    rows.into_iter()
        .filter_map(|r| match r {
            Record::Snapshot(s) => Some(s),
            _ => None,
        })
        .collect()
}

/// Up to `limit` agency rows, in store scan order.
pub async fn list_agencies(
    store: &dyn ItemStore,
    limit: usize,
) -> Result<Vec<AgencyRecord>, QueryError> {
    let rows = store
        .scan(&ScanFilter::entity(EntityType::Agency), Some(limit))
        .await?;
    Ok(agencies(rows))
}

/// The `limit` lowest-numbered title rows, in numeric order.
///
/// Reads every title row before truncating; the CFR has fifty titles.
pub async fn list_titles(
    store: &dyn ItemStore,
    limit: usize,
) -> Result<Vec<TitleRecord>, QueryError> {
    let rows = store
        .scan(&ScanFilter::entity(EntityType::Title), None)
        .await?;
    let mut titles: Vec<TitleRecord> = rows
        .into_iter()
        .filter_map(|r| match r {
            Record::Title(t) => Some(t),
            _ => None,
        })
        .collect();
    titles.sort_by_key(|t| t.number);
    titles.truncate(limit);
    Ok(titles)
}

/// First [`CHAPTER_LIMIT`] chapters and first [`PART_LIMIT`] parts of a
/// title, each in sort-key order. Empty lists when nothing is stored.
pub async fn get_title_structure(
    store: &dyn ItemStore,
    title_number: u32,
) -> Result<TitleStructure, QueryError> {
    let pk = PartitionKey::title(title_number);
    let chapters = store
        .query(&pk, Some(CHAPTER_PREFIX), Some(CHAPTER_LIMIT))
        .await?;
    let parts = store.query(&pk, Some(PART_PREFIX), Some(PART_LIMIT)).await?;
    Ok(TitleStructure {
        title_number,
        chapters: structure_nodes(chapters),
        parts: structure_nodes(parts),
    })
}

/// The agency row for `slug` and all of its title mappings.
pub async fn get_agency_cfr_coverage(
    store: &dyn ItemStore,
    slug: &str,
) -> Result<AgencyCoverage, QueryError> {
    let Some(Record::Agency(agency)) = store.get_item(&ItemKey::agency(slug)).await? else {
        return Err(QueryError::NotFound(format!("agency {slug:?}")));
    };
    let rows = store
        .query(&agency.pk, Some(TITLE_PREFIX), None)
        .await?;
    let titles = rows
        .into_iter()
        .filter_map(|r| match r {
            Record::AgencyTitle(m) => Some(m),
            _ => None,
        })
        .collect();
    Ok(AgencyCoverage { agency, titles })
}

/// Filtered lookup across entity types.
///
/// Exactly one of `title` / `agency` set: a partition query on that key,
/// no scan. Neither set, or both set: a scan filtered by `entity_type`
/// alone.
pub async fn search(
    store: &dyn ItemStore,
    req: &SearchRequest,
) -> Result<Vec<Record>, QueryError> {
    let pk = match (&req.title, &req.agency) {
        (Some(n), None) => Some(PartitionKey::title(*n)),
        (None, Some(slug)) => Some(PartitionKey::agency(slug)),
        (Some(_), Some(_)) => {
            tracing::debug!("search with both title and agency falls back to a scan");
            None
        }
        (None, None) => None,
    };

    let rows = match pk {
        Some(pk) => match req.entity_type {
            None => store.query(&pk, None, Some(req.limit)).await?,
            Some(t) => store
                .query(&pk, None, None)
                .await?
                .into_iter()
                .filter(|r| r.entity_type() == t)
                .take(req.limit)
                .collect(),
        },
        None => {
            let filter = ScanFilter {
                entity_type: req.entity_type,
                pk_prefix: None,
            };
            store.scan(&filter, Some(req.limit)).await?
        }
    };
    Ok(rows)
}

/// Legacy snapshots of agency `code` in date order, optionally from
/// `from` onward. Codes are matched uppercased.
pub async fn agency_history(
    store: &dyn ItemStore,
    code: &str,
    from: Option<UpdatedDate>,
) -> Result<Vec<SnapshotRecord>, QueryError> {
    let pk = PartitionKey::agency(&code.to_uppercase());
    let rows = store.query(&pk, Some(SNAPSHOT_PREFIX), None).await?;
    let mut history = snapshots(rows);
    if let Some(from) = from {
        history.retain(|s| s.date >= from);
    }
    history.sort_by_key(|s| s.date);
    Ok(history)
}

/// Most recent legacy snapshot of agency `code`.
pub async fn latest_snapshot(
    store: &dyn ItemStore,
    code: &str,
) -> Result<SnapshotRecord, QueryError> {
    agency_history(store, code, None)
        .await?
        .pop()
        .ok_or_else(|| QueryError::NotFound(format!("snapshot for agency {:?}", code.to_uppercase())))
}
