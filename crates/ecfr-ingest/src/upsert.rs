//! # Upsert Operations
//!
//! Converts upstream payloads into stored rows and writes them. Every write
//! is an unconditional put keyed by the row's composite key: no
//! read-before-write, no batching, no deletes. Writing the same input twice
//! yields the same keys and checksums; only `updated_date` moves.

use ecfr_client::{Agency, StructureNode, Title};
use ecfr_core::{
    checksum_of, text_checksum, AgencyRecord, AgencyTitleRecord, CfrReference, PartitionKey,
    Record, SnapshotRecord, SortKey, StructureNodeRecord, TitleRecord, UpdatedDate,
};
use ecfr_store::ItemStore;
use serde::Serialize;

use crate::error::IngestError;

/// Write one row and count it.
async fn put(store: &dyn ItemStore, record: Record) -> Result<Record, IngestError> {
    store.put_item(&record).await?;
    metrics::counter!("ecfr_rows_written_total", "entity_type" => record.entity_type().as_str())
        .increment(1);
    Ok(record)
}

/// Build the agency metadata row. The checksum covers the upstream agency
/// as received, children and all.
pub fn agency_record(agency: &Agency, date: UpdatedDate) -> Result<AgencyRecord, IngestError> {
    Ok(AgencyRecord {
        pk: PartitionKey::agency(&agency.slug),
        sk: SortKey::metadata(),
        name: agency.name.clone(),
        short_name: agency.short_name.clone(),
        display_name: agency.display_name.clone(),
        slug: agency.slug.clone(),
        cfr_references: agency
            .cfr_references
            .iter()
            .map(|r| CfrReference {
                title: r.title,
                chapter: r.chapter.clone(),
            })
            .collect(),
        updated_date: date,
        checksum: checksum_of(agency)?,
    })
}

/// One mapping row per `cfr_references` entry, stamped with the agency's
/// write date.
///
/// References to the same title collapse onto one key (`TITLE#<n>`); when
/// written in order, the last reference for a title wins.
pub fn derive_mappings(agency: &AgencyRecord) -> Vec<AgencyTitleRecord> {
    agency
        .cfr_references
        .iter()
        .map(|r| AgencyTitleRecord {
            pk: PartitionKey::agency(&agency.slug),
            sk: SortKey::title(r.title),
            agency_slug: agency.slug.clone(),
            agency_name: agency.name.clone(),
            title_number: r.title,
            chapter: r.chapter.clone(),
            updated_date: agency.updated_date,
        })
        .collect()
}

/// Write the agency row, then one mapping row per CFR reference.
///
/// Returns the written rows, agency first.
pub async fn store_agency(
    store: &dyn ItemStore,
    agency: &Agency,
    date: UpdatedDate,
) -> Result<Vec<Record>, IngestError> {
    let record = agency_record(agency, date)?;
    let mappings = derive_mappings(&record);

    let mut written = Vec::with_capacity(1 + mappings.len());
    written.push(put(store, record.into()).await?);
    for mapping in mappings {
        written.push(put(store, mapping.into()).await?);
    }
    tracing::debug!(slug = %agency.slug, rows = written.len(), "stored agency");
    Ok(written)
}

/// Build the title metadata row.
pub fn title_record(title: &Title, date: UpdatedDate) -> Result<TitleRecord, IngestError> {
    Ok(TitleRecord {
        pk: PartitionKey::title(title.number),
        sk: SortKey::metadata(),
        number: title.number,
        name: title.name.clone(),
        latest_amended_on: title.latest_amended_on.clone(),
        latest_issue_date: title.latest_issue_date.clone(),
        up_to_date_as_of: title.up_to_date_as_of.clone(),
        reserved: title.reserved,
        updated_date: date,
        checksum: checksum_of(title)?,
    })
}

/// Write the title metadata row.
pub async fn store_title(
    store: &dyn ItemStore,
    title: &Title,
    date: UpdatedDate,
) -> Result<Record, IngestError> {
    put(store, title_record(title, date)?.into()).await
}

/// The fields of a structure node that its checksum covers. Children are
/// excluded so a node's checksum changes only when the node itself does.
#[derive(Serialize)]
struct NodeContent<'a> {
    identifier: &'a str,
    label: &'a Option<String>,
    label_level: &'a Option<String>,
    label_description: &'a Option<String>,
    reserved: bool,
    #[serde(rename = "type")]
    node_type: &'a str,
    size: Option<u64>,
    volumes: &'a [String],
}

/// Join a child identifier onto its parent's path. The root has an empty
/// parent path, so its path is its own identifier.
pub fn child_path(parent: &str, identifier: &str) -> String {
    if parent.is_empty() {
        identifier.to_string()
    } else {
        format!("{parent}/{identifier}")
    }
}

fn node_record(
    title_number: u32,
    node: &StructureNode,
    path: String,
    date: UpdatedDate,
) -> Result<StructureNodeRecord, IngestError> {
    let checksum = checksum_of(&NodeContent {
        identifier: &node.identifier,
        label: &node.label,
        label_level: &node.label_level,
        label_description: &node.label_description,
        reserved: node.reserved,
        node_type: &node.node_type,
        size: node.size,
        volumes: &node.volumes,
    })?;
    let node_type = if node.node_type.is_empty() {
        "node"
    } else {
        node.node_type.as_str()
    };

    Ok(StructureNodeRecord {
        pk: PartitionKey::title(title_number),
        sk: SortKey::structure(node_type, &path),
        title_number,
        node_type: node_type.to_string(),
        identifier: node.identifier.clone(),
        label: node.label.clone(),
        label_level: node.label_level.clone(),
        label_description: node.label_description.clone(),
        reserved: node.reserved,
        size: node.size,
        volumes: node.volumes.clone(),
        path,
        updated_date: date,
        checksum,
    })
}

/// Flatten a structure tree into rows, depth-first pre-order.
///
/// Uses an explicit stack so deep trees cannot exhaust the call stack.
pub fn flatten_structure(
    title_number: u32,
    root: &StructureNode,
    date: UpdatedDate,
) -> Result<Vec<StructureNodeRecord>, IngestError> {
    let mut out = Vec::with_capacity(root.node_count());
    let mut stack: Vec<(&StructureNode, String)> = vec![(root, child_path("", &root.identifier))];

    while let Some((node, path)) = stack.pop() {
        // Push in reverse so the first child is visited next.
        for child in node.children.iter().rev() {
            stack.push((child, child_path(&path, &child.identifier)));
        }
        out.push(node_record(title_number, node, path, date)?);
    }
    Ok(out)
}

/// Write one row per node of the tree rooted at `root`.
///
/// Returns the written rows in pre-order.
pub async fn store_title_structure(
    store: &dyn ItemStore,
    title_number: u32,
    root: &StructureNode,
    date: UpdatedDate,
) -> Result<Vec<Record>, IngestError> {
    let nodes = flatten_structure(title_number, root, date)?;
    let mut written = Vec::with_capacity(nodes.len());
    for node in nodes {
        written.push(put(store, node.into()).await?);
    }
    tracing::debug!(title = title_number, rows = written.len(), "stored title structure");
    Ok(written)
}

/// Legacy agency code for a title: first word of its name, uppercased and
/// cut to eight characters. `UNKNOWN` for a blank name.
pub fn legacy_agency_code(title_name: &str) -> String {
    match title_name.split_whitespace().next() {
        Some(word) => word.to_uppercase().chars().take(8).collect(),
        None => "UNKNOWN".to_string(),
    }
}

/// Write a legacy `AGENCY#<code>` / `SNAPSHOT#<date>` row for `payload`.
///
/// `word_count` counts whitespace-separated tokens; the checksum is taken
/// over the payload text exactly as given.
pub async fn store_snapshot(
    store: &dyn ItemStore,
    agency_code: &str,
    payload: &str,
    date: UpdatedDate,
) -> Result<Record, IngestError> {
    let record = SnapshotRecord {
        pk: PartitionKey::agency(agency_code),
        sk: SortKey::snapshot(date),
        agency: agency_code.to_string(),
        date,
        checksum: text_checksum(payload),
        word_count: payload.split_whitespace().count() as u64,
    };
    put(store, record.into()).await
}
