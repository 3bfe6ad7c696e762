//! Behaviour shared by every `ItemStore` backend.
//!
//! Each check runs against `MemoryStore` unconditionally and against
//! `PgStore` when `DATABASE_URL` is set:
//!
//!   DATABASE_URL=postgres://... cargo test -p ecfr-store --test store_contract
//!
//! Postgres runs are isolated by a per-run partition prefix, so they can
//! share a database with other data.

use std::time::{SystemTime, UNIX_EPOCH};

use ecfr_core::{
    AgencyRecord, EntityType, ItemKey, PartitionKey, Record, SnapshotRecord, SortKey,
    StructureNodeRecord, UpdatedDate,
};
use ecfr_store::{ItemStore, MemoryStore, PgStore, ScanFilter, StoreError};

fn date(s: &str) -> UpdatedDate {
    UpdatedDate::parse(s).unwrap()
}

/// Unique partition prefix for one test in one process.
fn run_prefix(test: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("t{nanos}-{test}")
}

fn agency(slug: &str, name: &str) -> Record {
    Record::Agency(AgencyRecord {
        pk: PartitionKey::agency(slug),
        sk: SortKey::metadata(),
        name: name.into(),
        short_name: None,
        display_name: None,
        slug: slug.into(),
        cfr_references: vec![],
        updated_date: date("2025-08-01"),
        checksum: "c".into(),
    })
}

/// A structure-shaped row under an arbitrary agency partition.
fn node(partition: &str, node_type: &str, path: &str) -> Record {
    Record::Structure(StructureNodeRecord {
        pk: PartitionKey::agency(partition),
        sk: SortKey::structure(node_type, path),
        title_number: 40,
        node_type: node_type.into(),
        identifier: path.rsplit('/').next().unwrap_or(path).into(),
        label: None,
        label_level: None,
        label_description: None,
        reserved: false,
        size: None,
        volumes: vec![],
        path: path.into(),
        updated_date: date("2025-08-01"),
        checksum: "c".into(),
    })
}

fn snapshot(code: &str, d: &str) -> Record {
    Record::Snapshot(SnapshotRecord {
        pk: PartitionKey::agency(code),
        sk: SortKey::snapshot(date(d)),
        agency: code.into(),
        date: date(d),
        checksum: "c".into(),
        word_count: 1,
    })
}

fn sort_keys(rows: &[Record]) -> Vec<String> {
    rows.iter().map(|r| r.sk().to_string()).collect()
}

async fn pg_store() -> Option<PgStore> {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set, skipping PostgreSQL store test");
        return None;
    };
    Some(PgStore::connect(&url).await.unwrap())
}

// -- Shared checks -----------------------------------------------------------

async fn put_overwrites_existing_key(store: &dyn ItemStore, run: &str) {
    let slug = format!("{run}-agency");
    store.put_item(&agency(&slug, "First")).await.unwrap();
    store.put_item(&agency(&slug, "Second")).await.unwrap();

    let Some(Record::Agency(row)) = store.get_item(&ItemKey::agency(&slug)).await.unwrap() else {
        panic!("agency row missing")
    };
    assert_eq!(row.name, "Second");
    let rows = store
        .query(&PartitionKey::agency(&slug), None, None)
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
}

async fn get_missing_key_is_none(store: &dyn ItemStore, run: &str) {
    let key = ItemKey::agency(&format!("{run}-nobody"));
    assert!(store.get_item(&key).await.unwrap().is_none());
}

async fn query_isolates_partition_and_prefix(store: &dyn ItemStore, run: &str) {
    let p = format!("{run}-p");
    // Shares a string prefix with `p` but is a different partition.
    let p2 = format!("{run}-p2");
    for r in [
        node(&p, "chapter", "40/I"),
        node(&p, "chapter", "40/II"),
        node(&p, "part", "40/I/1"),
        agency(&p, "Metadata"),
        node(&p2, "chapter", "40/III"),
    ] {
        store.put_item(&r).await.unwrap();
    }

    let chapters = store
        .query(&PartitionKey::agency(&p), Some("CHAPTER#"), None)
        .await
        .unwrap();
    assert_eq!(sort_keys(&chapters), vec!["CHAPTER#40/I", "CHAPTER#40/II"]);

    let all = store.query(&PartitionKey::agency(&p), None, None).await.unwrap();
    assert_eq!(
        sort_keys(&all),
        vec!["CHAPTER#40/I", "CHAPTER#40/II", "METADATA", "PART#40/I/1"]
    );
}

async fn query_prefix_matches_wildcards_literally(store: &dyn ItemStore, run: &str) {
    let p = format!("{run}-like");
    for path in ["a_b", "axb", "a%c", "abc"] {
        store.put_item(&node(&p, "part", path)).await.unwrap();
    }
    let pk = PartitionKey::agency(&p);

    let underscore = store.query(&pk, Some("PART#a_"), None).await.unwrap();
    assert_eq!(sort_keys(&underscore), vec!["PART#a_b"]);

    let percent = store.query(&pk, Some("PART#a%"), None).await.unwrap();
    assert_eq!(sort_keys(&percent), vec!["PART#a%c"]);
}

async fn query_limit_follows_byte_order(store: &dyn ItemStore, run: &str) {
    let p = format!("{run}-order");
    for path in ["a", "B", "9", "10"] {
        store.put_item(&node(&p, "chapter", path)).await.unwrap();
    }

    let rows = store
        .query(&PartitionKey::agency(&p), Some("CHAPTER#"), Some(3))
        .await
        .unwrap();
    // Byte order: digits, then upper case, then lower case.
    assert_eq!(sort_keys(&rows), vec!["CHAPTER#10", "CHAPTER#9", "CHAPTER#B"]);
}

async fn scan_filters_before_limit(store: &dyn ItemStore, run: &str) {
    // Each agency row is followed by two snapshot rows in key order, so a
    // limit applied ahead of the filter would come back short.
    for i in 0..3 {
        let slug = format!("{run}-{i}");
        store.put_item(&snapshot(&slug, "2025-07-01")).await.unwrap();
        store.put_item(&snapshot(&slug, "2025-08-01")).await.unwrap();
        store.put_item(&agency(&slug, "Agency")).await.unwrap();
    }
    let scoped = |entity_type: EntityType| ScanFilter {
        entity_type: Some(entity_type),
        pk_prefix: Some(format!("AGENCY#{run}-")),
    };

    let agencies = store.scan(&scoped(EntityType::Agency), Some(2)).await.unwrap();
    let pks: Vec<_> = agencies.iter().map(|r| r.pk().to_string()).collect();
    assert_eq!(pks, vec![format!("AGENCY#{run}-0"), format!("AGENCY#{run}-1")]);
    assert!(agencies.iter().all(|r| r.entity_type() == EntityType::Agency));

    let snapshots = store.scan(&scoped(EntityType::Snapshot), None).await.unwrap();
    assert_eq!(snapshots.len(), 6);
}

// -- In-memory backend -------------------------------------------------------

#[tokio::test]
async fn memory_put_overwrites_existing_key() {
    put_overwrites_existing_key(&MemoryStore::new(), &run_prefix("overwrite")).await;
}

#[tokio::test]
async fn memory_get_missing_key_is_none() {
    get_missing_key_is_none(&MemoryStore::new(), &run_prefix("missing")).await;
}

#[tokio::test]
async fn memory_query_isolates_partition_and_prefix() {
    query_isolates_partition_and_prefix(&MemoryStore::new(), &run_prefix("isolate")).await;
}

#[tokio::test]
async fn memory_query_prefix_matches_wildcards_literally() {
    query_prefix_matches_wildcards_literally(&MemoryStore::new(), &run_prefix("like")).await;
}

#[tokio::test]
async fn memory_query_limit_follows_byte_order() {
    query_limit_follows_byte_order(&MemoryStore::new(), &run_prefix("order")).await;
}

#[tokio::test]
async fn memory_scan_filters_before_limit() {
    scan_filters_before_limit(&MemoryStore::new(), &run_prefix("scan")).await;
}

// -- PostgreSQL backend ------------------------------------------------------

#[tokio::test]
async fn postgres_put_overwrites_existing_key() {
    let Some(store) = pg_store().await else { return };
    put_overwrites_existing_key(&store, &run_prefix("overwrite")).await;
}

#[tokio::test]
async fn postgres_get_missing_key_is_none() {
    let Some(store) = pg_store().await else { return };
    get_missing_key_is_none(&store, &run_prefix("missing")).await;
}

#[tokio::test]
async fn postgres_query_isolates_partition_and_prefix() {
    let Some(store) = pg_store().await else { return };
    query_isolates_partition_and_prefix(&store, &run_prefix("isolate")).await;
}

#[tokio::test]
async fn postgres_query_prefix_matches_wildcards_literally() {
    let Some(store) = pg_store().await else { return };
    query_prefix_matches_wildcards_literally(&store, &run_prefix("like")).await;
}

#[tokio::test]
async fn postgres_query_limit_follows_byte_order() {
    let Some(store) = pg_store().await else { return };
    query_limit_follows_byte_order(&store, &run_prefix("order")).await;
}

#[tokio::test]
async fn postgres_scan_filters_before_limit() {
    let Some(store) = pg_store().await else { return };
    scan_filters_before_limit(&store, &run_prefix("scan")).await;
}

#[tokio::test]
async fn postgres_undecodable_row_is_decode_error() {
    let Some(store) = pg_store().await else { return };
    let url = std::env::var("DATABASE_URL").unwrap();
    let pool = sqlx::PgPool::connect(&url).await.unwrap();
    let pk = PartitionKey::agency(&run_prefix("decode"));

    sqlx::query(
        "INSERT INTO items (pk, sk, entity_type, body) VALUES ($1, 'METADATA', 'widget', $2)",
    )
    .bind(pk.as_str())
    .bind(serde_json::json!({"entity_type": "widget", "pk": pk.as_str(), "sk": "METADATA"}))
    .execute(&pool)
    .await
    .unwrap();

    let err = store
        .get_item(&ItemKey::new(pk, SortKey::metadata()))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Decode { .. }));
}
