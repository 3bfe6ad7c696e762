//! # ecfr-store: Composite-Key Item Store
//!
//! The only resource shared between ingestion and querying. Rows are
//! [`Record`]s addressed by an [`ItemKey`] (partition + sort key). The
//! [`ItemStore`] trait exposes exactly the access paths the rest of the
//! stack relies on:
//!
//! - `put_item`: upsert by composite key, last writer wins.
//! - `get_item`: exact-key lookup.
//! - `query`: all rows of one partition, optionally restricted to a sort-key
//!   prefix, in sort-key order.
//! - `scan`: every row matching a [`ScanFilter`], in backend order.
//!
//! There are no multi-item transactions and no deletes.
//!
//! ## Backends
//!
//! - [`MemoryStore`]: `BTreeMap` behind a `parking_lot::RwLock`. Used in
//!   tests and when no database is configured.
//! - [`PgStore`]: one PostgreSQL `items` table keyed on `(pk, sk)`.
//!
//! [`connect_from_env`] picks between them based on `DATABASE_URL`.

pub mod error;
pub mod memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use ecfr_core::{EntityType, ItemKey, PartitionKey, Record};

pub use error::StoreError;
pub use memory::{MemoryStore, StoreStats, StoreStatsSnapshot};
pub use postgres::PgStore;

/// Row filter for [`ItemStore::scan`]. Empty filter matches every row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanFilter {
    pub entity_type: Option<EntityType>,
    pub pk_prefix: Option<String>,
}

impl ScanFilter {
    /// Match every row.
    pub fn all() -> Self {
        Self::default()
    }

    /// Match rows of one entity type.
    pub fn entity(entity_type: EntityType) -> Self {
        Self {
            entity_type: Some(entity_type),
            pk_prefix: None,
        }
    }

    /// Whether `record` passes this filter.
    pub fn matches(&self, record: &Record) -> bool {
        if let Some(t) = self.entity_type {
            if record.entity_type() != t {
                return false;
            }
        }
        if let Some(prefix) = &self.pk_prefix {
            if !record.pk().as_str().starts_with(prefix.as_str()) {
                return false;
            }
        }
        true
    }
}

/// Key-value store operations over [`Record`]s.
///
/// Implementations must apply scan filters before the limit, so a scan
/// never returns more than `limit` rows and never fewer matching rows than
/// exist up to that bound.
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Write `record` under its own key, replacing any existing row.
    async fn put_item(&self, record: &Record) -> Result<(), StoreError>;

    /// Exact-key lookup.
    async fn get_item(&self, key: &ItemKey) -> Result<Option<Record>, StoreError>;

    /// Rows under `pk` whose sort key begins with `sk_prefix` (all rows when
    /// `None`), ordered by sort key, at most `limit`.
    async fn query(
        &self,
        pk: &PartitionKey,
        sk_prefix: Option<&str>,
        limit: Option<usize>,
    ) -> Result<Vec<Record>, StoreError>;

    /// Rows matching `filter`, at most `limit`, in `(pk, sk)` order.
    async fn scan(&self, filter: &ScanFilter, limit: Option<usize>)
        -> Result<Vec<Record>, StoreError>;

    /// Verify the backend is reachable.
    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }

    /// Short backend name for logs and readiness output.
    fn backend(&self) -> &'static str;
}

/// Open the store configured by the environment.
///
/// `DATABASE_URL` set: connect to PostgreSQL and apply migrations.
/// Unset: fall back to an in-memory store whose contents are lost on exit.
pub async fn connect_from_env() -> Result<Arc<dyn ItemStore>, StoreError> {
    match std::env::var("DATABASE_URL") {
        Ok(url) if !url.trim().is_empty() => {
            let store = PgStore::connect(&url).await?;
            Ok(Arc::new(store))
        }
        _ => {
            tracing::warn!(
                "DATABASE_URL not set, using in-memory store. \
                 Ingested data will not survive restarts."
            );
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecfr_core::{SortKey, TitleRecord, UpdatedDate};

    fn title(n: u32) -> Record {
        Record::from(TitleRecord {
            pk: PartitionKey::title(n),
            sk: SortKey::metadata(),
            number: n,
            name: format!("Title {n}"),
            latest_amended_on: None,
            latest_issue_date: None,
            up_to_date_as_of: None,
            reserved: false,
            updated_date: UpdatedDate::parse("2025-08-01").unwrap(),
            checksum: String::new(),
        })
    }

    #[test]
    fn empty_filter_matches_everything() {
        assert!(ScanFilter::all().matches(&title(1)));
    }

    #[test]
    fn entity_filter_rejects_other_types() {
        assert!(ScanFilter::entity(EntityType::Title).matches(&title(1)));
        assert!(!ScanFilter::entity(EntityType::Agency).matches(&title(1)));
    }

    #[test]
    fn pk_prefix_filter() {
        let f = ScanFilter {
            entity_type: None,
            pk_prefix: Some("TITLE#4".into()),
        };
        assert!(f.matches(&title(40)));
        assert!(!f.matches(&title(5)));
    }
}
