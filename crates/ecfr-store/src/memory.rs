//! # In-Memory Store
//!
//! Thread-safe, cloneable [`ItemStore`] over a `BTreeMap<ItemKey, Record>`.
//! Clones share the same map.
//!
//! All operations are synchronous under a `parking_lot::RwLock`; the lock is
//! never held across an `.await`. Because the map is ordered by
//! `(pk, sk)`, partition queries come out in sort-key order without a
//! separate sort.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use ecfr_core::{ItemKey, PartitionKey, Record};
use parking_lot::RwLock;
use serde::Serialize;

use crate::{ItemStore, ScanFilter, StoreError};

/// Per-operation counters, shared by every clone of a [`MemoryStore`].
#[derive(Debug, Default)]
pub struct StoreStats {
    puts: AtomicU64,
    gets: AtomicU64,
    queries: AtomicU64,
    scans: AtomicU64,
}

/// Point-in-time copy of [`StoreStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreStatsSnapshot {
    pub puts: u64,
    pub gets: u64,
    pub queries: u64,
    pub scans: u64,
}

impl StoreStatsSnapshot {
    /// Total operations of any kind.
    pub fn total(&self) -> u64 {
        self.puts + self.gets + self.queries + self.scans
    }
}

impl StoreStats {
    pub fn snapshot(&self) -> StoreStatsSnapshot {
        StoreStatsSnapshot {
            puts: self.puts.load(Ordering::Relaxed),
            gets: self.gets.load(Ordering::Relaxed),
            queries: self.queries.load(Ordering::Relaxed),
            scans: self.scans.load(Ordering::Relaxed),
        }
    }
}

/// In-memory [`ItemStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: Arc<RwLock<BTreeMap<ItemKey, Record>>>,
    stats: Arc<StoreStats>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Operation counters for this store and all its clones.
    pub fn stats(&self) -> StoreStatsSnapshot {
        self.stats.snapshot()
    }

    /// Number of rows held.
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Whether the store holds no rows.
    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }

    /// Every key currently held, in key order. Does not count as a scan.
    pub fn keys(&self) -> Vec<ItemKey> {
        self.data.read().keys().cloned().collect()
    }
}

#[async_trait]
impl ItemStore for MemoryStore {
    async fn put_item(&self, record: &Record) -> Result<(), StoreError> {
        self.stats.puts.fetch_add(1, Ordering::Relaxed);
        self.data.write().insert(record.key(), record.clone());
        Ok(())
    }

    async fn get_item(&self, key: &ItemKey) -> Result<Option<Record>, StoreError> {
        self.stats.gets.fetch_add(1, Ordering::Relaxed);
        Ok(self.data.read().get(key).cloned())
    }

    async fn query(
        &self,
        pk: &PartitionKey,
        sk_prefix: Option<&str>,
        limit: Option<usize>,
    ) -> Result<Vec<Record>, StoreError> {
        self.stats.queries.fetch_add(1, Ordering::Relaxed);
        let prefix = sk_prefix.unwrap_or("");
        let guard = self.data.read();
        Ok(guard
            .iter()
            .skip_while(|(k, _)| k.pk < *pk)
            .take_while(|(k, _)| k.pk == *pk)
            .filter(|(k, _)| k.sk.begins_with(prefix))
            .take(limit.unwrap_or(usize::MAX))
            .map(|(_, v)| v.clone())
            .collect())
    }

    async fn scan(
        &self,
        filter: &ScanFilter,
        limit: Option<usize>,
    ) -> Result<Vec<Record>, StoreError> {
        self.stats.scans.fetch_add(1, Ordering::Relaxed);
        let guard = self.data.read();
        Ok(guard
            .values()
            .filter(|r| filter.matches(r))
            .take(limit.unwrap_or(usize::MAX))
            .cloned()
            .collect())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
