//! Versioned in-process snapshot of recent device status records.
//!
//! Readers clone an `Arc` under a short read lock and never observe a partial
//! update; refreshes build the new record list first and swap it in whole.

use async_trait::async_trait;
use log::{debug, info};
use parking_lot::RwLock;
use scout_rs_format::Record;
use scout_rs_store::{DeviceStatusStore, Query, StoreError};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Immutable view of the cache at one version.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub version: u64,
    pub records: Arc<Vec<Record>>,
}

impl Snapshot {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Source of device status snapshots for the list route.
#[async_trait]
pub trait CacheSnapshotProvider: Send + Sync {
    /// Current snapshot, or `None` when nothing has been loaded yet.
    fn snapshot(&self) -> Option<Snapshot>;

    /// Reload from the backing store. Providers without a store do nothing.
    async fn refresh(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Snapshot cache filled from a [`DeviceStatusStore`].
pub struct DeviceStatusCache {
    store: Arc<dyn DeviceStatusStore>,
    max_records: usize,
    current: RwLock<Option<Arc<Vec<Record>>>>,
    version: AtomicU64,
}

impl DeviceStatusCache {
    pub fn new(store: Arc<dyn DeviceStatusStore>, max_records: usize) -> Self {
        Self {
            store,
            max_records,
            current: RwLock::new(None),
            version: AtomicU64::new(0),
        }
    }

    /// Swap in a new record list and bump the version.
    pub fn replace(&self, records: Vec<Record>) -> u64 {
        let records = Arc::new(records);
        let mut current = self.current.write();
        *current = Some(records);
        self.version.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn max_records(&self) -> usize {
        self.max_records
    }
}

#[async_trait]
impl CacheSnapshotProvider for DeviceStatusCache {
    fn snapshot(&self) -> Option<Snapshot> {
        let current = self.current.read();
        current.as_ref().map(|records| Snapshot {
            version: self.version.load(Ordering::SeqCst),
            records: Arc::clone(records),
        })
    }

    async fn refresh(&self) -> Result<(), StoreError> {
        let mut query = Query::new();
        query.insert("count", self.max_records as u64);
        let records = self.store.list(&query).await?;
        let loaded = records.len();
        let version = self.replace(records);
        info!("device status cache refreshed (records={loaded}, version={version})");
        Ok(())
    }
}

/// Fixed snapshot without a backing store.
#[derive(Debug, Clone)]
pub struct StaticSnapshot {
    records: Arc<Vec<Record>>,
}

impl StaticSnapshot {
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            records: Arc::new(records),
        }
    }
}

#[async_trait]
impl CacheSnapshotProvider for StaticSnapshot {
    fn snapshot(&self) -> Option<Snapshot> {
        debug!("serving static snapshot (records={})", self.records.len());
        Some(Snapshot {
            version: 0,
            records: Arc::clone(&self.records),
        })
    }
}
