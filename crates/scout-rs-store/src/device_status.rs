//! Device status collection on top of the document store.

use crate::document::DocumentCollection;
use crate::error::StoreError;
use crate::filter::Filter;
use crate::query::{DeleteSummary, Query};
use crate::store::DeviceStatusStore;
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use log::debug;
use scout_rs_format::Record;
use std::cmp::Ordering;
use std::path::Path;
use uuid::Uuid;

/// Device status store backed by a [`DocumentCollection`].
#[derive(Debug)]
pub struct DocumentDeviceStatusStore {
    collection: DocumentCollection,
}

impl DocumentDeviceStatusStore {
    pub const COLLECTION: &'static str = "devicestatus";

    pub fn in_memory() -> Self {
        Self {
            collection: DocumentCollection::in_memory(Self::COLLECTION),
        }
    }

    /// Open the JSONL-backed collection under `root`.
    pub fn open(root: impl AsRef<Path>) -> Result<Self, StoreError> {
        Ok(Self {
            collection: DocumentCollection::open(root, Self::COLLECTION)?,
        })
    }
}

#[async_trait]
impl DeviceStatusStore for DocumentDeviceStatusStore {
    async fn list(&self, query: &Query) -> Result<Vec<Record>, StoreError> {
        let filter = Filter::parse(query.find())?;
        let mut records = self.collection.find(&filter);
        records.sort_by(newest_first);
        if let Some(count) = query.count() {
            records.truncate(usize::try_from(count).unwrap_or(usize::MAX));
        }
        debug!(
            "listed device status (filtered={}, returned={})",
            !filter.is_empty(),
            records.len()
        );
        Ok(records)
    }

    async fn create(&self, mut record: Record) -> Result<Record, StoreError> {
        if record.id().is_none() {
            record.insert("_id", Uuid::new_v4().simple().to_string());
        }
        if record.created_at().is_none() {
            record.insert(
                "created_at",
                Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            );
        }
        if record.mills().is_none() {
            let mills = record
                .created_at()
                .and_then(|value| value.as_str())
                .and_then(|text| DateTime::parse_from_rfc3339(text).ok())
                .map(|parsed| parsed.timestamp_millis());
            if let Some(mills) = mills {
                record.insert("mills", mills);
            }
        }
        self.collection.insert(record)
    }

    async fn remove(&self, query: &Query) -> Result<DeleteSummary, StoreError> {
        let filter = Filter::parse(query.find())?;
        let removed = self.collection.remove_matching(&filter)?;
        Ok(DeleteSummary::deleted(removed))
    }
}

/// Descending by `mills`, then by `created_at` text; undated records last.
fn newest_first(a: &Record, b: &Record) -> Ordering {
    match (a.mills(), b.mills()) {
        (Some(a), Some(b)) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => {
            let created = |record: &Record| {
                record
                    .created_at()
                    .and_then(|value| value.as_str())
                    .map(str::to_string)
            };
            match (created(a), created(b)) {
                (Some(a), Some(b)) => b.cmp(&a),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::DocumentDeviceStatusStore;
    use crate::{DeviceStatusStore, Query};
    use pretty_assertions::assert_eq;
    use scout_rs_format::Record;
    use serde_json::json;

    fn record(value: serde_json::Value) -> Record {
        Record::try_from(value).expect("object")
    }

    #[tokio::test]
    async fn create_fills_identity_and_timestamps() {
        let store = DocumentDeviceStatusStore::in_memory();
        let created = store
            .create(record(json!({
                "device": "openaps://rig",
                "created_at": "2024-01-01T00:00:00.000Z"
            })))
            .await
            .expect("create");

        assert!(created.id().is_some());
        assert_eq!(created.mills(), Some(1704067200000.0));
    }

    #[tokio::test]
    async fn list_sorts_newest_first_and_limits() {
        let store = DocumentDeviceStatusStore::in_memory();
        for mills in [1, 3, 2] {
            store
                .create(record(json!({ "_id": format!("id{mills}"), "mills": mills })))
                .await
                .expect("create");
        }

        let listed = store
            .list(&Query::from_pairs([("count", "2")]))
            .await
            .expect("list");

        let ids: Vec<_> = listed.iter().filter_map(|r| r.id()).collect();
        assert_eq!(ids, vec!["id3", "id2"]);
    }

    #[tokio::test]
    async fn remove_ignores_count() {
        let store = DocumentDeviceStatusStore::in_memory();
        for idx in 0..15 {
            store
                .create(record(json!({ "_id": format!("id{idx}"), "device": "pump" })))
                .await
                .expect("create");
        }

        let summary = store
            .remove(&Query::from_pairs([("count", "10"), ("find[device]", "pump")]))
            .await
            .expect("remove");

        assert_eq!(summary.deleted_count, 15);
    }

    #[tokio::test]
    async fn invalid_filters_surface_as_errors() {
        let store = DocumentDeviceStatusStore::in_memory();
        let result = store
            .list(&Query::from_pairs([("find[mills][$regex]", "1")]))
            .await;
        assert!(result.is_err());
    }
}
