//! Device status query router.

use crate::cache::CacheSnapshotProvider;
use crate::delete::scope_to_id;
use crate::error::ScoutCoreError;
use crate::purifier::Purifier;
use log::{debug, info, warn};
use scout_rs_format::{NegotiatedBody, Record, ResourceKind, negotiate, normalize_dates};
use scout_rs_store::{DEFAULT_COUNT, DeleteSummary, DeviceStatusStore, Query};
use std::cmp::Ordering;
use std::sync::Arc;

/// Counts at or above this are exports and always go to storage.
pub const CACHE_COUNT_LIMIT: u64 = 10_000;

/// Whether a list request may be answered from a snapshot of `cached` records.
///
/// The query must carry nothing but `count`, the count must be numeric and
/// below [`CACHE_COUNT_LIMIT`], and the snapshot must hold at least that many
/// records.
pub fn can_serve_from_cache(cached: usize, query: &Query) -> bool {
    let Some(count) = query.count() else {
        return false;
    };
    query.len() == 1 && count < CACHE_COUNT_LIMIT && cached as u64 >= count
}

/// Routes device status list, create, and delete requests.
pub struct DeviceStatusRouter {
    store: Arc<dyn DeviceStatusStore>,
    cache: Option<Arc<dyn CacheSnapshotProvider>>,
    purifier: Arc<dyn Purifier>,
    de_normalize_dates: bool,
}

impl DeviceStatusRouter {
    pub fn new(store: Arc<dyn DeviceStatusStore>, purifier: Arc<dyn Purifier>) -> Self {
        Self {
            store,
            cache: None,
            purifier,
            de_normalize_dates: false,
        }
    }

    /// Serve small unfiltered lists from `cache`.
    pub fn with_cache(mut self, cache: Arc<dyn CacheSnapshotProvider>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Rewrite `created_at` into each record's `utcOffset` on output.
    pub fn with_date_denormalization(mut self, enabled: bool) -> Self {
        self.de_normalize_dates = enabled;
        self
    }

    /// List records and render them for the given `Accept` header.
    pub async fn list(
        &self,
        mut query: Query,
        accept: Option<&str>,
    ) -> Result<NegotiatedBody, ScoutCoreError> {
        query.ensure_count(DEFAULT_COUNT);
        let records = match self.cached_page(&query) {
            Some(records) => records,
            None => self.store.list(&query).await.inspect_err(|err| {
                warn!("device status list failed: {err}");
            })?,
        };
        let records = normalize_dates(records, self.de_normalize_dates);
        Ok(negotiate(accept, ResourceKind::DeviceStatus, &records))
    }

    fn cached_page(&self, query: &Query) -> Option<Vec<Record>> {
        let snapshot = self.cache.as_ref()?.snapshot()?;
        if !can_serve_from_cache(snapshot.len(), query) {
            debug!(
                "device status list bypasses cache (cached={}, params={}, count={:?})",
                snapshot.len(),
                query.len(),
                query.count()
            );
            return None;
        }
        let count = usize::try_from(query.count()?).ok()?;
        let mut records = snapshot.records.as_ref().clone();
        records.sort_by(newest_mills_first);
        records.truncate(count);
        debug!(
            "device status list served from cache (version={}, returned={})",
            snapshot.version,
            records.len()
        );
        Some(records)
    }

    /// Purify and store a new record, returning what storage kept.
    pub async fn create(&self, mut record: Record) -> Result<Record, ScoutCoreError> {
        self.purifier.purify_object(&mut record);
        let created = self.store.create(record).await.inspect_err(|err| {
            warn!("device status create failed: {err}");
        })?;
        self.refresh_cache().await;
        Ok(created)
    }

    /// Delete the record with `id`, or every matching record when `id` is `*`.
    pub async fn delete_by_id(
        &self,
        id: &str,
        mut query: Query,
    ) -> Result<DeleteSummary, ScoutCoreError> {
        scope_to_id(&mut query, id);
        self.delete_by_query(query).await
    }

    /// Delete every record matching the query's `find`.
    ///
    /// `count` is defaulted like the list route but storage does not treat it
    /// as a limit.
    pub async fn delete_by_query(&self, mut query: Query) -> Result<DeleteSummary, ScoutCoreError> {
        query.ensure_count(DEFAULT_COUNT);
        info!(
            "deleting device status records (query={})",
            serde_json::to_string(&query).unwrap_or_default()
        );
        let summary = self.store.remove(&query).await.inspect_err(|err| {
            warn!("device status delete failed: {err}");
        })?;
        info!(
            "device status records deleted (count={})",
            summary.deleted_count
        );
        self.refresh_cache().await;
        Ok(summary)
    }

    async fn refresh_cache(&self) {
        if let Some(cache) = &self.cache
            && let Err(err) = cache.refresh().await
        {
            warn!("device status cache refresh failed: {err}");
        }
    }
}

/// Descending `mills`; records without `mills` keep their order at the end.
fn newest_mills_first(a: &Record, b: &Record) -> Ordering {
    match (a.mills(), b.mills()) {
        (Some(a), Some(b)) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::{DeviceStatusRouter, can_serve_from_cache};
    use crate::cache::StaticSnapshot;
    use crate::purifier::NoopPurifier;
    use pretty_assertions::assert_eq;
    use scout_rs_format::{MediaType, Record};
    use scout_rs_store::Query;
    use scout_rs_test_utils::StubDeviceStatusStore;
    use serde_json::{Value, json};
    use std::sync::Arc;

    fn snapshot_records(n: usize) -> Vec<Record> {
        (0..n)
            .map(|idx| {
                Record::try_from(json!({ "_id": format!("cached{idx}"), "mills": idx }))
                    .expect("object")
            })
            .collect()
    }

    fn router(store: Arc<StubDeviceStatusStore>, cached: usize) -> DeviceStatusRouter {
        DeviceStatusRouter::new(store, Arc::new(NoopPurifier))
            .with_cache(Arc::new(StaticSnapshot::new(snapshot_records(cached))))
    }

    #[test]
    fn cache_eligibility_boundaries() {
        let count_only = Query::from_pairs([("count", "10")]);
        assert!(can_serve_from_cache(15, &count_only));
        assert!(can_serve_from_cache(10, &count_only));
        assert!(!can_serve_from_cache(9, &count_only));
        assert!(!can_serve_from_cache(
            15,
            &Query::from_pairs([("count", "10"), ("find[device]", "x")])
        ));
        assert!(!can_serve_from_cache(
            20_000,
            &Query::from_pairs([("count", "20000")])
        ));
        assert!(!can_serve_from_cache(
            15_000,
            &Query::from_pairs([("count", "10000")])
        ));
        assert!(!can_serve_from_cache(15, &Query::from_pairs([("count", "ten")])));
    }

    #[tokio::test]
    async fn default_count_is_served_from_cache_newest_first() {
        let store = Arc::new(StubDeviceStatusStore::new());
        let body = router(store.clone(), 15)
            .list(Query::new(), None)
            .await
            .expect("list");

        assert!(store.list_calls().is_empty());
        assert_eq!(body.media_type, MediaType::Json);
        let listed: Vec<Value> = serde_json::from_str(&body.body).expect("json");
        assert_eq!(listed.len(), 10);
        assert_eq!(listed[0]["_id"], json!("cached14"));
        assert_eq!(listed[9]["_id"], json!("cached5"));
    }

    #[tokio::test]
    async fn filtered_and_large_requests_use_storage() {
        let store = Arc::new(StubDeviceStatusStore::new());
        let router = router(store.clone(), 15);

        router
            .list(
                Query::from_pairs([("count", "10"), ("find[device]", "x")]),
                None,
            )
            .await
            .expect("list");
        router
            .list(Query::from_pairs([("count", "20000")]), None)
            .await
            .expect("list");

        let calls = store.list_calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].count(), Some(20000));
    }

    #[tokio::test]
    async fn storage_receives_default_count() {
        let store = Arc::new(StubDeviceStatusStore::new());
        DeviceStatusRouter::new(store.clone(), Arc::new(NoopPurifier))
            .list(Query::new(), Some("text/csv"))
            .await
            .expect("list");
        assert_eq!(store.list_calls()[0].count(), Some(10));
    }

    #[tokio::test]
    async fn dates_are_denormalized_when_enabled() {
        let store = Arc::new(StubDeviceStatusStore::with_records(vec![
            Record::try_from(json!({
                "_id": "a",
                "created_at": "2024-03-01T12:00:00.000Z",
                "utcOffset": 60
            }))
            .expect("object"),
        ]));
        let body = DeviceStatusRouter::new(store, Arc::new(NoopPurifier))
            .with_date_denormalization(true)
            .list(Query::from_pairs([("count", "1"), ("find[_id]", "a")]), None)
            .await
            .expect("list");
        let listed: Vec<Value> = serde_json::from_str(&body.body).expect("json");
        assert_eq!(listed[0]["created_at"], json!("2024-03-01T13:00:00.000+01:00"));
        assert!(listed[0].get("utcOffset").is_none());
    }

    #[tokio::test]
    async fn delete_by_id_scopes_the_query() {
        let store = Arc::new(StubDeviceStatusStore::new());
        let router = DeviceStatusRouter::new(store.clone(), Arc::new(NoopPurifier));

        router
            .delete_by_id("abc", Query::new())
            .await
            .expect("delete");
        router
            .delete_by_id("*", Query::from_pairs([("find[device]", "pump")]))
            .await
            .expect("delete");

        let calls = store.remove_calls();
        assert_eq!(
            calls[0].find().and_then(|find| find.get("_id")),
            Some(&json!("abc"))
        );
        assert!(calls[1].find().is_some_and(|find| !find.contains_key("_id")));
        assert_eq!(calls[1].count(), Some(10));
    }
}
