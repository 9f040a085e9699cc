//! Food catalog router.

use crate::delete::scope_to_id;
use crate::error::ScoutCoreError;
use crate::purifier::Purifier;
use log::{info, warn};
use scout_rs_format::{NegotiatedBody, Record, ResourceKind, negotiate};
use scout_rs_store::{DeleteSummary, FoodStore, Query};
use std::sync::Arc;

/// Routes food catalog requests. Lists always go to storage.
pub struct FoodRouter {
    store: Arc<dyn FoodStore>,
    purifier: Arc<dyn Purifier>,
}

impl FoodRouter {
    pub fn new(store: Arc<dyn FoodStore>, purifier: Arc<dyn Purifier>) -> Self {
        Self { store, purifier }
    }

    /// List entries and render them for the given `Accept` header.
    pub async fn list(
        &self,
        query: Query,
        accept: Option<&str>,
    ) -> Result<NegotiatedBody, ScoutCoreError> {
        let records = self
            .store
            .list(&query)
            .await
            .inspect_err(|err| warn!("food list failed: {err}"))?
            .unwrap_or_default();
        Ok(negotiate(accept, ResourceKind::Food, &records))
    }

    /// Visible quick picks in display order.
    pub async fn quickpicks(&self) -> Result<Vec<Record>, ScoutCoreError> {
        let records = self
            .store
            .list_quickpicks()
            .await
            .inspect_err(|err| warn!("food quickpicks failed: {err}"))?;
        Ok(records.unwrap_or_default())
    }

    /// Regular food entries.
    pub async fn regular(&self) -> Result<Vec<Record>, ScoutCoreError> {
        let records = self
            .store
            .list_regular()
            .await
            .inspect_err(|err| warn!("food regular list failed: {err}"))?;
        Ok(records.unwrap_or_default())
    }

    pub async fn create(&self, mut record: Record) -> Result<Record, ScoutCoreError> {
        self.purifier.purify_object(&mut record);
        let created = self
            .store
            .create(record)
            .await
            .inspect_err(|err| warn!("food create failed: {err}"))?;
        info!("food created (id={:?})", created.id());
        Ok(created)
    }

    /// Insert or replace by `_id`.
    pub async fn save(&self, mut record: Record) -> Result<Record, ScoutCoreError> {
        self.purifier.purify_object(&mut record);
        let saved = self
            .store
            .save(record)
            .await
            .inspect_err(|err| warn!("food save failed: {err}"))?;
        info!("food saved (id={:?})", saved.id());
        Ok(saved)
    }

    pub async fn delete_by_id(
        &self,
        id: &str,
        mut query: Query,
    ) -> Result<DeleteSummary, ScoutCoreError> {
        scope_to_id(&mut query, id);
        self.delete_by_query(query).await
    }

    pub async fn delete_by_query(&self, query: Query) -> Result<DeleteSummary, ScoutCoreError> {
        let summary = self
            .store
            .remove(&query)
            .await
            .inspect_err(|err| warn!("food delete failed: {err}"))?;
        info!("food records deleted (count={})", summary.deleted_count);
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::FoodRouter;
    use crate::purifier::TagStripPurifier;
    use pretty_assertions::assert_eq;
    use scout_rs_format::{MediaType, Record};
    use scout_rs_store::Query;
    use scout_rs_test_utils::StubFoodStore;
    use serde_json::json;
    use std::sync::Arc;

    fn router(store: Arc<StubFoodStore>) -> FoodRouter {
        FoodRouter::new(store, Arc::new(TagStripPurifier::new().expect("purifier")))
    }

    #[tokio::test]
    async fn missing_lists_become_empty() {
        let router = router(Arc::new(StubFoodStore::empty()));
        assert!(router.quickpicks().await.expect("quickpicks").is_empty());
        assert!(router.regular().await.expect("regular").is_empty());
        let body = router.list(Query::new(), None).await.expect("list");
        assert_eq!(body.body, "[]");
    }

    #[tokio::test]
    async fn list_negotiates_tabular_output() {
        let store = Arc::new(StubFoodStore::with_records(vec![
            Record::try_from(json!({ "_id": "f1", "name": "Apple", "carbs": 14 }))
                .expect("object"),
        ]));
        let body = router(store)
            .list(Query::new(), Some("text/csv"))
            .await
            .expect("list");
        assert_eq!(body.media_type, MediaType::Csv);
        let lines: Vec<_> = body.body.split("\r\n").collect();
        assert_eq!(
            lines[0],
            "_id,name,category,subcategory,portions,created_at,carbs,protein,fat,energy"
        );
        assert_eq!(lines[1], r#""f1","Apple","","","\"\"","",14,"","","""#);
    }

    #[tokio::test]
    async fn create_purifies_before_storing() {
        let store = Arc::new(StubFoodStore::empty());
        let created = router(store.clone())
            .create(Record::try_from(json!({ "name": "<b>Toast</b>" })).expect("object"))
            .await
            .expect("create");
        assert_eq!(created.get("name"), Some(&json!("Toast")));
        assert_eq!(store.created()[0].get("name"), Some(&json!("Toast")));
    }

    #[tokio::test]
    async fn wildcard_delete_drops_id_filter() {
        let store = Arc::new(StubFoodStore::empty());
        router(store.clone())
            .delete_by_id("*", Query::new())
            .await
            .expect("delete");
        let calls = store.remove_calls();
        assert!(calls[0].find().is_some_and(|find| find.is_empty()));
    }
}
