//! Food catalog collection on top of the document store.

use crate::document::DocumentCollection;
use crate::error::StoreError;
use crate::filter::Filter;
use crate::query::{DeleteSummary, Query};
use crate::store::FoodStore;
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use scout_rs_format::{Record, is_truthy};
use serde_json::Value;
use std::cmp::Ordering;
use std::path::Path;
use uuid::Uuid;

/// Food store backed by a [`DocumentCollection`].
#[derive(Debug)]
pub struct DocumentFoodStore {
    collection: DocumentCollection,
}

impl DocumentFoodStore {
    pub const COLLECTION: &'static str = "food";

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

    fn entries_of_type(&self, kind: &str) -> Vec<Record> {
        self.collection
            .find(&Filter::all())
            .into_iter()
            .filter(|record| record.get("type").and_then(Value::as_str) == Some(kind))
            .collect()
    }
}

#[async_trait]
impl FoodStore for DocumentFoodStore {
    async fn list(&self, query: &Query) -> Result<Option<Vec<Record>>, StoreError> {
        let filter = Filter::parse(query.find())?;
        let mut records = self.collection.find(&filter);
        if let Some(count) = query.count() {
            records.truncate(usize::try_from(count).unwrap_or(usize::MAX));
        }
        Ok(Some(records))
    }

    async fn list_quickpicks(&self) -> Result<Option<Vec<Record>>, StoreError> {
        let mut records: Vec<Record> = self
            .entries_of_type("quickpick")
            .into_iter()
            .filter(|record| !is_hidden(record))
            .collect();
        records.sort_by(|a, b| position(a).partial_cmp(&position(b)).unwrap_or(Ordering::Equal));
        Ok(Some(records))
    }

    async fn list_regular(&self) -> Result<Option<Vec<Record>>, StoreError> {
        let mut records = self.entries_of_type("food");
        records.sort_by(|a, b| {
            text_field(a, "category")
                .cmp(&text_field(b, "category"))
                .then_with(|| text_field(a, "subcategory").cmp(&text_field(b, "subcategory")))
                .then_with(|| text_field(a, "name").cmp(&text_field(b, "name")))
        });
        Ok(Some(records))
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
        self.collection.insert(record)
    }

    async fn save(&self, mut record: Record) -> Result<Record, StoreError> {
        if record.id().is_none() {
            record.insert("_id", Uuid::new_v4().simple().to_string());
        }
        self.collection.upsert(record)
    }

    async fn remove(&self, query: &Query) -> Result<DeleteSummary, StoreError> {
        let filter = Filter::parse(query.find())?;
        let removed = self.collection.remove_matching(&filter)?;
        Ok(DeleteSummary::deleted(removed))
    }
}

/// `hidden` is stored as a boolean or as the strings "true"/"false".
fn is_hidden(record: &Record) -> bool {
    match record.get("hidden") {
        Some(Value::String(text)) => text == "true",
        Some(value) => is_truthy(value),
        None => false,
    }
}

fn position(record: &Record) -> f64 {
    match record.get("position") {
        Some(Value::Number(number)) => number.as_f64().unwrap_or(f64::MAX),
        Some(Value::String(text)) => text.parse().unwrap_or(f64::MAX),
        _ => f64::MAX,
    }
}

fn text_field(record: &Record, field: &str) -> String {
    record
        .get(field)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::DocumentFoodStore;
    use crate::{FoodStore, Query};
    use pretty_assertions::assert_eq;
    use scout_rs_format::Record;
    use serde_json::json;

    fn record(value: serde_json::Value) -> Record {
        Record::try_from(value).expect("object")
    }

    async fn seeded() -> DocumentFoodStore {
        let store = DocumentFoodStore::in_memory();
        for value in [
            json!({ "_id": "q2", "type": "quickpick", "name": "Lunch", "position": 2, "hidden": "false" }),
            json!({ "_id": "q1", "type": "quickpick", "name": "Breakfast", "position": 1, "hidden": false }),
            json!({ "_id": "q3", "type": "quickpick", "name": "Secret", "position": 0, "hidden": "true" }),
            json!({ "_id": "f2", "type": "food", "category": "Fruit", "name": "Pear" }),
            json!({ "_id": "f1", "type": "food", "category": "Fruit", "name": "Apple" }),
        ] {
            store.create(record(value)).await.expect("create");
        }
        store
    }

    #[tokio::test]
    async fn quickpicks_skip_hidden_and_follow_position() {
        let store = seeded().await;
        let picks = store.list_quickpicks().await.expect("list").expect("some");
        let ids: Vec<_> = picks.iter().filter_map(|r| r.id()).collect();
        assert_eq!(ids, vec!["q1", "q2"]);
    }

    #[tokio::test]
    async fn regular_entries_sort_by_name_within_category() {
        let store = seeded().await;
        let foods = store.list_regular().await.expect("list").expect("some");
        let ids: Vec<_> = foods.iter().filter_map(|r| r.id()).collect();
        assert_eq!(ids, vec!["f1", "f2"]);
    }

    #[tokio::test]
    async fn save_replaces_by_id() {
        let store = seeded().await;
        store
            .save(record(json!({ "_id": "f1", "type": "food", "name": "Green apple" })))
            .await
            .expect("save");
        let listed = store
            .list(&Query::from_pairs([("find[_id]", "f1")]))
            .await
            .expect("list")
            .expect("some");
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].get("name"), Some(&json!("Green apple")));
    }
}
