//! Storage interfaces used by the API routers.

use crate::error::StoreError;
use crate::query::{DeleteSummary, Query};
use async_trait::async_trait;
use scout_rs_format::Record;

#[async_trait]
/// Device status storage.
pub trait DeviceStatusStore: Send + Sync {
    /// List records matching the query, newest first, limited by `count`.
    async fn list(&self, query: &Query) -> Result<Vec<Record>, StoreError>;

    /// Persist a new record and return it as stored.
    async fn create(&self, record: Record) -> Result<Record, StoreError>;

    /// Remove every record matching the query's `find` filter.
    ///
    /// `count` is not a deletion limit and is ignored.
    async fn remove(&self, query: &Query) -> Result<DeleteSummary, StoreError>;
}

#[async_trait]
/// Food catalog storage.
///
/// Listing operations may report "no list" with `None`; callers treat that as
/// an empty result.
pub trait FoodStore: Send + Sync {
    /// List catalog entries matching the query.
    async fn list(&self, query: &Query) -> Result<Option<Vec<Record>>, StoreError>;

    /// Visible quick-pick entries in display order.
    async fn list_quickpicks(&self) -> Result<Option<Vec<Record>>, StoreError>;

    /// Regular food entries.
    async fn list_regular(&self) -> Result<Option<Vec<Record>>, StoreError>;

    /// Persist a new entry and return it as stored.
    async fn create(&self, record: Record) -> Result<Record, StoreError>;

    /// Insert or replace an entry by `_id`.
    async fn save(&self, record: Record) -> Result<Record, StoreError>;

    /// Remove every entry matching the query's `find` filter.
    async fn remove(&self, query: &Query) -> Result<DeleteSummary, StoreError>;
}
