use async_trait::async_trait;
use parking_lot::Mutex;
use scout_rs_format::Record;
use scout_rs_store::{DeleteSummary, DeviceStatusStore, FoodStore, Query, StoreError};

/// Device status store returning fixed records and recording every query.
#[derive(Debug, Default)]
pub struct StubDeviceStatusStore {
    records: Vec<Record>,
    list_calls: Mutex<Vec<Query>>,
    remove_calls: Mutex<Vec<Query>>,
    created: Mutex<Vec<Record>>,
}

impl StubDeviceStatusStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<Record>) -> Self {
        Self {
            records,
            ..Self::default()
        }
    }

    pub fn list_calls(&self) -> Vec<Query> {
        self.list_calls.lock().clone()
    }

    pub fn remove_calls(&self) -> Vec<Query> {
        self.remove_calls.lock().clone()
    }

    pub fn created(&self) -> Vec<Record> {
        self.created.lock().clone()
    }
}

#[async_trait]
impl DeviceStatusStore for StubDeviceStatusStore {
    async fn list(&self, query: &Query) -> Result<Vec<Record>, StoreError> {
        self.list_calls.lock().push(query.clone());
        Ok(self.records.clone())
    }

    async fn create(&self, record: Record) -> Result<Record, StoreError> {
        self.created.lock().push(record.clone());
        Ok(record)
    }

    async fn remove(&self, query: &Query) -> Result<DeleteSummary, StoreError> {
        self.remove_calls.lock().push(query.clone());
        Ok(DeleteSummary::deleted(0))
    }
}

/// Food store returning fixed records; `empty()` answers lists with `None`.
#[derive(Debug, Default)]
pub struct StubFoodStore {
    records: Option<Vec<Record>>,
    created: Mutex<Vec<Record>>,
    saved: Mutex<Vec<Record>>,
    remove_calls: Mutex<Vec<Query>>,
}

impl StubFoodStore {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<Record>) -> Self {
        Self {
            records: Some(records),
            ..Self::default()
        }
    }

    pub fn created(&self) -> Vec<Record> {
        self.created.lock().clone()
    }

    pub fn saved(&self) -> Vec<Record> {
        self.saved.lock().clone()
    }

    pub fn remove_calls(&self) -> Vec<Query> {
        self.remove_calls.lock().clone()
    }
}

#[async_trait]
impl FoodStore for StubFoodStore {
    async fn list(&self, _query: &Query) -> Result<Option<Vec<Record>>, StoreError> {
        Ok(self.records.clone())
    }

    async fn list_quickpicks(&self) -> Result<Option<Vec<Record>>, StoreError> {
        Ok(self.records.clone())
    }

    async fn list_regular(&self) -> Result<Option<Vec<Record>>, StoreError> {
        Ok(self.records.clone())
    }

    async fn create(&self, record: Record) -> Result<Record, StoreError> {
        self.created.lock().push(record.clone());
        Ok(record)
    }

    async fn save(&self, record: Record) -> Result<Record, StoreError> {
        self.saved.lock().push(record.clone());
        Ok(record)
    }

    async fn remove(&self, query: &Query) -> Result<DeleteSummary, StoreError> {
        self.remove_calls.lock().push(query.clone());
        Ok(DeleteSummary::deleted(0))
    }
}

/// Store whose every operation fails with a backend error.
#[derive(Debug, Clone)]
pub struct FailingStore {
    message: String,
}

impl FailingStore {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    fn error(&self) -> StoreError {
        StoreError::Backend(self.message.clone())
    }
}

impl Default for FailingStore {
    fn default() -> Self {
        Self::new("connection refused")
    }
}

#[async_trait]
impl DeviceStatusStore for FailingStore {
    async fn list(&self, _query: &Query) -> Result<Vec<Record>, StoreError> {
        Err(self.error())
    }

    async fn create(&self, _record: Record) -> Result<Record, StoreError> {
        Err(self.error())
    }

    async fn remove(&self, _query: &Query) -> Result<DeleteSummary, StoreError> {
        Err(self.error())
    }
}

#[async_trait]
impl FoodStore for FailingStore {
    async fn list(&self, _query: &Query) -> Result<Option<Vec<Record>>, StoreError> {
        Err(self.error())
    }

    async fn list_quickpicks(&self) -> Result<Option<Vec<Record>>, StoreError> {
        Err(self.error())
    }

    async fn list_regular(&self) -> Result<Option<Vec<Record>>, StoreError> {
        Err(self.error())
    }

    async fn create(&self, _record: Record) -> Result<Record, StoreError> {
        Err(self.error())
    }

    async fn save(&self, _record: Record) -> Result<Record, StoreError> {
        Err(self.error())
    }

    async fn remove(&self, _query: &Query) -> Result<DeleteSummary, StoreError> {
        Err(self.error())
    }
}
