//! Storage collaborators for device status and food records.
//!
//! The API core only talks to the traits in [`store`]; the document store in
//! this crate is a small JSONL-backed implementation good enough to run the
//! server without an external database.

pub mod device_status;
pub mod document;
pub mod error;
pub mod filter;
pub mod food;
pub mod query;
pub mod store;

/// Document-store backed device status collection.
pub use device_status::DocumentDeviceStatusStore;
/// In-memory / JSONL document collection.
pub use document::DocumentCollection;
/// Storage error type.
pub use error::StoreError;
/// Compiled `find` filter.
pub use filter::Filter;
/// Document-store backed food catalog.
pub use food::DocumentFoodStore;
/// Query parameters and delete summaries.
pub use query::{DEFAULT_COUNT, DeleteSummary, Query};
/// Storage traits consumed by the API core.
pub use store::{DeviceStatusStore, FoodStore};
