//! Query routing for Scout's device status and food resources.
//!
//! Routers sit between the HTTP layer and storage: they pick the snapshot
//! cache or the store, apply date denormalization, purify incoming records,
//! and negotiate the response body. Authorization lives alongside them so the
//! server can check permissions before any routing logic runs.

pub mod auth;
pub mod cache;
pub mod delete;
pub mod device_status;
pub mod error;
pub mod food;
pub mod purifier;

/// Caller credentials and permission checks.
pub use auth::{AccessControl, AuthDecision, Authorizer, Credentials, require};
/// Device status snapshot cache.
pub use cache::{CacheSnapshotProvider, DeviceStatusCache, Snapshot, StaticSnapshot};
pub use delete::{MATCH_ALL_ID, scope_to_id};
pub use device_status::{CACHE_COUNT_LIMIT, DeviceStatusRouter, can_serve_from_cache};
pub use error::ScoutCoreError;
pub use food::FoodRouter;
/// Record sanitizers applied before storage.
pub use purifier::{NoopPurifier, Purifier, TagStripPurifier};
