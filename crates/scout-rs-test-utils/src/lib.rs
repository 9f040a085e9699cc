//! Test helpers shared across Scout crates.

pub mod store;

pub use store::{FailingStore, StubDeviceStatusStore, StubFoodStore};
