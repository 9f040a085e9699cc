//! Shared handler state.

use scout_rs_core::{Authorizer, DeviceStatusRouter, FoodRouter};
use std::sync::Arc;

/// Everything the HTTP handlers need, cheap to clone per request.
#[derive(Clone)]
pub struct AppState {
    pub device_status: Arc<DeviceStatusRouter>,
    pub food: Arc<FoodRouter>,
    pub authorizer: Arc<dyn Authorizer>,
    /// Mount create, update, and delete routes.
    pub api_enabled: bool,
}

impl AppState {
    pub fn new(
        device_status: DeviceStatusRouter,
        food: FoodRouter,
        authorizer: Arc<dyn Authorizer>,
    ) -> Self {
        Self {
            device_status: Arc::new(device_status),
            food: Arc::new(food),
            authorizer,
            api_enabled: true,
        }
    }

    pub fn with_api_enabled(mut self, enabled: bool) -> Self {
        self.api_enabled = enabled;
        self
    }
}
