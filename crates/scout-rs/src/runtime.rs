use anyhow::Context;
use log::{info, warn};
use scout_rs_config::ScoutConfig;
use scout_rs_core::{
    AccessControl, CacheSnapshotProvider, DeviceStatusCache, DeviceStatusRouter, FoodRouter,
    TagStripPurifier,
};
use scout_rs_server::AppState;
use scout_rs_store::{DeviceStatusStore, DocumentDeviceStatusStore, DocumentFoodStore, FoodStore};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// HTTP state plus the cache the binary keeps refreshed.
pub struct Services {
    pub state: AppState,
    pub cache: Option<Arc<DeviceStatusCache>>,
}

/// Open stores and build routers from a validated config.
pub fn build_services(config: &ScoutConfig) -> anyhow::Result<Services> {
    let device_status: Arc<dyn DeviceStatusStore>;
    let food: Arc<dyn FoodStore>;
    match config.storage.path.as_ref() {
        Some(path) => {
            info!("opening document store (path={})", path.display());
            device_status = Arc::new(
                DocumentDeviceStatusStore::open(path)
                    .context("failed to open device status collection")?,
            );
            food = Arc::new(DocumentFoodStore::open(path).context("failed to open food collection")?);
        }
        None => {
            warn!("no storage.path configured; records are kept in memory only");
            device_status = Arc::new(DocumentDeviceStatusStore::in_memory());
            food = Arc::new(DocumentFoodStore::in_memory());
        }
    }

    let purifier = Arc::new(TagStripPurifier::new().context("failed to build purifier")?);
    let cache = config
        .cache
        .enabled
        .then(|| Arc::new(DeviceStatusCache::new(device_status.clone(), config.cache.max_records)));

    let mut device_status_router = DeviceStatusRouter::new(device_status, purifier.clone())
        .with_date_denormalization(config.settings.de_normalize_dates);
    if let Some(cache) = &cache {
        device_status_router = device_status_router.with_cache(cache.clone());
    }
    let food_router = FoodRouter::new(food, purifier);
    let authorizer =
        Arc::new(AccessControl::from_config(&config.auth).context("invalid auth config")?);

    let state = AppState::new(device_status_router, food_router, authorizer)
        .with_api_enabled(config.server.api_enabled);
    Ok(Services { state, cache })
}

/// Refresh the cache now and then every `every`, logging failures.
pub fn spawn_cache_refresher(cache: Arc<DeviceStatusCache>, every: Duration) -> JoinHandle<()> {
    info!(
        "starting device status cache refresher (interval_secs={}, max_records={})",
        every.as_secs(),
        cache.max_records()
    );
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            if let Err(err) = cache.refresh().await {
                warn!("device status cache refresh failed: {err}");
            }
        }
    })
}
