//! Scout server assembly.
//!
//! Re-exports the workspace crates and wires configuration into stores,
//! routers, the snapshot cache, and the HTTP state.

mod runtime;

/// Re-export for convenience.
pub use scout_rs_config as config;
pub use scout_rs_core as core;
/// Re-export for convenience.
pub use scout_rs_format as format;
pub use scout_rs_server as server;
/// Re-export for convenience.
pub use scout_rs_store as store;

pub use runtime::{Services, build_services, spawn_cache_refresher};

/// Initialize logging with `env_logger`, defaulting to `info`.
///
/// `RUST_LOG` overrides the default filter. Calling this more than once is
/// harmless.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .try_init();
}
