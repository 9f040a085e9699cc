//! HTTP surface for Scout.
//!
//! Mounts the device status and food routes under `/api/v1`, rewrites format
//! extensions before routing, and maps core errors onto status responses.

mod error;
mod extension;
mod routes;
mod state;

use axum::Router;
use axum::extract::Request;
use log::info;
use tokio::net::TcpListener;
use tower::Layer;
use tower::util::{MapRequest, MapRequestLayer};
use tower_http::trace::TraceLayer;

pub use error::{ApiError, StatusBody};
pub use extension::rewrite_format_extension;
pub use routes::API_SECRET_HEADER;
pub use state::AppState;

/// Prefix every API route is mounted under.
pub const API_PREFIX: &str = "/api/v1";

/// Routed application wrapped in the format-extension rewrite.
pub type ScoutService = MapRequest<Router, fn(Request) -> Request>;

/// Build the router with request tracing.
pub fn app(state: AppState) -> Router {
    Router::new()
        .nest(API_PREFIX, routes::api_routes(state))
        .layer(TraceLayer::new_for_http())
}

/// Build the full service; the extension rewrite must run before routing.
pub fn service(state: AppState) -> ScoutService {
    let rewrite: fn(Request) -> Request = rewrite_format_extension;
    MapRequestLayer::new(rewrite).layer(app(state))
}

/// Serve until the listener fails.
pub async fn serve(listener: TcpListener, state: AppState) -> std::io::Result<()> {
    let service = service(state);
    if let Ok(addr) = listener.local_addr() {
        info!("scout api listening (addr={addr}, prefix={API_PREFIX})");
    }
    axum::serve(
        listener,
        axum::ServiceExt::<Request>::into_make_service(service),
    )
    .await
}
