//! Route table and request extraction helpers.

mod device_status;
mod food;

use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::http::HeaderMap;
use axum::http::header::{ACCEPT, CONTENT_TYPE, VARY};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use scout_rs_core::{Credentials, require};
use scout_rs_format::{NegotiatedBody, Record};
use serde_json::{Value, json};

/// Header carrying the shared API secret.
pub const API_SECRET_HEADER: &str = "api-secret";

/// Routes mounted under `/api/v1`.
pub fn api_routes(state: AppState) -> Router {
    let api_enabled = state.api_enabled;
    Router::new()
        .route("/status", get(status))
        .merge(device_status::routes(api_enabled))
        .merge(food::routes(api_enabled))
        .with_state(state)
}

async fn status() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "name": "scout",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Credentials from the `api-secret` header or the `secret`/`token` parameters.
pub(crate) fn credentials(headers: &HeaderMap, pairs: &[(String, String)]) -> Credentials {
    let param = |name: &str| {
        pairs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.clone())
    };
    let header_secret = headers
        .get(API_SECRET_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    Credentials {
        api_secret: header_secret.or_else(|| param("secret")),
        token: param("token"),
    }
}

/// Check every permission in order, failing on the first one missing.
pub(crate) async fn authorize(
    state: &AppState,
    headers: &HeaderMap,
    pairs: &[(String, String)],
    permissions: &[&str],
) -> Result<(), ApiError> {
    let credentials = credentials(headers, pairs);
    for permission in permissions {
        require(state.authorizer.as_ref(), &credentials, permission).await?;
    }
    Ok(())
}

pub(crate) fn accept_header(headers: &HeaderMap) -> Option<&str> {
    headers.get(ACCEPT).and_then(|value| value.to_str().ok())
}

/// Turn an extracted JSON body into a record, rejecting non-objects.
pub(crate) fn record_body(body: Result<Json<Value>, JsonRejection>) -> Result<Record, ApiError> {
    let Json(value) = body.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    Record::try_from(value)
        .map_err(|_| ApiError::BadRequest("request body must be a JSON object".to_string()))
}

/// Write a negotiated body with its content type.
pub(crate) fn negotiated_response(body: NegotiatedBody) -> Response {
    (
        [
            (CONTENT_TYPE, body.media_type.content_type()),
            (VARY, "Accept"),
        ],
        body.body,
    )
        .into_response()
}
