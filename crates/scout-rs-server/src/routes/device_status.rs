use super::{accept_header, authorize, negotiated_response, record_body};
use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query as Params, State};
use axum::http::HeaderMap;
use axum::response::Response;
use axum::routing::{delete, get};
use axum::{Json, Router};
use scout_rs_format::Record;
use scout_rs_store::{DeleteSummary, Query};
use serde_json::Value;

const READ: &str = "api:devicestatus:read";
const CREATE: &str = "api:devicestatus:create";
const DELETE: &str = "api:devicestatus:delete";

pub(super) fn routes(api_enabled: bool) -> Router<AppState> {
    let collection = if api_enabled {
        get(list).post(create).delete(delete_by_query)
    } else {
        get(list)
    };
    let router = Router::new()
        .route("/devicestatus", collection.clone())
        .route("/devicestatus/", collection);
    if api_enabled {
        router.route("/devicestatus/{id}", delete(delete_by_id))
    } else {
        router
    }
}

async fn list(
    State(state): State<AppState>,
    headers: HeaderMap,
    Params(pairs): Params<Vec<(String, String)>>,
) -> Result<Response, ApiError> {
    authorize(&state, &headers, &pairs, &[READ]).await?;
    let body = state
        .device_status
        .list(Query::from_pairs(pairs), accept_header(&headers))
        .await?;
    Ok(negotiated_response(body))
}

async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    Params(pairs): Params<Vec<(String, String)>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Record>, ApiError> {
    authorize(&state, &headers, &pairs, &[READ, CREATE]).await?;
    let record = record_body(body)?;
    Ok(Json(state.device_status.create(record).await?))
}

async fn delete_by_id(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Params(pairs): Params<Vec<(String, String)>>,
) -> Result<Json<DeleteSummary>, ApiError> {
    authorize(&state, &headers, &pairs, &[READ, DELETE]).await?;
    let summary = state
        .device_status
        .delete_by_id(&id, Query::from_pairs(pairs))
        .await
        .map_err(ApiError::internal)?;
    Ok(Json(summary))
}

async fn delete_by_query(
    State(state): State<AppState>,
    headers: HeaderMap,
    Params(pairs): Params<Vec<(String, String)>>,
) -> Result<Json<DeleteSummary>, ApiError> {
    authorize(&state, &headers, &pairs, &[READ, DELETE]).await?;
    let summary = state
        .device_status
        .delete_by_query(Query::from_pairs(pairs))
        .await
        .map_err(ApiError::internal)?;
    Ok(Json(summary))
}
