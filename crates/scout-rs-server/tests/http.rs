use axum::body::{Body, to_bytes};
use axum::http::header::{ACCEPT, CONTENT_TYPE, VARY};
use axum::http::{Method, Request, StatusCode};
use axum::response::Response;
use pretty_assertions::assert_eq;
use scout_rs_config::AuthConfig;
use scout_rs_core::{
    AccessControl, DeviceStatusRouter, FoodRouter, NoopPurifier, TagStripPurifier,
};
use scout_rs_format::Record;
use scout_rs_server::{API_SECRET_HEADER, AppState, service};
use scout_rs_store::{
    DeviceStatusStore, DocumentDeviceStatusStore, DocumentFoodStore, FoodStore,
};
use scout_rs_test_utils::{FailingStore, StubFoodStore};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

const SECRET: &str = "a sufficiently long secret";

fn access() -> Arc<AccessControl> {
    Arc::new(
        AccessControl::from_config(&AuthConfig {
            api_secret: Some(SECRET.to_string()),
            ..AuthConfig::default()
        })
        .expect("access"),
    )
}

fn state_with(
    device_status: Arc<dyn DeviceStatusStore>,
    food: Arc<dyn FoodStore>,
) -> AppState {
    AppState::new(
        DeviceStatusRouter::new(device_status, Arc::new(NoopPurifier)),
        FoodRouter::new(food, Arc::new(TagStripPurifier::new().expect("purifier"))),
        access(),
    )
}

async fn seeded_state() -> AppState {
    let device_status = Arc::new(DocumentDeviceStatusStore::in_memory());
    for (id, mills) in [("a", 1), ("b", 2)] {
        device_status
            .create(
                Record::try_from(json!({
                    "_id": id,
                    "device": "xDrip, \"rig\"",
                    "mills": mills,
                    "pump": { "battery": { "percent": 80 } }
                }))
                .expect("object"),
            )
            .await
            .expect("seed");
    }
    state_with(device_status, Arc::new(DocumentFoodStore::in_memory()))
}

fn request(method: Method, uri: &str) -> axum::http::request::Builder {
    Request::builder().method(method).uri(uri)
}

async fn send(state: AppState, request: Request<Body>) -> Response {
    service(state).oneshot(request).await.expect("response")
}

async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    String::from_utf8(bytes.to_vec()).expect("utf8")
}

fn header<'a>(response: &'a Response, name: axum::http::HeaderName) -> Option<&'a str> {
    response
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
}

#[tokio::test]
async fn csv_extension_negotiates_tabular_output() {
    let response = send(
        seeded_state().await,
        request(Method::GET, "/api/v1/devicestatus.csv?count=5&find%5Bdevice%5D=xDrip%2C%20%22rig%22")
            .body(Body::empty())
            .expect("request"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header(&response, CONTENT_TYPE), Some("text/csv; charset=utf-8"));
    assert_eq!(header(&response, VARY), Some("Accept"));
    let text = body_text(response).await;
    let lines: Vec<_> = text.split("\r\n").collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(
        lines[0],
        "_id,device,created_at,mills,uploaderBattery,pump,openaps,loop"
    );
    assert!(lines[1].starts_with(r#""b","xDrip, \"rig\"","#), "{}", lines[1]);
}

#[tokio::test]
async fn unknown_accept_falls_back_to_json() {
    let response = send(
        seeded_state().await,
        request(Method::GET, "/api/v1/devicestatus/")
            .header(ACCEPT, "application/xml")
            .body(Body::empty())
            .expect("request"),
    )
    .await;

    assert_eq!(
        header(&response, CONTENT_TYPE),
        Some("application/json; charset=utf-8")
    );
    let listed: Vec<Value> = serde_json::from_str(&body_text(response).await).expect("json");
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0]["pump"], json!({ "battery": { "percent": 80 } }));
}

#[tokio::test]
async fn anonymous_create_is_unauthorized() {
    let response = send(
        seeded_state().await,
        request(Method::POST, "/api/v1/devicestatus")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"device":"pump"}"#))
            .expect("request"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = serde_json::from_str(&body_text(response).await).expect("json");
    assert_eq!(
        body,
        json!({
            "status": 401,
            "message": "Unauthorized",
            "description": "Missing permission api:devicestatus:create"
        })
    );
}

#[tokio::test]
async fn secret_holder_can_create_and_wildcard_delete() {
    let state = seeded_state().await;

    let created = send(
        state.clone(),
        request(Method::POST, "/api/v1/devicestatus/")
            .header(API_SECRET_HEADER, SECRET)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"device":"openaps://rig","created_at":"2024-01-01T00:00:00Z"}"#))
            .expect("request"),
    )
    .await;
    assert_eq!(created.status(), StatusCode::OK);
    let created: Value = serde_json::from_str(&body_text(created).await).expect("json");
    assert!(created["_id"].is_string());
    assert_eq!(created["mills"], json!(1704067200000_i64));

    let deleted = send(
        state,
        request(Method::DELETE, "/api/v1/devicestatus/*")
            .header(API_SECRET_HEADER, SECRET)
            .body(Body::empty())
            .expect("request"),
    )
    .await;
    assert_eq!(deleted.status(), StatusCode::OK);
    let summary: Value = serde_json::from_str(&body_text(deleted).await).expect("json");
    assert_eq!(summary, json!({ "acknowledged": true, "deletedCount": 3 }));
}

#[tokio::test]
async fn storage_failures_map_to_500() {
    let failing = Arc::new(FailingStore::new("database offline"));
    let state = state_with(failing.clone(), failing);

    let listed = send(
        state.clone(),
        request(Method::GET, "/api/v1/devicestatus?count=3")
            .body(Body::empty())
            .expect("request"),
    )
    .await;
    assert_eq!(listed.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = serde_json::from_str(&body_text(listed).await).expect("json");
    assert_eq!(body["status"], json!(500));
    assert_eq!(body["message"], json!("Storage Error"));
    assert!(body["description"].as_str().is_some_and(|d| d.contains("database offline")));

    let deleted = send(
        state,
        request(Method::DELETE, "/api/v1/food/abc")
            .header(API_SECRET_HEADER, SECRET)
            .body(Body::empty())
            .expect("request"),
    )
    .await;
    assert_eq!(deleted.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(header(&deleted, CONTENT_TYPE).is_some_and(|ct| ct.starts_with("text/plain")));
    assert_eq!(body_text(deleted).await, "Internal Server Error");
}

#[tokio::test]
async fn non_object_body_is_a_bad_request() {
    let response = send(
        seeded_state().await,
        request(Method::PUT, "/api/v1/food/")
            .header(API_SECRET_HEADER, SECRET)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from("[1, 2]"))
            .expect("request"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_str(&body_text(response).await).expect("json");
    assert_eq!(body["status"], json!(400));
}

#[tokio::test]
async fn disabled_api_only_mounts_reads() {
    let state = seeded_state().await.with_api_enabled(false);
    let response = send(
        state.clone(),
        request(Method::POST, "/api/v1/food")
            .header(API_SECRET_HEADER, SECRET)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"name":"Toast"}"#))
            .expect("request"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);

    let listed = send(
        state,
        request(Method::GET, "/api/v1/food.json")
            .body(Body::empty())
            .expect("request"),
    )
    .await;
    assert_eq!(listed.status(), StatusCode::OK);
    assert_eq!(body_text(listed).await, "[]");
}

#[tokio::test]
async fn missing_food_lists_are_empty_arrays() {
    let state = state_with(
        Arc::new(DocumentDeviceStatusStore::in_memory()),
        Arc::new(StubFoodStore::empty()),
    );
    for path in ["/api/v1/food/quickpicks", "/api/v1/food/regular"] {
        let response = send(
            state.clone(),
            request(Method::GET, path).body(Body::empty()).expect("request"),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "[]");
    }
}

#[tokio::test]
async fn status_reports_liveness() {
    let response = send(
        seeded_state().await,
        request(Method::GET, "/api/v1/status")
            .body(Body::empty())
            .expect("request"),
    )
    .await;
    let body: Value = serde_json::from_str(&body_text(response).await).expect("json");
    assert_eq!(body["status"], json!("ok"));
}
