//! HTTP API Tests
//!
//! Drives the router end to end with `oneshot` requests:
//! - Status codes for every mutation outcome
//! - Read-only servers refuse mutations before touching the store
//! - Malformed searches are rejected before any store call

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use tledb::http_server::{tle_routes, AppState};
use tledb::store::RecordStore;

// =============================================================================
// Helper Functions
// =============================================================================

const ISS: [&str; 3] = [
    "ISS (ZARYA)",
    "1 25544U 98067A   19128.56248153  .00016717  00000-0  10270-3 0  9002",
    "2 25544  51.6390 198.1271 0001239 315.7000  44.4052 15.52641749  9097",
];

fn setup(writable: bool) -> (Arc<RecordStore>, Router) {
    let store = Arc::new(RecordStore::open_in_memory().unwrap());
    let router = tle_routes(AppState::new(Arc::clone(&store), writable));
    (store, router)
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

async fn get(router: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(router, request).await
}

async fn post_json(router: &Router, uri: &str, body: &Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(router, request).await
}

async fn delete(router: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(router, request).await
}

// =============================================================================
// Mutation Lifecycle
// =============================================================================

#[tokio::test]
async fn test_add_search_delete_lifecycle() {
    let (_store, router) = setup(true);

    let (status, body) = post_json(&router, "/add", &json!(ISS)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["norad_catalog"], 25544);
    assert_eq!(body["intldes"], "98067A");
    assert_eq!(body["classified"], 0);

    let (status, body) = get(&router, "/search/norad_catalog/eq/25544").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"].as_array().unwrap().len(), 1);
    assert_eq!(body["result"][0]["name"], "ISS (ZARYA)");

    let (status, body) = post_json(&router, "/add", &json!(ISS)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 409);

    let (status, body) = delete(&router, "/delete/norad_catalog/25544").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, _) = delete(&router, "/delete/norad_catalog/25544").await;
    assert_eq!(status, StatusCode::GONE);

    let (status, body) = get(&router, "/count").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn test_delete_by_intldes() {
    let (store, router) = setup(true);
    post_json(&router, "/add", &json!(ISS)).await;

    let (status, _) = delete(&router, "/delete/intldes/98067A").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(store.count().unwrap(), 0);
}

#[tokio::test]
async fn test_delete_unknown_catalog() {
    let (_store, router) = setup(true);
    let (status, body) = delete(&router, "/delete/name/ISS").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 400);
}

#[tokio::test]
async fn test_classified_add_accepts_two_lines() {
    let (_store, router) = setup(true);
    let (status, body) = post_json(&router, "/add/classified", &json!([ISS[1], ISS[2]])).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["classified"], 1);
    assert_eq!(body["name"], "");
}

#[tokio::test]
async fn test_malformed_payload() {
    let (store, router) = setup(true);

    let (status, _) = post_json(&router, "/add", &json!([ISS[1], ISS[2]])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let request = Request::builder()
        .method(Method::POST)
        .uri("/add")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("[\"ISS\", "))
        .unwrap();
    let (status, _) = send(&router, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(store.count().unwrap(), 0);
}

#[tokio::test]
async fn test_wrong_content_type() {
    let (store, router) = setup(true);
    let request = Request::builder()
        .method(Method::POST)
        .uri("/add")
        .header(header::CONTENT_TYPE, "text/plain")
        .body(Body::from(json!(ISS).to_string()))
        .unwrap();

    let (status, body) = send(&router, request).await;
    assert_eq!(status, StatusCode::NOT_ACCEPTABLE);
    assert_eq!(body["code"], 406);
    assert_eq!(store.count().unwrap(), 0);
}

// =============================================================================
// Read-Only Server
// =============================================================================

#[tokio::test]
async fn test_read_only_refuses_mutations() {
    let (store, router) = setup(false);
    let before = store.metrics().store_calls();

    let (status, body) = post_json(&router, "/add", &json!(ISS)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], 403);

    let (status, _) = delete(&router, "/delete/norad_catalog/25544").await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = get(&router, "/add").await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    assert_eq!(store.metrics().store_calls(), before);
}

#[tokio::test]
async fn test_add_help_on_writable_server() {
    let (_store, router) = setup(true);
    let (status, body) = get(&router, "/add").await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["tle_example"][0], "ISS (ZARYA)");
}

#[tokio::test]
async fn test_route_list_hides_mutations() {
    let (_store, read_only) = setup(false);
    let (_store, writable) = setup(true);

    let paths = |body: &Value| -> Vec<String> {
        body.as_array()
            .unwrap()
            .iter()
            .map(|r| r["path"].as_str().unwrap().to_string())
            .collect()
    };

    let (_, body) = get(&read_only, "/list").await;
    assert!(!paths(&body).iter().any(|p| p.starts_with("/add")));
    assert!(!paths(&body).iter().any(|p| p.starts_with("/delete")));

    let (_, body) = get(&writable, "/").await;
    assert!(paths(&body).iter().any(|p| p == "/add"));
    assert!(paths(&body).iter().any(|p| p == "/add/classified"));
}

// =============================================================================
// Search Rejections
// =============================================================================

#[tokio::test]
async fn test_bad_searches_are_rejected_without_store_calls() {
    let (store, router) = setup(false);
    let before = store.metrics().store_calls();

    for uri in [
        "/search/line1/eq/x",
        "/search/period/between/1/2",
        "/search/period/gt/1/2",
        "/search/norad_catalog/eq/ISS",
        "/search/epoch/lt/yesterday",
    ] {
        let (status, body) = get(&router, uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(body["code"], 400, "{}", uri);
        assert!(body["error"].is_string(), "{}", uri);
    }

    assert_eq!(store.metrics().store_calls(), before);
    assert_eq!(store.metrics().snapshot().queries_rejected, 5);
}

#[tokio::test]
async fn test_search_column_is_case_insensitive() {
    let (_store, router) = setup(true);
    post_json(&router, "/add", &json!(ISS)).await;

    let (status, body) = get(&router, "/search/NORAD_CATALOG/in/25544/20580").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_search_wildcard_is_percent_encoded() {
    let (_store, router) = setup(true);
    post_json(&router, "/add", &json!(ISS)).await;

    let (status, body) = get(&router, "/search/name/eq/ISS%25").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"][0]["norad_catalog"], 25544);
}

#[tokio::test]
async fn test_encoded_slash_stays_in_value() {
    let (_store, router) = setup(true);
    let (status, _) = post_json(&router, "/add", &json!(["SL-16 R/B", ISS[1], ISS[2]])).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = get(&router, "/search/name/eq/SL-16%20R%2FB").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"].as_array().unwrap().len(), 1);

    let (status, body) = get(&router, "/search/name/in/SL-16%20R/B").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["result"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_percent_encoding_rejected() {
    let (store, router) = setup(false);
    let before = store.metrics().store_calls();

    let (status, body) = get(&router, "/search/name/eq/ISS%zz").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 400);
    assert_eq!(store.metrics().store_calls(), before);
}

// =============================================================================
// Metadata
// =============================================================================

#[tokio::test]
async fn test_range_routes() {
    let (_store, router) = setup(true);
    post_json(&router, "/add", &json!(ISS)).await;

    let (status, body) = get(&router, "/range/inclination").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["inclination"]["min"], 51.639);
    assert_eq!(body["inclination"]["max"], 51.639);

    let (status, body) = get(&router, "/range/Inclination").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["inclination"]["min"], 51.639);

    let (status, body) = get(&router, "/range/line1").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 404);

    let (status, body) = get(&router, "/range").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.get("period").is_some());
    assert!(body.get("line1").is_none());
}

#[tokio::test]
async fn test_columns_and_schema() {
    let (_store, router) = setup(false);

    let (status, body) = get(&router, "/columns").await;
    assert_eq!(status, StatusCode::OK);
    let columns = body.as_array().unwrap();
    assert!(columns.contains(&json!("norad_catalog")));
    assert!(!columns.contains(&json!("line2")));

    let (status, body) = get(&router, "/schema").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["sql"].as_str().unwrap().contains("CREATE TABLE"));
    assert_eq!(body["columns"]["epoch"], "timestamp");
}

#[tokio::test]
async fn test_unknown_route() {
    let (_store, router) = setup(false);
    let (status, body) = get(&router, "/nowhere").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 404);
    assert!(body["error"].as_str().unwrap().contains("/nowhere"));
}
