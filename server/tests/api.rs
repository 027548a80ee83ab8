use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use chainsign_core::{genesis_signature, DeviceStore, InMemoryDeviceStore};
use chainsign_server::{router, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

fn setup() -> (Arc<dyn DeviceStore>, Router) {
    let store: Arc<dyn DeviceStore> = Arc::new(InMemoryDeviceStore::new());
    (store.clone(), router(AppState::new(store)))
}

async fn call(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri).header("content-type", "application/json");
    let body = match body {
        Some(v) => Body::from(serde_json::to_string(&v).expect("serialize body")),
        None => Body::empty(),
    };
    let response = router.clone().oneshot(builder.body(body).expect("request")).await.expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body bytes");
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

async fn create(router: &Router, id: &str, algorithm: &str) -> (StatusCode, Value) {
    call(router, "POST", "/api/v0/devices", Some(json!({ "id": id, "algorithm": algorithm, "label": "Device 1" }))).await
}

#[tokio::test]
async fn health_reports_pass() {
    let (_, router) = setup();
    let (status, body) = call(&router, "GET", "/api/v0/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "pass");
    assert_eq!(body["data"]["version"], "v0");
}

#[tokio::test]
async fn create_device_returns_public_view() {
    let (_, router) = setup();
    let id = Uuid::new_v4().to_string();
    let (status, body) = create(&router, &id, "RSA").await;

    assert_eq!(status, StatusCode::CREATED);
    let device = &body["data"];
    assert_eq!(device["id"], id.as_str());
    assert_eq!(device["algorithm"], "RSA");
    assert_eq!(device["label"], "Device 1");
    assert_eq!(device["signatureCounter"], 0);
    assert!(device["publicKey"].as_str().expect("public key").contains("PUBLIC KEY"));
    assert!(device.get("privateKey").is_none());
}

#[tokio::test]
async fn create_device_validation() {
    let (store, router) = setup();

    let (status, body) = create(&router, &Uuid::new_v4().to_string(), "INVALID_ALG").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0], "invalid algorithm: INVALID_ALG");

    let (status, body) = call(&router, "POST", "/api/v0/devices", Some(json!({ "algorithm": "RSA" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0], "Invalid Device ID. UUID format expected");

    let (status, _) = create(&router, "not-a-uuid", "ECC").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let request = Request::builder()
        .method("POST")
        .uri("/api/v0/devices")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .expect("request");
    let response = router.clone().oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    assert!(store.is_empty());
}

#[tokio::test]
async fn duplicate_device_conflicts() {
    let (store, router) = setup();
    let id = Uuid::new_v4().to_string();

    let (status, _) = create(&router, &id, "ECC").await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, body) = create(&router, &id, "ECC").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["errors"][0].as_str().unwrap().contains("already exists"));
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn sign_transactions_chain() {
    let (_, router) = setup();
    let id = Uuid::new_v4().to_string();
    create(&router, &id, "ECC").await;

    let uri = format!("/api/v0/devices/{id}/sign");
    let (status, first) = call(&router, "POST", &uri, Some(json!({ "data": "COFFEE:20251026" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["data"]["signedData"], format!("0_COFFEE:20251026_{}", genesis_signature(&id)));

    let (status, second) = call(&router, "POST", &uri, Some(json!({ "data": "TEA" }))).await;
    assert_eq!(status, StatusCode::OK);
    let prev = first["data"]["signature"].as_str().expect("signature");
    assert_eq!(second["data"]["signedData"], format!("1_TEA_{prev}"));

    let (status, device) = call(&router, "GET", &format!("/api/v0/devices/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(device["data"]["signatureCounter"], 2);
}

#[tokio::test]
async fn sign_rejects_bad_requests() {
    let (_, router) = setup();
    let id = Uuid::new_v4().to_string();
    create(&router, &id, "ECC").await;

    let (status, body) =
        call(&router, "POST", &format!("/api/v0/devices/{id}/sign"), Some(json!({ "data": "" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0], "data to sign cannot be empty");

    let unknown = Uuid::new_v4();
    let (status, _) =
        call(&router, "POST", &format!("/api/v0/devices/{unknown}/sign"), Some(json!({ "data": "X" }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = call(&router, "POST", "/api/v0/devices/not-a-uuid/sign", Some(json!({ "data": "X" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call(&router, "POST", "/api/v0/devices/sign", Some(json!({ "data": "X" }))).await;
    assert_ne!(status, StatusCode::OK);

    let (_, device) = call(&router, "GET", &format!("/api/v0/devices/{id}"), None).await;
    assert_eq!(device["data"]["signatureCounter"], 0);
}

#[tokio::test]
async fn get_device_and_list() {
    let (_, router) = setup();

    let (status, _) = call(&router, "GET", &format!("/api/v0/devices/{}", Uuid::new_v4()), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    for _ in 0..3 {
        create(&router, &Uuid::new_v4().to_string(), "ECC").await;
    }
    let (status, body) = call(&router, "GET", "/api/v0/devices", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().expect("array").len(), 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_requests_keep_counter_consistent() {
    let (store, router) = setup();
    let id = Uuid::new_v4().to_string();
    create(&router, &id, "ECC").await;

    let uri = format!("/api/v0/devices/{id}/sign");
    let tasks: Vec<_> = (0..20)
        .map(|i| {
            let router = router.clone();
            let uri = uri.clone();
            tokio::spawn(async move { call(&router, "POST", &uri, Some(json!({ "data": format!("tx{i}") }))).await })
        })
        .collect();
    for task in tasks {
        let (status, _) = task.await.expect("task");
        assert_eq!(status, StatusCode::OK);
    }

    assert_eq!(store.get_by_id(&id).expect("device").signature_counter, 20);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn reads_are_served_while_signing_is_busy() {
    let (_, router) = setup();
    let id = Uuid::new_v4().to_string();
    create(&router, &id, "RSA").await;

    let sign_uri = format!("/api/v0/devices/{id}/sign");
    let signers: Vec<_> = (0..8)
        .map(|i| {
            let router = router.clone();
            let uri = sign_uri.clone();
            tokio::spawn(async move { call(&router, "POST", &uri, Some(json!({ "data": format!("tx{i}") }))).await })
        })
        .collect();

    let device_uri = format!("/api/v0/devices/{id}");
    let mut last_counter = 0;
    for _ in 0..8 {
        let (status, device) = call(&router, "GET", &device_uri, None).await;
        assert_eq!(status, StatusCode::OK);
        let counter = device["data"]["signatureCounter"].as_u64().expect("counter");
        assert!(counter >= last_counter);
        last_counter = counter;

        let (status, list) = call(&router, "GET", "/api/v0/devices", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list["data"].as_array().expect("array").len(), 1);
    }

    for task in signers {
        let (status, _) = task.await.expect("task");
        assert_eq!(status, StatusCode::OK);
    }
    let (_, device) = call(&router, "GET", &device_uri, None).await;
    assert_eq!(device["data"]["signatureCounter"], 8);
}
