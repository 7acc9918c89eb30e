//! Router tests that never reach the database.
//!
//! The state carries a disconnected connection, so everything asserted here
//! is decided at the HTTP boundary or by the engine's own validation.

#![allow(clippy::uninlined_format_args)]

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use logisco_api::{AppState, create_router};
use logisco_core::storage::StorageService;
use sea_orm::DatabaseConnection;
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

const BOUNDARY: &str = "logisco-test-boundary";

fn app() -> Router {
    let state = AppState::new(
        DatabaseConnection::Disconnected,
        StorageService::in_memory().expect("memory storage"),
        "Logisco",
    );
    create_router(state)
}

async fn send(request: Request<Body>) -> (StatusCode, Value) {
    let response = app().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn multipart_request(uri: &str, fields: &[(&str, &str)]) -> Request<Body> {
    let mut body = String::new();
    for (name, value) in fields {
        body.push_str(&format!(
            "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
            BOUNDARY, name, value
        ));
    }
    body.push_str(&format!("--{}--\r\n", BOUNDARY));

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

fn trip_uri(suffix: &str) -> String {
    format!("/api/v1/trips/{}{}", Uuid::now_v7(), suffix)
}

#[tokio::test]
async fn test_health() {
    let request = Request::builder()
        .uri("/api/v1/health")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_unknown_trip_status_filter_is_rejected() {
    let request = Request::builder()
        .uri("/api/v1/trips?status=DONE")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");
    assert_eq!(body["message"], "Unknown trip status 'DONE'");
}

#[tokio::test]
async fn test_unknown_expense_category_is_rejected() {
    let request = multipart_request(
        &trip_uri("/expenses"),
        &[("category", "DIESEL"), ("amount", "200")],
    );
    let (status, body) = send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_expense_requires_amount() {
    let request = multipart_request(&trip_uri("/expenses"), &[("category", "FUEL")]);
    let (status, body) = send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "amount is required");
}

#[tokio::test]
async fn test_non_positive_expense_amount_is_rejected() {
    let request = multipart_request(
        &trip_uri("/expenses"),
        &[("category", "TOLL"), ("amount", "0")],
    );
    let (status, body) = send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "INVALID_AMOUNT");
}

#[tokio::test]
async fn test_fraction_of_a_paisa_is_rejected() {
    let request = multipart_request(
        &trip_uri("/expenses"),
        &[("category", "FUEL"), ("amount", "12.345")],
    );
    let (status, body) = send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "INVALID_AMOUNT");
}

#[tokio::test]
async fn test_unknown_payment_mode_is_rejected() {
    let request = json_request(
        "POST",
        &trip_uri("/payments"),
        &json!({ "amount": "500", "payment_type": "ADVANCE", "mode": "CHEQUE" }),
    );
    let (status, body) = send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Unknown payment mode 'CHEQUE'");
}

#[tokio::test]
async fn test_negative_payment_is_rejected() {
    let request = json_request(
        "POST",
        &trip_uri("/payments"),
        &json!({ "amount": "-1", "payment_type": "SETTLEMENT", "mode": "UPI" }),
    );
    let (status, body) = send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "INVALID_AMOUNT");
}

#[tokio::test]
async fn test_close_requires_actor() {
    let request = json_request("POST", &trip_uri("/close"), &json!({ "closed_by": "   " }));
    let (status, body) = send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "ACTOR_REQUIRED");
}

#[tokio::test]
async fn test_zero_quantity_is_rejected() {
    let request = json_request("PUT", &trip_uri("/actual-quantity"), &json!({ "actual_qty": "0" }));
    let (status, body) = send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "INVALID_QUANTITY");
}

#[tokio::test]
async fn test_blank_source_is_rejected() {
    let request = json_request(
        "POST",
        "/api/v1/trips",
        &json!({ "truck_id": Uuid::now_v7(), "source": " ", "destination": "Chennai" }),
    );
    let (status, body) = send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "MISSING_FIELD");
}

#[tokio::test]
async fn test_empty_expense_patch_is_rejected() {
    let request = json_request(
        "PATCH",
        &format!("{}/{}", trip_uri("/expenses"), Uuid::now_v7()),
        &json!({}),
    );
    let (status, body) = send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Nothing to update");
}

#[tokio::test]
async fn test_database_failure_hides_detail() {
    let request = Request::builder()
        .uri(trip_uri(""))
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(request).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "REPOSITORY_ERROR");
    assert_eq!(body["message"], "An internal error occurred");
}

#[tokio::test]
async fn test_malformed_trip_id_is_rejected() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/trips/not-a-uuid/start")
        .body(Body::empty())
        .unwrap();
    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
