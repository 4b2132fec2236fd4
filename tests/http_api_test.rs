mod common;

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use common::TestCtx;
use medcontrol_api::{config::AppConfig, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn test_router(ctx: &TestCtx) -> Router {
    let mut cfg = AppConfig::new(
        "sqlite::memory:".to_string(),
        "127.0.0.1".to_string(),
        18_080,
        "test".to_string(),
    );
    cfg.db_max_connections = 1;

    let state = Arc::new(AppState::new(
        ctx.db.clone(),
        cfg,
        ctx.event_sender.clone(),
    ));
    Router::new().nest("/api/v1", medcontrol_api::api_v1_routes().with_state(state))
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn reservation_endpoint_requires_caller_identity() {
    let ctx = TestCtx::new().await;
    let app = test_router(&ctx).await;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/reservations")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({
                "medication_id": 1,
                "ubs_id": 1,
                "quantity": 1,
                "pickup_time": "2026-09-01T10:30:00"
            })
            .to_string(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn reservation_round_trip_over_http() {
    let ctx = TestCtx::new().await;
    let med = ctx.seed_medication("Dipyrone 500", "dipyrone").await;
    let ubs = ctx.seed_health_unit("UBS Centro").await;
    ctx.seed_lot(med, ubs, "L-001", 50, 180).await;
    let app = test_router(&ctx).await;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/reservations")
        .header("content-type", "application/json")
        .header("X-User-ID", "7")
        .body(Body::from(
            json!({
                "medication_id": med,
                "ubs_id": ubs,
                "quantity": 30,
                "pickup_time": "2026-09-01T10:30:00"
            })
            .to_string(),
        ))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["reservation"]["quantity"], json!(30));
    assert_eq!(body["reservation"]["status"], json!("ACTIVE"));
    assert_eq!(body["reservation"]["pickup_time"], json!("2026-09-01T10:30:00"));

    let request = Request::builder()
        .method(Method::GET)
        .uri(format!("/api/v1/medications/{}/availability?ubs_id={}", med, ubs))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["available_quantity"], json!(20));

    // The history endpoint returns a bare array, not an envelope.
    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/v1/users/me/reservations")
        .header("X-User-ID", "7")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let rows = body.as_array().expect("history body should be a JSON array");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["medication_name"], json!("Dipyrone 500"));
    assert_eq!(rows[0]["status"], json!("ACTIVE"));
}

#[tokio::test]
async fn search_returns_a_bare_array_of_results() {
    let ctx = TestCtx::new().await;
    let med = ctx.seed_medication("Novalgina", "dipyrone").await;
    let ubs = ctx.seed_health_unit("UBS Centro").await;
    ctx.seed_lot(med, ubs, "L-001", 25, 180).await;
    let app = test_router(&ctx).await;

    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/v1/medications/search?name=noval")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let results = body.as_array().expect("search body should be a JSON array");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["medication_id"], json!(med));
    assert_eq!(results[0]["ubs_id"], json!(ubs));
    assert_eq!(results[0]["available_quantity"], json!(25));
    assert_eq!(results[0]["ubs_name"], json!("UBS Centro"));
}

#[tokio::test]
async fn over_reservation_maps_to_bad_request_with_remaining_quantity() {
    let ctx = TestCtx::new().await;
    let med = ctx.seed_medication("Amoxicillin 500", "amoxicillin").await;
    let ubs = ctx.seed_health_unit("UBS Norte").await;
    ctx.seed_lot(med, ubs, "L-001", 5, 180).await;
    let app = test_router(&ctx).await;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/reservations")
        .header("content-type", "application/json")
        .header("X-User-ID", "1")
        .body(Body::from(
            json!({
                "medication_id": med,
                "ubs_id": ubs,
                "quantity": 6,
                "pickup_time": "2026-09-01T10:30:00"
            })
            .to_string(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(
        body["message"],
        json!("Insufficient availability: available=5")
    );
}

#[tokio::test]
async fn blank_search_term_maps_to_bad_request() {
    let ctx = TestCtx::new().await;
    let app = test_router(&ctx).await;

    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/v1/medications/search?name=")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn health_endpoints_report_readiness_and_liveness() {
    let ctx = TestCtx::new().await;
    let app = medcontrol_api::health::health_routes(ctx.db.clone());

    let request = Request::builder()
        .method(Method::GET)
        .uri("/")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["ready"], json!(true));

    let request = Request::builder()
        .method(Method::GET)
        .uri("/live")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn cancel_of_unknown_reservation_maps_to_not_found() {
    let ctx = TestCtx::new().await;
    let app = test_router(&ctx).await;

    let request = Request::builder()
        .method(Method::PUT)
        .uri("/api/v1/reservations/999/cancel")
        .header("X-User-ID", "1")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["error"], json!("Not Found"));
}
