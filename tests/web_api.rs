//! Integration tests for the print-stats web API endpoints.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt; // for .collect().await
use serde_json::json;
use std::sync::Arc;
use tower::util::ServiceExt; // for `oneshot`

use printwatch_rs::clock::HostClock;
use printwatch_rs::motion::SharedGcodeMove;
use printwatch_rs::print_stats::PrintStats;
use printwatch_rs::web::api::create_router;
use printwatch_rs::web::stats_channel;

fn test_app() -> Router {
    let tracker = PrintStats::new(
        Arc::new(HostClock::new()),
        Arc::new(SharedGcodeMove::new()),
    );
    let (stats_tx, stats_rx) = tokio::sync::mpsc::channel(8);
    tokio::spawn(stats_channel::serve(tracker, stats_rx));
    create_router(stats_tx)
}

fn post_empty(uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn post_json(uri: &str, payload: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_status_in_standby() {
    let app = test_app();
    let request = Request::builder()
        .uri("/api/v1/print_stats")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["state"], "standby");
    assert_eq!(json["filename"], "");
    assert_eq!(json["total_duration"], 0.0);
    assert_eq!(json["print_duration"], 0.0);
    assert_eq!(json["filament_used"], 0.0);
    assert_eq!(json["message"], "");
}

#[tokio::test]
async fn test_start_reports_printing() {
    let app = test_app();
    let response = app
        .clone()
        .oneshot(post_empty("/api/v1/print_stats/start"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Print started");

    let request = Request::builder()
        .uri("/api/v1/print_stats")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let json = body_json(response).await;
    assert_eq!(json["state"], "printing");
}

#[tokio::test]
async fn test_double_start_is_conflict() {
    let app = test_app();
    let response = app
        .clone()
        .oneshot(post_empty("/api/v1/print_stats/start"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(post_empty("/api/v1/print_stats/start"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Print is already started");
}

#[tokio::test]
async fn test_pause_without_job_is_conflict() {
    let app = test_app();
    let response = app
        .oneshot(post_empty("/api/v1/print_stats/pause"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Print is not currently printing");
}

#[tokio::test]
async fn test_error_termination_records_message() {
    let app = test_app();
    app.clone()
        .oneshot(post_empty("/api/v1/print_stats/start"))
        .await
        .unwrap();
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/v1/print_stats/error",
            json!({ "message": "thermal runaway" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let request = Request::builder()
        .uri("/api/v1/print_stats")
        .body(Body::empty())
        .unwrap();
    let json = body_json(app.oneshot(request).await.unwrap()).await;
    assert_eq!(json["state"], "error");
    assert_eq!(json["message"], "thermal runaway");
}

#[tokio::test]
async fn test_complete_flow() {
    let app = test_app();
    app.clone()
        .oneshot(post_empty("/api/v1/print_stats/start"))
        .await
        .unwrap();
    let response = app
        .clone()
        .oneshot(post_empty("/api/v1/print_stats/complete"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Print complete");

    let request = Request::builder()
        .uri("/api/v1/print_stats")
        .body(Body::empty())
        .unwrap();
    let json = body_json(app.oneshot(request).await.unwrap()).await;
    assert_eq!(json["state"], "complete");
}

#[tokio::test]
async fn test_cancel_requires_active_job() {
    let app = test_app();
    let response = app
        .oneshot(post_empty("/api/v1/print_stats/cancel"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_reset_stores_basename() {
    let app = test_app();
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/v1/print_stats/reset",
            json!({ "filename": "gcodes/benchy.gcode" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Print stats reset");

    let request = Request::builder()
        .uri("/api/v1/print_stats")
        .body(Body::empty())
        .unwrap();
    let json = body_json(app.oneshot(request).await.unwrap()).await;
    assert_eq!(json["filename"], "benchy.gcode");
    assert_eq!(json["state"], "standby");
}

#[tokio::test]
async fn test_reset_without_filename_clears_it() {
    let app = test_app();
    app.clone()
        .oneshot(post_json(
            "/api/v1/print_stats/reset",
            json!({ "filename": "benchy.gcode" }),
        ))
        .await
        .unwrap();
    app.clone()
        .oneshot(post_json("/api/v1/print_stats/reset", json!({})))
        .await
        .unwrap();

    let request = Request::builder()
        .uri("/api/v1/print_stats")
        .body(Body::empty())
        .unwrap();
    let json = body_json(app.oneshot(request).await.unwrap()).await;
    assert_eq!(json["filename"], "");
}
