//! HTTP API tests driven through the router without binding a socket

mod common;

use std::net::SocketAddr;

use axum::body::{to_bytes, Body};
use axum::extract::ConnectInfo;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::Utc;
use common::{encoded_fixture, yandex_url};
use rankwatch::config::{RankConfig, ServerConfig};
use rankwatch::pipeline::ParsePipeline;
use rankwatch::server::{build_router, AppState};
use rankwatch::service::RankService;
use rankwatch::storage::{create_mock_repository, RankRepository, SharedRankRepository};
use serde_json::{json, Value};
use tower::ServiceExt;

const PEER: ([u8; 4], u16) = ([198, 51, 100, 4], 40000);

fn app_with(server: ServerConfig) -> (SharedRankRepository, Router) {
    let repo = create_mock_repository();
    let service = RankService::new(repo.clone(), RankConfig::default()).unwrap();
    let state = AppState::new(service).with_forwarded_for(server.trust_forwarded_for);
    let router = build_router(state, &server);
    (repo, router)
}

fn app() -> (SharedRankRepository, Router) {
    app_with(ServerConfig::default())
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .extension(ConnectInfo(SocketAddr::from(PEER)))
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .extension(ConnectInfo(SocketAddr::from(PEER)))
        .body(Body::empty())
        .unwrap()
}

fn get_forwarded(uri: &str, forwarded: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("x-forwarded-for", forwarded)
        .extension(ConnectInfo(SocketAddr::from(PEER)))
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_health() {
    let (_, router) = app();
    let (status, body) = send(&router, get("/api/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "healthy");
}

#[tokio::test]
async fn test_donors_returns_urls_and_delay() {
    let (repo, router) = app();
    let (status, body) = send(
        &router,
        post_json("/api/queries", json!({ "queries": ["red shoes", "hats", "hats"] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["count"], 2);

    let (status, body) = send(&router, get("/api/donors?count=10")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["delay"], 600_000);

    let donors = body["donors"].as_array().unwrap();
    assert_eq!(donors.len(), 2);
    assert!(donors
        .iter()
        .all(|d| d.as_str().unwrap().starts_with("https://yandex.ru/search/?text=")));

    // The request was recorded as activity for the peer address
    let active = repo
        .count_active_contributors(Utc::now() - chrono::Duration::hours(1))
        .unwrap();
    assert_eq!(active, 1);
}

#[tokio::test]
async fn test_spoofed_forwarded_header_does_not_inflate_workers() {
    let (repo, router) = app();
    send(&router, post_json("/api/queries", json!({ "queries": ["hats"] }))).await;

    let mut delays = Vec::new();
    for i in 0..20 {
        let (status, body) = send(
            &router,
            get_forwarded("/api/donors", &format!("203.0.113.{i}")),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        delays.push(body["delay"].as_u64().unwrap());
    }

    let active = repo
        .count_active_contributors(Utc::now() - chrono::Duration::hours(1))
        .unwrap();
    assert_eq!(active, 1);
    // Every request after the first sees the same single active worker
    assert!(delays[1..].iter().all(|d| *d == delays[1]));
}

#[tokio::test]
async fn test_forwarded_header_used_behind_trusted_proxy() {
    let server = ServerConfig {
        trust_forwarded_for: true,
        ..ServerConfig::default()
    };
    let (repo, router) = app_with(server);
    send(&router, post_json("/api/queries", json!({ "queries": ["hats"] }))).await;

    for i in 0..3 {
        let (status, _) = send(
            &router,
            get_forwarded("/api/donors", &format!("203.0.113.{i}, 10.0.0.1")),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let active = repo
        .count_active_contributors(Utc::now() - chrono::Duration::hours(1))
        .unwrap();
    assert_eq!(active, 3);
}

#[tokio::test]
async fn test_donors_rejects_non_numeric_count() {
    let (_, router) = app();
    let (status, _) = send(&router, get("/api/donors?count=many")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_accept_then_report() {
    let (repo, router) = app();
    send(&router, post_json("/api/queries", json!({ "queries": ["кроссовки"] }))).await;
    send(&router, post_json("/api/sites", json!({ "sites": ["runlab.ru"] }))).await;

    let (status, body) = send(
        &router,
        post_json(
            "/api/accept",
            json!({
                "url": yandex_url("кроссовки"),
                "text": encoded_fixture("yandex_results.html"),
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true }));

    let pending = repo.pending_captures(10).unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].contributor, "198.51.100.4");
    assert_eq!(pending[0].phrase, "кроссовки");

    ParsePipeline::new(repo.clone(), 10)
        .run_once(Utc::now())
        .unwrap();

    let (status, body) = send(&router, get("/api/result")).await;
    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["site"], "runlab.ru");
    assert_eq!(rows[0]["phrase"], "кроссовки");
    assert_eq!(rows[0]["position"], 1);
    assert_eq!(rows[0]["guarantee"], true);
}

#[tokio::test]
async fn test_accept_rejects_incomplete_submissions() {
    let (repo, router) = app();

    let cases = [
        json!({ "text": "aGk=" }),
        json!({ "url": "https://yandex.ru/search/?text=a" }),
        json!({ "url": "https://yandex.ru/search/?text=a", "text": "" }),
        json!({ "url": "https://yandex.ru/search/?text=a", "text": "@@not-base64@@" }),
    ];

    for case in cases {
        let (status, body) = send(&router, post_json("/api/accept", case.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{case}");
        assert_eq!(body["success"], false, "{case}");
        assert!(body["error"].is_string(), "{case}");
    }

    assert!(repo.pending_captures(10).unwrap().is_empty());
}

#[tokio::test]
async fn test_result_empty_without_captures() {
    let (_, router) = app();
    let (status, body) = send(&router, get("/api/result")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let (_, router) = app();
    let response = router.oneshot(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
