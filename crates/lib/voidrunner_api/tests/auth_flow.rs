//! Integration tests: drive the router end to end against the in-memory store.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use chrono::Duration;
use serde_json::{Value, json};
use tower::ServiceExt;
use voidrunner_api::{AppState, router};
use voidrunner_core::auth::clock::ManualClock;
use voidrunner_core::auth::jwt::TokenManager;
use voidrunner_core::store::MemoryCredentialStore;

fn app_with_clock(clock: Arc<ManualClock>) -> Router {
    let tokens = Arc::new(TokenManager::with_clock(
        b"integration-secret",
        Duration::hours(1),
        clock,
    ));
    let store = Arc::new(MemoryCredentialStore::new());
    router(AppState::new(store, tokens))
}

fn app() -> Router {
    app_with_clock(Arc::new(ManualClock::at(1_700_000_000)))
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.clone().oneshot(req).await.expect("request");
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("parse JSON")
    };
    (status, body)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn with_bearer(method: &str, uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

async fn register_alice(app: &Router) -> Value {
    let (status, body) = send(
        app,
        post_json(
            "/api/v1/register",
            json!({"username": "alice", "email": "alice@x.com", "password": "pw123", "first_name": "Alice"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body
}

async fn login(app: &Router, identifier: &str, password: &str) -> (StatusCode, Value) {
    send(
        app,
        post_json(
            "/api/v1/login",
            json!({"identifier": identifier, "password": password}),
        ),
    )
    .await
}

#[tokio::test]
async fn welcome_is_public() {
    let app = app();
    let req = Request::builder()
        .uri("/api/v1/welcome")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Welcome to the VoidRunner API");
}

#[tokio::test]
async fn register_returns_public_user() {
    let app = app();
    let user = register_alice(&app).await;
    assert_eq!(user["username"], "alice");
    assert_eq!(user["email"], "alice@x.com");
    assert_eq!(user["first_name"], "Alice");
    assert!(user.get("password_hash").is_none());
    assert!(user.get("password").is_none());
}

#[tokio::test]
async fn duplicate_username_is_conflict() {
    let app = app();
    register_alice(&app).await;

    let (status, body) = send(
        &app,
        post_json(
            "/api/v1/register",
            json!({"username": "alice", "email": "other@x.com", "password": "pw999"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "User already exists");
}

#[tokio::test]
async fn register_validation_and_bad_body() {
    let app = app();
    let (status, body) = send(
        &app,
        post_json(
            "/api/v1/register",
            json!({"username": "", "email": "a@x.com", "password": "pw"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");

    let req = Request::builder()
        .method("POST")
        .uri("/api/v1/register")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid request body");
}

#[tokio::test]
async fn login_with_username_or_email_and_reach_protected_route() {
    let app = app();
    let registered = register_alice(&app).await;

    for identifier in ["alice", "alice@x.com"] {
        let (status, body) = login(&app, identifier, "pw123").await;
        assert_eq!(status, StatusCode::OK, "{identifier}: {body}");
        assert_eq!(body["user"]["id"], registered["id"]);

        let token = body["token"].as_str().expect("token");
        let (status, me) = send(&app, with_bearer("GET", "/api/v1/me", token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(me["username"], "alice");
    }
}

#[tokio::test]
async fn bad_login_attempts_are_indistinguishable() {
    let app = app();
    register_alice(&app).await;

    let wrong_password = login(&app, "alice", "wrongpw").await;
    let unknown_user = login(&app, "nobody", "whatever").await;

    assert_eq!(wrong_password.0, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password, unknown_user);
}

#[tokio::test]
async fn gate_rejects_missing_malformed_and_foreign_tokens() {
    let app = app();

    let req = Request::builder()
        .uri("/api/v1/me")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Authorization header required");

    let req = Request::builder()
        .uri("/api/v1/me")
        .header(header::AUTHORIZATION, "Token abc")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid authorization header format");

    let (status, body) = send(&app, with_bearer("GET", "/api/v1/me", "invalid.token.here")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid token");

    let foreign = TokenManager::new(b"other-secret", Duration::hours(1))
        .issue(1, "alice", "alice@x.com")
        .unwrap();
    let (status, body) = send(&app, with_bearer("GET", "/api/v1/me", &foreign)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid token");
}

#[tokio::test]
async fn logout_revokes_token_and_is_idempotent() {
    let app = app();
    register_alice(&app).await;
    let (_, body) = login(&app, "alice", "pw123").await;
    let token = body["token"].as_str().expect("token").to_string();

    let (status, _) = send(&app, with_bearer("POST", "/api/v1/logout", &token)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, with_bearer("GET", "/api/v1/me", &token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid token");

    let (status, _) = send(&app, with_bearer("POST", "/api/v1/logout", &token)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn logout_requires_a_parseable_bearer_token() {
    let app = app();

    let req = Request::builder()
        .method("POST")
        .uri("/api/v1/logout")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Authorization header required");

    let (status, body) = send(&app, with_bearer("POST", "/api/v1/logout", "garbage")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid token");
}

#[tokio::test]
async fn expired_token_is_reported_as_expired_but_can_still_log_out() {
    let clock = Arc::new(ManualClock::at(1_700_000_000));
    let app = app_with_clock(clock.clone());
    register_alice(&app).await;
    let (_, body) = login(&app, "alice", "pw123").await;
    let token = body["token"].as_str().expect("token").to_string();

    clock.advance(Duration::hours(1) + Duration::seconds(1));

    let (status, body) = send(&app, with_bearer("GET", "/api/v1/me", &token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Token has expired");

    let (status, _) = send(&app, with_bearer("POST", "/api/v1/logout", &token)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}
