//! End-to-end tests driving the axum router: login, the access guard,
//! and the guarded user CRUD surface.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        Request, StatusCode,
    },
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use uzanto::api::{router, ApiContext};
use uzanto::auth::token::TokenCodec;
use uzanto::users::memory::MemoryStore;

fn test_app() -> (ApiContext, Router) {
    let ctx = ApiContext::new(
        Arc::new(MemoryStore::new()),
        Arc::new(TokenCodec::new("test-secret", 7200)),
    );
    let app = router(ctx.clone());
    (ctx, app)
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn empty_request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn login_token(app: &Router, username: &str, password: &str) -> String {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/v1/login",
            None,
            json!({"username": username, "password": password}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn guard_rejects_missing_invalid_and_expired_tokens() {
    let (ctx, app) = test_app();

    // No token at all.
    let response = app
        .clone()
        .oneshot(empty_request("GET", "/v1/users", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Garbage token.
    let response = app
        .clone()
        .oneshot(empty_request("GET", "/v1/users", Some("not-a-token")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Well-signed but already expired.
    let expired = ctx.tokens.issue("admin", -1).unwrap();
    let response = app
        .oneshot(empty_request("GET", "/v1/users", Some(&expired)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_failures_are_indistinguishable() {
    let (ctx, app) = test_app();
    ctx.directory
        .create("admin", "admin@example.com", "secret1")
        .await
        .unwrap();

    let wrong_password = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/v1/login",
            None,
            json!({"username": "admin", "password": "wrong"}),
        ))
        .await
        .unwrap();
    let unknown_user = app
        .oneshot(json_request(
            "POST",
            "/v1/login",
            None,
            json!({"username": "nobody", "password": "secret1"}),
        ))
        .await
        .unwrap();

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_user.status(), StatusCode::UNAUTHORIZED);

    // Identical bodies: nothing distinguishes a lookup miss from a
    // password mismatch.
    let first = to_bytes(wrong_password.into_body(), usize::MAX).await.unwrap();
    let second = to_bytes(unknown_user.into_body(), usize::MAX).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn end_to_end_create_login_admit_delete() {
    let (ctx, app) = test_app();
    ctx.directory
        .create("admin", "admin@example.com", "secret1")
        .await
        .unwrap();

    let token = login_token(&app, "admin", "secret1").await;
    assert_eq!(ctx.tokens.verify(&token).unwrap(), "admin");

    // Guarded create of bob.
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/v1/users",
            Some(&token),
            json!({"username": "bob", "email": "bob@x.com", "password": "secret1"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let bob = body_json(response).await;
    assert_eq!(bob["username"], "bob");
    assert_ne!(bob["password_hash"], "secret1");
    let bob_id = bob["id"].as_str().unwrap().to_string();

    // Admitted read.
    let response = app
        .clone()
        .oneshot(empty_request(
            "GET",
            &format!("/v1/users/{bob_id}"),
            Some(&token),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Delete, then the id no longer resolves.
    let response = app
        .clone()
        .oneshot(empty_request(
            "DELETE",
            &format!("/v1/users/{bob_id}"),
            Some(&token),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .oneshot(empty_request(
            "GET",
            &format!("/v1/users/{bob_id}"),
            Some(&token),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn create_conflicts_map_to_409_with_field() {
    let (ctx, app) = test_app();
    ctx.directory
        .create("admin", "admin@example.com", "secret1")
        .await
        .unwrap();
    let token = login_token(&app, "admin", "secret1").await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/v1/users",
            Some(&token),
            json!({"username": "admin", "email": "other@example.com", "password": "secret1"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], b"username already exists");

    let response = app
        .oneshot(json_request(
            "POST",
            "/v1/users",
            Some(&token),
            json!({"username": "other", "email": "admin@example.com", "password": "secret1"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], b"email already exists");
}

#[tokio::test]
async fn malformed_input_maps_to_400() {
    let (ctx, app) = test_app();
    ctx.directory
        .create("admin", "admin@example.com", "secret1")
        .await
        .unwrap();
    let token = login_token(&app, "admin", "secret1").await;

    // Invalid email shape never reaches the store.
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/v1/users",
            Some(&token),
            json!({"username": "bob", "email": "not-an-email", "password": "secret1"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Unparseable id.
    let response = app
        .oneshot(empty_request("GET", "/v1/users/not-a-uuid", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn update_with_own_values_is_not_a_conflict() {
    let (ctx, app) = test_app();
    let alice = ctx
        .directory
        .create("alice", "alice@example.com", "secret1")
        .await
        .unwrap();
    let token = login_token(&app, "alice", "secret1").await;

    let response = app
        .oneshot(json_request(
            "PUT",
            &format!("/v1/users/{}", alice.id),
            Some(&token),
            json!({"username": "alice", "email": "alice@example.com", "password": "secret1"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn health_is_open_and_stamped() {
    let (_ctx, app) = test_app();

    let response = app
        .oneshot(empty_request("GET", "/health", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("X-App"));

    let body = body_json(response).await;
    assert_eq!(body["name"], env!("CARGO_PKG_NAME"));
}
