//! Router-level tests driving the full axum application over the
//! in-memory store.

#![allow(clippy::panic)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;

use merkibocou::api::build_app;
use merkibocou::app_state::AppState;
use merkibocou::config::ServerConfig;
use merkibocou::notify::LogTransport;
use merkibocou::persistence::{DigestSource, InMemoryStore, Store};

const CRON_SECRET: &str = "cron-secret";

fn app() -> Router {
    let Ok(config) = ServerConfig::from_source(|key| match key {
        "JWT_SECRET_KEY" => Some("jwt-secret".to_string()),
        "CRON_SECRET_KEY" => Some(CRON_SECRET.to_string()),
        "PERSISTENCE_ENABLED" => Some("false".to_string()),
        _ => None,
    }) else {
        panic!("test configuration should load");
    };
    let store = Arc::new(InMemoryStore::new());
    let state = AppState::new(
        &config,
        Arc::clone(&store) as Arc<dyn Store>,
        store as Arc<dyn DigestSource>,
        Arc::new(LogTransport),
    );
    build_app(state)
}

async fn call(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    let Ok(request) = builder.body(body) else {
        panic!("request should build");
    };
    let Ok(response) = app.clone().oneshot(request).await else {
        panic!("router is infallible");
    };
    let status = response.status();
    let Ok(bytes) = axum::body::to_bytes(response.into_body(), usize::MAX).await else {
        panic!("body should be readable");
    };
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn register_and_login(app: &Router, username: &str) -> (i64, String) {
    let (status, body) = call(
        app,
        "POST",
        "/developers",
        None,
        Some(json!({
            "username": username,
            "password": "password123",
            "email": format!("{username}@example.org"),
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let Some(id) = body["id"].as_i64() else {
        panic!("id missing: {body}");
    };

    let (status, body) = call(
        app,
        "POST",
        "/developers/login",
        None,
        Some(json!({ "username": username, "password": "password123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token_type"], "bearer");
    let Some(token) = body["access_token"].as_str() else {
        panic!("token missing: {body}");
    };
    (id, token.to_string())
}

async fn create_project(app: &Router, token: &str, name: &str) -> i64 {
    let (status, body) = call(
        app,
        "POST",
        "/projects",
        Some(token),
        Some(json!({ "name": name })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let Some(id) = body["id"].as_i64() else {
        panic!("project id missing: {body}");
    };
    id
}

#[tokio::test]
async fn health_is_public() {
    let app = app();
    let (status, body) = call(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = app();
    let (status, body) = call(&app, "GET", "/api-docs/openapi.json", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/triggerwebcron"].is_object());
}

#[tokio::test]
async fn registration_and_login_errors() {
    let app = app();
    register_and_login(&app, "ada").await;

    let (status, body) = call(
        &app,
        "POST",
        "/developers",
        None,
        Some(json!({ "username": "ada", "password": "password123", "email": "x@example.org" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], 1002);

    let (status, body) = call(
        &app,
        "POST",
        "/developers/login",
        None,
        Some(json!({ "username": "ada", "password": "not-the-password" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], 1101);
}

#[tokio::test]
async fn profile_requires_a_valid_token() {
    let app = app();
    let (status, body) = call(&app, "GET", "/developers/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], 1102);

    let (status, _) = call(&app, "GET", "/developers/me", Some("forged.token.value"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (id, token) = register_and_login(&app, "ada").await;
    let (status, body) = call(&app, "GET", "/developers/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], id);
    assert_eq!(body["instantMessages"], true);
    assert_eq!(body["instantThankYou"], false);
    assert_eq!(body["summaryFrequency"], "daily");
}

#[tokio::test]
async fn preferences_update_partially() {
    let app = app();
    let (_, token) = register_and_login(&app, "ada").await;

    let (status, body) = call(
        &app,
        "PATCH",
        "/developers/me/preferences",
        Some(&token),
        Some(json!({ "summaryFrequency": "none", "instantThankYou": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["summaryFrequency"], "none");
    assert_eq!(body["instantThankYou"], true);
    assert_eq!(body["instantMessages"], true);
}

#[tokio::test]
async fn feedback_flows_into_the_dashboard() {
    let app = app();
    let (dev_id, token) = register_and_login(&app, "ada").await;
    let project_id = create_project(&app, &token, "my-lib").await;

    let (status, _) = call(
        &app,
        "POST",
        "/projects",
        Some(&token),
        Some(json!({ "name": "my-lib" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = call(
        &app,
        "POST",
        "/thank-you",
        None,
        Some(json!({ "projectName": "my-lib", "devId": dev_id, "userId": "anon_1", "clicks": 4 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["count"], 4);

    let (status, _) = call(
        &app,
        "POST",
        "/send-message",
        None,
        Some(json!({ "projectName": "my-lib", "devId": dev_id, "userId": "anon_1", "message": "thanks!" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = call(&app, "GET", "/projects", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["name"], "my-lib");
    assert_eq!(body[0]["dev_id"], dev_id);

    let (status, body) = call(&app, "GET", "/projects/summary", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["totalClicks"], 4);
    assert_eq!(body[0]["lastMessage"]["content"], "thanks!");

    let uri = format!("/projects/{project_id}/stats");
    let (status, body) = call(&app, "GET", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["project_name"], "my-lib");
    assert_eq!(body["total_clicks"], 4);
    assert_eq!(body["messages"], json!(["thanks!"]));

    let uri = format!("/projects/{project_id}/details");
    let (status, body) = call(&app, "GET", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["recentClicks"][0]["clicks"], 4);
    assert_eq!(body["recentClicks"][0]["userId"], "anon_1");
    assert_eq!(body["recentMessages"][0]["message"], "thanks!");
}

#[tokio::test]
async fn feedback_errors() {
    let app = app();
    let (dev_id, token) = register_and_login(&app, "ada").await;
    create_project(&app, &token, "my-lib").await;

    let (status, body) = call(
        &app,
        "POST",
        "/thank-you",
        None,
        Some(json!({ "projectName": "unknown", "devId": dev_id, "userId": "anon_1", "clicks": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], 2001);

    let (status, _) = call(
        &app,
        "POST",
        "/thank-you",
        None,
        Some(json!({ "projectName": "my-lib", "devId": dev_id, "userId": "anon_1", "clicks": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call(
        &app,
        "POST",
        "/send-message",
        None,
        Some(json!({ "projectName": "my-lib", "devId": dev_id, "userId": "anon_1", "message": "x".repeat(5001) })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn other_developers_projects_are_forbidden() {
    let app = app();
    let (_, owner) = register_and_login(&app, "owner").await;
    let (_, intruder) = register_and_login(&app, "intruder").await;
    let project_id = create_project(&app, &owner, "secret-project").await;

    for suffix in ["stats", "details"] {
        let uri = format!("/projects/{project_id}/{suffix}");
        let (status, body) = call(&app, "GET", &uri, Some(&intruder), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"]["code"], 1103);
    }
}

#[tokio::test]
async fn cron_trigger_checks_the_secret() {
    let app = app();
    let (status, _) = call(&app, "GET", "/triggerwebcron?secret=guess", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let uri = format!("/triggerwebcron?secret={CRON_SECRET}");
    let (status, body) = call(&app, "GET", &uri, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!(true));
}
