//! Test utilities and common setup.

#![allow(dead_code, clippy::field_reassign_with_default)]

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use serde_json::Value;
use tower::ServiceExt;

use spicerack::api;
use spicerack::config::AppConfig;
use spicerack::db::Database;
use spicerack::server;

/// JWT secret shared by the test app and tests that mint their own tokens.
pub const TEST_SECRET: &str = "test-secret-for-integration-tests-minimum-32-chars";

fn test_config(catalog_requires_auth: bool) -> AppConfig {
    let mut config = AppConfig::default();
    config.auth.jwt_secret = Some(TEST_SECRET.to_string());
    config.auth.bcrypt_cost = 4;
    config.catalog.require_auth = catalog_requires_auth;
    config
}

/// Create a test application backed by an in-memory database.
pub async fn test_app() -> Router {
    build(test_config(false)).await
}

/// Create a test application whose product catalog requires authentication.
pub async fn test_app_with_private_catalog() -> Router {
    build(test_config(true)).await
}

async fn build(config: AppConfig) -> Router {
    let db = Database::in_memory().await.unwrap();
    let state = server::build_state(&config, &db).unwrap();
    api::create_router(state)
}

/// Send a request and decode the JSON response body (`Null` if empty).
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().uri(uri).method(method);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(serde_json::to_vec(&json).unwrap())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

/// Register `email` and log in, returning the session token.
pub async fn register_and_login(app: &Router, email: &str, password: &str) -> String {
    let credentials = serde_json::json!({ "email": email, "password": password });

    let (status, _) = send(
        app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(credentials.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(app, Method::POST, "/api/auth/login", None, Some(credentials)).await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}
