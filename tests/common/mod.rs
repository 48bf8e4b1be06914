// SPDX-License-Identifier: MIT
// Copyright 2026 Paceline Authors

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use paceline::config::Config;
use paceline::db::MemoryStore;
use paceline::middleware::auth::create_jwt;
use paceline::AppState;
use std::sync::Arc;
use tower::ServiceExt;

/// Create a test app over an in-memory store.
/// Returns the router, the shared state, and the store for inspection.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>, Arc<MemoryStore>) {
    let config = Config::default();
    let store = Arc::new(MemoryStore::new());
    let state = Arc::new(AppState::new(config, store.clone()));
    (paceline::routes::create_router(state.clone()), state, store)
}

/// Create a signed session token for a test user.
#[allow(dead_code)]
pub fn create_test_jwt(user_id: &str, signing_key: &[u8]) -> String {
    create_jwt(user_id, false, signing_key).expect("JWT creation should succeed")
}

/// Create a signed anonymous session token.
#[allow(dead_code)]
pub fn create_anonymous_jwt(user_id: &str, signing_key: &[u8]) -> String {
    create_jwt(user_id, true, signing_key).expect("JWT creation should succeed")
}

/// Send a request with an optional bearer token and JSON body.
/// Returns the status and the parsed response body.
#[allow(dead_code)]
pub async fn send(
    app: &axum::Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    };
    (status, json)
}

/// Register a profile for a user and return their token.
#[allow(dead_code)]
pub async fn register_user(
    app: &axum::Router,
    state: &AppState,
    user_id: &str,
    display_name: &str,
) -> String {
    let token = create_test_jwt(user_id, &state.config.jwt_signing_key);
    let (status, _) = send(
        app,
        "POST",
        "/api/me",
        Some(&token),
        Some(serde_json::json!({ "display_name": display_name })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "registration should succeed");
    token
}

/// Record steps for a user through the API.
#[allow(dead_code)]
pub async fn record_steps(app: &axum::Router, token: &str, date_key: &str, steps: i64) {
    let (status, _) = send(
        app,
        "POST",
        "/api/steps",
        Some(token),
        Some(serde_json::json!({ "date_key": date_key, "steps": steps })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "step write should succeed");
}
