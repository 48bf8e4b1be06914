// SPDX-License-Identifier: MIT
// Copyright 2026 Paceline Authors

//! API input validation tests.

use axum::http::StatusCode;
use serde_json::json;

mod common;

#[tokio::test]
async fn test_negative_steps_rejected() {
    let (app, state, _store) = common::create_test_app();
    let token = common::register_user(&app, &state, "u1", "Ada").await;

    let (status, _) = common::send(
        &app,
        "POST",
        "/api/steps",
        Some(&token),
        Some(json!({ "date_key": "2026-01-20", "steps": -100 })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_date_key_rejected() {
    let (app, state, _store) = common::create_test_app();
    let token = common::register_user(&app, &state, "u1", "Ada").await;

    let (status, _) = common::send(
        &app,
        "POST",
        "/api/steps",
        Some(&token),
        Some(json!({ "date_key": "January 20, 2026", "steps": 100 })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_invalid_leaderboard_date_param_rejected() {
    let (app, state, _store) = common::create_test_app();
    let token = common::register_user(&app, &state, "u1", "Ada").await;

    let (status, _) = common::send(
        &app,
        "GET",
        "/api/leaderboard?period=day&date=tomorrow",
        Some(&token),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_group_scope_requires_group_id() {
    let (app, state, _store) = common::create_test_app();
    let token = common::register_user(&app, &state, "u1", "Ada").await;

    let (status, body) = common::send(
        &app,
        "GET",
        "/api/leaderboard?period=day&scope=group",
        Some(&token),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
}

#[tokio::test]
async fn test_empty_group_name_rejected() {
    let (app, state, _store) = common::create_test_app();
    let token = common::register_user(&app, &state, "u1", "Ada").await;

    let (status, _) = common::send(
        &app,
        "POST",
        "/api/groups",
        Some(&token),
        Some(json!({ "name": "" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_overlong_display_name_rejected() {
    let (app, state, _store) = common::create_test_app();
    let token = common::create_test_jwt("u1", &state.config.jwt_signing_key);

    let (status, _) = common::send(
        &app,
        "POST",
        "/api/me",
        Some(&token),
        Some(json!({ "display_name": "a".repeat(41) })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_period_rejected() {
    let (app, state, _store) = common::create_test_app();
    let token = common::register_user(&app, &state, "u1", "Ada").await;

    let (status, _) = common::send(
        &app,
        "GET",
        "/api/leaderboard?period=fortnight",
        Some(&token),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}
