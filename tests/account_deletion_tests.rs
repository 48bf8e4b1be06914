// SPDX-License-Identifier: MIT
// Copyright 2026 Paceline Authors

//! Account deletion cascade behavior.

use axum::http::StatusCode;
use paceline::db::Store;
use serde_json::json;

mod common;

#[tokio::test]
async fn test_deletion_removes_all_user_data() {
    let (app, state, store) = common::create_test_app();
    let ada = common::register_user(&app, &state, "u1", "Ada").await;
    let ben = common::register_user(&app, &state, "u2", "Ben").await;

    common::record_steps(&app, &ada, "2026-01-19", 1000).await;
    common::record_steps(&app, &ada, "2026-01-20", 2000).await;
    common::record_steps(&app, &ben, "2026-01-20", 7000).await;

    // Ada joins Ben's group.
    let (_, group) = common::send(
        &app,
        "POST",
        "/api/groups",
        Some(&ben),
        Some(json!({ "name": "Ben's Club" })),
    )
    .await;
    common::send(
        &app,
        "POST",
        "/api/groups/join",
        Some(&ada),
        Some(json!({ "reference": group["invite_code"].as_str().unwrap() })),
    )
    .await;

    let (status, body) = common::send(&app, "DELETE", "/api/account", Some(&ada), None).await;
    assert_eq!(status, StatusCode::OK);
    // 2 daily records + leaderboard doc + profile
    assert_eq!(body["deleted_documents"], 4);

    assert!(store.get_user("u1").await.unwrap().is_none());
    assert!(store.get_leaderboard_user("u1").await.unwrap().is_none());
    assert_eq!(store.daily_record_count("u1"), 0);

    // Ben's group lives on without Ada.
    let remaining = store
        .get_group(group["id"].as_str().unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(remaining.member_ids, vec!["u2".to_string()]);

    // The deleted user no longer appears on the board.
    let (_, board) = common::send(
        &app,
        "GET",
        "/api/leaderboard?period=day&date=2026-01-20",
        Some(&ben),
        None,
    )
    .await;
    let entries = board["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["user_id"], "u2");
}

#[tokio::test]
async fn test_deletion_blocked_for_admin_with_remaining_members() {
    let (app, state, store) = common::create_test_app();
    let ada = common::register_user(&app, &state, "u1", "Ada").await;
    let ben = common::register_user(&app, &state, "u2", "Ben").await;

    let (_, group) = common::send(
        &app,
        "POST",
        "/api/groups",
        Some(&ada),
        Some(json!({ "name": "Ada's Club" })),
    )
    .await;
    common::send(
        &app,
        "POST",
        "/api/groups/join",
        Some(&ben),
        Some(json!({ "reference": group["invite_code"].as_str().unwrap() })),
    )
    .await;

    let (status, body) = common::send(&app, "DELETE", "/api/account", Some(&ada), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "admin_must_transfer_ownership");

    // Nothing was deleted.
    assert!(store.get_user("u1").await.unwrap().is_some());
    assert!(store
        .get_group(group["id"].as_str().unwrap())
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn test_deletion_takes_sole_member_groups_along() {
    let (app, state, store) = common::create_test_app();
    let ada = common::register_user(&app, &state, "u1", "Ada").await;

    let (_, group) = common::send(
        &app,
        "POST",
        "/api/groups",
        Some(&ada),
        Some(json!({ "name": "Solo" })),
    )
    .await;

    let (status, _) = common::send(&app, "DELETE", "/api/account", Some(&ada), None).await;
    assert_eq!(status, StatusCode::OK);

    assert!(store
        .get_group(group["id"].as_str().unwrap())
        .await
        .unwrap()
        .is_none());
}
