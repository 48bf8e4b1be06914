// SPDX-License-Identifier: MIT
// Copyright 2026 Paceline Authors

//! API routes for competitive groups.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{Group, LeaderboardEntry, UserProfile};
use crate::period::{self, Period};
use crate::routes::api::parse_reference_date;
use crate::services::LeaveOutcome;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::{get, post, put},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

/// Group routes (require authentication via JWT).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/groups", post(create_group).get(list_groups))
        .route("/api/groups/join", post(join_group))
        .route(
            "/api/groups/{id}",
            put(update_group).delete(delete_group),
        )
        .route("/api/groups/{id}/leave", post(leave_group))
        .route("/api/groups/{id}/stats", get(group_stats))
}

// ─── Responses ───────────────────────────────────────────────

#[derive(Serialize)]
pub struct GroupResponse {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub admin_id: String,
    pub invite_code: String,
    pub member_ids: Vec<String>,
    pub share_link: String,
    pub created_at: String,
}

impl GroupResponse {
    fn from_group(group: Group, scheme: &str) -> Self {
        let share_link = group.share_link(scheme);
        Self {
            id: group.id,
            name: group.name,
            description: group.description,
            admin_id: group.admin_id,
            invite_code: group.invite_code,
            member_ids: group.member_ids,
            share_link,
            created_at: group.created_at,
        }
    }
}

async fn writer_profile(state: &AppState, user: &AuthUser) -> Result<UserProfile> {
    let user_id = user.writer_id()?;
    state.account.get_profile(user_id).await
}

// ─── Lifecycle ───────────────────────────────────────────────

#[derive(Deserialize, Validate)]
pub struct CreateGroupRequest {
    #[validate(length(min = 1, max = 60))]
    pub name: String,
    #[validate(length(max = 200))]
    pub description: Option<String>,
}

/// Create a group; the caller becomes its admin.
async fn create_group(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<CreateGroupRequest>,
) -> Result<Json<GroupResponse>> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let profile = writer_profile(&state, &user).await?;
    let group = state
        .groups
        .create_group(&profile, &payload.name, payload.description)
        .await?;
    Ok(Json(GroupResponse::from_group(
        group,
        &state.config.deep_link_scheme,
    )))
}

#[derive(Deserialize)]
pub struct JoinGroupRequest {
    /// Bare invite code, deep link, or a whole pasted share message
    pub reference: String,
}

/// Join a group by invite reference.
async fn join_group(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<JoinGroupRequest>,
) -> Result<Json<GroupResponse>> {
    let profile = writer_profile(&state, &user).await?;
    let group = state
        .groups
        .join_by_invite_code(&profile, &payload.reference)
        .await?;
    Ok(Json(GroupResponse::from_group(
        group,
        &state.config.deep_link_scheme,
    )))
}

#[derive(Serialize)]
pub struct LeaveGroupResponse {
    pub left: bool,
    /// Set when the sole-member admin left and the group was deleted
    pub group_deleted: bool,
}

/// Leave a group.
async fn leave_group(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(group_id): Path<String>,
) -> Result<Json<LeaveGroupResponse>> {
    let profile = writer_profile(&state, &user).await?;
    let outcome = state.groups.leave_group(&profile, &group_id).await?;
    Ok(Json(LeaveGroupResponse {
        left: true,
        group_deleted: outcome == LeaveOutcome::GroupDeleted,
    }))
}

#[derive(Serialize)]
pub struct DeleteGroupResponse {
    pub deleted: bool,
}

/// Delete a group (admin only).
async fn delete_group(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(group_id): Path<String>,
) -> Result<Json<DeleteGroupResponse>> {
    let profile = writer_profile(&state, &user).await?;
    state.groups.delete_group(&profile, &group_id).await?;
    Ok(Json(DeleteGroupResponse { deleted: true }))
}

#[derive(Deserialize, Validate)]
pub struct UpdateGroupRequest {
    #[validate(length(min = 1, max = 60))]
    pub name: String,
    #[validate(length(max = 200))]
    pub description: Option<String>,
}

/// Rename a group and replace its description (admin only).
async fn update_group(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(group_id): Path<String>,
    Json(payload): Json<UpdateGroupRequest>,
) -> Result<Json<GroupResponse>> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let profile = writer_profile(&state, &user).await?;
    let group = state
        .groups
        .rename_group(&profile, &group_id, &payload.name, payload.description)
        .await?;
    Ok(Json(GroupResponse::from_group(
        group,
        &state.config.deep_link_scheme,
    )))
}

// ─── Queries ─────────────────────────────────────────────────

/// Groups the current user belongs to.
async fn list_groups(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<GroupResponse>>> {
    let profile = state.account.get_profile(&user.user_id).await?;
    let groups = state.groups.groups_for(&profile).await?;
    Ok(Json(
        groups
            .into_iter()
            .map(|g| GroupResponse::from_group(g, &state.config.deep_link_scheme))
            .collect(),
    ))
}

#[derive(Deserialize)]
struct GroupStatsQuery {
    period: Period,
    date: Option<String>,
}

#[derive(Serialize)]
pub struct GroupStatsResponse {
    pub group_id: String,
    pub period: Period,
    pub date: String,
    pub entries: Vec<LeaderboardEntry>,
}

/// Members of a group ranked over the requested period.
async fn group_stats(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(group_id): Path<String>,
    Query(params): Query<GroupStatsQuery>,
) -> Result<Json<GroupStatsResponse>> {
    tracing::debug!(
        user_id = %user.user_id,
        %group_id,
        period = ?params.period,
        "Computing group stats"
    );

    let reference = parse_reference_date(params.date.as_deref())?;
    let date_keys = period::date_keys(params.period, reference, state.config.week_start);
    let entries = state.groups.members_with_stats(&group_id, &date_keys).await?;

    Ok(Json(GroupStatsResponse {
        group_id,
        period: params.period,
        date: period::date_key(reference),
        entries,
    }))
}
