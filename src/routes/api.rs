// SPDX-License-Identifier: MIT
// Copyright 2026 Paceline Authors

//! API routes for profiles, step writes, and leaderboard reads.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::leaderboard::Scope;
use crate::models::LeaderboardEntry;
use crate::period::Period;
use crate::time_utils::today_local;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, post, put},
    Extension, Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

/// API routes (require authentication via JWT).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/me", post(register).get(get_me))
        .route("/api/me/name", put(set_display_name))
        .route("/api/me/rank", get(get_my_rank))
        .route("/api/account", delete(delete_account))
        .route("/api/steps", post(record_steps))
        .route("/api/leaderboard", get(get_leaderboard))
        .route(
            "/api/friends/{user_id}",
            post(add_friend).delete(remove_friend),
        )
}

// ─── Profile ─────────────────────────────────────────────────

#[derive(Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 40))]
    pub display_name: String,
}

/// Profile response.
#[derive(Serialize)]
pub struct ProfileResponse {
    pub id: String,
    pub display_name: String,
    pub anonymous: bool,
    pub group_ids: Vec<String>,
    pub friend_ids: Vec<String>,
}

impl From<crate::models::UserProfile> for ProfileResponse {
    fn from(profile: crate::models::UserProfile) -> Self {
        Self {
            id: profile.id,
            display_name: profile.display_name,
            anonymous: profile.anonymous,
            group_ids: profile.group_ids,
            friend_ids: profile.friend_ids,
        }
    }
}

/// Register the profile on first sign-in (idempotent).
async fn register(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<ProfileResponse>> {
    let user_id = user.writer_id()?;
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let profile = state
        .account
        .ensure_user(user_id, &payload.display_name, user.anonymous)
        .await?;
    Ok(Json(profile.into()))
}

/// Get current user profile.
async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<ProfileResponse>> {
    let profile = state.account.get_profile(&user.user_id).await?;
    Ok(Json(profile.into()))
}

#[derive(Deserialize, Validate)]
pub struct RenameRequest {
    #[validate(length(min = 1, max = 40))]
    pub display_name: String,
}

/// Change the display name (unique across users).
async fn set_display_name(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<RenameRequest>,
) -> Result<Json<ProfileResponse>> {
    let user_id = user.writer_id()?;
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let profile = state.account.get_profile(user_id).await?;
    let updated = state
        .account
        .set_display_name(&profile, &payload.display_name)
        .await?;
    Ok(Json(updated.into()))
}

// ─── Account Deletion ────────────────────────────────────────

#[derive(Serialize)]
pub struct DeleteAccountResponse {
    pub deleted_documents: usize,
}

/// Delete the account and all associated data.
async fn delete_account(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<DeleteAccountResponse>> {
    let user_id = user.writer_id()?;
    tracing::info!(user_id, "User-initiated account deletion");

    let profile = state.account.get_profile(user_id).await?;
    let deleted_documents = state.account.delete_account(&profile).await?;

    Ok(Json(DeleteAccountResponse { deleted_documents }))
}

// ─── Step Writes ─────────────────────────────────────────────

#[derive(Deserialize, Validate)]
pub struct RecordStepsRequest {
    /// Calendar day being written, `yyyy-MM-dd`
    pub date_key: String,
    #[validate(range(min = 0))]
    pub steps: i64,
}

#[derive(Serialize)]
pub struct RecordStepsResponse {
    pub date_key: String,
    pub steps: i64,
}

/// Upsert one day of steps for the authenticated user.
async fn record_steps(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<RecordStepsRequest>,
) -> Result<Json<RecordStepsResponse>> {
    let user_id = user.writer_id()?;
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let profile = state.account.get_profile(user_id).await?;
    state
        .leaderboard
        .record_steps(&profile, &payload.date_key, payload.steps)
        .await?;

    Ok(Json(RecordStepsResponse {
        date_key: payload.date_key,
        steps: payload.steps,
    }))
}

// ─── Leaderboard ─────────────────────────────────────────────

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
enum ScopeParam {
    All,
    Friends,
    Group,
}

#[derive(Deserialize)]
struct LeaderboardQuery {
    period: Period,
    /// Reference date, `yyyy-MM-dd`; defaults to today
    date: Option<String>,
    scope: Option<ScopeParam>,
    group_id: Option<String>,
}

#[derive(Serialize)]
pub struct LeaderboardResponse {
    pub period: Period,
    pub date: String,
    pub entries: Vec<LeaderboardEntry>,
    pub computed_at: String,
}

pub(crate) fn parse_reference_date(raw: Option<&str>) -> Result<NaiveDate> {
    match raw {
        None => Ok(today_local()),
        Some(raw) => crate::period::parse_date_key(raw).ok_or_else(|| {
            AppError::BadRequest("Invalid 'date' parameter: must be yyyy-MM-dd".to_string())
        }),
    }
}

/// Ranked leaderboard for a period, date, and scope.
async fn get_leaderboard(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<LeaderboardQuery>,
) -> Result<Json<LeaderboardResponse>> {
    let reference = parse_reference_date(params.date.as_deref())?;

    let scope = match params.scope.unwrap_or(ScopeParam::All) {
        ScopeParam::All => Scope::All,
        ScopeParam::Friends => Scope::Friends {
            // Friends views need a signed-in viewer even though they only read.
            viewer_id: user.writer_id()?.to_string(),
        },
        ScopeParam::Group => {
            let group_id = params.group_id.ok_or_else(|| {
                AppError::BadRequest("'group_id' is required for scope=group".to_string())
            })?;
            Scope::Group { group_id }
        }
    };

    tracing::debug!(
        user_id = %user.user_id,
        period = ?params.period,
        date = %reference,
        scope = ?scope,
        "Computing leaderboard"
    );

    let snapshot = state
        .leaderboard
        .refresh(params.period, reference, scope)
        .await?;

    Ok(Json(LeaderboardResponse {
        period: params.period,
        date: crate::period::date_key(reference),
        entries: snapshot.entries.clone(),
        computed_at: snapshot.computed_at.clone(),
    }))
}

#[derive(Deserialize)]
struct RankQuery {
    period: Period,
    date: Option<String>,
}

#[derive(Serialize)]
pub struct RankResponse {
    /// 1-based rank on the all-users board; absent when the user has no
    /// leaderboard presence
    pub rank: Option<u32>,
}

/// Current user's global rank.
async fn get_my_rank(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<RankQuery>,
) -> Result<Json<RankResponse>> {
    let reference = parse_reference_date(params.date.as_deref())?;
    let rank = state
        .leaderboard
        .current_user_rank(params.period, reference, &user.user_id)
        .await?;
    Ok(Json(RankResponse { rank }))
}

// ─── Friends ─────────────────────────────────────────────────

/// Add a friend by user id.
async fn add_friend(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(friend_id): Path<String>,
) -> Result<Json<ProfileResponse>> {
    let user_id = user.writer_id()?;
    let profile = state.account.get_profile(user_id).await?;
    let updated = state.account.add_friend(&profile, &friend_id).await?;
    Ok(Json(updated.into()))
}

/// Remove a friend by user id.
async fn remove_friend(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(friend_id): Path<String>,
) -> Result<Json<ProfileResponse>> {
    let user_id = user.writer_id()?;
    let profile = state.account.get_profile(user_id).await?;
    let updated = state.account.remove_friend(&profile, &friend_id).await?;
    Ok(Json(updated.into()))
}
