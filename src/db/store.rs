// SPDX-License-Identifier: MIT
// Copyright 2026 Paceline Authors

//! Document store operations the core needs, behind a trait so services can
//! run against Firestore in production and an in-memory store in tests.

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::{DailyStepRecord, Group, LeaderboardUser, UserProfile};

/// Document store operations over the `users`, `leaderboard` (with its
/// `daily` sub-collection) and `groups` collections.
///
/// Membership data is written as two separate documents (`groups/{g}` and
/// `users/{u}`); implementations do not provide cross-document transactions
/// for them, and readers tolerate one side being stale.
#[async_trait]
pub trait Store: Send + Sync {
    // ─── User Operations ─────────────────────────────────────────

    async fn get_user(&self, user_id: &str) -> Result<Option<UserProfile>, AppError>;

    async fn upsert_user(&self, user: &UserProfile) -> Result<(), AppError>;

    /// Find a user by exact display name (for the uniqueness check).
    async fn find_user_by_display_name(
        &self,
        display_name: &str,
    ) -> Result<Option<UserProfile>, AppError>;

    async fn delete_user(&self, user_id: &str) -> Result<(), AppError>;

    // ─── Leaderboard Operations ──────────────────────────────────

    async fn list_leaderboard_users(&self) -> Result<Vec<LeaderboardUser>, AppError>;

    async fn get_leaderboard_user(
        &self,
        user_id: &str,
    ) -> Result<Option<LeaderboardUser>, AppError>;

    async fn upsert_leaderboard_user(&self, user: &LeaderboardUser) -> Result<(), AppError>;

    async fn delete_leaderboard_user(&self, user_id: &str) -> Result<(), AppError>;

    // ─── Daily Step Operations ───────────────────────────────────

    /// Create or replace the record for one (user, day).
    async fn upsert_daily_steps(
        &self,
        user_id: &str,
        record: &DailyStepRecord,
    ) -> Result<(), AppError>;

    /// Fetch the records for the given date keys. Days with no record are
    /// simply absent from the result. Callers must keep `date_keys` within
    /// [`crate::db::IN_QUERY_LIMIT`].
    async fn daily_steps_in(
        &self,
        user_id: &str,
        date_keys: &[String],
    ) -> Result<Vec<DailyStepRecord>, AppError>;

    /// Delete every daily record for a user. Returns the number removed.
    async fn delete_daily_steps(&self, user_id: &str) -> Result<usize, AppError>;

    // ─── Group Operations ────────────────────────────────────────

    async fn get_group(&self, group_id: &str) -> Result<Option<Group>, AppError>;

    /// Find the live group holding this invite code, if any.
    async fn find_group_by_invite_code(&self, code: &str) -> Result<Option<Group>, AppError>;

    async fn upsert_group(&self, group: &Group) -> Result<(), AppError>;

    async fn delete_group(&self, group_id: &str) -> Result<(), AppError>;
}
