// SPDX-License-Identifier: MIT
// Copyright 2026 Paceline Authors

//! In-memory store backend for tests and local development.
//!
//! Mirrors the document layout of the Firestore backend: leaderboard
//! documents keyed by user id with daily records keyed by (user, date key),
//! plus `users` and `groups` maps.

use async_trait::async_trait;
use dashmap::{DashMap, DashSet};

use crate::db::Store;
use crate::error::AppError;
use crate::models::{DailyStepRecord, Group, LeaderboardUser, UserProfile};

/// Process-local document store.
#[derive(Default)]
pub struct MemoryStore {
    users: DashMap<String, UserProfile>,
    board: DashMap<String, LeaderboardUser>,
    daily: DashMap<(String, String), DailyStepRecord>,
    groups: DashMap<String, Group>,
    /// Users whose daily reads fail, for exercising the aggregation
    /// omission policy in tests.
    failing_daily_reads: DashSet<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every daily-step read for `user_id` return a database error.
    pub fn fail_daily_reads_for(&self, user_id: &str) {
        self.failing_daily_reads.insert(user_id.to_string());
    }

    /// Number of daily records stored for a user (test inspection).
    pub fn daily_record_count(&self, user_id: &str) -> usize {
        self.daily
            .iter()
            .filter(|entry| entry.key().0 == user_id)
            .count()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get_user(&self, user_id: &str) -> Result<Option<UserProfile>, AppError> {
        Ok(self.users.get(user_id).map(|u| u.clone()))
    }

    async fn upsert_user(&self, user: &UserProfile) -> Result<(), AppError> {
        self.users.insert(user.id.clone(), user.clone());
        Ok(())
    }

    async fn find_user_by_display_name(
        &self,
        display_name: &str,
    ) -> Result<Option<UserProfile>, AppError> {
        Ok(self
            .users
            .iter()
            .find(|u| u.display_name == display_name)
            .map(|u| u.clone()))
    }

    async fn delete_user(&self, user_id: &str) -> Result<(), AppError> {
        self.users.remove(user_id);
        Ok(())
    }

    async fn list_leaderboard_users(&self) -> Result<Vec<LeaderboardUser>, AppError> {
        Ok(self.board.iter().map(|u| u.clone()).collect())
    }

    async fn get_leaderboard_user(
        &self,
        user_id: &str,
    ) -> Result<Option<LeaderboardUser>, AppError> {
        Ok(self.board.get(user_id).map(|u| u.clone()))
    }

    async fn upsert_leaderboard_user(&self, user: &LeaderboardUser) -> Result<(), AppError> {
        self.board.insert(user.user_id.clone(), user.clone());
        Ok(())
    }

    async fn delete_leaderboard_user(&self, user_id: &str) -> Result<(), AppError> {
        self.board.remove(user_id);
        Ok(())
    }

    async fn upsert_daily_steps(
        &self,
        user_id: &str,
        record: &DailyStepRecord,
    ) -> Result<(), AppError> {
        self.daily.insert(
            (user_id.to_string(), record.date_key.clone()),
            record.clone(),
        );
        Ok(())
    }

    async fn daily_steps_in(
        &self,
        user_id: &str,
        date_keys: &[String],
    ) -> Result<Vec<DailyStepRecord>, AppError> {
        if self.failing_daily_reads.contains(user_id) {
            return Err(AppError::Database(format!(
                "injected failure for {}",
                user_id
            )));
        }
        Ok(date_keys
            .iter()
            .filter_map(|key| {
                self.daily
                    .get(&(user_id.to_string(), key.clone()))
                    .map(|r| r.clone())
            })
            .collect())
    }

    async fn delete_daily_steps(&self, user_id: &str) -> Result<usize, AppError> {
        let keys: Vec<(String, String)> = self
            .daily
            .iter()
            .filter(|entry| entry.key().0 == user_id)
            .map(|entry| entry.key().clone())
            .collect();
        let removed = keys.len();
        for key in keys {
            self.daily.remove(&key);
        }
        Ok(removed)
    }

    async fn get_group(&self, group_id: &str) -> Result<Option<Group>, AppError> {
        Ok(self.groups.get(group_id).map(|g| g.clone()))
    }

    async fn find_group_by_invite_code(&self, code: &str) -> Result<Option<Group>, AppError> {
        Ok(self
            .groups
            .iter()
            .find(|g| g.invite_code == code)
            .map(|g| g.clone()))
    }

    async fn upsert_group(&self, group: &Group) -> Result<(), AppError> {
        self.groups.insert(group.id.clone(), group.clone());
        Ok(())
    }

    async fn delete_group(&self, group_id: &str) -> Result<(), AppError> {
        self.groups.remove(group_id);
        Ok(())
    }
}
