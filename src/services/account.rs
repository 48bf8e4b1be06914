// SPDX-License-Identifier: MIT
// Copyright 2026 Paceline Authors

//! Account lifecycle: profile registration, display names, friend lists,
//! and the full deletion cascade.

use std::sync::Arc;

use crate::db::Store;
use crate::error::{AppError, Result};
use crate::models::UserProfile;
use crate::time_utils::now_rfc3339;

pub struct AccountService {
    store: Arc<dyn Store>,
}

impl AccountService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    // ─── Registration ────────────────────────────────────────────

    /// Fetch the profile for a signed-in user, creating it on first sign-in.
    /// Creation enforces display-name uniqueness; an existing profile is
    /// returned as-is (renames go through `set_display_name`).
    pub async fn ensure_user(
        &self,
        user_id: &str,
        display_name: &str,
        anonymous: bool,
    ) -> Result<UserProfile> {
        if user_id.is_empty() {
            return Err(AppError::NotAuthenticated);
        }
        if let Some(existing) = self.store.get_user(user_id).await? {
            return Ok(existing);
        }

        let display_name = display_name.trim();
        if display_name.is_empty() {
            return Err(AppError::BadRequest(
                "Display name must not be empty".to_string(),
            ));
        }
        self.check_name_available(display_name, user_id).await?;

        let profile = UserProfile {
            id: user_id.to_string(),
            display_name: display_name.to_string(),
            anonymous,
            group_ids: vec![],
            friend_ids: vec![],
            created_at: now_rfc3339(),
        };
        self.store.upsert_user(&profile).await?;

        tracing::info!(user_id, "User profile created");
        Ok(profile)
    }

    /// Look up an existing profile.
    pub async fn get_profile(&self, user_id: &str) -> Result<UserProfile> {
        self.store
            .get_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))
    }

    // ─── Display Names ───────────────────────────────────────────

    /// Change a display name, keeping names unique across users. The
    /// denormalized name on the leaderboard document is refreshed too.
    pub async fn set_display_name(
        &self,
        user: &UserProfile,
        new_name: &str,
    ) -> Result<UserProfile> {
        if !user.can_write() {
            return Err(AppError::NotAuthenticated);
        }
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return Err(AppError::BadRequest(
                "Display name must not be empty".to_string(),
            ));
        }
        self.check_name_available(new_name, &user.id).await?;

        let mut profile = self.get_profile(&user.id).await?;
        profile.display_name = new_name.to_string();
        self.store.upsert_user(&profile).await?;

        if let Some(mut board_user) = self.store.get_leaderboard_user(&user.id).await? {
            board_user.name = new_name.to_string();
            board_user.updated_at = now_rfc3339();
            self.store.upsert_leaderboard_user(&board_user).await?;
        }

        Ok(profile)
    }

    /// Fails with `NameAlreadyTaken` when another user holds this name.
    async fn check_name_available(&self, name: &str, for_user_id: &str) -> Result<()> {
        match self.store.find_user_by_display_name(name).await? {
            Some(holder) if holder.id != for_user_id => Err(AppError::NameAlreadyTaken),
            _ => Ok(()),
        }
    }

    // ─── Friends ─────────────────────────────────────────────────

    /// Add a user to the caller's friend list.
    pub async fn add_friend(&self, user: &UserProfile, friend_id: &str) -> Result<UserProfile> {
        if !user.can_write() {
            return Err(AppError::NotAuthenticated);
        }
        if friend_id == user.id {
            return Err(AppError::BadRequest(
                "Cannot add yourself as a friend".to_string(),
            ));
        }
        if self.store.get_user(friend_id).await?.is_none() {
            return Err(AppError::NotFound(format!("User {} not found", friend_id)));
        }

        let mut profile = self.get_profile(&user.id).await?;
        if !profile.friend_ids.iter().any(|id| id == friend_id) {
            profile.friend_ids.push(friend_id.to_string());
            self.store.upsert_user(&profile).await?;
        }
        Ok(profile)
    }

    /// Remove a user from the caller's friend list.
    pub async fn remove_friend(&self, user: &UserProfile, friend_id: &str) -> Result<UserProfile> {
        if !user.can_write() {
            return Err(AppError::NotAuthenticated);
        }
        let mut profile = self.get_profile(&user.id).await?;
        profile.friend_ids.retain(|id| id != friend_id);
        self.store.upsert_user(&profile).await?;
        Ok(profile)
    }

    // ─── Deletion Cascade ────────────────────────────────────────

    /// Delete ALL data for a user: group memberships, daily step records,
    /// the leaderboard document, and the profile itself.
    ///
    /// Admin-owned groups with other members still present block deletion
    /// with `AdminMustTransferOwnership`, checked up front so the cascade
    /// never partially applies for that reason. Sole-member groups are
    /// deleted along with the account.
    ///
    /// Returns the number of documents deleted.
    pub async fn delete_account(&self, user: &UserProfile) -> Result<usize> {
        if !user.can_write() {
            return Err(AppError::NotAuthenticated);
        }
        let profile = self.get_profile(&user.id).await?;

        // Resolve memberships first; dangling references are skipped.
        let mut groups = Vec::new();
        for group_id in &profile.group_ids {
            if let Some(group) = self.store.get_group(group_id).await? {
                if group.is_admin(&profile.id) && group.member_ids.len() > 1 {
                    return Err(AppError::AdminMustTransferOwnership);
                }
                groups.push(group);
            }
        }

        let mut deleted_count = 0;

        for mut group in groups {
            if group.is_admin(&profile.id) {
                self.store.delete_group(&group.id).await?;
                deleted_count += 1;
                tracing::debug!(group_id = %group.id, "Deleted sole-member group");
            } else {
                group.member_ids.retain(|id| id != &profile.id);
                self.store.upsert_group(&group).await?;
            }
        }

        let daily_removed = self.store.delete_daily_steps(&profile.id).await?;
        deleted_count += daily_removed;
        tracing::debug!(user_id = %profile.id, count = daily_removed, "Deleted daily step records");

        self.store.delete_leaderboard_user(&profile.id).await?;
        deleted_count += 1;

        self.store.delete_user(&profile.id).await?;
        deleted_count += 1;

        tracing::info!(user_id = %profile.id, deleted_count, "Account deletion complete");
        Ok(deleted_count)
    }
}
