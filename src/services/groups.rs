// SPDX-License-Identifier: MIT
// Copyright 2026 Paceline Authors

//! Group lifecycle: creation, invite-code redemption, membership, and
//! admin-gated mutation.
//!
//! A group document and the member's own `group_ids` list are written as
//! two separate operations; the store offers no transaction across them.
//! Readers therefore skip ids that fail to resolve on either side instead
//! of reporting corruption.

use std::sync::Arc;

use crate::db::Store;
use crate::error::{AppError, Result};
use crate::models::group::{self, parse_invite_reference};
use crate::models::leaderboard::rank_entries;
use crate::models::{Group, LeaderboardEntry, UserProfile};
use crate::services::StepLedger;
use crate::time_utils::now_rfc3339;

/// How many fresh invite codes to try before giving up on a collision run.
const INVITE_CODE_RETRIES: usize = 5;

/// Outcome of a leave operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveOutcome {
    /// The user was removed; the group lives on.
    Left,
    /// The sole-member admin left, deleting the group.
    GroupDeleted,
}

/// Owns competitive-group state transitions.
pub struct GroupService {
    store: Arc<dyn Store>,
    ledger: StepLedger,
}

impl GroupService {
    pub fn new(store: Arc<dyn Store>, ledger: StepLedger) -> Self {
        Self { store, ledger }
    }

    // ─── Creation ────────────────────────────────────────────────

    /// Create a group with the creator as sole member and admin.
    pub async fn create_group(
        &self,
        creator: &UserProfile,
        name: &str,
        description: Option<String>,
    ) -> Result<Group> {
        if !creator.can_write() {
            return Err(AppError::NotAuthenticated);
        }
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::BadRequest("Group name must not be empty".to_string()));
        }

        let invite_code = self.unique_invite_code().await?;
        let group = Group {
            id: group::new_group_id(),
            name: name.to_string(),
            description: description.filter(|d| !d.trim().is_empty()),
            admin_id: creator.id.clone(),
            invite_code,
            member_ids: vec![creator.id.clone()],
            created_at: now_rfc3339(),
        };

        self.store.upsert_group(&group).await?;
        self.add_group_reference(&creator.id, &group.id).await?;

        tracing::info!(group_id = %group.id, admin_id = %creator.id, "Group created");
        Ok(group)
    }

    /// Generate an invite code not held by any live group. Collisions are
    /// retried with fresh codes.
    async fn unique_invite_code(&self) -> Result<String> {
        for _ in 0..INVITE_CODE_RETRIES {
            let code = group::generate_invite_code();
            if self.store.find_group_by_invite_code(&code).await?.is_none() {
                return Ok(code);
            }
        }
        Err(AppError::Database(
            "Could not allocate a unique invite code".to_string(),
        ))
    }

    // ─── Membership ──────────────────────────────────────────────

    /// Join the group holding the invite code extracted from `reference`
    /// (a bare code, deep link, or pasted share message).
    pub async fn join_by_invite_code(
        &self,
        user: &UserProfile,
        reference: &str,
    ) -> Result<Group> {
        if !user.can_write() {
            return Err(AppError::NotAuthenticated);
        }
        let code = parse_invite_reference(reference).ok_or(AppError::GroupNotFound)?;
        let mut group = self
            .store
            .find_group_by_invite_code(&code)
            .await?
            .ok_or(AppError::GroupNotFound)?;

        if group.is_member(&user.id) {
            return Err(AppError::AlreadyMember);
        }

        group.member_ids.push(user.id.clone());
        self.store.upsert_group(&group).await?;
        self.add_group_reference(&user.id, &group.id).await?;

        tracing::info!(group_id = %group.id, user_id = %user.id, "Joined group");
        Ok(group)
    }

    /// Leave a group. The admin can only leave when no one else remains,
    /// which deletes the group.
    pub async fn leave_group(&self, user: &UserProfile, group_id: &str) -> Result<LeaveOutcome> {
        if !user.can_write() {
            return Err(AppError::NotAuthenticated);
        }
        let mut group = self
            .store
            .get_group(group_id)
            .await?
            .ok_or(AppError::GroupNotFound)?;
        if !group.is_member(&user.id) {
            return Err(AppError::BadRequest("Not a member of this group".to_string()));
        }

        if group.is_admin(&user.id) {
            if group.member_ids.len() > 1 {
                return Err(AppError::AdminMustTransferOwnership);
            }
            self.store.delete_group(&group.id).await?;
            self.remove_group_reference(&user.id, &group.id).await?;
            tracing::info!(group_id = %group.id, "Sole-member admin left; group deleted");
            return Ok(LeaveOutcome::GroupDeleted);
        }

        group.member_ids.retain(|id| id != &user.id);
        self.store.upsert_group(&group).await?;
        self.remove_group_reference(&user.id, &group.id).await?;

        tracing::info!(group_id = %group.id, user_id = %user.id, "Left group");
        Ok(LeaveOutcome::Left)
    }

    /// Delete a group outright. Admin only. Clears the group reference
    /// from every member before removing the group document.
    pub async fn delete_group(&self, requester: &UserProfile, group_id: &str) -> Result<()> {
        if !requester.can_write() {
            return Err(AppError::NotAuthenticated);
        }
        let group = self
            .store
            .get_group(group_id)
            .await?
            .ok_or(AppError::GroupNotFound)?;
        if !group.is_admin(&requester.id) {
            return Err(AppError::NotAuthorized(
                "Only the group admin can delete it".to_string(),
            ));
        }

        for member_id in &group.member_ids {
            self.remove_group_reference(member_id, &group.id).await?;
        }
        self.store.delete_group(&group.id).await?;

        tracing::info!(group_id = %group.id, members = group.member_ids.len(), "Group deleted");
        Ok(())
    }

    /// Rename a group and replace its description. Admin only.
    pub async fn rename_group(
        &self,
        requester: &UserProfile,
        group_id: &str,
        new_name: &str,
        new_description: Option<String>,
    ) -> Result<Group> {
        if !requester.can_write() {
            return Err(AppError::NotAuthenticated);
        }
        let mut group = self
            .store
            .get_group(group_id)
            .await?
            .ok_or(AppError::GroupNotFound)?;
        if !group.is_admin(&requester.id) {
            return Err(AppError::NotAuthorized(
                "Only the group admin can rename it".to_string(),
            ));
        }
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return Err(AppError::BadRequest("Group name must not be empty".to_string()));
        }

        group.name = new_name.to_string();
        group.description = new_description.filter(|d| !d.trim().is_empty());
        self.store.upsert_group(&group).await?;
        Ok(group)
    }

    // ─── Queries ─────────────────────────────────────────────────

    /// Members of a group ranked by step totals over the given date keys.
    /// Members without a leaderboard document are skipped.
    pub async fn members_with_stats(
        &self,
        group_id: &str,
        date_keys: &[String],
    ) -> Result<Vec<LeaderboardEntry>> {
        let group = self
            .store
            .get_group(group_id)
            .await?
            .ok_or(AppError::GroupNotFound)?;

        let mut entries = Vec::with_capacity(group.member_ids.len());
        for member_id in &group.member_ids {
            let Some(board_user) = self.store.get_leaderboard_user(member_id).await? else {
                tracing::debug!(group_id, user_id = %member_id, "Member has no leaderboard entry");
                continue;
            };
            match self.ledger.total_for(&board_user, date_keys).await {
                Ok(total) => entries.push(LeaderboardEntry {
                    user_id: board_user.user_id,
                    name: board_user.name,
                    total_steps: total,
                    rank: 0,
                }),
                Err(err) => {
                    tracing::warn!(
                        group_id,
                        user_id = %member_id,
                        error = %err,
                        "Omitting member from group stats after failed step fetch"
                    );
                }
            }
        }
        Ok(rank_entries(entries))
    }

    /// Groups the user belongs to, resolved from their reference list.
    /// Ids that no longer resolve are skipped.
    pub async fn groups_for(&self, user: &UserProfile) -> Result<Vec<Group>> {
        let mut groups = Vec::with_capacity(user.group_ids.len());
        for group_id in &user.group_ids {
            match self.store.get_group(group_id).await? {
                Some(group) => groups.push(group),
                None => {
                    tracing::debug!(user_id = %user.id, %group_id, "Skipping dangling group reference");
                }
            }
        }
        Ok(groups)
    }

    // ─── Reference List Maintenance ──────────────────────────────

    async fn add_group_reference(&self, user_id: &str, group_id: &str) -> Result<()> {
        let Some(mut profile) = self.store.get_user(user_id).await? else {
            return Ok(());
        };
        if !profile.group_ids.iter().any(|id| id == group_id) {
            profile.group_ids.push(group_id.to_string());
            self.store.upsert_user(&profile).await?;
        }
        Ok(())
    }

    async fn remove_group_reference(&self, user_id: &str, group_id: &str) -> Result<()> {
        let Some(mut profile) = self.store.get_user(user_id).await? else {
            return Ok(());
        };
        let before = profile.group_ids.len();
        profile.group_ids.retain(|id| id != group_id);
        if profile.group_ids.len() != before {
            self.store.upsert_user(&profile).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::models::group::{INVITE_CODE_ALPHABET, INVITE_CODE_LEN};
    use crate::models::DailyStepRecord;

    fn profile(id: &str, name: &str) -> UserProfile {
        UserProfile {
            id: id.to_string(),
            display_name: name.to_string(),
            anonymous: false,
            group_ids: vec![],
            friend_ids: vec![],
            created_at: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    async fn seeded(store: &Arc<MemoryStore>, id: &str, name: &str) -> UserProfile {
        let user = profile(id, name);
        store.upsert_user(&user).await.unwrap();
        user
    }

    fn service(store: Arc<MemoryStore>) -> GroupService {
        let ledger = StepLedger::new(store.clone());
        GroupService::new(store, ledger)
    }

    #[tokio::test]
    async fn test_create_group_sets_admin_and_invite_code() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(store.clone());
        let user_a = seeded(&store, "userA", "Ada").await;

        let group = svc
            .create_group(&user_a, "Office", None)
            .await
            .unwrap();

        assert_eq!(group.admin_id, "userA");
        assert_eq!(group.member_ids, vec!["userA".to_string()]);
        assert_eq!(group.invite_code.len(), INVITE_CODE_LEN);
        assert!(group
            .invite_code
            .bytes()
            .all(|b| INVITE_CODE_ALPHABET.contains(&b)));

        let stored = store.get_user("userA").await.unwrap().unwrap();
        assert_eq!(stored.group_ids, vec![group.id.clone()]);
    }

    #[tokio::test]
    async fn test_create_group_requires_signed_in_user() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(store.clone());

        let mut nobody = profile("", "Nobody");
        assert!(matches!(
            svc.create_group(&nobody, "Office", None).await,
            Err(AppError::NotAuthenticated)
        ));

        nobody.id = "anon1".to_string();
        nobody.anonymous = true;
        assert!(matches!(
            svc.create_group(&nobody, "Office", None).await,
            Err(AppError::NotAuthenticated)
        ));
    }

    #[tokio::test]
    async fn test_join_by_code_and_duplicate_join() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(store.clone());
        let user_a = seeded(&store, "userA", "Ada").await;
        let user_b = seeded(&store, "userB", "Ben").await;

        let group = svc.create_group(&user_a, "Office", None).await.unwrap();

        let joined = svc
            .join_by_invite_code(&user_b, &group.invite_code.to_lowercase())
            .await
            .unwrap();
        assert!(joined.is_member("userB"));

        assert!(matches!(
            svc.join_by_invite_code(&user_b, &group.invite_code).await,
            Err(AppError::AlreadyMember)
        ));
    }

    #[tokio::test]
    async fn test_join_via_pasted_share_message() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(store.clone());
        let user_a = seeded(&store, "userA", "Ada").await;
        let user_b = seeded(&store, "userB", "Ben").await;

        let group = svc.create_group(&user_a, "Office", None).await.unwrap();
        let message = format!("Join my group! {}", group.share_link("paceline"));

        let joined = svc.join_by_invite_code(&user_b, &message).await.unwrap();
        assert!(joined.is_member("userB"));
    }

    #[tokio::test]
    async fn test_join_unknown_code_fails() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(store.clone());
        let user_b = seeded(&store, "userB", "Ben").await;

        assert!(matches!(
            svc.join_by_invite_code(&user_b, "AB23XZ").await,
            Err(AppError::GroupNotFound)
        ));
        assert!(matches!(
            svc.join_by_invite_code(&user_b, "random text").await,
            Err(AppError::GroupNotFound)
        ));
    }

    #[tokio::test]
    async fn test_admin_cannot_leave_with_members_present() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(store.clone());
        let user_a = seeded(&store, "userA", "Ada").await;
        let user_b = seeded(&store, "userB", "Ben").await;

        let group = svc.create_group(&user_a, "Office", None).await.unwrap();
        svc.join_by_invite_code(&user_b, &group.invite_code)
            .await
            .unwrap();

        assert!(matches!(
            svc.leave_group(&user_a, &group.id).await,
            Err(AppError::AdminMustTransferOwnership)
        ));
    }

    #[tokio::test]
    async fn test_sole_member_admin_leave_deletes_group() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(store.clone());
        let user_a = seeded(&store, "userA", "Ada").await;

        let group = svc.create_group(&user_a, "Office", None).await.unwrap();
        let outcome = svc.leave_group(&user_a, &group.id).await.unwrap();

        assert_eq!(outcome, LeaveOutcome::GroupDeleted);
        assert!(store.get_group(&group.id).await.unwrap().is_none());
        let stored = store.get_user("userA").await.unwrap().unwrap();
        assert!(stored.group_ids.is_empty());
    }

    #[tokio::test]
    async fn test_member_leave_keeps_group() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(store.clone());
        let user_a = seeded(&store, "userA", "Ada").await;
        let user_b = seeded(&store, "userB", "Ben").await;

        let group = svc.create_group(&user_a, "Office", None).await.unwrap();
        svc.join_by_invite_code(&user_b, &group.invite_code)
            .await
            .unwrap();

        let outcome = svc.leave_group(&user_b, &group.id).await.unwrap();
        assert_eq!(outcome, LeaveOutcome::Left);

        let remaining = store.get_group(&group.id).await.unwrap().unwrap();
        assert_eq!(remaining.member_ids, vec!["userA".to_string()]);
    }

    #[tokio::test]
    async fn test_delete_requires_admin_and_clears_references() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(store.clone());
        let user_a = seeded(&store, "userA", "Ada").await;
        let user_b = seeded(&store, "userB", "Ben").await;

        let group = svc.create_group(&user_a, "Office", None).await.unwrap();
        svc.join_by_invite_code(&user_b, &group.invite_code)
            .await
            .unwrap();

        assert!(matches!(
            svc.delete_group(&user_b, &group.id).await,
            Err(AppError::NotAuthorized(_))
        ));

        svc.delete_group(&user_a, &group.id).await.unwrap();
        assert!(store.get_group(&group.id).await.unwrap().is_none());
        for id in ["userA", "userB"] {
            let stored = store.get_user(id).await.unwrap().unwrap();
            assert!(stored.group_ids.is_empty());
        }
    }

    #[tokio::test]
    async fn test_rename_is_admin_gated_and_validated() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(store.clone());
        let user_a = seeded(&store, "userA", "Ada").await;
        let user_b = seeded(&store, "userB", "Ben").await;

        let group = svc.create_group(&user_a, "Office", None).await.unwrap();
        svc.join_by_invite_code(&user_b, &group.invite_code)
            .await
            .unwrap();

        assert!(matches!(
            svc.rename_group(&user_b, &group.id, "Mine Now", None).await,
            Err(AppError::NotAuthorized(_))
        ));
        assert!(matches!(
            svc.rename_group(&user_a, &group.id, "   ", None).await,
            Err(AppError::BadRequest(_))
        ));

        let renamed = svc
            .rename_group(&user_a, &group.id, "Step Club", Some("walk more".to_string()))
            .await
            .unwrap();
        assert_eq!(renamed.name, "Step Club");
        assert_eq!(renamed.description.as_deref(), Some("walk more"));
    }

    #[tokio::test]
    async fn test_members_with_stats_ranks_and_skips_dangling() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(store.clone());
        let user_a = seeded(&store, "userA", "Ada").await;
        let user_b = seeded(&store, "userB", "Ben").await;

        let mut group = svc.create_group(&user_a, "Office", None).await.unwrap();
        svc.join_by_invite_code(&user_b, &group.invite_code)
            .await
            .unwrap();
        // A member id with no leaderboard document (eventual consistency).
        group = store.get_group(&group.id).await.unwrap().unwrap();
        group.member_ids.push("ghost".to_string());
        store.upsert_group(&group).await.unwrap();

        for (id, name, steps) in [("userA", "Ada", 5000i64), ("userB", "Ben", 7000)] {
            store
                .upsert_leaderboard_user(&crate::models::LeaderboardUser {
                    user_id: id.to_string(),
                    name: name.to_string(),
                    demo: false,
                    demo_steps: None,
                    updated_at: String::new(),
                })
                .await
                .unwrap();
            store
                .upsert_daily_steps(
                    id,
                    &DailyStepRecord {
                        date_key: "2026-01-20".to_string(),
                        steps,
                        updated_at: String::new(),
                    },
                )
                .await
                .unwrap();
        }

        let entries = svc
            .members_with_stats(&group.id, &["2026-01-20".to_string()])
            .await
            .unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].user_id, "userB");
        assert_eq!(entries[0].rank, 1);
        assert_eq!(entries[1].user_id, "userA");
        assert_eq!(entries[1].rank, 2);
    }

    #[tokio::test]
    async fn test_groups_for_skips_dangling_references() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(store.clone());
        let mut user_a = seeded(&store, "userA", "Ada").await;

        let group = svc.create_group(&user_a, "Office", None).await.unwrap();
        user_a = store.get_user("userA").await.unwrap().unwrap();
        user_a.group_ids.push("vanished".to_string());
        store.upsert_user(&user_a).await.unwrap();

        let groups = svc.groups_for(&user_a).await.unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].id, group.id);
    }
}
