// SPDX-License-Identifier: MIT
// Copyright 2026 Paceline Authors

//! Leaderboard aggregation.
//!
//! Each ranking pass is a self-contained fan-out/fan-in: resolve the date
//! keys for the period, fetch every candidate user's total concurrently,
//! then sort once all fetches have settled. Results land in a snapshot
//! tagged with a generation number; publishing compares generations so a
//! slow pass can never overwrite a newer one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{NaiveDate, Weekday};
use dashmap::DashMap;
use futures_util::{stream, StreamExt};
use tokio::sync::watch;

use crate::db::Store;
use crate::error::{AppError, Result};
use crate::models::leaderboard::{rank_entries, Scope};
use crate::models::{LeaderboardEntry, LeaderboardUser, UserProfile};
use crate::period::{self, Period};
use crate::services::StepLedger;
use crate::time_utils::now_rfc3339;

/// Upper bound on concurrent per-user ledger fetches within one pass.
const MAX_CONCURRENT_FETCHES: usize = 16;

/// Identity of one aggregation pass. A snapshot only supersedes the
/// published one if its key matches a newer request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankingKey {
    pub period: Period,
    pub reference: NaiveDate,
    pub scope: Scope,
}

/// Output of one completed aggregation pass.
#[derive(Debug, Clone)]
pub struct RankingSnapshot {
    pub key: RankingKey,
    pub generation: u64,
    pub entries: Vec<LeaderboardEntry>,
    pub computed_at: String,
}

/// Aggregates step totals into ranked leaderboards and owns the published
/// snapshot state views subscribe to.
pub struct LeaderboardService {
    store: Arc<dyn Store>,
    ledger: StepLedger,
    week_start: Weekday,
    /// Most recent per-user day total written through `record_steps`,
    /// keyed by user id. Serves the live "today" figure without a query.
    current_totals: DashMap<String, (String, i64)>,
    generation: AtomicU64,
    snapshot_tx: watch::Sender<Option<Arc<RankingSnapshot>>>,
}

impl LeaderboardService {
    pub fn new(store: Arc<dyn Store>, ledger: StepLedger, week_start: Weekday) -> Self {
        let (snapshot_tx, _) = watch::channel(None);
        Self {
            store,
            ledger,
            week_start,
            current_totals: DashMap::new(),
            generation: AtomicU64::new(0),
            snapshot_tx,
        }
    }

    // ─── Ranking ─────────────────────────────────────────────────

    /// Rank every user in `scope` over the period containing `reference`.
    ///
    /// A user whose ledger fetch fails is omitted from the result rather
    /// than failing the pass or being counted as zero; ranks stay
    /// contiguous over the users that did resolve.
    pub async fn rank(
        &self,
        period: Period,
        reference: NaiveDate,
        scope: &Scope,
    ) -> Result<Vec<LeaderboardEntry>> {
        let date_keys = period::date_keys(period, reference, self.week_start);
        let users = self.resolve_scope(scope).await?;

        let keys = &date_keys;
        let totals: Vec<Option<(LeaderboardUser, i64)>> = stream::iter(users)
            .map(|user| {
                let ledger = self.ledger.clone();
                async move {
                    match ledger.total_for(&user, keys).await {
                        Ok(total) => Some((user, total)),
                        Err(err) => {
                            tracing::warn!(
                                user_id = %user.user_id,
                                error = %err,
                                "Omitting user from ranking after failed step fetch"
                            );
                            None
                        }
                    }
                }
            })
            .buffer_unordered(MAX_CONCURRENT_FETCHES)
            .collect()
            .await;

        let entries = totals
            .into_iter()
            .flatten()
            .map(|(user, total)| LeaderboardEntry {
                user_id: user.user_id,
                name: user.name,
                total_steps: total,
                rank: 0,
            })
            .collect();

        Ok(rank_entries(entries))
    }

    /// Run a full pass and publish the snapshot if it is still current.
    pub async fn refresh(
        &self,
        period: Period,
        reference: NaiveDate,
        scope: Scope,
    ) -> Result<Arc<RankingSnapshot>> {
        // Claim a generation before any awaits so overlapping passes are
        // ordered by issue time, not completion time.
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let entries = self.rank(period, reference, &scope).await?;

        let snapshot = Arc::new(RankingSnapshot {
            key: RankingKey {
                period,
                reference,
                scope,
            },
            generation,
            entries,
            computed_at: now_rfc3339(),
        });

        self.publish(snapshot.clone());
        Ok(snapshot)
    }

    /// Publish a snapshot unless a newer one is already out. Returns
    /// whether the snapshot was accepted.
    fn publish(&self, snapshot: Arc<RankingSnapshot>) -> bool {
        let mut accepted = false;
        self.snapshot_tx.send_if_modified(|current| {
            match current {
                Some(existing) if existing.generation >= snapshot.generation => false,
                _ => {
                    *current = Some(snapshot.clone());
                    accepted = true;
                    true
                }
            }
        });
        if !accepted {
            tracing::debug!(
                generation = snapshot.generation,
                "Discarding superseded ranking snapshot"
            );
        }
        accepted
    }

    /// Subscribe to published ranking snapshots.
    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<RankingSnapshot>>> {
        self.snapshot_tx.subscribe()
    }

    /// The most recently published snapshot, if any pass has completed.
    pub fn latest(&self) -> Option<Arc<RankingSnapshot>> {
        self.snapshot_tx.borrow().clone()
    }

    /// The current user's 1-based rank on the all-users board, or `None`
    /// if they have no leaderboard presence for the period.
    pub async fn current_user_rank(
        &self,
        period: Period,
        reference: NaiveDate,
        user_id: &str,
    ) -> Result<Option<u32>> {
        let entries = self.rank(period, reference, &Scope::All).await?;
        Ok(entries
            .iter()
            .find(|e| e.user_id == user_id)
            .map(|e| e.rank))
    }

    // ─── Step Writes ─────────────────────────────────────────────

    /// Upsert one day of steps for a user and refresh their leaderboard
    /// document. Safe to repeat with the same values; last write wins.
    pub async fn record_steps(
        &self,
        profile: &UserProfile,
        date_key: &str,
        steps: i64,
    ) -> Result<()> {
        if !profile.can_write() {
            return Err(AppError::NotAuthenticated);
        }
        if steps < 0 {
            return Err(AppError::BadRequest(
                "Step count must be non-negative".to_string(),
            ));
        }
        if period::parse_date_key(date_key).is_none() {
            return Err(AppError::BadRequest(format!(
                "Invalid date key: {}",
                date_key
            )));
        }

        let now = now_rfc3339();
        self.store
            .upsert_leaderboard_user(&LeaderboardUser {
                user_id: profile.id.clone(),
                name: profile.display_name.clone(),
                demo: false,
                demo_steps: None,
                updated_at: now.clone(),
            })
            .await?;
        self.store
            .upsert_daily_steps(
                &profile.id,
                &crate::models::DailyStepRecord {
                    date_key: date_key.to_string(),
                    steps,
                    updated_at: now,
                },
            )
            .await?;

        self.current_totals
            .insert(profile.id.clone(), (date_key.to_string(), steps));

        tracing::debug!(user_id = %profile.id, date_key, steps, "Recorded steps");
        Ok(())
    }

    /// Cached total from the most recent `record_steps` call for a user,
    /// if it was for the given day.
    pub fn current_total(&self, user_id: &str, date_key: &str) -> Option<i64> {
        self.current_totals.get(user_id).and_then(|entry| {
            let (cached_key, steps) = entry.value();
            (cached_key == date_key).then_some(*steps)
        })
    }

    // ─── Scope Resolution ────────────────────────────────────────

    /// Resolve a scope into the leaderboard users to aggregate over.
    /// Dangling ids (a friend or member with no leaderboard document) are
    /// skipped, not treated as corruption.
    async fn resolve_scope(&self, scope: &Scope) -> Result<Vec<LeaderboardUser>> {
        match scope {
            Scope::All => self.store.list_leaderboard_users().await,
            Scope::Friends { viewer_id } => {
                let profile = self
                    .store
                    .get_user(viewer_id)
                    .await?
                    .ok_or_else(|| AppError::NotFound(format!("User {} not found", viewer_id)))?;
                let mut ids = profile.friend_ids;
                ids.push(profile.id);
                self.board_users_for(ids).await
            }
            Scope::Group { group_id } => {
                let group = self
                    .store
                    .get_group(group_id)
                    .await?
                    .ok_or(AppError::GroupNotFound)?;
                self.board_users_for(group.member_ids).await
            }
        }
    }

    async fn board_users_for(&self, ids: Vec<String>) -> Result<Vec<LeaderboardUser>> {
        let store = &self.store;
        let fetched: Vec<Option<LeaderboardUser>> = stream::iter(ids)
            .map(|id| async move {
                match store.get_leaderboard_user(&id).await {
                    Ok(user) => user,
                    Err(err) => {
                        tracing::warn!(user_id = %id, error = %err, "Skipping unreadable leaderboard user");
                        None
                    }
                }
            })
            .buffer_unordered(MAX_CONCURRENT_FETCHES)
            .collect()
            .await;
        Ok(fetched.into_iter().flatten().collect())
    }
}
