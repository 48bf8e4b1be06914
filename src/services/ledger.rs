// SPDX-License-Identifier: MIT
// Copyright 2026 Paceline Authors

//! Step ledger reads: per-user totals over a resolved date range.

use std::sync::Arc;

use crate::db::{Store, IN_QUERY_LIMIT};
use crate::error::Result;
use crate::models::LeaderboardUser;

/// Reads daily step records and sums them over date ranges.
#[derive(Clone)]
pub struct StepLedger {
    store: Arc<dyn Store>,
}

impl StepLedger {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Sum a user's steps over the given date keys. Days without a record
    /// count as zero.
    ///
    /// Lookups are partitioned into chunks of [`IN_QUERY_LIMIT`] keys to
    /// stay within the backend's `in`-filter limit; callers see a single
    /// total regardless of how the range was partitioned.
    pub async fn sum_steps(&self, user_id: &str, date_keys: &[String]) -> Result<i64> {
        let mut total = 0i64;
        for chunk in date_keys.chunks(IN_QUERY_LIMIT) {
            let records = self.store.daily_steps_in(user_id, chunk).await?;
            total += records.iter().map(|r| r.steps).sum::<i64>();
        }
        Ok(total)
    }

    /// Total for one leaderboard user. Demo accounts report their static
    /// precomputed total and never touch the daily ledger.
    pub async fn total_for(&self, user: &LeaderboardUser, date_keys: &[String]) -> Result<i64> {
        if user.demo {
            return Ok(user.demo_steps.unwrap_or(0));
        }
        self.sum_steps(&user.user_id, date_keys).await
    }
}
