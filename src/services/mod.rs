// SPDX-License-Identifier: MIT
// Copyright 2026 Paceline Authors

//! Services module - business logic layer.

pub mod account;
pub mod groups;
pub mod leaderboard;
pub mod ledger;

pub use account::AccountService;
pub use groups::{GroupService, LeaveOutcome};
pub use leaderboard::{LeaderboardService, RankingKey, RankingSnapshot};
pub use ledger::StepLedger;
