// SPDX-License-Identifier: MIT
// Copyright 2026 Paceline Authors

//! Data models for the application.

pub mod group;
pub mod leaderboard;
pub mod steps;
pub mod user;

pub use group::Group;
pub use leaderboard::LeaderboardEntry;
pub use steps::{DailyStepRecord, LeaderboardUser};
pub use user::UserProfile;
