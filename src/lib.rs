// SPDX-License-Identifier: MIT
// Copyright 2026 Paceline Authors

//! Paceline: shared step leaderboards and competitive groups
//!
//! This crate provides the backend API that aggregates daily step counts
//! into ranked leaderboards and manages invite-code based competitive
//! groups.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod period;
pub mod routes;
pub mod services;
pub mod time_utils;

use std::sync::Arc;

use config::Config;
use db::Store;
use services::{AccountService, GroupService, LeaderboardService};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn Store>,
    pub leaderboard: LeaderboardService,
    pub groups: GroupService,
    pub account: AccountService,
}

impl AppState {
    /// Wire the service layer over a store backend.
    pub fn new(config: Config, store: Arc<dyn Store>) -> Self {
        let ledger = services::StepLedger::new(store.clone());
        let leaderboard =
            LeaderboardService::new(store.clone(), ledger.clone(), config.week_start);
        let groups = GroupService::new(store.clone(), ledger);
        let account = AccountService::new(store.clone());
        Self {
            config,
            store,
            leaderboard,
            groups,
            account,
        }
    }
}
