// SPDX-License-Identifier: MIT

//! Crewstreak: weekly group workout streak evaluation.
//!
//! This crate provides the scheduled backend jobs that compute weekly
//! workout compliance for social groups, advance or reset each group's
//! streak counter, and fan out notifications.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::StreakStore;
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn StreakStore>,
}
