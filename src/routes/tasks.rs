// SPDX-License-Identifier: MIT

//! Job trigger routes for Cloud Scheduler.
//!
//! These endpoints are called on fixed UTC cron schedules, not by
//! users: Thursday 18:00 (at-risk), Sunday 23:59 (evaluate), Monday
//! 00:00 (create-week). A non-2xx response makes the scheduler retry.

use crate::error::Result;
use crate::services::{AtRiskNotifier, JobSummary, WeeklyStreakEvaluator, WeeklyWeekCreator};
use crate::AppState;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
    Router,
};
use chrono::Utc;
use std::sync::Arc;

/// Job trigger routes (called by Cloud Scheduler).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/tasks/at-risk", post(at_risk))
        .route("/tasks/evaluate-week", post(evaluate_week))
        .route("/tasks/create-week", post(create_week))
}

/// Security check: Cloud Run strips this header from external requests,
/// so its presence guarantees the request came from Cloud Scheduler.
fn is_scheduler_request(headers: &HeaderMap) -> bool {
    headers
        .get(crate::config::SCHEDULER_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(|v| v == "true")
        .unwrap_or(false)
}

fn log_summary(job: &str, summary: JobSummary) {
    tracing::info!(
        processed = summary.processed,
        skipped = summary.skipped,
        failed = summary.failed,
        notifications = summary.notifications,
        "{job} complete"
    );
}

/// Mid-week at-risk scan (Thursday).
async fn at_risk(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<StatusCode> {
    if !is_scheduler_request(&headers) {
        tracing::warn!("Blocked unauthorized access to at-risk job");
        return Ok(StatusCode::FORBIDDEN);
    }

    tracing::info!("Starting at-risk scan");
    let job = AtRiskNotifier::new(state.store.clone());
    let summary = job.run(Utc::now()).await?;
    log_summary("At-risk scan", summary);

    Ok(StatusCode::OK)
}

/// Week-end streak evaluation (Sunday).
async fn evaluate_week(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<StatusCode> {
    if !is_scheduler_request(&headers) {
        tracing::warn!("Blocked unauthorized access to evaluate-week job");
        return Ok(StatusCode::FORBIDDEN);
    }

    tracing::info!("Starting weekly streak evaluation");
    let job = WeeklyStreakEvaluator::new(state.store.clone());
    let summary = job.run(Utc::now()).await?;
    log_summary("Weekly evaluation", summary);

    Ok(StatusCode::OK)
}

/// Week-start rollover (Monday).
async fn create_week(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<StatusCode> {
    if !is_scheduler_request(&headers) {
        tracing::warn!("Blocked unauthorized access to create-week job");
        return Ok(StatusCode::FORBIDDEN);
    }

    tracing::info!("Starting week rollover");
    let job = WeeklyWeekCreator::new(state.store.clone());
    let summary = job.run(Utc::now()).await?;
    log_summary("Week rollover", summary);

    Ok(StatusCode::OK)
}
