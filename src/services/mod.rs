// SPDX-License-Identifier: MIT

//! Services module - the scheduled jobs and their shared primitives.

pub mod at_risk;
pub mod evaluator;
pub mod notify;
pub mod rollover;

pub use at_risk::AtRiskNotifier;
pub use evaluator::WeeklyStreakEvaluator;
pub use rollover::WeeklyWeekCreator;

/// Per-invocation counters returned by each job and logged on completion.
///
/// A failure processing one group never aborts the others; it is
/// counted here and the loop continues.
#[derive(Debug, Default, Clone, Copy)]
pub struct JobSummary {
    /// Groups that produced writes this run
    pub processed: u32,
    /// Groups skipped (inapplicable or already handled)
    pub skipped: u32,
    /// Groups that failed and were left for the next scheduled run
    pub failed: u32,
    /// Notification documents written
    pub notifications: u32,
}
