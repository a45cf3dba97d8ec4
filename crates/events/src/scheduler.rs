//! Periodic nudge trigger.
//!
//! [`NudgeScheduler`] runs as a background task. Every tick it lists users
//! with notifications enabled and evaluates each one: a forced reset when
//! their local reset hour has come and the frequency interval has elapsed,
//! an ordinary scheduled evaluation otherwise.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use studynudge_core::profile::UserProfile;
use studynudge_core::schedule;
use studynudge_core::types::{Timestamp, UserId};
use studynudge_engine::{BatchSummary, EvaluateOptions, NudgeService, StoreError};
use tokio_util::sync::CancellationToken;

/// Default tick cadence.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(900);

// ---------------------------------------------------------------------------
// NudgeScheduler
// ---------------------------------------------------------------------------

pub struct NudgeScheduler {
    service: Arc<NudgeService>,
    interval: Duration,
    max_concurrency: usize,
}

impl NudgeScheduler {
    pub fn new(service: Arc<NudgeService>, interval: Duration, max_concurrency: usize) -> Self {
        Self {
            service,
            interval,
            max_concurrency,
        }
    }

    /// Run the scheduler loop until `cancel` fires.
    ///
    /// The first tick runs immediately.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut interval = tokio::time::interval(self.interval);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Nudge scheduler cancelled");
                    break;
                }
                _ = interval.tick() => {
                    if let Err(e) = self.tick_at(Utc::now()).await {
                        tracing::error!(error = %e, "Failed to list users for nudge tick");
                    }
                }
            }
        }
    }

    /// Evaluate every active user as of `now`.
    pub async fn tick_at(&self, now: Timestamp) -> Result<BatchSummary, StoreError> {
        let users = self.service.store().list_active().await?;
        let jobs = plan_jobs(&users, now);
        let planned_resets = jobs.iter().filter(|(_, o)| o.force_new_question).count();

        let summary = self.service.run_batch(jobs, self.max_concurrency, now).await;

        if summary.evaluated + summary.failed > 0 {
            tracing::info!(
                users = users.len(),
                planned_resets,
                nudged = summary.nudged,
                celebrated = summary.celebrated,
                skipped = summary.skipped,
                failed = summary.failed,
                "Nudge tick complete"
            );
        }
        Ok(summary)
    }
}

/// Pick the evaluation mode for each user.
pub fn plan_jobs(users: &[UserProfile], now: Timestamp) -> Vec<(UserId, EvaluateOptions)> {
    users
        .iter()
        .map(|user| {
            let tz = schedule::resolve_timezone(user.timezone.as_deref());
            let options = if schedule::is_reset_due(
                now,
                tz,
                user.last_reset_at,
                user.notification_frequency,
            ) {
                EvaluateOptions::daily_reset()
            } else {
                EvaluateOptions::scheduled()
            };
            (user.id, options)
        })
        .collect()
}
