//! Load, evaluate, persist.
//!
//! [`NudgeService`] wraps the engine with the store round-trip and
//! serializes evaluations per user: two triggers for the same user never
//! interleave, so a cooldown written by the first is visible to the second.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use studynudge_core::outcome::{NudgeOutcome, NudgeStatus};
use studynudge_core::profile::UserProfile;
use studynudge_core::schedule;
use studynudge_core::types::{Timestamp, UserId};

use crate::engine::{EvaluateOptions, NudgeEngine};
use crate::ports::{StoreError, UserStore};

/// Default fan-out for scheduled batches.
pub const DEFAULT_MAX_CONCURRENCY: usize = 8;

// ---------------------------------------------------------------------------
// Per-user locks
// ---------------------------------------------------------------------------

#[derive(Default)]
struct UserLocks {
    inner: Mutex<HashMap<UserId, Arc<tokio::sync::Mutex<()>>>>,
}

impl UserLocks {
    fn get(&self, id: UserId) -> Arc<tokio::sync::Mutex<()>> {
        let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(map.entry(id).or_default())
    }

    /// Drop the entry for `id` once nobody else holds or awaits it.
    fn release(&self, id: UserId) {
        let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if map.get(&id).is_some_and(|lock| Arc::strong_count(lock) == 1) {
            map.remove(&id);
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

// ---------------------------------------------------------------------------
// Batch summary
// ---------------------------------------------------------------------------

/// Tally of one scheduled batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub evaluated: usize,
    pub nudged: usize,
    pub celebrated: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl BatchSummary {
    fn record(&mut self, result: &Result<NudgeOutcome, StoreError>) {
        match result {
            Ok(outcome) => {
                self.evaluated += 1;
                match outcome.status {
                    NudgeStatus::Nudged => self.nudged += 1,
                    NudgeStatus::Celebrated => self.celebrated += 1,
                    NudgeStatus::Skipped => self.skipped += 1,
                }
            }
            Err(_) => self.failed += 1,
        }
    }
}

// ---------------------------------------------------------------------------
// NudgeService
// ---------------------------------------------------------------------------

pub struct NudgeService {
    engine: NudgeEngine,
    store: Arc<dyn UserStore>,
    locks: UserLocks,
}

impl NudgeService {
    pub fn new(engine: NudgeEngine, store: Arc<dyn UserStore>) -> Self {
        Self {
            engine,
            store,
            locks: UserLocks::default(),
        }
    }

    pub fn engine(&self) -> &NudgeEngine {
        &self.engine
    }

    pub fn store(&self) -> &Arc<dyn UserStore> {
        &self.store
    }

    pub async fn run_for_user(
        &self,
        id: UserId,
        options: EvaluateOptions,
    ) -> Result<NudgeOutcome, StoreError> {
        self.run_for_user_at(id, options, Utc::now()).await
    }

    /// Evaluate one user under their lock and persist the mutation when the
    /// outcome calls for it.
    ///
    /// The profile is reloaded after the lock is taken so the engine always
    /// sees the previous evaluation's writes.
    pub async fn run_for_user_at(
        &self,
        id: UserId,
        options: EvaluateOptions,
        now: Timestamp,
    ) -> Result<NudgeOutcome, StoreError> {
        let lock = self.locks.get(id);
        let result = {
            let _guard = lock.lock().await;
            self.evaluate_locked(id, options, now).await
        };
        drop(lock);
        self.locks.release(id);
        result
    }

    async fn evaluate_locked(
        &self,
        id: UserId,
        options: EvaluateOptions,
        now: Timestamp,
    ) -> Result<NudgeOutcome, StoreError> {
        let user = self
            .store
            .load(id)
            .await?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        let options = confirm_options(options, &user, now);
        let outcome = self.engine.evaluate_at(&user, options, now).await;
        tracing::info!(
            user_id = %id,
            status = ?outcome.status,
            reason = outcome.reason.map(|r| r.as_str()),
            dispatched = outcome.dispatched,
            "Evaluation finished"
        );

        if outcome.should_persist() && !outcome.mutation.is_empty() {
            self.store.apply_mutation(id, &outcome.mutation).await?;
        }
        Ok(outcome)
    }

    /// Evaluate many users with at most `concurrency` in flight.
    ///
    /// Individual failures are logged and counted; they never abort the batch.
    pub async fn run_batch(
        &self,
        jobs: Vec<(UserId, EvaluateOptions)>,
        concurrency: usize,
        now: Timestamp,
    ) -> BatchSummary {
        let concurrency = concurrency.max(1);

        let results: Vec<(UserId, Result<NudgeOutcome, StoreError>)> = stream::iter(jobs)
            .map(|(id, options)| async move { (id, self.run_for_user_at(id, options, now).await) })
            .buffer_unordered(concurrency)
            .collect()
            .await;

        let mut summary = BatchSummary::default();
        for (id, result) in &results {
            if let Err(e) = result {
                tracing::error!(user_id = %id, error = %e, "Nudge evaluation failed");
            }
            summary.record(result);
        }
        summary
    }
}

/// Downgrade a planned reset to a scheduled evaluation when the reloaded
/// profile says it is no longer due (another path reset it since planning).
fn confirm_options(
    options: EvaluateOptions,
    user: &UserProfile,
    now: Timestamp,
) -> EvaluateOptions {
    if !options.confirm_reset_due {
        return options;
    }
    let tz = schedule::resolve_timezone(user.timezone.as_deref());
    if schedule::is_reset_due(now, tz, user.last_reset_at, user.notification_frequency) {
        options
    } else {
        tracing::debug!(user_id = %user.id, "Planned reset no longer due");
        EvaluateOptions::scheduled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn locks_are_pruned_after_release() {
        let locks = UserLocks::default();
        let id = uuid::Uuid::new_v4();

        let lock = locks.get(id);
        assert_eq!(locks.len(), 1);
        locks.release(id);
        assert_eq!(locks.len(), 1, "still held by the caller");

        drop(lock);
        locks.release(id);
        assert_eq!(locks.len(), 0);
    }

    #[tokio::test]
    async fn same_user_shares_one_lock() {
        let locks = UserLocks::default();
        let id = uuid::Uuid::new_v4();
        let a = locks.get(id);
        let b = locks.get(id);
        assert!(Arc::ptr_eq(&a, &b));

        let _held = a.lock().await;
        assert!(b.try_lock().is_err());
    }

    #[test]
    fn stale_reset_is_downgraded() {
        use chrono::{NaiveDate, TimeZone};
        use studynudge_core::profile::NotificationFrequency;

        // 08:05 in New York.
        let now = Utc.with_ymd_and_hms(2024, 6, 3, 12, 5, 0).unwrap();
        let mut user = UserProfile {
            id: uuid::Uuid::new_v4(),
            handle: "alice".into(),
            channel_key: "key".into(),
            topics: vec![],
            difficulties: vec![],
            notification_frequency: NotificationFrequency::Daily,
            timezone: Some("America/New_York".into()),
            current_question: None,
            last_notified_at: None,
            last_reset_at: NaiveDate::from_ymd_opt(2024, 6, 2),
            study_plan_slug: None,
            created_at: now,
        };

        let planned = EvaluateOptions::daily_reset();
        assert_eq!(confirm_options(planned, &user, now), planned);

        user.last_reset_at = NaiveDate::from_ymd_opt(2024, 6, 3);
        assert_eq!(confirm_options(planned, &user, now), EvaluateOptions::scheduled());

        let shuffle = EvaluateOptions::shuffle();
        assert_eq!(confirm_options(shuffle, &user, now), shuffle);
    }

    #[test]
    fn summary_counts_each_status() {
        use studynudge_core::outcome::SkipReason;
        let mut summary = BatchSummary::default();
        summary.record(&Ok(NudgeOutcome::skipped(SkipReason::TooEarly)));
        summary.record(&Err(StoreError::Backend("down".into())));
        assert_eq!(summary.evaluated, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.failed, 1);
    }
}
