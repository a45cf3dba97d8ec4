//! Contracts the engine consumes.
//!
//! Implementations live in adapter crates (`studynudge-leetcode`,
//! `studynudge-events`, `studynudge-db`). Everything is injected through
//! `Arc<dyn ...>` so tests can substitute in-process fakes.

use async_trait::async_trait;
use studynudge_core::notification::Notification;
use studynudge_core::profile::{NewUser, SettingsUpdate, UserMutation, UserProfile};
use studynudge_core::question::{Difficulty, Question};
use studynudge_core::stats::UserStats;
use studynudge_core::types::UserId;

// ---------------------------------------------------------------------------
// Question source
// ---------------------------------------------------------------------------

/// Supplies practice questions and solved-status checks.
///
/// Transport failures are absorbed at the adapter boundary: none of these
/// methods can fail visibly.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// One question for `topic`, filtered by `difficulties` (empty = any).
    ///
    /// Returns a deterministic placeholder on upstream error or empty results.
    async fn random_question(&self, topic: &str, difficulties: &[Difficulty]) -> Question;

    /// Ordered question list of a study plan. Empty on any failure.
    async fn study_plan_questions(&self, plan_slug: &str) -> Vec<Question>;

    /// Whether `handle` has an accepted submission for `slug`.
    ///
    /// `false` on any failure, so an unconfirmed solve keeps the question sticky.
    async fn is_solved(&self, handle: &str, slug: &str) -> bool;

    /// Account statistics, or `None` if the handle is unknown or the
    /// source is unreachable.
    async fn user_stats(&self, _handle: &str) -> Option<UserStats> {
        None
    }
}

// ---------------------------------------------------------------------------
// Notification dispatcher
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// The request never got a response (network, DNS, timeout).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The notification server answered with a non-2xx status.
    #[error("Delivery rejected with HTTP {0}")]
    Rejected(u16),
}

/// Delivers a composed notification to a user's channel. One attempt only.
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    async fn dispatch(&self, notification: &Notification) -> Result<(), DispatchError>;
}

// ---------------------------------------------------------------------------
// User store
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("User not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Store backend error: {0}")]
    Backend(String),
}

/// Durable per-user record.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn load(&self, id: UserId) -> Result<Option<UserProfile>, StoreError>;

    /// Apply an engine mutation atomically. `last_notified_at` never moves back.
    async fn apply_mutation(&self, id: UserId, mutation: &UserMutation) -> Result<(), StoreError>;

    /// Users whose notification frequency is not `none`.
    async fn list_active(&self) -> Result<Vec<UserProfile>, StoreError>;

    async fn find_by_channel_key(&self, channel_key: &str)
        -> Result<Option<UserProfile>, StoreError>;

    async fn find_by_handle(&self, handle: &str) -> Result<Option<UserProfile>, StoreError>;

    /// Create a profile with default topics, difficulties and frequency.
    async fn create(&self, input: &NewUser) -> Result<UserProfile, StoreError>;

    /// Returns `None` if no user with `id` exists.
    async fn update_settings(
        &self,
        id: UserId,
        update: &SettingsUpdate,
    ) -> Result<Option<UserProfile>, StoreError>;

    /// Liveness probe for the backing storage.
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
