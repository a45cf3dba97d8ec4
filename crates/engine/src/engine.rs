//! The study nudge decision state machine.
//!
//! One [`NudgeEngine::evaluate`] call decides, for one user at one instant,
//! between skipping, celebrating a solved question, re-sending the sticky
//! question, or assigning a new one. The engine never writes to the store:
//! it returns the mutation alongside the outcome and the caller persists it.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use studynudge_core::composer::{ComposedMessage, MessageComposer, MessageKind};
use studynudge_core::config::NudgeConfig;
use studynudge_core::notification::{
    settings_url, Notification, NotificationAction, MANAGE_SETTINGS_LABEL, SOLVE_NOW_LABEL,
};
use studynudge_core::outcome::{NudgeOutcome, SkipReason};
use studynudge_core::profile::{CurrentQuestion, UserMutation, UserProfile};
use studynudge_core::question::Question;
use studynudge_core::schedule::{self, HourBucket};
use studynudge_core::types::Timestamp;

use crate::ports::{NotificationDispatcher, QuestionSource};

// ---------------------------------------------------------------------------
// EvaluateOptions
// ---------------------------------------------------------------------------

/// How an evaluation was triggered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EvaluateOptions {
    /// On-demand trigger: bypasses quiet hours and cooldown.
    pub is_manual: bool,
    /// Forced reset: bypasses both gates and discards the sticky question.
    pub force_new_question: bool,
    /// The forced reset was planned from a snapshot. [`NudgeService`]
    /// re-checks it against the reloaded profile and falls back to a
    /// scheduled evaluation when the reset is no longer due.
    ///
    /// [`NudgeService`]: crate::service::NudgeService
    pub confirm_reset_due: bool,
}

impl EvaluateOptions {
    /// Periodic scheduler tick.
    pub fn scheduled() -> Self {
        Self::default()
    }

    /// User pressed "nudge me".
    pub fn manual() -> Self {
        Self {
            is_manual: true,
            ..Self::default()
        }
    }

    /// Once-per-local-day reset fired by the scheduler.
    pub fn daily_reset() -> Self {
        Self {
            is_manual: false,
            force_new_question: true,
            confirm_reset_due: true,
        }
    }

    /// User asked for a different question right now.
    pub fn shuffle() -> Self {
        Self {
            is_manual: true,
            force_new_question: true,
            confirm_reset_due: false,
        }
    }

    pub fn bypasses_gates(self) -> bool {
        self.is_manual || self.force_new_question
    }
}

// ---------------------------------------------------------------------------
// NudgeEngine
// ---------------------------------------------------------------------------

pub struct NudgeEngine {
    source: Arc<dyn QuestionSource>,
    dispatcher: Arc<dyn NotificationDispatcher>,
    composer: MessageComposer,
    config: NudgeConfig,
    rng: Mutex<StdRng>,
}

impl NudgeEngine {
    pub fn new(
        source: Arc<dyn QuestionSource>,
        dispatcher: Arc<dyn NotificationDispatcher>,
        config: NudgeConfig,
    ) -> Self {
        Self {
            source,
            dispatcher,
            composer: MessageComposer::new(),
            config,
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Replace the random source with a seeded one (topic draws and template
    /// picks become reproducible).
    pub fn with_seed(self, seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            ..self
        }
    }

    pub fn config(&self) -> &NudgeConfig {
        &self.config
    }

    pub fn source(&self) -> &Arc<dyn QuestionSource> {
        &self.source
    }

    /// Evaluate `user` at the current wall-clock time.
    pub async fn evaluate(&self, user: &UserProfile, options: EvaluateOptions) -> NudgeOutcome {
        self.evaluate_at(user, options, Utc::now()).await
    }

    /// Evaluate `user` as of `now`.
    ///
    /// Never fails: adapter problems degrade into a skipped outcome with an
    /// empty mutation, so the next tick retries from the same state.
    #[tracing::instrument(
        name = "evaluate",
        skip_all,
        fields(
            user_id = %user.id,
            manual = options.is_manual,
            force = options.force_new_question,
        )
    )]
    pub async fn evaluate_at(
        &self,
        user: &UserProfile,
        options: EvaluateOptions,
        now: Timestamp,
    ) -> NudgeOutcome {
        if let Err(e) = user.validate_identity() {
            tracing::warn!(error = %e, "Skipping user with incomplete identity");
            return NudgeOutcome::skipped(SkipReason::InvalidUser);
        }

        let tz = schedule::resolve_timezone(user.timezone.as_deref());
        let hour = schedule::local_hour(now, tz);

        if !options.bypasses_gates() {
            if let Some(reason) =
                schedule::check_gates(now, hour, user.last_notified_at, self.config.cooldown())
            {
                tracing::debug!(%reason, local_hour = hour, "Gate closed");
                return NudgeOutcome::skipped(reason);
            }
        }

        let mut mutation = UserMutation::default();

        let (question, is_new_question) = match &user.current_question {
            Some(current) if !options.force_new_question => {
                if self.source.is_solved(&user.handle, &current.slug).await {
                    return self.celebrate(user, current, now).await;
                }
                (current.to_question(), false)
            }
            _ => {
                let question = self.select_new_question(user).await;
                mutation.assign_question(CurrentQuestion::from_question(&question));
                (question, true)
            }
        };

        let kind = if is_new_question {
            MessageKind::NewQuestion
        } else {
            MessageKind::Reminder
        };
        let bucket = HourBucket::from_hour(hour);
        let message = self.with_rng(|rng| self.composer.compose(rng, &question, kind, bucket));
        let notification = self.build_notification(user, &question, message);

        if let Err(e) = self.dispatcher.dispatch(&notification).await {
            tracing::warn!(error = %e, "Dispatch failed, leaving state unchanged");
            return NudgeOutcome::skipped(SkipReason::DispatchFailed);
        }

        mutation.mark_notified(now, user.last_notified_at);
        if options.force_new_question {
            mutation.mark_reset(schedule::local_date(now, tz));
        }

        tracing::info!(
            slug = %question.slug(),
            is_new_question,
            "Nudge dispatched"
        );
        NudgeOutcome::nudged(question, is_new_question, mutation)
    }

    /// The sticky question was solved: congratulate and clear it.
    ///
    /// The question is cleared even if the celebration cannot be delivered,
    /// but `last_notified_at` only advances on delivery.
    async fn celebrate(
        &self,
        user: &UserProfile,
        current: &CurrentQuestion,
        now: Timestamp,
    ) -> NudgeOutcome {
        let question = current.to_question();
        let message = self.composer.celebration(&question);
        let notification = self.build_notification(user, &question, message);

        let mut mutation = UserMutation::default();
        mutation.clear_question();

        match self.dispatcher.dispatch(&notification).await {
            Ok(()) => {
                mutation.mark_notified(now, user.last_notified_at);
                tracing::info!(slug = %current.slug, "Solved question celebrated");
                NudgeOutcome::celebrated(question, true, mutation)
            }
            Err(e) => {
                tracing::warn!(
                    slug = %current.slug,
                    error = %e,
                    "Celebration dispatch failed, clearing question anyway"
                );
                NudgeOutcome::celebrated(question, false, mutation)
            }
        }
    }

    /// Pick the next question: first unsolved study-plan entry, otherwise a
    /// random question from a random topic.
    async fn select_new_question(&self, user: &UserProfile) -> Question {
        if let Some(plan) = user.study_plan() {
            if let Some(question) = self.next_in_plan(user, plan).await {
                return question;
            }
            tracing::info!(plan, "Study plan exhausted or unavailable, using random topic");
        }

        let topics = user.effective_topics();
        let topic = self.with_rng(|rng| topics[rng.random_range(0..topics.len())].to_string());
        tracing::debug!(%topic, "Drawing random question");
        self.source.random_question(&topic, &user.difficulties).await
    }

    /// First plan question, in plan order, that the user has not solved.
    async fn next_in_plan(&self, user: &UserProfile, plan: &str) -> Option<Question> {
        let questions = self.source.study_plan_questions(plan).await;
        for question in questions {
            if !self.source.is_solved(&user.handle, &question.slug()).await {
                return Some(question);
            }
        }
        None
    }

    fn build_notification(
        &self,
        user: &UserProfile,
        question: &Question,
        message: ComposedMessage,
    ) -> Notification {
        Notification {
            channel_key: user.channel_key.clone(),
            title: message.title,
            body: message.body,
            tags: message.tags,
            priority: message.priority,
            actions: vec![
                NotificationAction::new(SOLVE_NOW_LABEL, question.url.clone()),
                NotificationAction::new(
                    MANAGE_SETTINGS_LABEL,
                    settings_url(&self.config.app_url, &user.channel_key),
                ),
            ],
        }
    }

    /// Run `f` with the shared RNG. Never hold the guard across an await.
    fn with_rng<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut rng)
    }
}
