#![allow(dead_code)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use studynudge_core::config::NudgeConfig;
use studynudge_core::notification::Notification;
use studynudge_core::profile::{CurrentQuestion, NotificationFrequency, UserProfile};
use studynudge_core::question::{fallback_question, Difficulty, Question};
use studynudge_core::types::Timestamp;
use studynudge_engine::{DispatchError, NotificationDispatcher, NudgeEngine, QuestionSource};

// ---------------------------------------------------------------------------
// Question source fake
// ---------------------------------------------------------------------------

/// Scripted question source. Random draws pop from a queue (falling back to
/// the offline table when empty); solved status is a set of `(handle, slug)`.
#[derive(Default)]
pub struct FakeSource {
    random: Mutex<VecDeque<Question>>,
    plans: Mutex<HashMap<String, Vec<Question>>>,
    solved: Mutex<HashSet<(String, String)>>,
    topics_requested: Mutex<Vec<String>>,
    solved_checks: Mutex<Vec<String>>,
}

impl FakeSource {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn queue(&self, question: Question) {
        self.random.lock().unwrap().push_back(question);
    }

    pub fn set_plan(&self, slug: &str, questions: Vec<Question>) {
        self.plans.lock().unwrap().insert(slug.to_string(), questions);
    }

    pub fn mark_solved(&self, handle: &str, slug: &str) {
        self.solved
            .lock()
            .unwrap()
            .insert((handle.to_string(), slug.to_string()));
    }

    pub fn topics_requested(&self) -> Vec<String> {
        self.topics_requested.lock().unwrap().clone()
    }

    /// Slugs passed to `is_solved`, in call order.
    pub fn solved_checks(&self) -> Vec<String> {
        self.solved_checks.lock().unwrap().clone()
    }
}

#[async_trait]
impl QuestionSource for FakeSource {
    async fn random_question(&self, topic: &str, _difficulties: &[Difficulty]) -> Question {
        self.topics_requested.lock().unwrap().push(topic.to_string());
        self.random
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| fallback_question(topic))
    }

    async fn study_plan_questions(&self, plan_slug: &str) -> Vec<Question> {
        self.plans
            .lock()
            .unwrap()
            .get(plan_slug)
            .cloned()
            .unwrap_or_default()
    }

    async fn is_solved(&self, handle: &str, slug: &str) -> bool {
        self.solved_checks.lock().unwrap().push(slug.to_string());
        self.solved
            .lock()
            .unwrap()
            .contains(&(handle.to_string(), slug.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Dispatcher fake
// ---------------------------------------------------------------------------

/// Records every notification it is asked to deliver.
#[derive(Default)]
pub struct RecordingDispatcher {
    sent: Mutex<Vec<Notification>>,
    attempts: AtomicUsize,
    failing: AtomicBool,
    delay: Mutex<Option<Duration>>,
}

impl RecordingDispatcher {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Hold every dispatch for `delay` before answering.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NotificationDispatcher for RecordingDispatcher {
    async fn dispatch(&self, notification: &Notification) -> Result<(), DispatchError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(DispatchError::Rejected(503));
        }
        self.sent.lock().unwrap().push(notification.clone());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

pub fn engine(source: Arc<FakeSource>, dispatcher: Arc<RecordingDispatcher>) -> NudgeEngine {
    NudgeEngine::new(source, dispatcher, NudgeConfig::default()).with_seed(17)
}

/// A UTC user so wall-clock hours in tests equal local hours.
pub fn user(handle: &str) -> UserProfile {
    UserProfile {
        id: uuid::Uuid::new_v4(),
        handle: handle.to_string(),
        channel_key: format!("key-{handle}"),
        topics: vec!["Array".to_string()],
        difficulties: vec![Difficulty::Easy, Difficulty::Medium],
        notification_frequency: NotificationFrequency::Daily,
        timezone: Some("UTC".to_string()),
        current_question: None,
        last_notified_at: None,
        last_reset_at: None,
        study_plan_slug: None,
        created_at: at(1, 0, 0),
    }
}

pub fn with_current(mut user: UserProfile, slug: &str, title: &str) -> UserProfile {
    user.current_question = Some(CurrentQuestion {
        slug: slug.to_string(),
        title: title.to_string(),
    });
    user
}

pub fn question(slug: &str, title: &str) -> Question {
    Question::from_slug(slug, title, Some(Difficulty::Medium))
}

/// 2024-06-`day` at `hour`:`minute` UTC.
pub fn at(day: u32, hour: u32, minute: u32) -> Timestamp {
    Utc.with_ymd_and_hms(2024, 6, day, hour, minute, 0).unwrap()
}
