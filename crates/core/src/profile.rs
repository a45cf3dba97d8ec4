//! User profile, the sticky question record, and partial-update intents.
//!
//! The engine never writes a profile directly. It returns a [`UserMutation`]
//! and the caller hands it to the user store, which applies it atomically.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::question::{Difficulty, Question, DEFAULT_TOPIC};
use crate::schedule;
use crate::types::{Timestamp, UserId};

/// Maximum accepted length for a free-text topic name.
pub const MAX_TOPIC_LEN: usize = 64;

// ---------------------------------------------------------------------------
// NotificationFrequency
// ---------------------------------------------------------------------------

/// How often the scheduled trigger should reset the user's question.
///
/// Not consulted by the engine itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationFrequency {
    #[default]
    Daily,
    Weekly,
    None,
}

impl NotificationFrequency {
    pub fn as_str(self) -> &'static str {
        match self {
            NotificationFrequency::Daily => "daily",
            NotificationFrequency::Weekly => "weekly",
            NotificationFrequency::None => "none",
        }
    }

    /// Minimum number of local calendar days between two forced resets.
    /// `None` never resets.
    pub fn reset_interval_days(self) -> Option<i64> {
        match self {
            NotificationFrequency::Daily => Some(1),
            NotificationFrequency::Weekly => Some(7),
            NotificationFrequency::None => None,
        }
    }
}

impl fmt::Display for NotificationFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationFrequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(NotificationFrequency::Daily),
            "weekly" => Ok(NotificationFrequency::Weekly),
            "none" => Ok(NotificationFrequency::None),
            other => Err(format!("unknown notification frequency '{other}'")),
        }
    }
}

// ---------------------------------------------------------------------------
// CurrentQuestion
// ---------------------------------------------------------------------------

/// The sticky in-progress challenge. Slug and title always travel together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentQuestion {
    pub slug: String,
    pub title: String,
}

impl CurrentQuestion {
    pub fn from_question(question: &Question) -> Self {
        Self {
            slug: question.slug(),
            title: question.title.clone(),
        }
    }

    /// Rebuild a question value for message composition. Difficulty is not
    /// stored, so it is left unknown.
    pub fn to_question(&self) -> Question {
        Question::from_slug(&self.slug, self.title.clone(), None)
    }

    /// Pair two nullable columns into a record, or `None` unless both are set.
    pub fn from_parts(slug: Option<String>, title: Option<String>) -> Option<Self> {
        match (slug, title) {
            (Some(slug), Some(title)) if !slug.is_empty() => Some(Self { slug, title }),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// UserProfile
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    /// External account name used for solved-status lookups.
    pub handle: String,
    /// Secret per-user notification channel. Doubles as the settings link token.
    pub channel_key: String,
    pub topics: Vec<String>,
    /// Empty means no difficulty filter.
    pub difficulties: Vec<Difficulty>,
    pub notification_frequency: NotificationFrequency,
    pub timezone: Option<String>,
    pub current_question: Option<CurrentQuestion>,
    pub last_notified_at: Option<Timestamp>,
    pub last_reset_at: Option<NaiveDate>,
    pub study_plan_slug: Option<String>,
    pub created_at: Timestamp,
}

impl UserProfile {
    /// Topics to draw from, substituting [`DEFAULT_TOPIC`] when none are set.
    pub fn effective_topics(&self) -> Vec<&str> {
        let topics: Vec<&str> = self
            .topics
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .collect();
        if topics.is_empty() {
            vec![DEFAULT_TOPIC]
        } else {
            topics
        }
    }

    /// The study plan slug, treating a blank value as unset.
    pub fn study_plan(&self) -> Option<&str> {
        self.study_plan_slug
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Check the identity fields the engine cannot work without.
    pub fn validate_identity(&self) -> Result<(), CoreError> {
        if self.handle.trim().is_empty() {
            return Err(CoreError::InvalidUser("handle is empty".into()));
        }
        if self.channel_key.trim().is_empty() {
            return Err(CoreError::InvalidUser("channel key is empty".into()));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// UserMutation
// ---------------------------------------------------------------------------

/// Partial update produced by one engine evaluation.
///
/// Every field left as `None` is untouched by the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UserMutation {
    /// `Some(None)` clears the sticky question; `Some(Some(q))` assigns one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_question: Option<Option<CurrentQuestion>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_notified_at: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_reset_at: Option<NaiveDate>,
}

impl UserMutation {
    pub fn is_empty(&self) -> bool {
        self.current_question.is_none()
            && self.last_notified_at.is_none()
            && self.last_reset_at.is_none()
    }

    pub fn assign_question(&mut self, question: CurrentQuestion) -> &mut Self {
        self.current_question = Some(Some(question));
        self
    }

    pub fn clear_question(&mut self) -> &mut Self {
        self.current_question = Some(None);
        self
    }

    /// Record a successful dispatch. Never moves the stored timestamp back.
    pub fn mark_notified(&mut self, at: Timestamp, stored: Option<Timestamp>) -> &mut Self {
        self.last_notified_at = Some(stored.map_or(at, |prev| prev.max(at)));
        self
    }

    pub fn mark_reset(&mut self, on: NaiveDate) -> &mut Self {
        self.last_reset_at = Some(on);
        self
    }

    /// Apply this mutation to an in-memory profile.
    ///
    /// `last_notified_at` only ever moves forward.
    pub fn apply_to(&self, profile: &mut UserProfile) {
        if let Some(question) = &self.current_question {
            profile.current_question = question.clone();
        }
        if let Some(at) = self.last_notified_at {
            profile.last_notified_at = Some(profile.last_notified_at.map_or(at, |prev| prev.max(at)));
        }
        if let Some(on) = self.last_reset_at {
            profile.last_reset_at = Some(on);
        }
    }
}

// ---------------------------------------------------------------------------
// Account setup and settings inputs
// ---------------------------------------------------------------------------

/// Input for creating a profile at account setup.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub handle: String,
    pub channel_key: String,
    pub timezone: String,
}

impl NewUser {
    /// Input for a fresh account with a newly generated channel key.
    pub fn new(handle: impl Into<String>, timezone: Option<String>) -> Self {
        Self {
            handle: handle.into(),
            channel_key: generate_channel_key(),
            timezone: timezone.unwrap_or_else(|| schedule::DEFAULT_TIMEZONE.to_string()),
        }
    }

    pub const DEFAULT_TOPICS: [&'static str; 1] = [DEFAULT_TOPIC];
    pub const DEFAULT_DIFFICULTIES: [Difficulty; 2] = [Difficulty::Easy, Difficulty::Medium];
}

/// Random, unguessable channel key (UUID v4, 32 hex characters).
pub fn generate_channel_key() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Settings change requested by the user. `None` fields are left untouched.
///
/// `study_plan_slug: Some(None)` clears the plan.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingsUpdate {
    pub topics: Option<Vec<String>>,
    pub difficulties: Option<Vec<Difficulty>>,
    pub notification_frequency: Option<NotificationFrequency>,
    pub timezone: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub study_plan_slug: Option<Option<String>>,
}

impl SettingsUpdate {
    pub fn validate(&self) -> Result<(), CoreError> {
        if let Some(topics) = &self.topics {
            if topics.iter().all(|t| t.trim().is_empty()) {
                return Err(CoreError::Validation("at least one topic is required".into()));
            }
            if let Some(long) = topics.iter().find(|t| t.len() > MAX_TOPIC_LEN) {
                return Err(CoreError::Validation(format!(
                    "topic '{long}' exceeds {MAX_TOPIC_LEN} characters"
                )));
            }
        }
        if let Some(difficulties) = &self.difficulties {
            if difficulties.is_empty() {
                return Err(CoreError::Validation(
                    "at least one difficulty is required".into(),
                ));
            }
        }
        if let Some(tz) = &self.timezone {
            if schedule::parse_timezone(tz).is_none() {
                return Err(CoreError::Validation(format!("unknown timezone '{tz}'")));
            }
        }
        Ok(())
    }

    pub fn apply_to(&self, profile: &mut UserProfile) {
        if let Some(topics) = &self.topics {
            profile.topics = topics.clone();
        }
        if let Some(difficulties) = &self.difficulties {
            profile.difficulties = difficulties.clone();
        }
        if let Some(frequency) = self.notification_frequency {
            profile.notification_frequency = frequency;
        }
        if let Some(tz) = &self.timezone {
            profile.timezone = Some(tz.clone());
        }
        if let Some(plan) = &self.study_plan_slug {
            profile.study_plan_slug = plan.clone();
        }
    }
}

/// Distinguish an absent field from an explicit `null`.
fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::{Duration, TimeZone, Utc};

    fn profile() -> UserProfile {
        UserProfile {
            id: uuid::Uuid::new_v4(),
            handle: "alice".into(),
            channel_key: "k3y".into(),
            topics: vec![],
            difficulties: vec![],
            notification_frequency: NotificationFrequency::Daily,
            timezone: None,
            current_question: None,
            last_notified_at: None,
            last_reset_at: None,
            study_plan_slug: None,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn empty_topics_fall_back_to_default() {
        let mut user = profile();
        assert_eq!(user.effective_topics(), vec![DEFAULT_TOPIC]);
        user.topics = vec!["  ".into()];
        assert_eq!(user.effective_topics(), vec![DEFAULT_TOPIC]);
        user.topics = vec!["Tree".into(), "Math".into()];
        assert_eq!(user.effective_topics(), vec!["Tree", "Math"]);
    }

    #[test]
    fn blank_study_plan_is_unset() {
        let mut user = profile();
        user.study_plan_slug = Some("   ".into());
        assert_eq!(user.study_plan(), None);
        user.study_plan_slug = Some("leetcode-75".into());
        assert_eq!(user.study_plan(), Some("leetcode-75"));
    }

    #[test]
    fn identity_requires_handle_and_channel() {
        let mut user = profile();
        assert!(user.validate_identity().is_ok());
        user.handle.clear();
        assert_matches!(user.validate_identity(), Err(CoreError::InvalidUser(_)));
        user.handle = "alice".into();
        user.channel_key = " ".into();
        assert_matches!(user.validate_identity(), Err(CoreError::InvalidUser(_)));
    }

    #[test]
    fn current_question_needs_both_parts() {
        assert_eq!(CurrentQuestion::from_parts(Some("two-sum".into()), None), None);
        assert_eq!(CurrentQuestion::from_parts(None, Some("Two Sum".into())), None);
        assert_eq!(
            CurrentQuestion::from_parts(Some("two-sum".into()), Some("Two Sum".into())),
            Some(CurrentQuestion {
                slug: "two-sum".into(),
                title: "Two Sum".into()
            })
        );
    }

    #[test]
    fn mutation_never_moves_notified_backwards() {
        let mut user = profile();
        let later = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        user.last_notified_at = Some(later);

        let mut mutation = UserMutation::default();
        mutation.mark_notified(later - Duration::hours(2), user.last_notified_at);
        assert_eq!(mutation.last_notified_at, Some(later));

        let stale = UserMutation {
            last_notified_at: Some(later - Duration::hours(5)),
            ..Default::default()
        };
        stale.apply_to(&mut user);
        assert_eq!(user.last_notified_at, Some(later));
    }

    #[test]
    fn mutation_clears_and_assigns_question() {
        let mut user = profile();
        let q = CurrentQuestion {
            slug: "coin-change".into(),
            title: "Coin Change".into(),
        };

        let mut assign = UserMutation::default();
        assign.assign_question(q.clone());
        assign.apply_to(&mut user);
        assert_eq!(user.current_question, Some(q));

        let mut clear = UserMutation::default();
        clear.clear_question();
        clear.apply_to(&mut user);
        assert_eq!(user.current_question, None);
    }

    #[test]
    fn untouched_fields_survive_an_empty_mutation() {
        let mut user = profile();
        user.current_question = Some(CurrentQuestion {
            slug: "two-sum".into(),
            title: "Two Sum".into(),
        });
        let before = user.clone();
        let mutation = UserMutation::default();
        assert!(mutation.is_empty());
        mutation.apply_to(&mut user);
        assert_eq!(user, before);
    }

    #[test]
    fn settings_update_rejects_bad_input() {
        let empty_topics = SettingsUpdate {
            topics: Some(vec!["".into()]),
            ..Default::default()
        };
        assert_matches!(empty_topics.validate(), Err(CoreError::Validation(_)));

        let no_difficulty = SettingsUpdate {
            difficulties: Some(vec![]),
            ..Default::default()
        };
        assert_matches!(no_difficulty.validate(), Err(CoreError::Validation(_)));

        let bad_zone = SettingsUpdate {
            timezone: Some("Mars/Olympus".into()),
            ..Default::default()
        };
        assert_matches!(bad_zone.validate(), Err(CoreError::Validation(_)));
    }

    #[test]
    fn settings_update_distinguishes_null_plan() {
        let clear: SettingsUpdate =
            serde_json::from_str(r#"{"study_plan_slug": null}"#).unwrap();
        assert_eq!(clear.study_plan_slug, Some(None));

        let absent: SettingsUpdate = serde_json::from_str(r#"{"topics": ["Tree"]}"#).unwrap();
        assert_eq!(absent.study_plan_slug, None);

        let mut user = profile();
        user.study_plan_slug = Some("leetcode-75".into());
        clear.apply_to(&mut user);
        assert_eq!(user.study_plan_slug, None);
    }

    #[test]
    fn new_user_gets_default_zone_and_fresh_key() {
        let a = NewUser::new("alice", None);
        let b = NewUser::new("alice", Some("Europe/Berlin".into()));
        assert_eq!(a.timezone, schedule::DEFAULT_TIMEZONE);
        assert_eq!(b.timezone, "Europe/Berlin");
        assert_eq!(a.channel_key.len(), 32);
        assert_ne!(a.channel_key, b.channel_key);
    }

    #[test]
    fn frequency_round_trips_through_str() {
        for f in [
            NotificationFrequency::Daily,
            NotificationFrequency::Weekly,
            NotificationFrequency::None,
        ] {
            assert_eq!(f.as_str().parse::<NotificationFrequency>(), Ok(f));
        }
        assert_eq!(NotificationFrequency::None.reset_interval_days(), None);
    }
}
