//! User row model and its mapping onto the domain profile.

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::FromRow;
use studynudge_core::profile::{CurrentQuestion, NotificationFrequency, UserProfile};
use studynudge_core::question::Difficulty;
use studynudge_core::types::{Timestamp, UserId};

/// A row from the `users` table.
///
/// `channel_key` is a secret; never serialize this row to API responses.
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: UserId,
    pub handle: String,
    pub channel_key: String,
    pub topics: Vec<String>,
    pub difficulties: Vec<String>,
    pub notification_frequency: String,
    pub timezone: Option<String>,
    pub current_question_slug: Option<String>,
    pub current_question_title: Option<String>,
    pub last_notified_at: Option<Timestamp>,
    pub last_reset_at: Option<NaiveDate>,
    pub study_plan_slug: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<UserRow> for UserProfile {
    /// Unknown difficulty or frequency strings are dropped or defaulted
    /// with a warning rather than failing the whole load.
    fn from(row: UserRow) -> Self {
        let difficulties = row
            .difficulties
            .iter()
            .filter_map(|d| match d.parse::<Difficulty>() {
                Ok(d) => Some(d),
                Err(e) => {
                    tracing::warn!(user_id = %row.id, error = %e, "Ignoring stored difficulty");
                    None
                }
            })
            .collect();

        let notification_frequency = row
            .notification_frequency
            .parse::<NotificationFrequency>()
            .unwrap_or_else(|e| {
                tracing::warn!(user_id = %row.id, error = %e, "Defaulting stored frequency");
                NotificationFrequency::default()
            });

        UserProfile {
            id: row.id,
            handle: row.handle,
            channel_key: row.channel_key,
            topics: row.topics,
            difficulties,
            notification_frequency,
            timezone: row.timezone,
            current_question: CurrentQuestion::from_parts(
                row.current_question_slug,
                row.current_question_title,
            ),
            last_notified_at: row.last_notified_at,
            last_reset_at: row.last_reset_at,
            study_plan_slug: row.study_plan_slug,
            created_at: row.created_at,
        }
    }
}

/// Public settings view, safe to return from the settings endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct UserSettingsResponse {
    pub handle: String,
    pub topics: Vec<String>,
    pub difficulties: Vec<Difficulty>,
    pub notification_frequency: NotificationFrequency,
    pub timezone: Option<String>,
    pub study_plan_slug: Option<String>,
    pub current_question: Option<CurrentQuestion>,
    pub last_notified_at: Option<Timestamp>,
}

impl From<&UserProfile> for UserSettingsResponse {
    fn from(user: &UserProfile) -> Self {
        Self {
            handle: user.handle.clone(),
            topics: user.topics.clone(),
            difficulties: user.difficulties.clone(),
            notification_frequency: user.notification_frequency,
            timezone: user.timezone.clone(),
            study_plan_slug: user.study_plan_slug.clone(),
            current_question: user.current_question.clone(),
            last_notified_at: user.last_notified_at,
        }
    }
}
