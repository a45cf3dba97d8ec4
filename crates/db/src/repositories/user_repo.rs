//! Repository for the `users` table.

use sqlx::PgPool;
use studynudge_core::profile::{NewUser, SettingsUpdate, UserMutation};
use studynudge_core::types::UserId;

use crate::models::user::UserRow;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, handle, channel_key, topics, difficulties, notification_frequency, \
                       timezone, current_question_slug, current_question_title, \
                       last_notified_at, last_reset_at, study_plan_slug, created_at, updated_at";

/// Provides CRUD operations for study nudge users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user with default topics, difficulties and frequency.
    pub async fn create(pool: &PgPool, id: UserId, input: &NewUser) -> Result<UserRow, sqlx::Error> {
        let topics: Vec<String> = NewUser::DEFAULT_TOPICS.iter().map(|t| t.to_string()).collect();
        let difficulties: Vec<String> = NewUser::DEFAULT_DIFFICULTIES
            .iter()
            .map(|d| d.as_str().to_string())
            .collect();

        let query = format!(
            "INSERT INTO users (id, handle, channel_key, timezone, topics, difficulties)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserRow>(&query)
            .bind(id)
            .bind(&input.handle)
            .bind(&input.channel_key)
            .bind(&input.timezone)
            .bind(&topics)
            .bind(&difficulties)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: UserId) -> Result<Option<UserRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, UserRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by external handle (case-sensitive).
    pub async fn find_by_handle(pool: &PgPool, handle: &str) -> Result<Option<UserRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE handle = $1");
        sqlx::query_as::<_, UserRow>(&query)
            .bind(handle)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_channel_key(
        pool: &PgPool,
        channel_key: &str,
    ) -> Result<Option<UserRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE channel_key = $1");
        sqlx::query_as::<_, UserRow>(&query)
            .bind(channel_key)
            .fetch_optional(pool)
            .await
    }

    /// Users with notifications enabled, oldest first.
    pub async fn list_active(pool: &PgPool) -> Result<Vec<UserRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM users
             WHERE notification_frequency <> 'none'
             ORDER BY created_at"
        );
        sqlx::query_as::<_, UserRow>(&query).fetch_all(pool).await
    }

    /// Update settings. Only non-`None` fields in `input` are applied;
    /// `study_plan_slug: Some(None)` clears the plan.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update_settings(
        pool: &PgPool,
        id: UserId,
        input: &SettingsUpdate,
    ) -> Result<Option<UserRow>, sqlx::Error> {
        let difficulties: Option<Vec<String>> = input
            .difficulties
            .as_ref()
            .map(|ds| ds.iter().map(|d| d.as_str().to_string()).collect());
        let frequency = input.notification_frequency.map(|f| f.as_str());

        let query = format!(
            "UPDATE users SET
                topics = COALESCE($2, topics),
                difficulties = COALESCE($3, difficulties),
                notification_frequency = COALESCE($4, notification_frequency),
                timezone = COALESCE($5, timezone),
                study_plan_slug = CASE WHEN $6 THEN $7 ELSE study_plan_slug END,
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserRow>(&query)
            .bind(id)
            .bind(&input.topics)
            .bind(&difficulties)
            .bind(frequency)
            .bind(&input.timezone)
            .bind(input.study_plan_slug.is_some())
            .bind(input.study_plan_slug.clone().flatten())
            .fetch_optional(pool)
            .await
    }

    /// Apply an engine mutation in one statement.
    ///
    /// `last_notified_at` goes through `GREATEST`, so a stale write can never
    /// move it backwards. Returns `true` if the row exists.
    pub async fn apply_mutation(
        pool: &PgPool,
        id: UserId,
        mutation: &UserMutation,
    ) -> Result<bool, sqlx::Error> {
        let question = mutation.current_question.as_ref();
        let slug = question.and_then(|q| q.as_ref()).map(|q| q.slug.as_str());
        let title = question.and_then(|q| q.as_ref()).map(|q| q.title.as_str());

        let result = sqlx::query(
            "UPDATE users SET
                current_question_slug = CASE WHEN $2 THEN $3 ELSE current_question_slug END,
                current_question_title = CASE WHEN $2 THEN $4 ELSE current_question_title END,
                last_notified_at = GREATEST(last_notified_at, $5),
                last_reset_at = COALESCE($6, last_reset_at),
                updated_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .bind(question.is_some())
        .bind(slug)
        .bind(title)
        .bind(mutation.last_notified_at)
        .bind(mutation.last_reset_at)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
