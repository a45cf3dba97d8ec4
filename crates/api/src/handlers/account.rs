//! Handlers for account setup and settings.
//!
//! Settings are addressed by the user's channel key, which doubles as the
//! capability token handed out at setup.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use studynudge_core::error::CoreError;
use studynudge_core::profile::{NewUser, SettingsUpdate, UserProfile};
use studynudge_core::schedule::parse_timezone;
use studynudge_db::models::user::UserSettingsResponse;
use studynudge_engine::StoreError;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct SetupRequest {
    #[validate(length(min = 1, max = 64, message = "username must be 1-64 characters"))]
    pub username: String,
    pub timezone: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SetupResponse {
    pub secret_key: String,
    /// `false` when the handle already had an account.
    pub created: bool,
}

/// POST /api/v1/setup
///
/// Find the account for `username`, creating it with defaults on first use.
/// Returns the channel key either way.
pub async fn setup(
    State(state): State<AppState>,
    Json(input): Json<SetupRequest>,
) -> AppResult<impl IntoResponse> {
    let input = SetupRequest {
        username: input.username.trim().to_string(),
        timezone: input.timezone.filter(|tz| !tz.trim().is_empty()),
    };
    input.validate()?;
    if let Some(tz) = &input.timezone {
        if parse_timezone(tz).is_none() {
            return Err(CoreError::Validation(format!("unknown timezone '{tz}'")).into());
        }
    }

    let store = state.store();
    if let Some(existing) = store.find_by_handle(&input.username).await? {
        return Ok((StatusCode::OK, Json(setup_response(existing, false))));
    }

    let user = match store
        .create(&NewUser::new(input.username.clone(), input.timezone.clone()))
        .await
    {
        Ok(user) => user,
        // Lost a race against a concurrent setup for the same handle.
        Err(StoreError::Conflict(_)) => store
            .find_by_handle(&input.username)
            .await?
            .ok_or_else(|| AppError::InternalError("user vanished after conflict".into()))?,
        Err(e) => return Err(e.into()),
    };

    tracing::info!(user_id = %user.id, handle = %user.handle, "Account created");

    Ok((StatusCode::CREATED, Json(setup_response(user, true))))
}

fn setup_response(user: UserProfile, created: bool) -> DataResponse<SetupResponse> {
    DataResponse {
        data: SetupResponse {
            secret_key: user.channel_key,
            created,
        },
    }
}

/// GET /api/v1/settings/{channel_key}
pub async fn get_settings(
    State(state): State<AppState>,
    Path(channel_key): Path<String>,
) -> AppResult<impl IntoResponse> {
    let user = find_by_key(&state, &channel_key).await?;
    Ok(Json(DataResponse {
        data: UserSettingsResponse::from(&user),
    }))
}

/// PATCH /api/v1/settings/{channel_key}
///
/// Apply a partial settings update. Omitted fields are left untouched;
/// `"study_plan_slug": null` clears the plan.
pub async fn update_settings(
    State(state): State<AppState>,
    Path(channel_key): Path<String>,
    Json(update): Json<SettingsUpdate>,
) -> AppResult<impl IntoResponse> {
    update.validate()?;
    let user = find_by_key(&state, &channel_key).await?;

    let updated = state
        .store()
        .update_settings(user.id, &update)
        .await?
        .ok_or_else(|| StoreError::NotFound(user.id.to_string()))?;

    tracing::info!(user_id = %updated.id, "User settings updated");

    Ok(Json(DataResponse {
        data: UserSettingsResponse::from(&updated),
    }))
}

/// Resolve a channel key to its profile, or a 404.
pub(crate) async fn find_by_key(state: &AppState, channel_key: &str) -> AppResult<UserProfile> {
    state
        .store()
        .find_by_channel_key(channel_key)
        .await?
        .ok_or_else(|| StoreError::NotFound("channel key".into()).into())
}
