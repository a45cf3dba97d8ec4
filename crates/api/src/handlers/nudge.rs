//! On-demand triggers: a manual nudge and a shuffle to a fresh question.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use studynudge_core::error::CoreError;
use studynudge_core::outcome::{NudgeOutcome, NudgeStatus, SkipReason};
use studynudge_engine::EvaluateOptions;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::handlers::account::find_by_key;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct TriggerRequest {
    #[validate(length(min = 1, message = "secret_key is required"))]
    pub secret_key: String,
}

/// POST /api/v1/nudge
///
/// Evaluate the user now, bypassing the time-of-day and cooldown gates.
/// A sticky question is resent, or celebrated if it has been solved.
pub async fn nudge(
    State(state): State<AppState>,
    Json(input): Json<TriggerRequest>,
) -> AppResult<impl IntoResponse> {
    trigger(&state, input, EvaluateOptions::manual()).await
}

/// POST /api/v1/shuffle
///
/// Discard the sticky question and send a freshly picked one.
pub async fn shuffle(
    State(state): State<AppState>,
    Json(input): Json<TriggerRequest>,
) -> AppResult<impl IntoResponse> {
    trigger(&state, input, EvaluateOptions::shuffle()).await
}

async fn trigger(
    state: &AppState,
    input: TriggerRequest,
    options: EvaluateOptions,
) -> AppResult<Json<DataResponse<NudgeOutcome>>> {
    input.validate()?;
    let user = find_by_key(state, &input.secret_key).await?;

    let outcome = state.service.run_for_user(user.id, options).await?;
    outcome_to_result(&outcome)?;

    Ok(Json(DataResponse { data: outcome }))
}

/// Map the skipped outcomes a manual trigger can still hit onto HTTP errors.
fn outcome_to_result(outcome: &NudgeOutcome) -> AppResult<()> {
    if outcome.status != NudgeStatus::Skipped {
        return Ok(());
    }
    match outcome.reason {
        Some(SkipReason::InvalidUser) => Err(CoreError::InvalidUser(
            "profile is missing its handle or channel key".into(),
        )
        .into()),
        Some(SkipReason::DispatchFailed) => Err(AppError::DispatchFailed(
            SkipReason::DispatchFailed.to_string(),
        )),
        Some(SkipReason::TooEarly | SkipReason::CooldownActive) | None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use studynudge_core::profile::UserMutation;
    use studynudge_core::question::Question;

    use super::*;

    #[test]
    fn skipped_outcomes_become_errors() {
        assert_matches!(
            outcome_to_result(&NudgeOutcome::skipped(SkipReason::DispatchFailed)),
            Err(AppError::DispatchFailed(reason)) if reason == "dispatch failed"
        );
        assert_matches!(
            outcome_to_result(&NudgeOutcome::skipped(SkipReason::InvalidUser)),
            Err(AppError::Core(CoreError::InvalidUser(_)))
        );
    }

    #[test]
    fn celebrations_are_successes_even_undelivered() {
        let question = Question::from_slug("two-sum", "Two Sum", None);
        let outcome = NudgeOutcome::celebrated(question, false, UserMutation::default());
        assert!(outcome_to_result(&outcome).is_ok());
    }
}
