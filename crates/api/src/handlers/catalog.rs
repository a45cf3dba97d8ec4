//! Read-only lookups: account statistics and the topic catalogue.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use studynudge_core::error::CoreError;
use studynudge_core::question::KNOWN_TOPICS;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/stats/{handle}
///
/// Solved and available counts per difficulty plus global rank.
/// 404 when the handle is unknown or the question source is unreachable.
pub async fn get_stats(
    State(state): State<AppState>,
    Path(handle): Path<String>,
) -> AppResult<impl IntoResponse> {
    let stats = state
        .source()
        .user_stats(&handle)
        .await
        .ok_or(CoreError::NotFound {
            entity: "LeetCode user",
            key: handle,
        })?;

    Ok(Json(DataResponse { data: stats }))
}

/// GET /api/v1/topics
pub async fn list_topics() -> AppResult<impl IntoResponse> {
    Ok(Json(DataResponse { data: KNOWN_TOPICS }))
}
