pub mod account;
pub mod catalog;
pub mod health;
pub mod nudge;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /setup                      find-or-create account (POST)
/// /settings/{channel_key}     read (GET), update (PATCH)
///
/// /nudge                      manual nudge (POST)
/// /shuffle                    forced new question (POST)
///
/// /stats/{handle}             account statistics (GET)
/// /topics                     known topic list (GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(account::router())
        .merge(nudge::router())
        .merge(catalog::router())
}
