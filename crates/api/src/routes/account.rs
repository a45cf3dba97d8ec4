use axum::routing::{get, post};
use axum::Router;

use crate::handlers::account;
use crate::state::AppState;

/// Account routes.
///
/// ```text
/// POST  /setup                    -> setup
/// GET   /settings/{channel_key}   -> get_settings
/// PATCH /settings/{channel_key}   -> update_settings
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/setup", post(account::setup)).route(
        "/settings/{channel_key}",
        get(account::get_settings).patch(account::update_settings),
    )
}
