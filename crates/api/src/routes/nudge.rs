use axum::routing::post;
use axum::Router;

use crate::handlers::nudge;
use crate::state::AppState;

/// On-demand trigger routes.
///
/// ```text
/// POST /nudge    -> nudge
/// POST /shuffle  -> shuffle
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/nudge", post(nudge::nudge))
        .route("/shuffle", post(nudge::shuffle))
}
