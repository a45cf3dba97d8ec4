use axum::routing::get;
use axum::Router;

use crate::handlers::catalog;
use crate::state::AppState;

/// ```text
/// GET /stats/{handle}  -> get_stats
/// GET /topics          -> list_topics
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/stats/{handle}", get(catalog::get_stats))
        .route("/topics", get(catalog::list_topics))
}
