use std::sync::Arc;

use studynudge_engine::{NudgeService, QuestionSource, UserStore};

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: everything inside is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Per-user serialized engine runner. Owns the user store and the
    /// question source.
    pub service: Arc<NudgeService>,
}

impl AppState {
    pub fn new(config: ServerConfig, service: Arc<NudgeService>) -> Self {
        Self {
            config: Arc::new(config),
            service,
        }
    }

    pub fn store(&self) -> &Arc<dyn UserStore> {
        self.service.store()
    }

    pub fn source(&self) -> &Arc<dyn QuestionSource> {
        self.service.engine().source()
    }
}
