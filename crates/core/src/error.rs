#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with key {key}")]
    NotFound { entity: &'static str, key: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    /// The profile lacks an identity field the engine needs to act on it.
    #[error("Invalid user: {0}")]
    InvalidUser(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
