//! Study Nudge Engine.
//!
//! [`engine::NudgeEngine`] makes the per-user decision, [`service::NudgeService`]
//! wraps it with the store round-trip and per-user serialization, and
//! [`ports`] defines the adapter contracts both depend on.

pub mod engine;
pub mod ports;
pub mod service;
pub mod store;

pub use engine::{EvaluateOptions, NudgeEngine};
pub use ports::{DispatchError, NotificationDispatcher, QuestionSource, StoreError, UserStore};
pub use service::{BatchSummary, NudgeService, DEFAULT_MAX_CONCURRENCY};
pub use store::MemoryUserStore;
