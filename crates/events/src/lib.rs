//! Nudge delivery and scheduling.
//!
//! - [`delivery::ntfy`]: push delivery through an ntfy server.
//! - [`NudgeScheduler`]: periodic trigger that evaluates every active user.

pub mod delivery;
pub mod scheduler;

pub use delivery::ntfy::{NtfyDelivery, NtfyError, DEFAULT_NTFY_BASE_URL};
pub use scheduler::{plan_jobs, NudgeScheduler, DEFAULT_TICK_INTERVAL};
