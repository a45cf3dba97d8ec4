//! Study nudge domain crate.
//!
//! Zero internal dependencies: profiles, questions, the time-of-day and
//! cooldown gates, the message composer, and the outcome type the engine
//! returns. Everything here is synchronous and free of I/O.

pub mod composer;
pub mod config;
pub mod error;
pub mod notification;
pub mod outcome;
pub mod profile;
pub mod question;
pub mod schedule;
pub mod stats;
pub mod types;
