//! Local-time gates: quiet hours, cooldown, hour buckets and the daily reset.
//!
//! All wall-clock questions are answered in the user's IANA zone via
//! `chrono-tz`, so DST transitions shift the local hour correctly.

use chrono::{Duration, NaiveDate, Timelike};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::outcome::SkipReason;
use crate::profile::NotificationFrequency;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Zone assumed for profiles without a (valid) timezone.
pub const DEFAULT_TIMEZONE: &str = "America/New_York";

/// Automatic nudges are suppressed before this local hour.
pub const QUIET_HOURS_END: u32 = 8;

/// Local hour at which the scheduled daily reset fires.
pub const DAILY_RESET_HOUR: u32 = 8;

/// Minimum minutes between two successful dispatches to the same user.
pub const DEFAULT_COOLDOWN_MINUTES: i64 = 180;

/// Largest accepted cooldown (30 days).
pub const MAX_COOLDOWN_MINUTES: i64 = 30 * 24 * 60;

// ---------------------------------------------------------------------------
// Time zones
// ---------------------------------------------------------------------------

pub fn parse_timezone(name: &str) -> Option<Tz> {
    name.trim().parse::<Tz>().ok()
}

/// Resolve a profile's zone, falling back to [`DEFAULT_TIMEZONE`] when absent
/// or unparseable.
pub fn resolve_timezone(name: Option<&str>) -> Tz {
    name.and_then(parse_timezone).unwrap_or(chrono_tz::America::New_York)
}

pub fn local_hour(now: Timestamp, tz: Tz) -> u32 {
    now.with_timezone(&tz).hour()
}

pub fn local_date(now: Timestamp, tz: Tz) -> NaiveDate {
    now.with_timezone(&tz).date_naive()
}

// ---------------------------------------------------------------------------
// Hour buckets
// ---------------------------------------------------------------------------

/// Coarse time-of-day used to pick message templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HourBucket {
    /// [8, 12)
    Morning,
    /// [12, 17)
    Afternoon,
    /// [17, 21)
    Evening,
    /// [21, 24) and [0, 8)
    Late,
}

impl HourBucket {
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            8..=11 => HourBucket::Morning,
            12..=16 => HourBucket::Afternoon,
            17..=20 => HourBucket::Evening,
            _ => HourBucket::Late,
        }
    }
}

// ---------------------------------------------------------------------------
// Gates
// ---------------------------------------------------------------------------

/// Evaluate the quiet-hours and cooldown gates.
///
/// Returns the reason to skip, or `None` when a nudge may go out. Quiet hours
/// are checked first so an early-morning tick always reports "too early".
pub fn check_gates(
    now: Timestamp,
    local_hour: u32,
    last_notified_at: Option<Timestamp>,
    cooldown: Duration,
) -> Option<SkipReason> {
    if local_hour < QUIET_HOURS_END {
        return Some(SkipReason::TooEarly);
    }
    if let Some(last) = last_notified_at {
        if now.signed_duration_since(last) < cooldown {
            return Some(SkipReason::CooldownActive);
        }
    }
    None
}

/// Whether the scheduled forced reset should run for a user right now.
///
/// Fires only during [`DAILY_RESET_HOUR`] local time, and only when the last
/// reset is at least the frequency's interval of local calendar days ago.
pub fn is_reset_due(
    now: Timestamp,
    tz: Tz,
    last_reset_at: Option<NaiveDate>,
    frequency: NotificationFrequency,
) -> bool {
    let Some(interval_days) = frequency.reset_interval_days() else {
        return false;
    };
    if local_hour(now, tz) != DAILY_RESET_HOUR {
        return false;
    }
    let today = local_date(now, tz);
    match last_reset_at {
        None => true,
        Some(last) => (today - last).num_days() >= interval_days,
    }
}
