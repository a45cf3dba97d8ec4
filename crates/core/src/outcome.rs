//! The engine's return value.

use std::fmt;

use serde::Serialize;

use crate::profile::UserMutation;
use crate::question::Question;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NudgeStatus {
    Skipped,
    Celebrated,
    Nudged,
}

/// Why an evaluation did not produce a nudge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SkipReason {
    #[serde(rename = "too early")]
    TooEarly,
    #[serde(rename = "cooldown active")]
    CooldownActive,
    #[serde(rename = "dispatch failed")]
    DispatchFailed,
    #[serde(rename = "invalid user")]
    InvalidUser,
}

impl SkipReason {
    pub fn as_str(self) -> &'static str {
        match self {
            SkipReason::TooEarly => "too early",
            SkipReason::CooldownActive => "cooldown active",
            SkipReason::DispatchFailed => "dispatch failed",
            SkipReason::InvalidUser => "invalid user",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one evaluation.
///
/// `mutation` must be persisted if and only if [`NudgeOutcome::should_persist`]
/// holds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NudgeOutcome {
    pub dispatched: bool,
    pub status: NudgeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<SkipReason>,
    /// The question referenced by the notification, when one was composed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<Question>,
    pub is_new_question: bool,
    pub mutation: UserMutation,
}

impl NudgeOutcome {
    pub fn skipped(reason: SkipReason) -> Self {
        Self {
            dispatched: false,
            status: NudgeStatus::Skipped,
            reason: Some(reason),
            question: None,
            is_new_question: false,
            mutation: UserMutation::default(),
        }
    }

    pub fn nudged(question: Question, is_new_question: bool, mutation: UserMutation) -> Self {
        Self {
            dispatched: true,
            status: NudgeStatus::Nudged,
            reason: None,
            question: Some(question),
            is_new_question,
            mutation,
        }
    }

    pub fn celebrated(question: Question, dispatched: bool, mutation: UserMutation) -> Self {
        Self {
            dispatched,
            status: NudgeStatus::Celebrated,
            reason: (!dispatched).then_some(SkipReason::DispatchFailed),
            question: Some(question),
            is_new_question: false,
            mutation,
        }
    }

    pub fn should_persist(&self) -> bool {
        self.dispatched || self.status == NudgeStatus::Celebrated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skipped_outcomes_are_not_persisted() {
        let outcome = NudgeOutcome::skipped(SkipReason::CooldownActive);
        assert!(!outcome.should_persist());
        assert!(outcome.mutation.is_empty());
    }

    #[test]
    fn celebration_persists_even_without_delivery() {
        let q = crate::question::fallback_question("Array");
        let outcome = NudgeOutcome::celebrated(q, false, UserMutation::default());
        assert!(outcome.should_persist());
        assert_eq!(outcome.reason, Some(SkipReason::DispatchFailed));
    }

    #[test]
    fn reasons_serialize_as_phrases() {
        let json = serde_json::to_value(NudgeOutcome::skipped(SkipReason::TooEarly)).unwrap();
        assert_eq!(json["status"], "skipped");
        assert_eq!(json["reason"], "too early");
        assert_eq!(json["dispatched"], false);
    }
}
