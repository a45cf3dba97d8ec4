//! Notification payload handed to the dispatcher.

use serde::Serialize;

/// ntfy-style priority levels (1 = min, 5 = max).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Min,
    Low,
    Default,
    High,
    Max,
}

impl Priority {
    pub fn level(self) -> u8 {
        match self {
            Priority::Min => 1,
            Priority::Low => 2,
            Priority::Default => 3,
            Priority::High => 4,
            Priority::Max => 5,
        }
    }
}

/// A tappable link attached to a notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationAction {
    pub label: String,
    pub url: String,
}

impl NotificationAction {
    pub fn new(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            url: url.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    /// Secret per-user channel. Never logged.
    #[serde(skip_serializing)]
    pub channel_key: String,
    pub title: String,
    pub body: String,
    pub tags: Vec<String>,
    pub priority: Priority,
    pub actions: Vec<NotificationAction>,
}

pub const SOLVE_NOW_LABEL: &str = "Solve Now";
pub const MANAGE_SETTINGS_LABEL: &str = "Manage Settings";

/// Link to the settings page for a channel key.
pub fn settings_url(app_url: &str, channel_key: &str) -> String {
    format!("{}/settings/{channel_key}", app_url.trim_end_matches('/'))
}
