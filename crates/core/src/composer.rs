//! Message composer: picks a notification template for a question.
//!
//! Pools are keyed by `(MessageKind, HourBucket)`. One entry is drawn
//! uniformly per call from the caller-supplied RNG, so tests can pin the
//! choice with a seeded generator.

use rand::Rng;
use serde::Serialize;

use crate::notification::Priority;
use crate::question::Question;
use crate::schedule::HourBucket;

/// Placeholder replaced with the question title.
const TITLE_PLACEHOLDER: &str = "{title}";

/// Placeholder replaced with the question difficulty (or "coding" when unknown).
const DIFFICULTY_PLACEHOLDER: &str = "{difficulty}";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// A freshly assigned question.
    NewQuestion,
    /// A reminder about the sticky question.
    Reminder,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComposedMessage {
    pub title: String,
    pub body: String,
    pub tags: Vec<String>,
    pub priority: Priority,
}

#[derive(Debug, Clone, Copy)]
struct Template {
    title: &'static str,
    body: &'static str,
}

const fn t(title: &'static str, body: &'static str) -> Template {
    Template { title, body }
}

// ---------------------------------------------------------------------------
// Template pools
// ---------------------------------------------------------------------------

const NEW_MORNING: [Template; 3] = [
    t("Daily Challenge", "Today's Challenge: {title}. You've got this!"),
    t("Fresh Problem", "Good morning! Start the day strong with {title}."),
    t("New {difficulty} Challenge", "Coffee and {title}: the perfect morning combo."),
];

const NEW_AFTERNOON: [Template; 3] = [
    t("Daily Challenge", "Today's Challenge: {title}. You've got this!"),
    t("Afternoon Challenge", "Beat the afternoon slump with {title}."),
    t("New {difficulty} Challenge", "A new problem just landed: {title}. Take a swing at it."),
];

const NEW_EVENING: [Template; 3] = [
    t("Daily Challenge", "Today's Challenge: {title}. You've got this!"),
    t("Evening Challenge", "Wind down with something fun: {title}."),
    t("New {difficulty} Challenge", "Your next problem is {title}. One focused session is all it takes."),
];

const NEW_LATE: [Template; 3] = [
    t("Daily Challenge", "Today's Challenge: {title}. You've got this!"),
    t("Night Owl Challenge", "Still up? {title} is waiting whenever you are."),
    t("New {difficulty} Challenge", "Queued up for you: {title}. Tackle it when you're fresh."),
];

const REMINDER_MORNING: [Template; 3] = [
    t("Encouraging Nudge", "Fresh start! Give {title} a quick look whenever you're ready."),
    t("Morning Reminder", "{title} is still on the board. A clear head is your best tool."),
    t("Keep Going", "New day, same goal: {title}. You're closer than you think."),
];

const REMINDER_AFTERNOON: [Template; 3] = [
    t("Encouraging Nudge", "Mid-day momentum! You're more than capable of handling {title}."),
    t("Afternoon Reminder", "Ten minutes on {title} over lunch? Every attempt counts."),
    t("Keep Going", "{title} hasn't gone anywhere. Neither has your progress."),
];

const REMINDER_EVENING: [Template; 3] = [
    t("Encouraging Nudge", "Evening focus time! You've solved tougher ones than {title} before."),
    t("Evening Reminder", "Quiet evening? Perfect time to finish {title}."),
    t("Keep Going", "You started {title} for a reason. Let's close it out."),
];

const REMINDER_LATE: [Template; 3] = [
    t(
        "Encouraging Nudge",
        "Before you wrap up, one last push for your {title} goal! You'll feel great crossing it off.",
    ),
    t("Late Reminder", "{title} will still be here tomorrow, but imagine solving it tonight."),
    t("Keep Going", "Sleep on {title} if you must. A fresh look often cracks it."),
];

const CELEBRATION: Template = t(
    "Challenge Completed",
    "You solved {title}! Great work. A new challenge is on its way.",
);

// ---------------------------------------------------------------------------
// MessageComposer
// ---------------------------------------------------------------------------

/// Pure template selector. Holds no state between calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct MessageComposer;

impl MessageComposer {
    pub fn new() -> Self {
        Self
    }

    /// Compose a nudge for `question`.
    ///
    /// New-question messages are high priority; reminders use the default.
    pub fn compose<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        question: &Question,
        kind: MessageKind,
        bucket: HourBucket,
    ) -> ComposedMessage {
        let pool = Self::pool(kind, bucket);
        let template = pool[rng.random_range(0..pool.len())];

        let (tags, priority) = match kind {
            MessageKind::NewQuestion => (vec!["brain".to_string()], Priority::High),
            MessageKind::Reminder => (vec!["muscle".to_string()], Priority::Default),
        };

        ComposedMessage {
            title: render(template.title, question),
            body: render(template.body, question),
            tags,
            priority,
        }
    }

    /// Fixed high-priority message for a solved sticky question.
    pub fn celebration(&self, question: &Question) -> ComposedMessage {
        ComposedMessage {
            title: render(CELEBRATION.title, question),
            body: render(CELEBRATION.body, question),
            tags: vec!["tada".to_string(), "trophy".to_string()],
            priority: Priority::High,
        }
    }

    fn pool(kind: MessageKind, bucket: HourBucket) -> &'static [Template; 3] {
        match (kind, bucket) {
            (MessageKind::NewQuestion, HourBucket::Morning) => &NEW_MORNING,
            (MessageKind::NewQuestion, HourBucket::Afternoon) => &NEW_AFTERNOON,
            (MessageKind::NewQuestion, HourBucket::Evening) => &NEW_EVENING,
            (MessageKind::NewQuestion, HourBucket::Late) => &NEW_LATE,
            (MessageKind::Reminder, HourBucket::Morning) => &REMINDER_MORNING,
            (MessageKind::Reminder, HourBucket::Afternoon) => &REMINDER_AFTERNOON,
            (MessageKind::Reminder, HourBucket::Evening) => &REMINDER_EVENING,
            (MessageKind::Reminder, HourBucket::Late) => &REMINDER_LATE,
        }
    }
}

fn render(template: &str, question: &Question) -> String {
    let difficulty = question.difficulty.map_or("Coding", |d| d.as_str());
    template
        .replace(TITLE_PLACEHOLDER, &question.title)
        .replace(DIFFICULTY_PLACEHOLDER, difficulty)
}
