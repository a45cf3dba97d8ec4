//! Practice questions and the topic catalogue.
//!
//! A [`Question`] is an immutable value handed out by the question source.
//! Its `url` encodes the problem slug, which is what solved-status checks and
//! the sticky `current_question` record key on.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Base URL for problem pages. Slugs are appended as `{base}{slug}/`.
pub const PROBLEM_URL_BASE: &str = "https://leetcode.com/problems/";

/// Topic used when a profile has no topics configured.
pub const DEFAULT_TOPIC: &str = "Array";

/// Topics offered by the settings UI.
pub const KNOWN_TOPICS: [&str; 20] = [
    "Array",
    "String",
    "Hash Table",
    "Dynamic Programming",
    "Math",
    "Sorting",
    "Greedy",
    "Depth-First Search",
    "Database",
    "Binary Search",
    "Matrix",
    "Tree",
    "Breadth-First Search",
    "Bit Manipulation",
    "Two Pointers",
    "Prefix Sum",
    "Heap (Priority Queue)",
    "Binary Tree",
    "Simulation",
    "Stack",
];

// ---------------------------------------------------------------------------
// Difficulty
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    #[serde(alias = "EASY", alias = "easy")]
    Easy,
    #[serde(alias = "MEDIUM", alias = "medium")]
    Medium,
    #[serde(alias = "HARD", alias = "hard")]
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }

    /// Upper-case form expected by the question list filter.
    pub fn as_filter(self) -> &'static str {
        match self {
            Difficulty::Easy => "EASY",
            Difficulty::Medium => "MEDIUM",
            Difficulty::Hard => "HARD",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    /// Case-insensitive: upstream sends both `Easy` and `EASY`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty '{other}'")),
        }
    }
}

// ---------------------------------------------------------------------------
// Question
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub title: String,
    pub url: String,
    /// `None` for sticky questions rebuilt from the stored slug/title pair.
    pub difficulty: Option<Difficulty>,
}

impl Question {
    pub fn from_slug(slug: &str, title: impl Into<String>, difficulty: Option<Difficulty>) -> Self {
        Self {
            title: title.into(),
            url: problem_url(slug),
            difficulty,
        }
    }

    /// The external slug encoded in `url`, or a slug derived from the title
    /// when the URL does not follow the `/problems/{slug}/` shape.
    pub fn slug(&self) -> String {
        slug_from_url(&self.url)
            .map(str::to_string)
            .unwrap_or_else(|| title_slug(&self.title))
    }
}

/// Build a problem page URL for a slug.
pub fn problem_url(slug: &str) -> String {
    format!("{PROBLEM_URL_BASE}{slug}/")
}

/// Extract the slug segment following `/problems/` in a problem URL.
pub fn slug_from_url(url: &str) -> Option<&str> {
    let (_, rest) = url.split_once("/problems/")?;
    let slug = rest.split('/').next()?.trim();
    if slug.is_empty() {
        None
    } else {
        Some(slug)
    }
}

/// Convert a topic name into the tag slug the question list filters on.
///
/// `"Heap (Priority Queue)"` becomes `"heap-priority-queue"`.
pub fn topic_tag_slug(topic: &str) -> String {
    let cleaned: String = topic
        .to_lowercase()
        .chars()
        .filter(|c| *c != '(' && *c != ')')
        .collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join("-")
}

/// Lower-case, hyphen-joined slug for a problem title ("Two Sum" -> "two-sum").
pub fn title_slug(title: &str) -> String {
    title.to_lowercase().split_whitespace().collect::<Vec<_>>().join("-")
}

// ---------------------------------------------------------------------------
// Fallback questions
// ---------------------------------------------------------------------------

/// Offline question per topic, used when the source is unreachable or
/// returns nothing. Unknown topics use [`DEFAULT_FALLBACK`].
const FALLBACK_TABLE: [(&str, &str); 4] = [
    ("Array", "Two Sum"),
    ("String", "Valid Palindrome"),
    ("Hash Table", "Two Sum"),
    ("Dynamic Programming", "Climbing Stairs"),
];

const DEFAULT_FALLBACK: &str = "Two Sum";

/// Deterministic placeholder question for a topic. Difficulty is always Easy.
pub fn fallback_question(topic: &str) -> Question {
    let title = FALLBACK_TABLE
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(topic))
        .map_or(DEFAULT_FALLBACK, |(_, title)| *title);

    Question::from_slug(&title_slug(title), title, Some(Difficulty::Easy))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_extracted_from_problem_url() {
        assert_eq!(
            slug_from_url("https://leetcode.com/problems/two-sum/"),
            Some("two-sum")
        );
        assert_eq!(
            slug_from_url("https://leetcode.com/problems/house-robber"),
            Some("house-robber")
        );
    }

    #[test]
    fn slug_missing_for_foreign_urls() {
        assert_eq!(slug_from_url("https://example.com/two-sum"), None);
        assert_eq!(slug_from_url("https://leetcode.com/problems/"), None);
    }

    #[test]
    fn question_slug_falls_back_to_title() {
        let q = Question {
            title: "Climbing Stairs".into(),
            url: "https://example.com/elsewhere".into(),
            difficulty: None,
        };
        assert_eq!(q.slug(), "climbing-stairs");
    }

    #[test]
    fn tag_slug_strips_parentheses() {
        assert_eq!(topic_tag_slug("Heap (Priority Queue)"), "heap-priority-queue");
        assert_eq!(topic_tag_slug("Depth-First Search"), "depth-first-search");
        assert_eq!(topic_tag_slug("Hash  Table"), "hash-table");
    }

    #[test]
    fn difficulty_parses_any_case() {
        assert_eq!("EASY".parse::<Difficulty>(), Ok(Difficulty::Easy));
        assert_eq!("medium".parse::<Difficulty>(), Ok(Difficulty::Medium));
        assert_eq!(" Hard ".parse::<Difficulty>(), Ok(Difficulty::Hard));
        assert!("extreme".parse::<Difficulty>().is_err());
    }

    #[test]
    fn fallback_is_stable_per_topic() {
        let a = fallback_question("Dynamic Programming");
        let b = fallback_question("Dynamic Programming");
        assert_eq!(a, b);
        assert_eq!(a.title, "Climbing Stairs");
        assert_eq!(a.url, "https://leetcode.com/problems/climbing-stairs/");
        assert_eq!(a.difficulty, Some(Difficulty::Easy));
    }

    #[test]
    fn fallback_for_unknown_topic_uses_default() {
        let q = fallback_question("Unknown Topic");
        assert_eq!(q.title, "Two Sum");
        assert_eq!(q.slug(), "two-sum");
    }
}
