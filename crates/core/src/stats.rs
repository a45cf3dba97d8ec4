//! Account statistics reported by the question source.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultyCounts {
    pub easy: i64,
    pub medium: i64,
    pub hard: i64,
    pub total: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStats {
    pub username: String,
    pub solved: DifficultyCounts,
    pub available: DifficultyCounts,
    pub rank: Option<i64>,
}

impl UserStats {
    /// Share of available problems solved, in percent.
    pub fn completion_percent(&self) -> f64 {
        if self.available.total <= 0 {
            return 0.0;
        }
        self.solved.total as f64 * 100.0 / self.available.total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completion_handles_empty_catalogue() {
        let stats = UserStats {
            username: "alice".into(),
            solved: DifficultyCounts::default(),
            available: DifficultyCounts::default(),
            rank: None,
        };
        assert_eq!(stats.completion_percent(), 0.0);
    }

    #[test]
    fn completion_percent() {
        let stats = UserStats {
            username: "alice".into(),
            solved: DifficultyCounts { easy: 10, medium: 5, hard: 0, total: 15 },
            available: DifficultyCounts { easy: 50, medium: 40, hard: 10, total: 100 },
            rank: Some(1234),
        };
        assert!((stats.completion_percent() - 15.0).abs() < f64::EPSILON);
    }
}
