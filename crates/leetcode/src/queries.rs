//! GraphQL documents and response shapes for the LeetCode API.

use serde::Deserialize;
use studynudge_core::question::{problem_url, Difficulty, Question};

/// Candidates fetched per random draw.
pub const QUESTION_LIST_LIMIT: u32 = 50;

/// Recent submissions inspected by the solved check.
pub const RECENT_SUBMISSION_LIMIT: u32 = 20;

pub const QUESTION_LIST: &str = r#"
query problemsetQuestionList($categorySlug: String, $limit: Int, $skip: Int, $filters: QuestionListFilterInput) {
  problemsetQuestionList: questionList(
    categorySlug: $categorySlug
    limit: $limit
    skip: $skip
    filters: $filters
  ) {
    questions: data {
      title
      titleSlug
      difficulty
    }
  }
}
"#;

pub const RECENT_SUBMISSIONS: &str = r#"
query recentSubmissionList($username: String!, $limit: Int) {
  recentSubmissionList(username: $username, limit: $limit) {
    titleSlug
    statusDisplay
  }
}
"#;

pub const STUDY_PLAN: &str = r#"
query studyPlanV2Detail($slug: String!) {
  studyPlanV2Detail(planSlug: $slug) {
    planSubGroups {
      questions {
        title
        titleSlug
        difficulty
      }
    }
  }
}
"#;

pub const USER_PROFILE: &str = r#"
query getUserProfile($username: String!) {
  allQuestionsCount {
    difficulty
    count
  }
  matchedUser(username: $username) {
    username
    profile {
      ranking
    }
    submitStats {
      acSubmissionNum {
        difficulty
        count
      }
    }
  }
}
"#;

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
pub struct GraphQlError {
    pub message: String,
}

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionNode {
    pub title: String,
    pub title_slug: String,
    pub difficulty: Option<Difficulty>,
}

impl From<QuestionNode> for Question {
    fn from(node: QuestionNode) -> Self {
        Question {
            url: problem_url(&node.title_slug),
            title: node.title,
            difficulty: node.difficulty,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionListData {
    pub problemset_question_list: Option<QuestionList>,
}

#[derive(Debug, Deserialize)]
pub struct QuestionList {
    #[serde(default)]
    pub questions: Vec<QuestionNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentSubmissionsData {
    #[serde(default)]
    pub recent_submission_list: Option<Vec<Submission>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub title_slug: String,
    pub status_display: String,
}

impl Submission {
    pub fn is_accepted(&self) -> bool {
        self.status_display == "Accepted"
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyPlanData {
    pub study_plan_v2_detail: Option<StudyPlanDetail>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyPlanDetail {
    #[serde(default)]
    pub plan_sub_groups: Vec<PlanSubGroup>,
}

#[derive(Debug, Deserialize)]
pub struct PlanSubGroup {
    #[serde(default)]
    pub questions: Vec<QuestionNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfileData {
    #[serde(default)]
    pub all_questions_count: Vec<DifficultyCount>,
    pub matched_user: Option<MatchedUser>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchedUser {
    pub username: String,
    pub profile: Option<MatchedProfile>,
    pub submit_stats: Option<SubmitStats>,
}

#[derive(Debug, Deserialize)]
pub struct MatchedProfile {
    pub ranking: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitStats {
    #[serde(default)]
    pub ac_submission_num: Vec<DifficultyCount>,
}

/// One row of a per-difficulty count list. `difficulty` is "All", "Easy",
/// "Medium" or "Hard".
#[derive(Debug, Deserialize)]
pub struct DifficultyCount {
    pub difficulty: String,
    pub count: i64,
}

/// Count for `difficulty` in a list, zero when absent.
pub fn count_for(rows: &[DifficultyCount], difficulty: &str) -> i64 {
    rows.iter()
        .find(|r| r.difficulty == difficulty)
        .map_or(0, |r| r.count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_node_builds_problem_url() {
        let node: QuestionNode = serde_json::from_str(
            r#"{"title": "Two Sum", "titleSlug": "two-sum", "difficulty": "Easy"}"#,
        )
        .unwrap();
        let question = Question::from(node);
        assert_eq!(question.url, "https://leetcode.com/problems/two-sum/");
        assert_eq!(question.difficulty, Some(Difficulty::Easy));
    }

    #[test]
    fn errors_default_to_empty() {
        let response: GraphQlResponse<RecentSubmissionsData> =
            serde_json::from_str(r#"{"data": {"recentSubmissionList": []}}"#).unwrap();
        assert!(response.errors.is_empty());
    }

    #[test]
    fn missing_counts_are_zero() {
        let rows = vec![DifficultyCount {
            difficulty: "Easy".into(),
            count: 4,
        }];
        assert_eq!(count_for(&rows, "Easy"), 4);
        assert_eq!(count_for(&rows, "Hard"), 0);
    }
}
