//! LeetCode GraphQL client and its [`QuestionSource`] implementation.
//!
//! The inherent `fetch_*` methods surface every failure as a
//! [`LeetCodeError`]. The trait implementation absorbs those errors into the
//! documented fallbacks (offline question, empty plan, "not solved") after
//! logging them.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::de::DeserializeOwned;
use serde_json::json;
use studynudge_core::question::{fallback_question, topic_tag_slug, Difficulty, Question};
use studynudge_core::stats::{DifficultyCounts, UserStats};
use studynudge_engine::QuestionSource;

use crate::error::LeetCodeError;
use crate::queries::{
    self, count_for, DifficultyCount, GraphQlResponse, QuestionListData, RecentSubmissionsData,
    StudyPlanData, Submission, UserProfileData,
};

pub const DEFAULT_GRAPHQL_URL: &str = "https://leetcode.com/graphql";

/// HTTP request timeout for a single GraphQL call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

const REFERER: &str = "https://leetcode.com";

pub struct LeetCodeClient {
    client: reqwest::Client,
    endpoint: String,
    rng: Mutex<StdRng>,
}

impl LeetCodeClient {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, LeetCodeError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("studynudge/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            rng: Mutex::new(StdRng::from_os_rng()),
        })
    }

    /// Pin difficulty and candidate picks to a seeded generator.
    pub fn with_seed(self, seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            ..self
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    // -----------------------------------------------------------------------
    // Raw queries
    // -----------------------------------------------------------------------

    /// Up to [`queries::QUESTION_LIST_LIMIT`] questions tagged with `topic`.
    pub async fn fetch_questions(
        &self,
        topic: &str,
        difficulty: Option<Difficulty>,
    ) -> Result<Vec<Question>, LeetCodeError> {
        let mut filters = json!({ "tags": [topic_tag_slug(topic)] });
        if let Some(difficulty) = difficulty {
            filters["difficulty"] = json!(difficulty.as_filter());
        }
        let variables = json!({
            "categorySlug": "",
            "skip": 0,
            "limit": queries::QUESTION_LIST_LIMIT,
            "filters": filters,
        });

        let data: QuestionListData = self.query(queries::QUESTION_LIST, variables).await?;
        Ok(data
            .problemset_question_list
            .map(|list| list.questions.into_iter().map(Question::from).collect())
            .unwrap_or_default())
    }

    pub async fn fetch_recent_submissions(
        &self,
        handle: &str,
    ) -> Result<Vec<Submission>, LeetCodeError> {
        let variables = json!({
            "username": handle,
            "limit": queries::RECENT_SUBMISSION_LIMIT,
        });
        let data: RecentSubmissionsData = self.query(queries::RECENT_SUBMISSIONS, variables).await?;
        Ok(data.recent_submission_list.unwrap_or_default())
    }

    /// Plan questions flattened across sub-groups, in plan order.
    pub async fn fetch_study_plan(&self, plan_slug: &str) -> Result<Vec<Question>, LeetCodeError> {
        let data: StudyPlanData = self
            .query(queries::STUDY_PLAN, json!({ "slug": plan_slug }))
            .await?;
        Ok(data
            .study_plan_v2_detail
            .map(|detail| {
                detail
                    .plan_sub_groups
                    .into_iter()
                    .flat_map(|group| group.questions)
                    .map(Question::from)
                    .collect()
            })
            .unwrap_or_default())
    }

    /// `None` when the handle does not match an account.
    pub async fn fetch_user_stats(&self, handle: &str) -> Result<Option<UserStats>, LeetCodeError> {
        let data: UserProfileData = self
            .query(queries::USER_PROFILE, json!({ "username": handle }))
            .await?;
        let Some(user) = data.matched_user else {
            return Ok(None);
        };

        let solved = user
            .submit_stats
            .map(|s| counts(&s.ac_submission_num))
            .unwrap_or_default();
        Ok(Some(UserStats {
            username: user.username,
            solved,
            available: counts(&data.all_questions_count),
            rank: user.profile.and_then(|p| p.ranking),
        }))
    }

    async fn query<T: DeserializeOwned>(
        &self,
        document: &str,
        variables: serde_json::Value,
    ) -> Result<T, LeetCodeError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::REFERER, REFERER)
            .json(&json!({ "query": document, "variables": variables }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(LeetCodeError::HttpStatus(response.status().as_u16()));
        }

        let body: GraphQlResponse<T> = response.json().await?;
        if let Some(first) = body.errors.into_iter().next() {
            return Err(LeetCodeError::GraphQl(first.message));
        }
        body.data.ok_or(LeetCodeError::EmptyResponse)
    }

    fn with_rng<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut rng)
    }
}

fn counts(rows: &[DifficultyCount]) -> DifficultyCounts {
    DifficultyCounts {
        easy: count_for(rows, "Easy"),
        medium: count_for(rows, "Medium"),
        hard: count_for(rows, "Hard"),
        total: count_for(rows, "All"),
    }
}

// ---------------------------------------------------------------------------
// QuestionSource
// ---------------------------------------------------------------------------

#[async_trait]
impl QuestionSource for LeetCodeClient {
    async fn random_question(&self, topic: &str, difficulties: &[Difficulty]) -> Question {
        // One difficulty per request keeps the filter simple and varies the mix.
        let difficulty = self.with_rng(|rng| {
            (!difficulties.is_empty()).then(|| difficulties[rng.random_range(0..difficulties.len())])
        });

        match self.fetch_questions(topic, difficulty).await {
            Ok(candidates) if !candidates.is_empty() => {
                let index = self.with_rng(|rng| rng.random_range(0..candidates.len()));
                candidates
                    .into_iter()
                    .nth(index)
                    .unwrap_or_else(|| fallback_question(topic))
            }
            Ok(_) => {
                tracing::warn!(topic, ?difficulty, "No questions found, using fallback");
                fallback_question(topic)
            }
            Err(e) => {
                tracing::warn!(topic, error = %e, "Question list unavailable, using fallback");
                fallback_question(topic)
            }
        }
    }

    async fn study_plan_questions(&self, plan_slug: &str) -> Vec<Question> {
        self.fetch_study_plan(plan_slug).await.unwrap_or_else(|e| {
            tracing::warn!(plan_slug, error = %e, "Study plan unavailable");
            Vec::new()
        })
    }

    async fn is_solved(&self, handle: &str, slug: &str) -> bool {
        match self.fetch_recent_submissions(handle).await {
            Ok(submissions) => submissions
                .iter()
                .any(|s| s.title_slug == slug && s.is_accepted()),
            Err(e) => {
                tracing::warn!(handle, slug, error = %e, "Solved check failed, treating as unsolved");
                false
            }
        }
    }

    async fn user_stats(&self, handle: &str) -> Option<UserStats> {
        self.fetch_user_stats(handle).await.unwrap_or_else(|e| {
            tracing::warn!(handle, error = %e, "User stats unavailable");
            None
        })
    }
}
