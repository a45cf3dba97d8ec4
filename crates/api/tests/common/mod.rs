#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use studynudge_api::config::ServerConfig;
use studynudge_api::router::build_app_router;
use studynudge_api::state::AppState;
use studynudge_core::notification::Notification;
use studynudge_core::question::{Difficulty, Question};
use studynudge_core::stats::{DifficultyCounts, UserStats};
use studynudge_engine::{
    DispatchError, MemoryUserStore, NotificationDispatcher, NudgeEngine, NudgeService,
    QuestionSource,
};
use tower::ServiceExt;

/// Build a test `ServerConfig` with safe defaults and the scheduler off.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        database_url: "postgres://unused".to_string(),
        cors_origins: vec!["http://localhost:3000".to_string()],
        request_timeout_secs: 30,
        app_url: "https://nudge.test".to_string(),
        ntfy_base_url: "http://ntfy.invalid".to_string(),
        leetcode_graphql_url: "http://leetcode.invalid/graphql".to_string(),
        cooldown_minutes: 180,
        scheduler_interval_secs: 900,
        scheduler_enabled: false,
        max_concurrent_evaluations: 4,
    }
}

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

/// Always offers the same question; knows one account, `alice`.
#[derive(Default)]
pub struct StubSource {
    solved: Mutex<HashSet<(String, String)>>,
}

impl StubSource {
    pub fn mark_solved(&self, handle: &str, slug: &str) {
        self.solved
            .lock()
            .unwrap()
            .insert((handle.to_string(), slug.to_string()));
    }
}

pub fn offered_question() -> Question {
    Question::from_slug("climbing-stairs", "Climbing Stairs", Some(Difficulty::Easy))
}

#[async_trait]
impl QuestionSource for StubSource {
    async fn random_question(&self, _topic: &str, _difficulties: &[Difficulty]) -> Question {
        offered_question()
    }

    async fn study_plan_questions(&self, _plan_slug: &str) -> Vec<Question> {
        Vec::new()
    }

    async fn is_solved(&self, handle: &str, slug: &str) -> bool {
        self.solved
            .lock()
            .unwrap()
            .contains(&(handle.to_string(), slug.to_string()))
    }

    async fn user_stats(&self, handle: &str) -> Option<UserStats> {
        (handle == "alice").then(|| UserStats {
            username: "alice".into(),
            solved: DifficultyCounts {
                easy: 40,
                medium: 15,
                hard: 5,
                total: 60,
            },
            available: DifficultyCounts {
                easy: 800,
                medium: 1700,
                hard: 700,
                total: 3200,
            },
            rank: Some(120_000),
        })
    }
}

#[derive(Default)]
pub struct RecordingDispatcher {
    failing: AtomicBool,
    sent: Mutex<Vec<Notification>>,
}

impl RecordingDispatcher {
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationDispatcher for RecordingDispatcher {
    async fn dispatch(&self, notification: &Notification) -> Result<(), DispatchError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(DispatchError::Rejected(503));
        }
        self.sent.lock().unwrap().push(notification.clone());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// App harness
// ---------------------------------------------------------------------------

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryUserStore>,
    pub source: Arc<StubSource>,
    pub dispatcher: Arc<RecordingDispatcher>,
}

/// Build the full application router over an in-memory store and fakes,
/// with the same middleware stack production uses.
pub fn build_test_app() -> TestApp {
    let config = test_config();
    let store = Arc::new(MemoryUserStore::new());
    let source = Arc::new(StubSource::default());
    let dispatcher = Arc::new(RecordingDispatcher::default());

    let engine = NudgeEngine::new(source.clone(), dispatcher.clone(), config.nudge_config())
        .with_seed(7);
    let service = Arc::new(NudgeService::new(engine, store.clone()));
    let router = build_app_router(AppState::new(config.clone(), service), &config)
        .expect("test config is valid");

    TestApp {
        router,
        store,
        source,
        dispatcher,
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: &TestApp, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.router.clone().oneshot(request).await.unwrap()
}

pub async fn send_json(app: &TestApp, method: Method, uri: &str, body: Value) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.router.clone().oneshot(request).await.unwrap()
}

pub async fn post_json(app: &TestApp, uri: &str, body: Value) -> Response<Body> {
    send_json(app, Method::POST, uri, body).await
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Run account setup for `username` and return the channel key.
pub async fn setup_user(app: &TestApp, username: &str) -> String {
    let response = post_json(app, "/api/v1/setup", serde_json::json!({ "username": username })).await;
    let json = body_json(response).await;
    json["data"]["secret_key"].as_str().unwrap().to_string()
}
