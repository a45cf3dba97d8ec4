//! `AppError` to HTTP response mapping, checked directly on `IntoResponse`.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use http_body_util::BodyExt;
use studynudge_api::error::AppError;
use studynudge_core::error::CoreError;
use studynudge_engine::StoreError;

async fn error_to_response(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn not_found_error_returns_404() {
    let err = AppError::Core(CoreError::NotFound {
        entity: "LeetCode user",
        key: "ghost".into(),
    });

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "LeetCode user ghost not found");
}

#[tokio::test]
async fn store_errors_map_by_kind() {
    let (status, json) = error_to_response(StoreError::NotFound("abc".into()).into()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "User not found");

    let (status, json) =
        error_to_response(StoreError::Conflict("handle 'alice' already exists".into()).into())
            .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "CONFLICT");
}

#[tokio::test]
async fn backend_failures_are_sanitized() {
    let err: AppError = StoreError::Backend("password authentication failed".into()).into();

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert_eq!(json["error"], "An internal error occurred");
}

#[tokio::test]
async fn invalid_user_is_unprocessable() {
    let err = AppError::Core(CoreError::InvalidUser("handle is empty".into()));
    let (status, json) = error_to_response(err).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["code"], "INVALID_USER");
}

#[tokio::test]
async fn dispatch_failure_is_bad_gateway() {
    let (status, json) = error_to_response(AppError::DispatchFailed("dispatch failed".into())).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json["code"], "DISPATCH_FAILED");
}

#[tokio::test]
async fn bad_request_keeps_message() {
    let (status, json) = error_to_response(AppError::BadRequest("invalid field value".into())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "BAD_REQUEST");
    assert_eq!(json["error"], "invalid field value");
}
