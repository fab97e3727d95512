/// Integration tests for the taskdeck HTTP API
///
/// Drives the full router through `tower::Service`. The first group covers
/// the credential and validation surface, which never touches storage and
/// runs anywhere. The second group covers the task lifecycle end-to-end
/// and needs `DATABASE_URL`; without it those tests skip themselves.
mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{bearer_for, send, test_app, TestContext};
use serde_json::json;
use taskdeck_shared::auth::api_key::generate_api_key;
use taskdeck_shared::models::task::Task;
use tower::Service as _;

#[tokio::test]
async fn test_missing_credential_is_rejected_with_message_body() {
    let app = test_app();

    let request = Request::builder()
        .method("GET")
        .uri("/v1/tasks")
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_wrong_authorization_scheme_is_bad_request() {
    let app = test_app();

    let request = Request::builder()
        .method("GET")
        .uri("/v1/tasks")
        .header("authorization", "Basic abc")
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_foreign_signature_is_unauthorized() {
    let app = test_app();

    let token = taskdeck_shared::auth::token::TokenCodec::new(
        "a-different-secret-of-32-bytes-min!!",
    )
    .encode(&taskdeck_shared::auth::token::Claims::new(7))
    .unwrap();

    let request = Request::builder()
        .method("GET")
        .uri("/v1/tasks")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_create_task_with_empty_name_is_unprocessable() {
    let app = test_app();

    let request = Request::builder()
        .method("POST")
        .uri("/v1/tasks")
        .header("authorization", bearer_for(7))
        .header("content-type", "application/json")
        .body(Body::from(json!({ "name": "" }).to_string()))
        .unwrap();

    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let errors = body["errors"].as_array().unwrap();
    assert!(!errors.is_empty());
}

#[tokio::test]
async fn test_empty_patch_reports_zero_rows_without_touching_storage() {
    // The planner yields an empty plan for {}, so no statement runs and
    // the never-connected pool is never asked for a connection.
    let app = test_app();

    let request = Request::builder()
        .method("PATCH")
        .uri("/v1/tasks/5")
        .header("authorization", bearer_for(7))
        .header("content-type", "application/json")
        .body(Body::from("{}"))
        .unwrap();

    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rows_affected"], 0);
}

#[tokio::test]
async fn test_method_not_allowed_carries_allow_header() {
    let app = test_app();

    let request = Request::builder()
        .method("PUT")
        .uri("/v1/tasks/5")
        .header("authorization", bearer_for(7))
        .body(Body::empty())
        .unwrap();

    let response = app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert!(response.headers().contains_key("allow"));
}

#[tokio::test]
async fn test_health_is_public() {
    let app = test_app();

    let request = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["status"].is_string());
    assert!(body["version"].is_string());
    assert!(body["database"].is_string());
}

/// Registers a fresh user through the API, returning `(user_id, api_key)`
async fn register_user(ctx: &TestContext) -> (i64, String) {
    let username = format!("user-{}", &generate_api_key()[..12]);

    let request = Request::builder()
        .method("POST")
        .uri("/v1/auth/register")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({
                "name": "Test User",
                "username": username,
                "password": "correct horse battery staple"
            })
            .to_string(),
        ))
        .unwrap();

    let (status, body) = send(&ctx.app, request).await;
    assert_eq!(status, StatusCode::CREATED);

    let user_id = body["user_id"].as_i64().unwrap();
    let api_key = body["api_key"].as_str().unwrap().to_string();
    assert_eq!(api_key.len(), 32);

    (user_id, api_key)
}

/// Creates a task through the API with an api key, returning its id
async fn create_task(ctx: &TestContext, api_key: &str, name: &str) -> i64 {
    let request = Request::builder()
        .method("POST")
        .uri("/v1/tasks")
        .header("X-API-Key", api_key)
        .header("content-type", "application/json")
        .body(Body::from(json!({ "name": name }).to_string()))
        .unwrap();

    let (status, body) = send(&ctx.app, request).await;
    assert_eq!(status, StatusCode::CREATED);

    body["id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_create_task_assigns_authenticated_owner() {
    let Some(ctx) = TestContext::with_database().await else {
        return;
    };

    let (user_id, api_key) = register_user(&ctx).await;
    let task_id = create_task(&ctx, &api_key, "Buy milk").await;

    let task = Task::find_by_id_and_user(&ctx.db, task_id, user_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(task.user_id, user_id);
    assert_eq!(task.name, "Buy milk");
    assert!(!task.is_completed);
}

#[tokio::test]
async fn test_foreign_task_is_not_found_not_forbidden() {
    let Some(ctx) = TestContext::with_database().await else {
        return;
    };

    let (_, owner_key) = register_user(&ctx).await;
    let (_, intruder_key) = register_user(&ctx).await;
    let task_id = create_task(&ctx, &owner_key, "Private errand").await;

    let request = Request::builder()
        .method("GET")
        .uri(format!("/v1/tasks/{}", task_id))
        .header("X-API-Key", intruder_key.as_str())
        .body(Body::empty())
        .unwrap();

    let (status, _) = send(&ctx.app, request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // The owner still sees it
    let request = Request::builder()
        .method("GET")
        .uri(format!("/v1/tasks/{}", task_id))
        .header("X-API-Key", owner_key.as_str())
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(&ctx.app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"].as_i64().unwrap(), task_id);
}

#[tokio::test]
async fn test_patch_and_delete_report_row_counts() {
    let Some(ctx) = TestContext::with_database().await else {
        return;
    };

    let (user_id, api_key) = register_user(&ctx).await;
    let task_id = create_task(&ctx, &api_key, "Water plants").await;

    // Matching id/user pair: one row
    let request = Request::builder()
        .method("PATCH")
        .uri(format!("/v1/tasks/{}", task_id))
        .header("X-API-Key", api_key.as_str())
        .header("content-type", "application/json")
        .body(Body::from(json!({ "is_completed": true }).to_string()))
        .unwrap();

    let (status, body) = send(&ctx.app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rows_affected"], 1);

    let task = Task::find_by_id_and_user(&ctx.db, task_id, user_id)
        .await
        .unwrap()
        .unwrap();
    assert!(task.is_completed);
    assert_eq!(task.name, "Water plants");

    // Unmatched id: zero rows, not a 404
    let request = Request::builder()
        .method("PATCH")
        .uri(format!("/v1/tasks/{}", task_id + 1_000_000))
        .header("X-API-Key", api_key.as_str())
        .header("content-type", "application/json")
        .body(Body::from(json!({ "is_completed": true }).to_string()))
        .unwrap();

    let (status, body) = send(&ctx.app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rows_affected"], 0);

    // Delete, then the read path answers 404
    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/v1/tasks/{}", task_id))
        .header("X-API-Key", api_key.as_str())
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(&ctx.app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rows_affected"], 1);

    let request = Request::builder()
        .method("GET")
        .uri(format!("/v1/tasks/{}", task_id))
        .header("X-API-Key", api_key.as_str())
        .body(Body::empty())
        .unwrap();

    let (status, _) = send(&ctx.app, request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
