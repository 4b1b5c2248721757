/// Integration tests for the FieldTask API
///
/// These tests drive the full router over the in-memory store:
/// - Health check
/// - Login with Basic credentials
/// - Bearer and manager gates
/// - User creation and validation
/// - Task creation, visibility and pagination
/// - Manager notifications after task creation

mod common;

use axum::http::{Method, StatusCode};
use common::{basic, bearer, wait_for, TestContext, JWT_KEY, PASSWORD};
use fieldtask_shared::auth::jwt::{ClaimMap, ClaimValue, SessionCodec};
use serde_json::json;

fn token_for(subject_id: i64, role: &str, expires_in_ms: i64) -> String {
    let mut claims = ClaimMap::new();
    claims.insert("role".to_string(), ClaimValue::from(role));
    SessionCodec::from_millis(JWT_KEY, expires_in_ms)
        .encrypt(subject_id, claims)
        .unwrap()
}

#[tokio::test]
async fn test_healthcheck() {
    let ctx = TestContext::new().await.unwrap();

    let (status, body) = ctx.send(Method::GET, "/api/healthcheck", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "up" }));

    ctx.store.set_healthy(false);
    let (status, body) = ctx.send(Method::GET, "/api/healthcheck", None, None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body, json!({ "status": "down" }));
}

#[tokio::test]
async fn test_login_issues_session_token() {
    let ctx = TestContext::new().await.unwrap();

    let (status, body) = ctx
        .send(Method::POST, "/api/auth/login", Some(basic("tech", PASSWORD)), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let token = body["access_token"].as_str().unwrap();
    let claims = ctx.state.codec.decrypt(token).unwrap();
    assert_eq!(claims["sub"].to_string(), ctx.technician.id.to_string());
    assert_eq!(claims["username"].as_str(), Some("tech"));
    assert_eq!(claims["role"].as_str(), Some("technician"));
}

#[tokio::test]
async fn test_login_rejects_unknown_credentials() {
    let ctx = TestContext::new().await.unwrap();

    for header in [basic("tech", "wrong"), basic("nobody", PASSWORD)] {
        let (status, body) = ctx
            .send(Method::POST, "/api/auth/login", Some(header), None)
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body, json!({ "error": "user not found" }));
    }
}

#[tokio::test]
async fn test_login_rejects_malformed_header() {
    let ctx = TestContext::new().await.unwrap();

    let (status, body) = ctx.send(Method::POST, "/api/auth/login", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "invalid authorization" }));

    let (status, _) = ctx
        .send(
            Method::POST,
            "/api/auth/login",
            Some(bearer(&ctx.manager_token)),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_bearer_gate() {
    let ctx = TestContext::new().await.unwrap();

    let (status, body) = ctx.send(Method::GET, "/api/tasks", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "invalid authorization" }));

    let (status, body) = ctx.list_tasks("not-a-token", "").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, json!({ "error": "invalid token" }));

    let expired = token_for(ctx.technician.id, "technician", 0);
    let (status, body) = ctx.list_tasks(&expired, "").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, json!({ "error": "token is expired" }));
}

#[tokio::test]
async fn test_invalid_subject_is_forbidden() {
    let ctx = TestContext::new().await.unwrap();

    let mut claims = ClaimMap::new();
    claims.insert("sub".to_string(), ClaimValue::from("abc"));
    let token = ctx.state.codec.encrypt(1, claims).unwrap();

    let (status, body) = ctx.list_tasks(&token, "").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, json!({ "error": "invalid token subject" }));
}

#[tokio::test]
async fn test_manager_creates_user() {
    let ctx = TestContext::new().await.unwrap();

    let (status, body) = ctx
        .send(
            Method::POST,
            "/api/users",
            Some(bearer(&ctx.manager_token)),
            Some(json!({
                "username": "jdoe",
                "email": "jdoe@example.com",
                "password": "hunter2"
            })),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["id"], 3);
    assert_eq!(body["data"]["username"], "jdoe");
    assert_eq!(body["data"]["email"], "jdoe@example.com");
    assert_eq!(body["data"]["role"], "technician");
    assert!(body["data"].get("password").is_none());

    // The new user can log in with the plaintext password
    let (status, _) = ctx
        .send(Method::POST, "/api/auth/login", Some(basic("jdoe", "hunter2")), None)
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_technician_cannot_create_user() {
    let ctx = TestContext::new().await.unwrap();

    let (status, body) = ctx
        .send(
            Method::POST,
            "/api/users",
            Some(bearer(&ctx.technician_token)),
            Some(json!({
                "username": "jdoe",
                "email": "jdoe@example.com",
                "password": "hunter2"
            })),
        )
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "error": "unauthorized user role" }));
}

#[tokio::test]
async fn test_create_user_validation() {
    let ctx = TestContext::new().await.unwrap();

    let (status, body) = ctx
        .send(
            Method::POST,
            "/api/users",
            Some(bearer(&ctx.manager_token)),
            Some(json!({
                "username": "abc",
                "email": "not-an-email",
                "password": "hunter2",
                "role": "admin"
            })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let fields: Vec<&str> = body["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["email", "role", "username"]);
}

#[tokio::test]
async fn test_duplicate_username_conflicts() {
    let ctx = TestContext::new().await.unwrap();

    let (status, body) = ctx
        .send(
            Method::POST,
            "/api/users",
            Some(bearer(&ctx.manager_token)),
            Some(json!({
                "username": "tech",
                "email": "other@example.com",
                "password": "hunter2",
                "role": "technician"
            })),
        )
        .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body, json!({ "error": "username already exists" }));
}

#[tokio::test]
async fn test_create_task() {
    let ctx = TestContext::new().await.unwrap();

    let (status, body) = ctx.create_task(&ctx.technician_token, "Replace filter").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["id"], 1);
    assert_eq!(body["data"]["user"]["id"], ctx.technician.id);
    assert_eq!(body["data"]["summary"], "Replace filter");
    assert_eq!(body["data"]["status"], "opened");
    assert_eq!(body["data"]["created_at"].as_str().unwrap().len(), 19);
}

#[tokio::test]
async fn test_create_task_validation() {
    let ctx = TestContext::new().await.unwrap();

    for summary in [String::new(), "x".repeat(2501)] {
        let (status, body) = ctx.create_task(&ctx.technician_token, &summary).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["details"][0]["field"], "summary");
    }

    assert!(ctx.store.tasks().await.is_empty());
}

#[tokio::test]
async fn test_create_task_for_missing_user() {
    let ctx = TestContext::new().await.unwrap();

    let token = token_for(99, "technician", 60_000);
    let (status, body) = ctx.create_task(&token, "Orphan").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "user not found" }));
    assert!(ctx.sink.is_empty());
}

#[tokio::test]
async fn test_task_visibility() {
    let ctx = TestContext::new().await.unwrap();

    ctx.create_task(&ctx.technician_token, "Technician task").await;
    ctx.create_task(&ctx.manager_token, "Manager task").await;

    let (status, body) = ctx.list_tasks(&ctx.technician_token, "").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["total"], 1);
    assert_eq!(body["data"][0]["summary"], "Technician task");

    let (status, body) = ctx.list_tasks(&ctx.manager_token, "").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
    assert_eq!(body["total"], 2);
    assert_eq!(body["data"][0]["summary"], "Manager task");
    assert_eq!(body["data"][1]["summary"], "Technician task");
}

#[tokio::test]
async fn test_task_pagination() {
    let ctx = TestContext::new().await.unwrap();

    for i in 0..12 {
        ctx.create_task(&ctx.technician_token, &format!("Task {i}")).await;
    }

    let (_, body) = ctx.list_tasks(&ctx.technician_token, "").await;
    assert_eq!(body["count"], 10);
    assert_eq!(body["total"], 12);
    assert_eq!(body["data"][0]["summary"], "Task 11");

    let (_, body) = ctx.list_tasks(&ctx.technician_token, "?limit=5&offset=10").await;
    assert_eq!(body["count"], 2);
    assert_eq!(body["total"], 12);
    assert_eq!(body["data"][0]["summary"], "Task 1");

    let (status, body) = ctx
        .list_tasks(&ctx.technician_token, "?limit=abc&offset=-3")
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 10);
}

#[tokio::test]
async fn test_task_creation_notifies_managers() {
    let ctx = TestContext::new().await.unwrap();

    let summary = "x".repeat(50);
    let (status, _) = ctx.create_task(&ctx.technician_token, &summary).await;
    assert_eq!(status, StatusCode::CREATED);

    let sink = ctx.sink.clone();
    wait_for(move || sink.len() == 1, 5).await.unwrap();

    let notification = &ctx.sink.notifications()[0];
    assert_eq!(notification.recipient.id, ctx.manager.id);
    assert_eq!(notification.task.user_id, ctx.technician.id);
    assert_eq!(notification.owner.username, "tech");
    assert_eq!(notification.summary, format!("{}...", "x".repeat(30)));
}

#[tokio::test]
async fn test_every_manager_is_notified() {
    let ctx = TestContext::new().await.unwrap();

    let (status, _) = ctx
        .send(
            Method::POST,
            "/api/users",
            Some(bearer(&ctx.manager_token)),
            Some(json!({
                "username": "boss2",
                "email": "boss2@example.com",
                "password": "hunter2",
                "role": "manager"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    ctx.create_task(&ctx.manager_token, "Short summary").await;

    let sink = ctx.sink.clone();
    wait_for(move || sink.len() == 2, 5).await.unwrap();

    let mut recipients: Vec<String> = ctx
        .sink
        .notifications()
        .into_iter()
        .map(|n| {
            assert_eq!(n.summary, "Short summary");
            n.recipient.username
        })
        .collect();
    recipients.sort();
    assert_eq!(recipients, vec!["boss", "boss2"]);
}
