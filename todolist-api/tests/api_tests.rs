/// HTTP tests for the todo list API
///
/// These drive the real router end to end over the in-memory store:
/// - Registration and login
/// - Bearer authentication failures
/// - Todo CRUD with ownership scoping
/// - Validation and pagination

mod common;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use chrono::{DateTime, Duration, Utc};
use common::TestContext;
use serde_json::json;

fn todos_request(authorization: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri("/todos")
        .header(header::AUTHORIZATION, authorization)
        .body(Body::empty())
        .unwrap()
}

fn timestamp(value: &serde_json::Value) -> DateTime<Utc> {
    value.as_str().unwrap().parse().unwrap()
}

#[tokio::test]
async fn test_register_returns_user_and_token() {
    let ctx = TestContext::new();

    let (status, body) = ctx
        .send(
            Method::POST,
            "/register",
            None,
            Some(json!({
                "username": "alice",
                "email": "alice@example.com",
                "password": "secret1",
            })),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["username"], "alice");
    assert_eq!(body["email"], "alice@example.com");
    assert!(body["created_at"].is_string());
    assert!(body["updated_at"].is_string());
    assert!(body.get("password").is_none());

    let token = body["token"].as_str().unwrap();
    let user_id = ctx.state.tokens.validate(token).unwrap();
    assert_eq!(user_id, body["id"].as_i64().unwrap());
}

#[tokio::test]
async fn test_register_conflicts() {
    let ctx = TestContext::new();
    ctx.register("alice").await;

    let (status, body) = ctx
        .send(
            Method::POST,
            "/register",
            None,
            Some(json!({
                "username": "someone-else",
                "email": "alice@example.com",
                "password": "secret1",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");
    assert_eq!(body["message"], "email already exists");

    let (status, body) = ctx
        .send(
            Method::POST,
            "/register",
            None,
            Some(json!({
                "username": "alice",
                "email": "new@example.com",
                "password": "secret1",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "username already exists");
}

#[tokio::test]
async fn test_register_reports_every_invalid_field() {
    let ctx = TestContext::new();

    let (status, body) = ctx
        .send(
            Method::POST,
            "/register",
            None,
            Some(json!({ "username": "al", "email": "not-an-email", "password": "123" })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
    assert_eq!(
        body["details"]["username"],
        "Username must be between 3 and 50 characters"
    );
    assert_eq!(body["details"]["email"], "Invalid email format");
    assert_eq!(
        body["details"]["password"],
        "Password must be at least 6 characters"
    );

    let (status, body) = ctx
        .send(Method::POST, "/register", None, Some(json!({})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["username"], "Username is required");
    assert_eq!(body["details"]["email"], "Email is required");
    assert_eq!(body["details"]["password"], "Password is required");
}

#[tokio::test]
async fn test_register_rejects_email_longer_than_column() {
    let ctx = TestContext::new();
    let email = format!("{}@{}.example.com", "a".repeat(61), "b".repeat(27));
    assert_eq!(email.chars().count(), 101);

    let (status, body) = ctx
        .send(
            Method::POST,
            "/register",
            None,
            Some(json!({ "username": "alice", "email": email, "password": "secret1" })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
    assert_eq!(
        body["details"]["email"],
        "Email must be at most 100 characters"
    );

    // Nothing was stored, so the first real user still gets ID 1
    let (id, _) = ctx.register("alice").await;
    assert_eq!(id, 1);
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let ctx = TestContext::new();

    let request = Request::builder()
        .method(Method::POST)
        .uri("/register")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = ctx.send_request(request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
}

#[tokio::test]
async fn test_login() {
    let ctx = TestContext::new();
    let (user_id, _) = ctx.register("alice").await;

    let (status, body) = ctx
        .send(
            Method::POST,
            "/login",
            None,
            Some(json!({ "email": "alice@example.com", "password": "secret1" })),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], user_id);
    let token = body["token"].as_str().unwrap();
    assert_eq!(ctx.state.tokens.validate(token).unwrap(), user_id);
}

#[tokio::test]
async fn test_login_failures_look_the_same() {
    let ctx = TestContext::new();
    ctx.register("alice").await;

    let (wrong_status, wrong_body) = ctx
        .send(
            Method::POST,
            "/login",
            None,
            Some(json!({ "email": "alice@example.com", "password": "wrong-password" })),
        )
        .await;
    let (unknown_status, unknown_body) = ctx
        .send(
            Method::POST,
            "/login",
            None,
            Some(json!({ "email": "nobody@example.com", "password": "secret1" })),
        )
        .await;

    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_body, unknown_body);
    assert_eq!(wrong_body["message"], "Invalid email or password");
}

#[tokio::test]
async fn test_login_validation() {
    let ctx = TestContext::new();

    let (status, body) = ctx
        .send(
            Method::POST,
            "/login",
            None,
            Some(json!({ "email": "alice@example.com" })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["password"], "Password is required");
    assert!(body["details"].get("email").is_none());
}

#[tokio::test]
async fn test_missing_authorization_header() {
    let ctx = TestContext::new();

    let (status, body) = ctx.send(Method::GET, "/todos", None, None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");
    assert_eq!(body["message"], "Authorization header required");
}

#[tokio::test]
async fn test_malformed_authorization_header() {
    let ctx = TestContext::new();
    let (_, token) = ctx.register("alice").await;

    for header_value in [
        format!("Token {}", token),
        format!("bearer {}", token),
        format!("Bearer {} extra", token),
        token.clone(),
    ] {
        let (status, body) = ctx.send_request(todos_request(&header_value)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "header: {}", header_value);
        assert_eq!(
            body["message"],
            "Authorization header must be in the format 'Bearer {token}'"
        );
    }
}

#[tokio::test]
async fn test_invalid_and_expired_tokens() {
    let ctx = TestContext::new();
    let (user_id, _) = ctx.register("alice").await;

    let (status, body) = ctx.send_request(todos_request("Bearer garbage")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid or expired token");

    let expired = ctx
        .state
        .tokens
        .issue_at(user_id, Utc::now() - Duration::hours(25))
        .unwrap();
    let (status, body) = ctx
        .send(Method::GET, "/todos", Some(&expired), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid or expired token");
}

#[tokio::test]
async fn test_create_and_list_round_trip() {
    let ctx = TestContext::new();
    let (user_id, token) = ctx.register("alice").await;

    assert!(ctx.list_todos(&token).await.is_empty());

    let (status, body) = ctx
        .send(
            Method::POST,
            "/todos",
            Some(&token),
            Some(json!({
                "id": 777,
                "title": "Buy milk",
                "completed": true,
                "priority": "high",
                "user_id": 999,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["id"].as_i64().unwrap();
    assert_ne!(id, 777);

    let todos = ctx.list_todos(&token).await;
    assert_eq!(todos.len(), 1);
    assert_eq!(todos[0]["id"], id);
    assert_eq!(todos[0]["title"], "Buy milk");
    assert_eq!(todos[0]["completed"], true);
    assert_eq!(todos[0]["priority"], "high");
    assert_eq!(todos[0]["user_id"], user_id);
}

#[tokio::test]
async fn test_invalid_todo_persists_nothing() {
    let ctx = TestContext::new();
    let (_, token) = ctx.register("alice").await;

    let (status, body) = ctx
        .send(
            Method::POST,
            "/todos",
            Some(&token),
            Some(json!({ "title": "", "priority": "urgent" })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["title"], "Title is required");
    assert_eq!(
        body["details"]["priority"],
        "Priority must be low, medium, or high"
    );
    assert!(ctx.list_todos(&token).await.is_empty());

    let (status, body) = ctx
        .send(
            Method::POST,
            "/todos",
            Some(&token),
            Some(json!({ "title": "x".repeat(256), "priority": "High" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["details"]["title"],
        "Title must be at most 255 characters"
    );
    assert!(body["details"]["priority"].is_string());
    assert!(ctx.list_todos(&token).await.is_empty());
}

#[tokio::test]
async fn test_update_replaces_fields() {
    let ctx = TestContext::new();
    let (user_id, token) = ctx.register("alice").await;
    let id = ctx.create_todo(&token, "Draft", "low").await;
    let before = ctx.list_todos(&token).await.remove(0);

    let (status, body) = ctx
        .send(
            Method::PUT,
            &format!("/todos/{}", id),
            Some(&token),
            Some(json!({ "title": "Final", "completed": true, "priority": "medium", "user_id": 999 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], id);

    let after = ctx.list_todos(&token).await.remove(0);
    assert_eq!(after["id"], id);
    assert_eq!(after["title"], "Final");
    assert_eq!(after["completed"], true);
    assert_eq!(after["priority"], "medium");
    assert_eq!(after["user_id"], user_id);
    assert_eq!(after["created_at"], before["created_at"]);
    assert!(timestamp(&after["updated_at"]) > timestamp(&before["updated_at"]));
}

#[tokio::test]
async fn test_update_validates_payload() {
    let ctx = TestContext::new();
    let (_, token) = ctx.register("alice").await;
    let id = ctx.create_todo(&token, "Keep me", "low").await;

    let (status, _) = ctx
        .send(
            Method::PUT,
            &format!("/todos/{}", id),
            Some(&token),
            Some(json!({ "title": "", "priority": "low" })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(ctx.list_todos(&token).await[0]["title"], "Keep me");
}

#[tokio::test]
async fn test_delete() {
    let ctx = TestContext::new();
    let (_, token) = ctx.register("alice").await;
    let id = ctx.create_todo(&token, "Temporary", "low").await;

    let (status, body) = ctx
        .send(Method::DELETE, &format!("/todos/{}", id), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], id);
    assert!(ctx.list_todos(&token).await.is_empty());

    let (status, _) = ctx
        .send(Method::DELETE, &format!("/todos/{}", id), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_users_cannot_touch_each_others_todos() {
    let ctx = TestContext::new();
    let (_, alice) = ctx.register("alice").await;
    let (_, bob) = ctx.register("bob").await;
    let id = ctx.create_todo(&alice, "Alice's", "high").await;

    assert!(ctx.list_todos(&bob).await.is_empty());

    let (status, body) = ctx
        .send(
            Method::PUT,
            &format!("/todos/{}", id),
            Some(&bob),
            Some(json!({ "title": "Hijacked", "completed": true, "priority": "low" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden");

    let (status, _) = ctx
        .send(Method::DELETE, &format!("/todos/{}", id), Some(&bob), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let todos = ctx.list_todos(&alice).await;
    assert_eq!(todos.len(), 1);
    assert_eq!(todos[0]["title"], "Alice's");
}

#[tokio::test]
async fn test_missing_todo_is_forbidden_not_found() {
    let ctx = TestContext::new();
    let (_, token) = ctx.register("alice").await;

    let (status, _) = ctx
        .send(
            Method::PUT,
            "/todos/424242",
            Some(&token),
            Some(json!({ "title": "Ghost", "priority": "low" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = ctx
        .send(Method::DELETE, "/todos/424242", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_invalid_todo_id() {
    let ctx = TestContext::new();
    let (_, token) = ctx.register("alice").await;

    let (status, body) = ctx
        .send(Method::DELETE, "/todos/abc", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid todo ID");

    let (status, body) = ctx
        .send(
            Method::PUT,
            "/todos/abc",
            Some(&token),
            Some(json!({ "title": "x", "priority": "low" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid todo ID");
}

#[tokio::test]
async fn test_pagination() {
    let ctx = TestContext::new();
    let (_, alice) = ctx.register("alice").await;
    let (_, bob) = ctx.register("bob").await;
    for i in 0..25 {
        ctx.create_todo(&alice, &format!("Todo {}", i), "medium").await;
    }
    ctx.create_todo(&bob, "Not Alice's", "low").await;

    let (status, body) = ctx
        .send(Method::GET, "/todos?page=1&pageSize=10", Some(&alice), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["todos"].as_array().unwrap().len(), 10);
    assert_eq!(body["todos"][0]["title"], "Todo 0");
    assert_eq!(
        body["pagination"],
        json!({ "page": 1, "pageSize": 10, "total": 25, "totalPages": 3 })
    );

    let (_, body) = ctx
        .send(Method::GET, "/todos?page=3&pageSize=10", Some(&alice), None)
        .await;
    let todos = body["todos"].as_array().unwrap();
    assert_eq!(todos.len(), 5);
    assert_eq!(todos[4]["title"], "Todo 24");
    assert_eq!(body["pagination"]["page"], 3);
}

#[tokio::test]
async fn test_pagination_falls_back_to_defaults() {
    let ctx = TestContext::new();
    let (_, token) = ctx.register("alice").await;
    for i in 0..12 {
        ctx.create_todo(&token, &format!("Todo {}", i), "low").await;
    }

    let (status, body) = ctx
        .send(Method::GET, "/todos?page=abc&pageSize=500", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["page"], 1);
    assert_eq!(body["pagination"]["pageSize"], 10);
    assert_eq!(body["pagination"]["totalPages"], 2);
    assert_eq!(body["todos"].as_array().unwrap().len(), 10);

    // Empty page parameter means no pagination at all
    let (_, body) = ctx
        .send(Method::GET, "/todos?page=&pageSize=5", Some(&token), None)
        .await;
    assert_eq!(body.as_array().unwrap().len(), 12);
}

#[tokio::test]
async fn test_health() {
    let ctx = TestContext::new();

    let (status, body) = ctx.send(Method::GET, "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "connected");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_unknown_path_is_plain_text_not_found() {
    let ctx = TestContext::new();

    let (status, body) = ctx.send(Method::GET, "/nope", None, None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!("Not found"));
}

#[tokio::test]
async fn test_empty_todo_id_has_no_route() {
    let ctx = TestContext::new();
    let (_, token) = ctx.register("alice").await;

    for token in [Some(token.as_str()), None] {
        let (status, body) = ctx.send(Method::DELETE, "/todos/", token, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!("Not found"));
    }
}
