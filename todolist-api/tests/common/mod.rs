//! Common test utilities for integration tests
//!
//! Every test gets its own router over a fresh in-memory store, so tests
//! run in parallel without a database.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use todolist_api::app::{build_router, AppState};
use todolist_api::config::Config;
use todolist_shared::auth::password::PasswordHasher;
use tower::ServiceExt;

pub const JWT_SECRET: &str = "test-secret-key-at-least-32-bytes-long";

/// Test context holding a router
pub struct TestContext {
    pub app: Router,
    pub state: AppState,
}

impl TestContext {
    /// Creates a new test context with an empty in-memory store
    pub fn new() -> Self {
        let config = Config::from_vars(|key| match key {
            "JWT_SECRET" => Some(JWT_SECRET.to_string()),
            _ => None,
        })
        .expect("test config");

        // Minimal Argon2 cost keeps the suite fast
        let hasher = PasswordHasher::with_params(1024, 1, 1).expect("test hasher");
        let state = AppState::in_memory(config).with_password_hasher(hasher);
        let app = build_router(state.clone());

        Self { app, state }
    }

    /// Sends a request and returns the status with the parsed JSON body
    ///
    /// Non-JSON bodies come back as a JSON string.
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        self.send_request(request).await
    }

    /// Sends a prebuilt request
    pub async fn send_request(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        (status, body)
    }

    /// Registers a user and returns `(user_id, token)`
    pub async fn register(&self, username: &str) -> (i64, String) {
        let (status, body) = self
            .send(
                Method::POST,
                "/register",
                None,
                Some(json!({
                    "username": username,
                    "email": format!("{}@example.com", username),
                    "password": "secret1",
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);

        (
            body["id"].as_i64().unwrap(),
            body["token"].as_str().unwrap().to_string(),
        )
    }

    /// Creates a todo and returns its ID
    pub async fn create_todo(&self, token: &str, title: &str, priority: &str) -> i64 {
        let (status, body) = self
            .send(
                Method::POST,
                "/todos",
                Some(token),
                Some(json!({ "title": title, "completed": false, "priority": priority })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create failed: {}", body);

        body["id"].as_i64().unwrap()
    }

    /// Lists the caller's todos without pagination
    pub async fn list_todos(&self, token: &str) -> Vec<Value> {
        let (status, body) = self.send(Method::GET, "/todos", Some(token), None).await;
        assert_eq!(status, StatusCode::OK);

        body.as_array().unwrap().clone()
    }
}
