//! Common test utilities for integration tests
//!
//! This module provides shared infrastructure for integration tests:
//! - An application over the in-memory store with a recording sink
//! - A seeded manager and technician, already logged in
//! - Request helpers

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use fieldtask_api::app::{build_router, AppState, Backends};
use fieldtask_api::config::Config;
use fieldtask_shared::models::user::{User, UserRole};
use fieldtask_shared::services::notification::MemorySink;
use fieldtask_shared::services::user::CreateUser;
use fieldtask_shared::store::memory::MemoryStore;
use serde_json::Value;
use std::sync::Arc;
use tower::Service as _;

pub const JWT_KEY: &str = "integration-secret-key-at-least-32-bytes";
pub const PASSWORD: &str = "secret";

/// Test context containing all necessary resources
pub struct TestContext {
    pub app: axum::Router,
    pub state: AppState,
    pub store: MemoryStore,
    pub sink: MemorySink,
    pub manager: User,
    pub technician: User,
    pub manager_token: String,
    pub technician_token: String,
}

/// Configuration used by every test application
pub fn test_config() -> Config {
    let builder = Config::defaults()
        .and_then(|builder| {
            Ok(builder
                .set_override("database.url", "postgresql://unused/fieldtask")?
                .set_override("security.hash_key", "integration-hash-key")?
                .set_override("security.jwt_key", JWT_KEY)?)
        })
        .unwrap();

    Config::from_builder(builder).unwrap()
}

/// `Basic` header value for `username:password`
pub fn basic(username: &str, password: &str) -> String {
    format!("Basic {}", BASE64.encode(format!("{username}:{password}")))
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

impl TestContext {
    /// Builds the app and seeds `boss` (manager, id 1) and `tech` (technician, id 2)
    pub async fn new() -> anyhow::Result<Self> {
        let store = MemoryStore::new();
        let sink = MemorySink::new();

        let state = AppState::new(
            test_config(),
            Backends::memory(store.clone(), Arc::new(sink.clone())),
        );

        let manager = state
            .users
            .create_user(CreateUser {
                username: "boss".to_string(),
                email: "boss@example.com".to_string(),
                password: PASSWORD.to_string(),
                role: Some(UserRole::Manager),
            })
            .await?;

        let technician = state
            .users
            .create_user(CreateUser {
                username: "tech".to_string(),
                email: "tech@example.com".to_string(),
                password: PASSWORD.to_string(),
                role: None,
            })
            .await?;

        let manager_token = state.auth.login(&basic("boss", PASSWORD)).await?;
        let technician_token = state.auth.login(&basic("tech", PASSWORD)).await?;

        let app = build_router(state.clone());

        Ok(TestContext {
            app,
            state,
            store,
            sink,
            manager,
            technician,
            manager_token,
            technician_token,
        })
    }

    /// Sends a request and returns the status and the JSON body
    ///
    /// Non-JSON bodies come back as `Value::Null`.
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        authorization: Option<String>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(value) = authorization {
            builder = builder.header(header::AUTHORIZATION, value);
        }

        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .app
            .clone()
            .call(builder.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    /// Creates a task as the holder of `token`
    pub async fn create_task(&self, token: &str, summary: &str) -> (StatusCode, Value) {
        self.send(
            Method::POST,
            "/api/tasks",
            Some(bearer(token)),
            Some(serde_json::json!({ "summary": summary })),
        )
        .await
    }

    pub async fn list_tasks(&self, token: &str, query: &str) -> (StatusCode, Value) {
        self.send(
            Method::GET,
            &format!("/api/tasks{query}"),
            Some(bearer(token)),
            None,
        )
        .await
    }
}

/// Helper to wait for condition with timeout
pub async fn wait_for<F>(condition: F, timeout_secs: u64) -> anyhow::Result<()>
where
    F: Fn() -> bool,
{
    let start = std::time::Instant::now();
    let timeout = std::time::Duration::from_secs(timeout_secs);

    loop {
        if condition() {
            return Ok(());
        }

        if start.elapsed() > timeout {
            anyhow::bail!("Condition not met within {} seconds", timeout_secs);
        }

        tokio::time::sleep(tokio::time::Duration::from_millis(10)).await;
    }
}
