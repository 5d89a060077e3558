/// Shared helpers for API integration tests
///
/// Every test gets its own router over a fresh `MemoryStore`, so tests run in
/// parallel without a database.

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use habitpilot_api::{
    app::{build_router, AppState},
    config::{ApiConfig, Config, DatabaseConfig, JwtConfig, ScoringConfig},
};
use habitpilot_shared::store::MemoryStore;
use serde_json::{json, Value};
use tower::Service as _;

pub const TEST_PASSWORD: &str = "correct-horse-battery";

pub fn test_config() -> Config {
    Config {
        api: ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origins: vec!["http://localhost:3000".to_string()],
            production: false,
        },
        database: DatabaseConfig {
            url: String::new(),
            max_connections: 1,
            run_migrations: false,
            create_database: false,
        },
        jwt: JwtConfig {
            secret: "integration-test-secret-at-least-32-bytes".to_string(),
            access_ttl_hours: 1,
            refresh_ttl_days: 1,
        },
        scoring: ScoringConfig::default(),
    }
}

/// A router plus the bearer token of one registered user
pub struct TestContext {
    pub app: Router,
    pub token: String,
    pub refresh_token: String,
    pub user: Value,
}

impl TestContext {
    /// Builds a fresh app and registers `email`
    pub async fn new(email: &str) -> Self {
        let app = build_router(AppState::new(MemoryStore::new(), test_config()));
        Self::register_on(app, email).await
    }

    /// Registers `email` on an existing app
    pub async fn register_on(app: Router, email: &str) -> Self {
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({ "email": email, "password": TEST_PASSWORD, "name": "Test User" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {body}");

        Self {
            token: body["access_token"].as_str().unwrap().to_string(),
            refresh_token: body["refresh_token"].as_str().unwrap().to_string(),
            user: body["user"].clone(),
            app,
        }
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        send(&self.app, Method::GET, uri, Some(&self.token), None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        send(&self.app, Method::POST, uri, Some(&self.token), Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        send(&self.app, Method::PUT, uri, Some(&self.token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        send(&self.app, Method::DELETE, uri, Some(&self.token), None).await
    }

    /// Creates a task and returns its ID
    pub async fn create_task(&self, title: &str) -> String {
        let (status, body) = self.post("/api/tasks", json!({ "title": title })).await;
        assert_eq!(status, StatusCode::CREATED, "create task failed: {body}");
        body["id"].as_str().unwrap().to_string()
    }
}

/// Sends one request and decodes the body as JSON (`Value::Null` when empty)
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().call(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, value)
}
