//! Common test utilities for integration tests
//!
//! Every test gets its own app over the in-memory repository and session
//! store, with cheap Argon2 parameters.
#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use checkmark_api::app::{build_router, AppState};
use checkmark_api::config::Config;
use serde_json::{json, Value};
use std::collections::HashMap;
use tower::ServiceExt;
use uuid::Uuid;

/// Test context containing the app and its state
pub struct TestContext {
    pub app: Router,
    pub state: AppState,
}

impl TestContext {
    /// Creates a fresh in-memory app
    pub fn new() -> Self {
        let vars: HashMap<&str, &str> = [
            ("DATABASE_URL", "memory"),
            ("PASSWORD_MEMORY_KIB", "1024"),
            ("PASSWORD_ITERATIONS", "1"),
            ("PASSWORD_PARALLELISM", "1"),
        ]
        .into_iter()
        .collect();

        let config = Config::from_lookup(|key| vars.get(key).map(|v| v.to_string())).unwrap();
        let state = AppState::in_memory(config).unwrap();
        let app = build_router(state.clone());

        TestContext { app, state }
    }

    /// Sends a request through the full router
    pub async fn send(&self, request: Request<Body>) -> Response {
        self.app.clone().oneshot(request).await.unwrap()
    }

    /// Sends a JSON request; an empty response body parses as `null`
    pub async fn json(
        &self,
        method: &str,
        uri: &str,
        cookie: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, HeaderMap, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.send(request).await;
        let status = response.status();
        let headers = response.headers().clone();
        let text = body_string(response).await;
        let value = if text.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap()
        };

        (status, headers, value)
    }

    /// Sends a page GET
    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response {
        let mut builder = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    /// Submits an urlencoded form
    pub async fn form(&self, uri: &str, cookie: Option<&str>, body: &str) -> Response {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    /// Signs up through the JSON API
    pub async fn signup(&self, email: &str, password: &str, display_name: &str) -> StatusCode {
        let (status, _, _) = self
            .json(
                "POST",
                "/api/accounts",
                None,
                Some(json!({
                    "email": email,
                    "password": password,
                    "display_name": display_name,
                })),
            )
            .await;
        status
    }

    /// Logs in through the JSON API and returns the `Cookie` header value
    pub async fn login(&self, email: &str, password: &str) -> String {
        let (status, headers, _) = self
            .json(
                "POST",
                "/api/sessions",
                None,
                Some(json!({ "email": email, "password": password })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        session_cookie(&headers).unwrap()
    }

    /// Signs up and logs in
    pub async fn register(&self, email: &str, display_name: &str) -> String {
        assert_eq!(
            self.signup(email, "secret1", display_name).await,
            StatusCode::CREATED
        );
        self.login(email, "secret1").await
    }

    /// Creates a task through the JSON API and returns its ID
    pub async fn create_task(&self, cookie: &str, title: &str) -> Uuid {
        let (status, _, body) = self
            .json("POST", "/api/tasks", Some(cookie), Some(json!({ "title": title })))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_str().unwrap().parse().unwrap()
    }

    /// User ID behind a session cookie
    pub async fn current_user(&self, cookie: &str) -> Uuid {
        let (status, _, body) = self
            .json("GET", "/api/sessions/current", Some(cookie), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        body["user_id"].as_str().unwrap().parse().unwrap()
    }
}

/// `name=value` of the session cookie set by a response, if any
pub fn session_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("checkmark_session="))
        .and_then(|v| v.split(';').next())
        .map(|v| v.to_string())
}

/// `Location` header of a redirect
pub fn location(response: &Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
}

/// Collects a response body
pub async fn body_string(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
