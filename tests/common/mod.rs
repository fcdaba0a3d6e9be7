#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use http::{Method, Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use house_points::app::create_app;
use house_points::config::Config;
use house_points::record_store::{MemorySheetTransport, RecordStoreClient, UnavailableConnector};
use house_points::state::AppState;
use house_points::utils::clock::FixedClock;
use house_points::utils::jwt::UserRole;

pub const TODAY: &str = "2026-10-16";

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub transport: Option<Arc<MemorySheetTransport>>,
}

fn config() -> Config {
    let mut config = Config::defaults();
    config.swagger_enabled = false;
    config
}

fn build(store: RecordStoreClient, transport: Option<Arc<MemorySheetTransport>>) -> TestApp {
    let state = AppState::new(config(), store, Arc::new(FixedClock::on(TODAY)));
    TestApp {
        router: create_app(state.clone()),
        state,
        transport,
    }
}

/// App backed by an in-process record store.
pub fn memory_app() -> TestApp {
    let transport = Arc::new(MemorySheetTransport::new());
    let store = RecordStoreClient::with_transport(
        transport.clone(),
        Duration::from_secs(30),
        Duration::ZERO,
    );
    build(store, Some(transport))
}

/// App whose record store can never be reached.
pub fn offline_app() -> TestApp {
    let store = RecordStoreClient::new(
        UnavailableConnector::new("no credentials"),
        Duration::from_secs(30),
        Duration::ZERO,
    );
    build(store, None)
}

impl TestApp {
    pub fn admin_token(&self) -> String {
        self.state
            .jwt
            .create_jwt("admin@alpha.school", "Admin", UserRole::Admin, None, 3600)
            .unwrap()
    }

    pub fn student_token(&self, student_id: i64, email: &str) -> String {
        self.state
            .jwt
            .create_jwt(email, "Student", UserRole::Student, Some(student_id), 3600)
            .unwrap()
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        self.request_with_headers(method, uri, token, body, &[]).await
    }

    pub async fn request_with_headers(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
        headers: &[(&str, &str)],
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }
}
