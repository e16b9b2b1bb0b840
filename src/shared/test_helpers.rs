//! Helpers for driving the HTTP API against the in-memory store.

use std::sync::Arc;

use axum::http::{header, HeaderValue};
use axum_test::{TestRequest, TestServer};
use serde_json::{json, Value};

use crate::app::api_router;
use crate::core::config::AuthConfig;
use crate::core::store::memory::MemoryStore;
use crate::features::auth::dtos::RegisterRequestDto;
use crate::features::auth::{AuthService, TokenService};
use crate::features::catalog;

pub const TEST_PASSWORD: &str = "kopi-luwak-42";

pub fn registration(username: &str, is_admin: bool, is_editor: bool) -> RegisterRequestDto {
    RegisterRequestDto {
        username: Some(username.to_string()),
        email: Some(format!("{}@example.com", username)),
        first_name: Some("Test".to_string()),
        last_name: Some("User".to_string()),
        password1: Some(TEST_PASSWORD.to_string()),
        password2: Some(TEST_PASSWORD.to_string()),
        is_admin: Some(is_admin),
        is_editor: Some(is_editor),
        ..Default::default()
    }
}

/// Test server seeded with an `admin`, an `editor` and a `visitor` without roles.
pub struct TestApp {
    pub server: TestServer,
}

impl TestApp {
    pub async fn new() -> Self {
        let store = Arc::new(MemoryStore::new(catalog::relations()));
        let config = AuthConfig::default();

        let tokens = Arc::new(TokenService::new(store.clone(), config.token_ttl));
        let accounts = AuthService::new(store.clone(), tokens, config.password_min_length);
        for (username, is_admin, is_editor) in [
            ("admin", true, false),
            ("editor", false, true),
            ("visitor", false, false),
        ] {
            accounts
                .register(registration(username, is_admin, is_editor))
                .await
                .unwrap();
        }

        let server = TestServer::new(api_router(store, &config)).unwrap();
        Self { server }
    }

    pub async fn login(&self, username: &str) -> String {
        let response = self
            .server
            .post("/login")
            .json(&json!({"username": username, "password": TEST_PASSWORD}))
            .await;
        response.assert_status_ok();
        response.json::<Value>()["data"]["token"]
            .as_str()
            .unwrap()
            .to_string()
    }
}

pub fn with_token(request: TestRequest, token: &str) -> TestRequest {
    request.add_header(
        header::AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
    )
}
