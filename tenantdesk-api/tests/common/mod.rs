//! Common test utilities for API tests
//!
//! The router runs in-process against the in-memory store, so these tests
//! need neither a database nor a listening socket. Requests go through
//! `tower::ServiceExt::oneshot`.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tenantdesk_api::app::{build_router, AppState};
use tenantdesk_api::config::{
    ApiConfig, Config, DatabaseConfig, HashingSettings, JwtConfig, LogFormat, SuperAdminConfig,
};
use tenantdesk_shared::service::Services;
use tenantdesk_shared::store::MemoryStore;
use tower::ServiceExt;

pub const ADMIN_PASSWORD: &str = "admin-password-123";
pub const MEMBER_PASSWORD: &str = "member-password-123";
pub const OPERATOR_PASSWORD: &str = "operator-password-123";

/// Test context containing the router, its services and backing store
pub struct TestContext {
    pub app: Router,
    pub store: Arc<MemoryStore>,
    pub services: Services,
}

/// A signed-in user
pub struct Session {
    pub token: String,
    pub user_id: String,
    pub tenant_id: String,
}

pub fn test_config() -> Config {
    Config {
        api: ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origins: vec!["*".to_string()],
        },
        database: DatabaseConfig {
            url: "postgresql://unused".to_string(),
            max_connections: 1,
        },
        jwt: JwtConfig {
            secret: "api-test-secret-key-at-least-32-bytes".to_string(),
            ttl_seconds: 3600,
        },
        // Minimal Argon2 cost keeps the suite fast
        hashing: HashingSettings {
            memory_kib: 4096,
            iterations: 1,
            parallelism: 1,
        },
        log_format: LogFormat::Pretty,
        super_admin: None,
    }
}

/// Test configuration with a platform operator to seed
pub fn operator_config() -> Config {
    Config {
        super_admin: Some(SuperAdminConfig {
            tenant_subdomain: "platform".to_string(),
            tenant_name: "Platform".to_string(),
            email: "root@platform.test".to_string(),
            password: OPERATOR_PASSWORD.to_string(),
            full_name: "Platform Admin".to_string(),
        }),
        ..test_config()
    }
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: Config) -> Self {
        let store = Arc::new(MemoryStore::new());
        let services = Services::new(
            store.clone(),
            config.session_config(),
            config.hashing_config(),
        )
        .expect("Valid hashing params");

        Self {
            app: build_router(AppState::new(services.clone(), config)),
            store,
            services,
        }
    }

    /// Sends a request and returns the status with the parsed JSON body
    ///
    /// An empty body parses as `Value::Null`.
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
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                panic!(
                    "Response body is not JSON ({}): {}",
                    e,
                    String::from_utf8_lossy(&bytes)
                )
            })
        };

        (status, json)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(token), Some(body)).await
    }

    /// Registers a tenant whose admin is `admin@<subdomain>.test`
    pub async fn register(&self, subdomain: &str) -> Value {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/auth/register-tenant",
                None,
                Some(json!({
                    "tenantName": format!("{} Corp", subdomain),
                    "subdomain": subdomain,
                    "adminEmail": format!("admin@{}.test", subdomain),
                    "adminPassword": ADMIN_PASSWORD,
                    "adminFullName": "Ada Admin"
                })),
            )
            .await;

        assert_eq!(status, StatusCode::CREATED, "registration failed: {}", body);
        body
    }

    pub async fn login(&self, subdomain: &str, email: &str, password: &str) -> Session {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/auth/login",
                None,
                Some(json!({
                    "email": email,
                    "password": password,
                    "tenantSubdomain": subdomain
                })),
            )
            .await;

        assert_eq!(status, StatusCode::OK, "login failed: {}", body);

        Session {
            token: body["data"]["token"].as_str().unwrap().to_string(),
            user_id: body["data"]["user"]["id"].as_str().unwrap().to_string(),
            tenant_id: body["data"]["user"]["tenant"]["id"]
                .as_str()
                .unwrap()
                .to_string(),
        }
    }

    /// Registers a tenant and signs its admin in
    pub async fn admin_session(&self, subdomain: &str) -> Session {
        self.register(subdomain).await;
        self.login(subdomain, &format!("admin@{}.test", subdomain), ADMIN_PASSWORD)
            .await
    }

    /// Adds a `user`-role member through the API and signs them in
    pub async fn member_session(&self, admin: &Session, subdomain: &str, email: &str) -> Session {
        let (status, body) = self
            .post(
                &format!("/api/tenants/{}/users", admin.tenant_id),
                &admin.token,
                json!({
                    "email": email,
                    "full_name": "Mo Member",
                    "password": MEMBER_PASSWORD,
                    "role": "user"
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "member creation failed: {}", body);

        self.login(subdomain, email, MEMBER_PASSWORD).await
    }

    pub async fn create_project(&self, session: &Session, name: &str) -> (StatusCode, Value) {
        self.post("/api/projects", &session.token, json!({ "name": name }))
            .await
    }
}
