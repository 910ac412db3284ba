//! Shared helpers for service-level integration tests
//!
//! Everything runs against the in-memory store, so no database is needed.
//! Password hashing uses minimal Argon2 cost to keep the suite fast.

#![allow(dead_code)]

use std::sync::Arc;

use tenantdesk_shared::auth::guard::{Principal, RequestContext};
use tenantdesk_shared::auth::jwt::SessionConfig;
use tenantdesk_shared::auth::password::HashingConfig;
use tenantdesk_shared::models::tenant::RegisterTenant;
use tenantdesk_shared::models::user::{CreateUserRequest, LoginRequest, Role, User};
use tenantdesk_shared::service::registry::Registration;
use tenantdesk_shared::service::session::LoginResult;
use tenantdesk_shared::service::Services;
use tenantdesk_shared::store::MemoryStore;

pub const TEST_SECRET: &str = "integration-test-secret-at-least-32-bytes";
pub const ADMIN_PASSWORD: &str = "admin-password-123";
pub const MEMBER_PASSWORD: &str = "member-password-123";

pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub services: Services,
}

pub fn harness() -> Harness {
    let store = Arc::new(MemoryStore::new());
    let services = Services::new(
        store.clone(),
        SessionConfig::new(TEST_SECRET),
        HashingConfig {
            memory_kib: 4096,
            iterations: 1,
            parallelism: 1,
        },
    )
    .expect("Valid hashing params");

    Harness { store, services }
}

pub fn registration(subdomain: &str) -> RegisterTenant {
    RegisterTenant {
        tenant_name: format!("{} Corp", subdomain),
        subdomain: subdomain.to_string(),
        admin_email: admin_email(subdomain),
        admin_password: ADMIN_PASSWORD.to_string(),
        admin_full_name: "Ada Admin".to_string(),
    }
}

pub fn admin_email(subdomain: &str) -> String {
    format!("admin@{}.test", subdomain)
}

impl Harness {
    pub async fn register(&self, subdomain: &str) -> Registration {
        self.services
            .registry
            .register_tenant(registration(subdomain), Some("127.0.0.1".to_string()))
            .await
            .expect("Registration should succeed")
    }

    pub async fn login(&self, subdomain: &str, email: &str, password: &str) -> LoginResult {
        self.services
            .sessions
            .login(LoginRequest {
                email: email.to_string(),
                password: password.to_string(),
                tenant_subdomain: subdomain.to_string(),
            })
            .await
            .expect("Login should succeed")
    }

    /// Logs in and authenticates the issued token like a request would
    pub async fn sign_in(&self, subdomain: &str, email: &str, password: &str) -> Principal {
        let result = self.login(subdomain, email, password).await;
        let header = format!("Bearer {}", result.token);

        self.services
            .guard
            .authenticate(Some(&header))
            .await
            .expect("Fresh token should authenticate")
    }

    /// Registers a tenant and returns its admin's request context
    pub async fn admin_of(&self, subdomain: &str) -> RequestContext {
        self.register(subdomain).await;
        let principal = self
            .sign_in(subdomain, &admin_email(subdomain), ADMIN_PASSWORD)
            .await;
        ctx(principal)
    }

    /// Adds a regular member to the admin's tenant
    pub async fn add_member(&self, admin: &RequestContext, email: &str) -> User {
        self.services
            .users
            .create_user(
                admin,
                admin.principal.tenant_id,
                CreateUserRequest {
                    email: email.to_string(),
                    full_name: "Mo Member".to_string(),
                    password: MEMBER_PASSWORD.to_string(),
                    role: Role::User,
                    is_active: true,
                },
            )
            .await
            .expect("Member creation should succeed")
    }
}

pub fn ctx(principal: Principal) -> RequestContext {
    RequestContext::new(principal, Some("127.0.0.1".to_string()))
}
