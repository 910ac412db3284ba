/// Integration tests for login, current user and logout

mod common;

use common::{admin_email, harness, ADMIN_PASSWORD, MEMBER_PASSWORD};
use tenantdesk_shared::models::project::{CreateProject, ProjectStatus};
use tenantdesk_shared::models::task::{CreateTask, TaskPriority, TaskStatus};
use tenantdesk_shared::models::user::{LoginRequest, Role, UpdateUser};
use tenantdesk_shared::store::UserRepository;
use tenantdesk_shared::CoreError;

fn login_request(subdomain: &str, email: &str, password: &str) -> LoginRequest {
    LoginRequest {
        email: email.to_string(),
        password: password.to_string(),
        tenant_subdomain: subdomain.to_string(),
    }
}

#[tokio::test]
async fn test_login_success_returns_profile_and_token() {
    let h = harness();
    let registration = h.register("acme").await;

    let result = h.login("acme", &admin_email("acme"), ADMIN_PASSWORD).await;

    assert_eq!(result.expires_in, 86_400);
    assert!(!result.token.is_empty());
    assert_eq!(result.user.id, registration.admin.id);
    assert_eq!(result.user.role, Role::TenantAdmin);
    assert_eq!(result.user.tenant.subdomain, "acme");
    assert_eq!(result.user.tenant.name, "acme Corp");
}

#[tokio::test]
async fn test_login_normalizes_email_and_subdomain() {
    let h = harness();
    h.register("acme").await;

    let result = h
        .services
        .sessions
        .login(login_request(" ACME ", " Admin@Acme.Test ", ADMIN_PASSWORD))
        .await;

    assert!(result.is_ok());
}

#[tokio::test]
async fn test_login_unknown_tenant_is_not_found() {
    let h = harness();

    let result = h
        .services
        .sessions
        .login(login_request("nowhere", "a@nowhere.test", ADMIN_PASSWORD))
        .await;

    assert!(matches!(result, Err(CoreError::NotFound(_))));
}

#[tokio::test]
async fn test_wrong_password_and_unknown_user_look_the_same() {
    let h = harness();
    h.register("acme").await;

    let wrong_password = h
        .services
        .sessions
        .login(login_request("acme", &admin_email("acme"), "not-the-password"))
        .await;
    let unknown_user = h
        .services
        .sessions
        .login(login_request("acme", "ghost@acme.test", ADMIN_PASSWORD))
        .await;

    match (wrong_password, unknown_user) {
        (Err(CoreError::Unauthorized(a)), Err(CoreError::Unauthorized(b))) => assert_eq!(a, b),
        other => panic!("Expected two Unauthorized errors, got {:?}", other),
    }
}

#[tokio::test]
async fn test_user_of_other_tenant_cannot_log_in_here() {
    let h = harness();
    h.register("acme").await;
    h.register("globex").await;

    let result = h
        .services
        .sessions
        .login(login_request("globex", &admin_email("acme"), ADMIN_PASSWORD))
        .await;

    assert!(matches!(result, Err(CoreError::Unauthorized(_))));
}

#[tokio::test]
async fn test_inactive_user_cannot_log_in() {
    let h = harness();
    let admin = h.admin_of("acme").await;
    let member = h.add_member(&admin, "mo@acme.test").await;

    h.store
        .update_user(
            admin.principal.tenant_id,
            member.id,
            UpdateUser {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let result = h
        .services
        .sessions
        .login(login_request("acme", "mo@acme.test", MEMBER_PASSWORD))
        .await;

    assert!(matches!(result, Err(CoreError::Unauthorized(_))));
}

#[tokio::test]
async fn test_same_email_in_two_tenants() {
    let h = harness();
    let acme = h.admin_of("acme").await;
    let globex = h.admin_of("globex").await;

    h.add_member(&acme, "shared@example.test").await;
    h.add_member(&globex, "shared@example.test").await;

    let in_acme = h.sign_in("acme", "shared@example.test", MEMBER_PASSWORD).await;
    let in_globex = h.sign_in("globex", "shared@example.test", MEMBER_PASSWORD).await;

    assert_ne!(in_acme.user_id, in_globex.user_id);
    assert_eq!(in_acme.tenant_id, acme.principal.tenant_id);
    assert_eq!(in_globex.tenant_id, globex.principal.tenant_id);
}

#[tokio::test]
async fn test_current_user() {
    let h = harness();
    let admin = h.admin_of("acme").await;

    let profile = h
        .services
        .sessions
        .current_user(&admin.principal)
        .await
        .unwrap();

    assert_eq!(profile.id, admin.principal.user_id);
    assert_eq!(profile.email, admin_email("acme"));
    assert_eq!(profile.tenant.id, admin.principal.tenant_id);
}

#[tokio::test]
async fn test_current_user_deleted_after_issuance() {
    let h = harness();
    let admin = h.admin_of("acme").await;
    h.add_member(&admin, "mo@acme.test").await;
    let member = h.sign_in("acme", "mo@acme.test", MEMBER_PASSWORD).await;

    h.services
        .users
        .delete_user(&admin, member.user_id)
        .await
        .unwrap();

    let result = h.services.sessions.current_user(&member).await;
    assert!(matches!(result, Err(CoreError::NotFound(_))));
}

#[tokio::test]
async fn test_deleted_user_token_cannot_write() {
    let h = harness();
    let admin = h.admin_of("acme").await;
    h.add_member(&admin, "mo@acme.test").await;
    let member = common::ctx(h.sign_in("acme", "mo@acme.test", MEMBER_PASSWORD).await);

    h.services
        .users
        .delete_user(&admin, member.principal.user_id)
        .await
        .unwrap();

    let result = h
        .services
        .projects
        .create_project(
            &member,
            CreateProject {
                name: "Orphan".to_string(),
                description: None,
                status: ProjectStatus::Active,
            },
        )
        .await;
    assert!(matches!(result, Err(CoreError::Unauthorized(_))));

    // Nothing was written
    let projects = h
        .services
        .projects
        .list_projects(&admin.principal, &Default::default())
        .await
        .unwrap();
    assert!(projects.is_empty());
}

#[tokio::test]
async fn test_deactivated_user_token_cannot_write() {
    let h = harness();
    let admin = h.admin_of("acme").await;
    let launch = h
        .services
        .projects
        .create_project(
            &admin,
            CreateProject {
                name: "Launch".to_string(),
                description: None,
                status: ProjectStatus::Active,
            },
        )
        .await
        .unwrap();
    let mo = h.add_member(&admin, "mo@acme.test").await;
    let member = common::ctx(h.sign_in("acme", "mo@acme.test", MEMBER_PASSWORD).await);

    h.services
        .users
        .update_user(
            &admin,
            mo.id,
            UpdateUser {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let result = h
        .services
        .tasks
        .create_task(
            &member,
            launch.id,
            CreateTask {
                title: "Sneaky".to_string(),
                description: None,
                status: TaskStatus::Todo,
                priority: TaskPriority::Low,
                due_date: None,
                assigned_to: None,
            },
        )
        .await;
    assert!(matches!(result, Err(CoreError::Unauthorized(_))));

    let delete = h.services.projects.delete_project(&member, launch.id).await;
    assert!(matches!(delete, Err(CoreError::Unauthorized(_))));
}

#[tokio::test]
async fn test_logout_revokes_token() {
    let h = harness();
    h.register("acme").await;
    let result = h.login("acme", &admin_email("acme"), ADMIN_PASSWORD).await;
    let header = format!("Bearer {}", result.token);

    let principal = h.services.guard.authenticate(Some(&header)).await.unwrap();
    h.services.sessions.logout(&principal).await.unwrap();

    let after = h.services.guard.authenticate(Some(&header)).await;
    assert!(matches!(after, Err(CoreError::Unauthorized(_))));

    // A new login is unaffected
    h.sign_in("acme", &admin_email("acme"), ADMIN_PASSWORD).await;
}

#[tokio::test]
async fn test_purge_keeps_live_revocations() {
    let h = harness();
    let admin = h.admin_of("acme").await;
    h.services.sessions.logout(&admin.principal).await.unwrap();

    let purged = h.services.sessions.purge_expired_revocations().await.unwrap();
    assert_eq!(purged, 0);
}
