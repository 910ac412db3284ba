/// Integration tests for tenant user management

mod common;

use common::{ctx, harness, MEMBER_PASSWORD};
use tenantdesk_shared::models::user::{CreateUserRequest, Role, UpdateUser};
use tenantdesk_shared::CoreError;

fn member_request(email: &str) -> CreateUserRequest {
    CreateUserRequest {
        email: email.to_string(),
        full_name: "Mo Member".to_string(),
        password: MEMBER_PASSWORD.to_string(),
        role: Role::User,
        is_active: true,
    }
}

#[tokio::test]
async fn test_self_deletion_is_forbidden() {
    let h = harness();
    let admin = h.admin_of("acme").await;

    let result = h
        .services
        .users
        .delete_user(&admin, admin.principal.user_id)
        .await;
    assert!(matches!(result, Err(CoreError::Forbidden(ref m)) if m == "Cannot delete yourself"));

    // Account remains and still works
    let profile = h
        .services
        .sessions
        .current_user(&admin.principal)
        .await
        .unwrap();
    assert_eq!(profile.id, admin.principal.user_id);
}

#[tokio::test]
async fn test_admin_deletes_member() {
    let h = harness();
    let admin = h.admin_of("acme").await;
    let member = h.add_member(&admin, "mo@acme.test").await;

    h.services
        .users
        .delete_user(&admin, member.id)
        .await
        .unwrap();

    let users = h
        .services
        .users
        .list_users(&admin.principal, admin.principal.tenant_id)
        .await
        .unwrap();
    assert_eq!(users.len(), 1);
}

#[tokio::test]
async fn test_members_cannot_manage_users() {
    let h = harness();
    let admin = h.admin_of("acme").await;
    h.add_member(&admin, "mo@acme.test").await;
    let member = ctx(h.sign_in("acme", "mo@acme.test", MEMBER_PASSWORD).await);

    let create = h
        .services
        .users
        .create_user(&member, member.principal.tenant_id, member_request("x@acme.test"))
        .await;
    assert!(matches!(create, Err(CoreError::Forbidden(ref m)) if m == "Access denied"));

    let delete = h
        .services
        .users
        .delete_user(&member, admin.principal.user_id)
        .await;
    assert!(matches!(delete, Err(CoreError::Forbidden(_))));

    // Members may still list their colleagues
    let users = h
        .services
        .users
        .list_users(&member.principal, member.principal.tenant_id)
        .await
        .unwrap();
    assert_eq!(users.len(), 2);
}

#[tokio::test]
async fn test_duplicate_email_within_tenant_conflicts() {
    let h = harness();
    let admin = h.admin_of("acme").await;
    h.add_member(&admin, "mo@acme.test").await;

    let result = h
        .services
        .users
        .create_user(&admin, admin.principal.tenant_id, member_request("MO@acme.test"))
        .await;

    assert!(matches!(result, Err(CoreError::Conflict(ref m)) if m == "User already exists"));
}

#[tokio::test]
async fn test_super_admin_cannot_be_granted() {
    let h = harness();
    let admin = h.admin_of("acme").await;

    let mut request = member_request("root@acme.test");
    request.role = Role::SuperAdmin;
    let create = h
        .services
        .users
        .create_user(&admin, admin.principal.tenant_id, request)
        .await;
    assert!(matches!(create, Err(CoreError::Forbidden(_))));

    let member = h.add_member(&admin, "mo@acme.test").await;
    let promote = h
        .services
        .users
        .update_user(
            &admin,
            member.id,
            UpdateUser {
                role: Some(Role::SuperAdmin),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(promote, Err(CoreError::Forbidden(_))));
}

#[tokio::test]
async fn test_update_user_fields() {
    let h = harness();
    let admin = h.admin_of("acme").await;
    let member = h.add_member(&admin, "mo@acme.test").await;

    let updated = h
        .services
        .users
        .update_user(
            &admin,
            member.id,
            UpdateUser {
                full_name: Some("Mo Promoted".to_string()),
                role: Some(Role::TenantAdmin),
                is_active: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.full_name, "Mo Promoted");
    assert_eq!(updated.role, Role::TenantAdmin);
    assert!(updated.is_active);
    assert_eq!(updated.email, "mo@acme.test");
}

#[tokio::test]
async fn test_create_user_validation() {
    let h = harness();
    let admin = h.admin_of("acme").await;

    let mut request = member_request("mo@acme.test");
    request.password = "short".to_string();

    let result = h
        .services
        .users
        .create_user(&admin, admin.principal.tenant_id, request)
        .await;
    assert!(matches!(result, Err(CoreError::Validation(_))));
}

#[tokio::test]
async fn test_users_listed_oldest_first() {
    let h = harness();
    let admin = h.admin_of("acme").await;
    h.add_member(&admin, "first@acme.test").await;
    h.add_member(&admin, "second@acme.test").await;

    let users = h
        .services
        .users
        .list_users(&admin.principal, admin.principal.tenant_id)
        .await
        .unwrap();

    let emails: Vec<_> = users.iter().map(|u| u.email.as_str()).collect();
    assert_eq!(emails, ["admin@acme.test", "first@acme.test", "second@acme.test"]);
}

#[tokio::test]
async fn test_blank_full_name_rejected_on_update() {
    let h = harness();
    let admin = h.admin_of("acme").await;
    let member = h.add_member(&admin, "mo@acme.test").await;

    let result = h
        .services
        .users
        .update_user(
            &admin,
            member.id,
            UpdateUser {
                full_name: Some("  ".to_string()),
                ..Default::default()
            },
        )
        .await;

    assert!(matches!(result, Err(CoreError::Validation(_))));
}
