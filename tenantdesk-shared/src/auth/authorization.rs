/// Role-based authorization
///
/// Roles form a closed set ([`Role`]) and so do the guarded actions
/// ([`Action`]). [`Action::allowed_roles`] is the capability table: it names
/// every role that may perform an action. There is no implicit hierarchy, so
/// `super_admin` only passes where it is listed.
///
/// # Capability table
///
/// | Action | user | tenant_admin | super_admin |
/// |---|---|---|---|
/// | `ListTenants` | | | yes |
/// | `ViewTenant` | yes | yes | yes |
/// | `UpdateTenant` | | yes | yes |
/// | `ViewUsers` | yes | yes | yes |
/// | `ManageUsers` | | yes | |
/// | `ReadProjects` / `WriteProjects` | yes | yes | yes |
/// | `ReadTasks` / `WriteTasks` | yes | yes | yes |
/// | `ViewAuditLog` | | yes | |
///
/// # Tenant scoping
///
/// Project, task and user operations always use the principal's own tenant.
/// There is no cross-tenant "view as"; a path that names another tenant is
/// answered as if that tenant did not exist.
///
/// # Example
///
/// ```
/// use tenantdesk_shared::auth::authorization::{require, scope_to_tenant, Action};
/// use tenantdesk_shared::auth::guard::Principal;
/// use tenantdesk_shared::models::user::Role;
/// use chrono::Utc;
/// use uuid::Uuid;
///
/// let principal = Principal {
///     user_id: Uuid::new_v4(),
///     tenant_id: Uuid::new_v4(),
///     role: Role::User,
///     token_id: Uuid::new_v4(),
///     expires_at: Utc::now(),
/// };
///
/// assert!(require(&principal, Action::WriteProjects).is_ok());
/// assert!(require(&principal, Action::ManageUsers).is_err());
/// assert_eq!(scope_to_tenant(&principal), principal.tenant_id);
/// ```

use tracing::debug;
use uuid::Uuid;

use super::guard::Principal;
use crate::models::user::Role;

/// Error type for authorization checks
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    /// Principal's role is not in the allowed set
    #[error("Access denied")]
    InsufficientRole { actual: Role },

    /// Requested tenant is not the principal's tenant
    #[error("Tenant not found")]
    TenantMismatch,
}

/// Guarded operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ListTenants,
    ViewTenant,
    UpdateTenant,
    ViewUsers,
    ManageUsers,
    ReadProjects,
    WriteProjects,
    ReadTasks,
    WriteTasks,
    ViewAuditLog,
}

const EVERYONE: &[Role] = &[Role::User, Role::TenantAdmin, Role::SuperAdmin];

impl Action {
    /// Roles permitted to perform this action
    pub fn allowed_roles(&self) -> &'static [Role] {
        match self {
            Action::ListTenants => &[Role::SuperAdmin],
            Action::UpdateTenant => &[Role::TenantAdmin, Role::SuperAdmin],
            Action::ManageUsers | Action::ViewAuditLog => &[Role::TenantAdmin],
            Action::ViewTenant
            | Action::ViewUsers
            | Action::ReadProjects
            | Action::WriteProjects
            | Action::ReadTasks
            | Action::WriteTasks => EVERYONE,
        }
    }
}

/// Checks that the principal's role is one of `allowed`
///
/// # Errors
///
/// Returns `AuthzError::InsufficientRole` otherwise
pub fn authorize(principal: &Principal, allowed: &[Role]) -> Result<(), AuthzError> {
    if allowed.contains(&principal.role) {
        return Ok(());
    }

    Err(AuthzError::InsufficientRole {
        actual: principal.role,
    })
}

/// Checks the capability table for `action`
pub fn require(principal: &Principal, action: Action) -> Result<(), AuthzError> {
    authorize(principal, action.allowed_roles()).map_err(|e| {
        debug!(
            user_id = %principal.user_id,
            tenant_id = %principal.tenant_id,
            role = principal.role.as_str(),
            action = ?action,
            "Authorization denied"
        );
        e
    })
}

/// Tenant every project, task and user operation is filtered by
pub fn scope_to_tenant(principal: &Principal) -> Uuid {
    principal.tenant_id
}

/// Resolves a tenant ID taken from a request path
///
/// # Errors
///
/// Returns `AuthzError::TenantMismatch` unless `requested` is the principal's
/// own tenant
pub fn scope_requested_tenant(principal: &Principal, requested: Uuid) -> Result<Uuid, AuthzError> {
    if requested == principal.tenant_id {
        Ok(requested)
    } else {
        Err(AuthzError::TenantMismatch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn principal(role: Role) -> Principal {
        Principal {
            user_id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            role,
            token_id: Uuid::new_v4(),
            expires_at: Utc::now(),
        }
    }

    #[test]
    fn test_list_tenants_super_admin_only() {
        assert!(require(&principal(Role::SuperAdmin), Action::ListTenants).is_ok());
        assert!(require(&principal(Role::TenantAdmin), Action::ListTenants).is_err());
        assert!(require(&principal(Role::User), Action::ListTenants).is_err());
    }

    #[test]
    fn test_super_admin_not_implicitly_granted() {
        let admin = principal(Role::SuperAdmin);

        assert!(require(&admin, Action::ManageUsers).is_err());
        assert!(require(&admin, Action::ViewAuditLog).is_err());
    }

    #[test]
    fn test_update_tenant_roles() {
        assert!(require(&principal(Role::TenantAdmin), Action::UpdateTenant).is_ok());
        assert!(require(&principal(Role::SuperAdmin), Action::UpdateTenant).is_ok());
        assert!(require(&principal(Role::User), Action::UpdateTenant).is_err());
    }

    #[test]
    fn test_everyone_works_with_projects_and_tasks() {
        for role in [Role::User, Role::TenantAdmin, Role::SuperAdmin] {
            let p = principal(role);
            for action in [
                Action::ReadProjects,
                Action::WriteProjects,
                Action::ReadTasks,
                Action::WriteTasks,
            ] {
                assert!(require(&p, action).is_ok(), "{:?} should allow {:?}", action, role);
            }
        }
    }

    #[test]
    fn test_authorize_explicit_set() {
        let user = principal(Role::User);

        assert!(authorize(&user, &[Role::User]).is_ok());
        assert!(matches!(
            authorize(&user, &[Role::TenantAdmin]),
            Err(AuthzError::InsufficientRole { actual: Role::User })
        ));
        assert!(authorize(&user, &[]).is_err());
    }

    #[test]
    fn test_scope_requested_tenant() {
        let p = principal(Role::TenantAdmin);

        assert_eq!(scope_requested_tenant(&p, p.tenant_id).unwrap(), p.tenant_id);
        assert!(matches!(
            scope_requested_tenant(&p, Uuid::new_v4()),
            Err(AuthzError::TenantMismatch)
        ));
    }
}
