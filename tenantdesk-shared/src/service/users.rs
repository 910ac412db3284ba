/// Tenant user management
///
/// Listing is open to every member of the tenant; creating, updating and
/// deleting users is reserved for `tenant_admin`. The `super_admin` role can
/// never be granted through this service.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;
use validator::Validate;

use super::audit::AuditRecorder;
use super::ensure_live_actor;
use crate::auth::authorization::{require, scope_requested_tenant, scope_to_tenant, Action};
use crate::auth::guard::{Principal, RequestContext};
use crate::auth::password::CredentialStore;
use crate::error::{CoreError, CoreResult};
use crate::models::audit::{AuditAction, EntityType};
use crate::models::user::{normalize_email, CreateUserRequest, NewUser, Role, UpdateUser, User};
use crate::store::Store;

#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn Store>,
    credentials: Arc<CredentialStore>,
    audit: AuditRecorder,
}

fn reject_super_admin(role: Option<Role>) -> CoreResult<()> {
    if role == Some(Role::SuperAdmin) {
        return Err(CoreError::Forbidden(
            "Cannot assign super_admin role".to_string(),
        ));
    }
    Ok(())
}

impl UserService {
    pub fn new(
        store: Arc<dyn Store>,
        credentials: Arc<CredentialStore>,
        audit: AuditRecorder,
    ) -> Self {
        Self {
            store,
            credentials,
            audit,
        }
    }

    /// Users of the principal's tenant, oldest first
    pub async fn list_users(&self, principal: &Principal, tenant_id: Uuid) -> CoreResult<Vec<User>> {
        require(principal, Action::ViewUsers)?;
        let tenant_id = scope_requested_tenant(principal, tenant_id)?;

        Ok(self.store.list_users(tenant_id).await?)
    }

    /// Adds a user to the principal's tenant
    ///
    /// # Errors
    ///
    /// - `CoreError::Forbidden` if the caller is not a `tenant_admin`, the
    ///   role is `super_admin` or the tenant is at `max_users`
    /// - `CoreError::Conflict` if the email is already used in the tenant
    pub async fn create_user(
        &self,
        ctx: &RequestContext,
        tenant_id: Uuid,
        mut request: CreateUserRequest,
    ) -> CoreResult<User> {
        require(&ctx.principal, Action::ManageUsers)?;
        let tenant_id = scope_requested_tenant(&ctx.principal, tenant_id)?;

        request.email = normalize_email(&request.email);
        request.full_name = request.full_name.trim().to_string();
        request.validate()?;
        reject_super_admin(Some(request.role))?;
        ensure_live_actor(self.store.as_ref(), &ctx.principal).await?;

        let user = self
            .store
            .create_user_within_quota(NewUser {
                tenant_id,
                email: request.email,
                password_hash: self.credentials.hash_blocking(&request.password).await?,
                full_name: request.full_name,
                role: request.role,
                is_active: request.is_active,
            })
            .await
            .map_err(|e| {
                info!(tenant_id = %tenant_id, error = %e, "User creation rejected");
                CoreError::from(e)
            })?;

        info!(tenant_id = %tenant_id, user_id = %user.id, role = user.role.as_str(), "User created");

        self.audit
            .record_for(ctx, AuditAction::Create, EntityType::User, user.id)
            .await;

        Ok(user)
    }

    pub async fn update_user(
        &self,
        ctx: &RequestContext,
        user_id: Uuid,
        mut patch: UpdateUser,
    ) -> CoreResult<User> {
        require(&ctx.principal, Action::ManageUsers)?;
        patch.normalize();
        patch.validate()?;
        reject_super_admin(patch.role)?;
        ensure_live_actor(self.store.as_ref(), &ctx.principal).await?;

        let user = self
            .store
            .update_user(scope_to_tenant(&ctx.principal), user_id, patch)
            .await?
            .ok_or_else(|| CoreError::not_found("User"))?;

        self.audit
            .record_for(ctx, AuditAction::Update, EntityType::User, user.id)
            .await;

        Ok(user)
    }

    /// Deletes a user of the principal's tenant
    ///
    /// # Errors
    ///
    /// `CoreError::Forbidden` when the principal targets its own account
    pub async fn delete_user(&self, ctx: &RequestContext, user_id: Uuid) -> CoreResult<()> {
        if user_id == ctx.principal.user_id {
            return Err(CoreError::Forbidden("Cannot delete yourself".to_string()));
        }
        require(&ctx.principal, Action::ManageUsers)?;
        ensure_live_actor(self.store.as_ref(), &ctx.principal).await?;

        let tenant_id = scope_to_tenant(&ctx.principal);
        if !self.store.delete_user(tenant_id, user_id).await? {
            return Err(CoreError::not_found("User"));
        }

        info!(tenant_id = %tenant_id, user_id = %user_id, "User deleted");

        self.audit
            .record_for(ctx, AuditAction::Delete, EntityType::User, user_id)
            .await;

        Ok(())
    }
}
