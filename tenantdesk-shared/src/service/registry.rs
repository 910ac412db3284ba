/// Tenant registry
///
/// Owns the tenant lifecycle: self-service registration (tenant plus first
/// admin, atomically), lookups, partial updates and the platform-wide
/// listing reserved for `super_admin`.
///
/// New tenants always start on the free plan with its user and project
/// limits copied onto the tenant row. The one exception is the platform
/// operator's tenant, seeded at startup on the enterprise plan.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;
use validator::Validate;

use super::audit::AuditRecorder;
use super::ensure_live_actor;
use crate::auth::authorization::{require, scope_requested_tenant, Action};
use crate::auth::guard::{Principal, RequestContext};
use crate::auth::password::CredentialStore;
use crate::error::{CoreError, CoreResult};
use crate::models::audit::{AuditAction, EntityType, NewAuditEntry};
use crate::models::tenant::{
    normalize_subdomain, NewTenant, RegisterTenant, SubscriptionPlan, Tenant, UpdateTenant,
};
use crate::models::user::{NewUser, Role, UpdateUser, User};
use crate::quota::{QuotaCheckResult, QuotaLimits, QuotaType};
use crate::store::Store;

/// Result of a successful registration
#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub tenant: Tenant,
    pub admin: User,
}

/// Current usage against the tenant's limits
#[derive(Debug, Clone, Serialize)]
pub struct TenantUsage {
    pub users: QuotaCheckResult,
    pub projects: QuotaCheckResult,
}

/// Tenant with its usage figures
#[derive(Debug, Clone, Serialize)]
pub struct TenantDetails {
    pub tenant: Tenant,
    pub usage: TenantUsage,
}

/// Tenant row input with the plan's limits copied on
fn new_tenant(name: String, subdomain: String, plan: SubscriptionPlan) -> NewTenant {
    let limits = QuotaLimits::for_plan(plan);
    NewTenant {
        name,
        subdomain,
        plan,
        max_users: limits.get(QuotaType::Users) as i32,
        max_projects: limits.get(QuotaType::Projects) as i32,
    }
}

#[derive(Clone)]
pub struct TenantRegistry {
    store: Arc<dyn Store>,
    credentials: Arc<CredentialStore>,
    audit: AuditRecorder,
}

impl TenantRegistry {
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

    /// Registers a tenant together with its first `tenant_admin`
    ///
    /// # Errors
    ///
    /// - `CoreError::Validation` for malformed input
    /// - `CoreError::Conflict` if the subdomain is taken; nothing is written
    pub async fn register_tenant(
        &self,
        mut request: RegisterTenant,
        source_addr: Option<String>,
    ) -> CoreResult<Registration> {
        request.normalize();
        request.validate()?;

        let new_tenant = new_tenant(request.tenant_name, request.subdomain, SubscriptionPlan::Free);

        let admin = NewUser {
            // Replaced with the new tenant's ID inside the store
            tenant_id: Uuid::nil(),
            email: request.admin_email,
            password_hash: self.credentials.hash_blocking(&request.admin_password).await?,
            full_name: request.admin_full_name,
            role: Role::TenantAdmin,
            is_active: true,
        };

        let (tenant, admin) = self.store.create_tenant_with_admin(new_tenant, admin).await?;

        info!(
            tenant_id = %tenant.id,
            subdomain = %tenant.subdomain,
            user_id = %admin.id,
            "Tenant registered"
        );

        self.audit
            .record(NewAuditEntry {
                tenant_id: tenant.id,
                user_id: Some(admin.id),
                action: AuditAction::Create,
                entity_type: EntityType::Tenant,
                entity_id: tenant.id,
                ip_address: source_addr,
            })
            .await;

        Ok(Registration { tenant, admin })
    }

    /// Ensures the configured platform operator exists
    ///
    /// On first start this creates the operator's tenant on the enterprise
    /// plan with a `super_admin` user. Later runs find the tenant and promote
    /// an existing user with that email if needed, or add one. The password
    /// of an existing user is never changed. Safe to call on every start.
    pub async fn bootstrap_super_admin(&self, mut seed: RegisterTenant) -> CoreResult<User> {
        seed.normalize();
        seed.validate()?;

        let Some(tenant) = self.store.find_tenant_by_subdomain(&seed.subdomain).await? else {
            let operator = NewUser {
                tenant_id: Uuid::nil(),
                email: seed.admin_email,
                password_hash: self.credentials.hash_blocking(&seed.admin_password).await?,
                full_name: seed.admin_full_name,
                role: Role::SuperAdmin,
                is_active: true,
            };
            let tenant = new_tenant(seed.tenant_name, seed.subdomain, SubscriptionPlan::Enterprise);

            let (tenant, operator) = self.store.create_tenant_with_admin(tenant, operator).await?;
            info!(tenant_id = %tenant.id, user_id = %operator.id, "Platform operator created");
            return Ok(operator);
        };

        match self
            .store
            .find_active_user_by_email(tenant.id, &seed.admin_email)
            .await?
        {
            Some(user) if user.role == Role::SuperAdmin => {
                debug!(tenant_id = %tenant.id, user_id = %user.id, "Platform operator already present");
                Ok(user)
            }
            Some(user) => {
                let promoted = self
                    .store
                    .update_user(
                        tenant.id,
                        user.id,
                        UpdateUser {
                            role: Some(Role::SuperAdmin),
                            ..Default::default()
                        },
                    )
                    .await?
                    .ok_or_else(|| CoreError::not_found("User"))?;

                info!(tenant_id = %tenant.id, user_id = %promoted.id, "Promoted user to super_admin");
                Ok(promoted)
            }
            None => {
                let operator = self
                    .store
                    .create_user_within_quota(NewUser {
                        tenant_id: tenant.id,
                        email: seed.admin_email,
                        password_hash: self.credentials.hash_blocking(&seed.admin_password).await?,
                        full_name: seed.admin_full_name,
                        role: Role::SuperAdmin,
                        is_active: true,
                    })
                    .await?;

                info!(tenant_id = %tenant.id, user_id = %operator.id, "Platform operator added");
                Ok(operator)
            }
        }
    }

    /// Looks a tenant up by its login subdomain
    pub async fn get_by_subdomain(&self, subdomain: &str) -> CoreResult<Tenant> {
        self.store
            .find_tenant_by_subdomain(&normalize_subdomain(subdomain))
            .await?
            .ok_or_else(|| CoreError::not_found("Tenant"))
    }

    /// The principal's own tenant with usage figures
    ///
    /// # Errors
    ///
    /// `CoreError::NotFound` if `tenant_id` is not the principal's tenant or
    /// the tenant no longer exists
    pub async fn get_tenant(&self, principal: &Principal, tenant_id: Uuid) -> CoreResult<TenantDetails> {
        require(principal, Action::ViewTenant)?;
        let tenant_id = scope_requested_tenant(principal, tenant_id)?;

        let tenant = self
            .store
            .find_tenant(tenant_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Tenant"))?;

        let users = self.store.count_users(tenant_id).await?;
        let projects = self.store.count_projects(tenant_id).await?;

        let usage = TenantUsage {
            users: QuotaCheckResult::evaluate(users.max(0) as u32, tenant.max_users.max(0) as u32),
            projects: QuotaCheckResult::evaluate(
                projects.max(0) as u32,
                tenant.max_projects.max(0) as u32,
            ),
        };

        Ok(TenantDetails { tenant, usage })
    }

    /// Partially updates the principal's own tenant
    ///
    /// Any status may replace any other; there is no transition guard.
    pub async fn update_tenant(
        &self,
        ctx: &RequestContext,
        tenant_id: Uuid,
        mut patch: UpdateTenant,
    ) -> CoreResult<Tenant> {
        require(&ctx.principal, Action::UpdateTenant)?;
        let tenant_id = scope_requested_tenant(&ctx.principal, tenant_id)?;
        patch.normalize();
        patch.validate()?;
        ensure_live_actor(self.store.as_ref(), &ctx.principal).await?;

        let tenant = self
            .store
            .update_tenant(tenant_id, patch)
            .await?
            .ok_or_else(|| CoreError::not_found("Tenant"))?;

        info!(
            tenant_id = %tenant.id,
            user_id = %ctx.principal.user_id,
            status = ?tenant.status,
            "Tenant updated"
        );

        self.audit
            .record_for(ctx, AuditAction::Update, EntityType::Tenant, tenant.id)
            .await;

        Ok(tenant)
    }

    /// Every tenant on the platform, newest first
    ///
    /// # Errors
    ///
    /// `CoreError::Forbidden` unless the principal is a `super_admin`
    pub async fn list_all(&self, principal: &Principal) -> CoreResult<Vec<Tenant>> {
        require(principal, Action::ListTenants)?;

        Ok(self.store.list_tenants().await?)
    }
}
