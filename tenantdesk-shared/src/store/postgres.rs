/// PostgreSQL store
///
/// Thin adapter from the repository traits onto the model operations in
/// [`crate::models`]. All SQL lives with the models.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use tenantdesk_shared::db::pool::{create_pool, DatabaseConfig};
/// use tenantdesk_shared::store::{PgStore, Store};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
/// let store: Arc<dyn Store> = Arc::new(PgStore::new(pool));
/// store.ping().await?;
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{
    AuditRepository, ProjectRepository, RevocationRepository, Store, StoreResult, TaskRepository,
    TenantRepository, UserRepository,
};
use crate::db::pool::health_check;
use crate::models::{
    audit::{AuditLogEntry, NewAuditEntry},
    project::{NewProject, Project, ProjectFilter, UpdateProject},
    revoked_token::RevokedToken,
    task::{NewTask, Task, TaskFilter, UpdateTask},
    tenant::{NewTenant, Tenant, UpdateTenant},
    user::{NewUser, UpdateUser, User},
};

/// Store backed by a PostgreSQL connection pool
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl TenantRepository for PgStore {
    async fn create_tenant_with_admin(
        &self,
        tenant: NewTenant,
        admin: NewUser,
    ) -> StoreResult<(Tenant, User)> {
        Ok(Tenant::create_with_admin(&self.pool, tenant, admin).await?)
    }

    async fn find_tenant(&self, id: Uuid) -> StoreResult<Option<Tenant>> {
        Ok(Tenant::find_by_id(&self.pool, id).await?)
    }

    async fn find_tenant_by_subdomain(&self, subdomain: &str) -> StoreResult<Option<Tenant>> {
        Ok(Tenant::find_by_subdomain(&self.pool, subdomain).await?)
    }

    async fn update_tenant(&self, id: Uuid, patch: UpdateTenant) -> StoreResult<Option<Tenant>> {
        Ok(Tenant::update(&self.pool, id, patch).await?)
    }

    async fn list_tenants(&self) -> StoreResult<Vec<Tenant>> {
        Ok(Tenant::list(&self.pool).await?)
    }
}

#[async_trait]
impl UserRepository for PgStore {
    async fn create_user_within_quota(&self, user: NewUser) -> StoreResult<User> {
        Ok(User::create_within_quota(&self.pool, user).await?)
    }

    async fn find_user(&self, tenant_id: Uuid, id: Uuid) -> StoreResult<Option<User>> {
        Ok(User::find_by_id(&self.pool, tenant_id, id).await?)
    }

    async fn find_active_user_by_email(
        &self,
        tenant_id: Uuid,
        email: &str,
    ) -> StoreResult<Option<User>> {
        Ok(User::find_active_by_email(&self.pool, tenant_id, email).await?)
    }

    async fn list_users(&self, tenant_id: Uuid) -> StoreResult<Vec<User>> {
        Ok(User::list_by_tenant(&self.pool, tenant_id).await?)
    }

    async fn update_user(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        patch: UpdateUser,
    ) -> StoreResult<Option<User>> {
        Ok(User::update(&self.pool, tenant_id, id, patch).await?)
    }

    async fn delete_user(&self, tenant_id: Uuid, id: Uuid) -> StoreResult<bool> {
        Ok(User::delete(&self.pool, tenant_id, id).await?)
    }

    async fn count_users(&self, tenant_id: Uuid) -> StoreResult<i64> {
        Ok(User::count_by_tenant(&self.pool, tenant_id).await?)
    }
}

#[async_trait]
impl ProjectRepository for PgStore {
    async fn create_project_within_quota(&self, project: NewProject) -> StoreResult<Project> {
        Ok(Project::create_within_quota(&self.pool, project).await?)
    }

    async fn find_project(&self, tenant_id: Uuid, id: Uuid) -> StoreResult<Option<Project>> {
        Ok(Project::find_by_id(&self.pool, tenant_id, id).await?)
    }

    async fn list_projects(
        &self,
        tenant_id: Uuid,
        filter: &ProjectFilter,
    ) -> StoreResult<Vec<Project>> {
        Ok(Project::list_by_tenant(&self.pool, tenant_id, filter).await?)
    }

    async fn update_project(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        patch: UpdateProject,
    ) -> StoreResult<Option<Project>> {
        Ok(Project::update(&self.pool, tenant_id, id, patch).await?)
    }

    async fn delete_project(&self, tenant_id: Uuid, id: Uuid) -> StoreResult<bool> {
        Ok(Project::delete(&self.pool, tenant_id, id).await?)
    }

    async fn count_projects(&self, tenant_id: Uuid) -> StoreResult<i64> {
        Ok(Project::count_by_tenant(&self.pool, tenant_id).await?)
    }
}

#[async_trait]
impl TaskRepository for PgStore {
    async fn create_task(&self, task: NewTask) -> StoreResult<Option<Task>> {
        Ok(Task::create(&self.pool, task).await?)
    }

    async fn find_task(&self, tenant_id: Uuid, id: Uuid) -> StoreResult<Option<Task>> {
        Ok(Task::find_by_id(&self.pool, tenant_id, id).await?)
    }

    async fn list_tasks(
        &self,
        tenant_id: Uuid,
        project_id: Uuid,
        filter: &TaskFilter,
    ) -> StoreResult<Vec<Task>> {
        Ok(Task::list_by_project(&self.pool, tenant_id, project_id, filter).await?)
    }

    async fn update_task(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        patch: UpdateTask,
    ) -> StoreResult<Option<Task>> {
        Ok(Task::update(&self.pool, tenant_id, id, patch).await?)
    }

    async fn delete_task(&self, tenant_id: Uuid, id: Uuid) -> StoreResult<bool> {
        Ok(Task::delete(&self.pool, tenant_id, id).await?)
    }
}

#[async_trait]
impl AuditRepository for PgStore {
    async fn append_audit_entry(&self, entry: &NewAuditEntry) -> StoreResult<()> {
        AuditLogEntry::append(&self.pool, entry).await?;
        Ok(())
    }

    async fn list_audit_entries(
        &self,
        tenant_id: Uuid,
        limit: i64,
    ) -> StoreResult<Vec<AuditLogEntry>> {
        Ok(AuditLogEntry::list_by_tenant(&self.pool, tenant_id, limit).await?)
    }
}

#[async_trait]
impl RevocationRepository for PgStore {
    async fn revoke_token(&self, jti: Uuid, expires_at: DateTime<Utc>) -> StoreResult<()> {
        Ok(RevokedToken::insert(&self.pool, jti, expires_at).await?)
    }

    async fn is_token_revoked(&self, jti: Uuid) -> StoreResult<bool> {
        Ok(RevokedToken::exists(&self.pool, jti).await?)
    }

    async fn purge_expired_revocations(&self, now: DateTime<Utc>) -> StoreResult<u64> {
        Ok(RevokedToken::purge_expired(&self.pool, now).await?)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(health_check(&self.pool).await?)
    }
}
