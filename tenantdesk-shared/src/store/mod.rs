/// Store interfaces
///
/// Components never reach for a global connection. Each one receives an
/// `Arc<dyn Store>` (or a narrower repository trait) at construction, which
/// lets the same services run against PostgreSQL in production and an
/// in-memory store in tests.
///
/// # Implementations
///
/// - [`postgres::PgStore`]: sqlx/PostgreSQL, quota checks under a tenant row lock
/// - [`memory::MemoryStore`]: in-process tables behind an async `RwLock`
///
/// # Tenant scoping
///
/// Every user, project and task method takes the tenant ID as a required
/// argument and matches on it together with the entity ID. A lookup with the
/// right ID but the wrong tenant returns `None` / `false`, exactly like a
/// missing row.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{
    audit::{AuditLogEntry, NewAuditEntry},
    project::{NewProject, Project, ProjectFilter, UpdateProject},
    task::{NewTask, Task, TaskFilter, UpdateTask},
    tenant::{NewTenant, Tenant, UpdateTenant},
    user::{NewUser, UpdateUser, User},
};
use crate::quota::{QuotaError, QuotaType};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Unique constraint on `tenants.subdomain`
pub const SUBDOMAIN_CONSTRAINT: &str = "tenants_subdomain_key";

/// Unique constraint on `users (tenant_id, email)`
pub const TENANT_EMAIL_CONSTRAINT: &str = "users_tenant_email_key";

/// Error type for store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Unique constraint violation
    #[error("{0}")]
    Conflict(String),

    /// Tenant quota reached; nothing was written
    #[error("{} limit exceeded ({current}/{limit})", .quota.as_str())]
    QuotaExceeded {
        quota: QuotaType,
        limit: u32,
        current: u32,
    },

    /// A row the operation depends on is missing
    #[error("{0}")]
    NotFound(String),

    /// Backend is not reachable or refused the write
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),
}

impl StoreError {
    /// Conflict error for a violated unique constraint
    pub fn conflict_for(constraint: Option<&str>) -> Self {
        let message = match constraint {
            Some(SUBDOMAIN_CONSTRAINT) => "Subdomain already exists",
            Some(TENANT_EMAIL_CONSTRAINT) => "User already exists",
            _ => "Duplicate record",
        };
        StoreError::Conflict(message.to_string())
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return StoreError::conflict_for(db_err.constraint());
            }
        }

        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                StoreError::Unavailable(err.to_string())
            }
            other => StoreError::Database(other),
        }
    }
}

impl From<QuotaError> for StoreError {
    fn from(err: QuotaError) -> Self {
        match err {
            QuotaError::LimitExceeded {
                quota_type,
                limit,
                current,
            } => StoreError::QuotaExceeded {
                quota: quota_type,
                limit,
                current,
            },
            QuotaError::DatabaseError(e) => StoreError::from(e),
            QuotaError::TenantNotFound(id) => StoreError::NotFound(format!("Tenant {} not found", id)),
        }
    }
}

/// Store result type alias
pub type StoreResult<T> = Result<T, StoreError>;

/// Tenant lifecycle
#[async_trait]
pub trait TenantRepository: Send + Sync {
    /// Creates the tenant and its first admin atomically
    ///
    /// `admin.tenant_id` is overwritten with the new tenant's ID. On any
    /// failure neither row persists.
    async fn create_tenant_with_admin(
        &self,
        tenant: NewTenant,
        admin: NewUser,
    ) -> StoreResult<(Tenant, User)>;

    async fn find_tenant(&self, id: Uuid) -> StoreResult<Option<Tenant>>;

    async fn find_tenant_by_subdomain(&self, subdomain: &str) -> StoreResult<Option<Tenant>>;

    async fn update_tenant(&self, id: Uuid, patch: UpdateTenant) -> StoreResult<Option<Tenant>>;

    /// All tenants, newest first
    async fn list_tenants(&self) -> StoreResult<Vec<Tenant>>;
}

/// Tenant-scoped users
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Inserts the user unless the tenant is at `max_users`
    ///
    /// The count and the insert are atomic with respect to other creations
    /// in the same tenant.
    async fn create_user_within_quota(&self, user: NewUser) -> StoreResult<User>;

    async fn find_user(&self, tenant_id: Uuid, id: Uuid) -> StoreResult<Option<User>>;

    async fn find_active_user_by_email(
        &self,
        tenant_id: Uuid,
        email: &str,
    ) -> StoreResult<Option<User>>;

    /// Oldest first
    async fn list_users(&self, tenant_id: Uuid) -> StoreResult<Vec<User>>;

    async fn update_user(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        patch: UpdateUser,
    ) -> StoreResult<Option<User>>;

    async fn delete_user(&self, tenant_id: Uuid, id: Uuid) -> StoreResult<bool>;

    async fn count_users(&self, tenant_id: Uuid) -> StoreResult<i64>;
}

/// Tenant-scoped projects
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// Inserts the project unless the tenant is at `max_projects`
    async fn create_project_within_quota(&self, project: NewProject) -> StoreResult<Project>;

    async fn find_project(&self, tenant_id: Uuid, id: Uuid) -> StoreResult<Option<Project>>;

    /// Newest first
    async fn list_projects(
        &self,
        tenant_id: Uuid,
        filter: &ProjectFilter,
    ) -> StoreResult<Vec<Project>>;

    async fn update_project(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        patch: UpdateProject,
    ) -> StoreResult<Option<Project>>;

    /// Deletes the project and its tasks
    async fn delete_project(&self, tenant_id: Uuid, id: Uuid) -> StoreResult<bool>;

    async fn count_projects(&self, tenant_id: Uuid) -> StoreResult<i64>;
}

/// Tenant-scoped tasks
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Inserts the task if `task.project_id` belongs to `task.tenant_id`
    ///
    /// Returns `None` (and writes nothing) otherwise.
    async fn create_task(&self, task: NewTask) -> StoreResult<Option<Task>>;

    async fn find_task(&self, tenant_id: Uuid, id: Uuid) -> StoreResult<Option<Task>>;

    /// Newest first
    async fn list_tasks(
        &self,
        tenant_id: Uuid,
        project_id: Uuid,
        filter: &TaskFilter,
    ) -> StoreResult<Vec<Task>>;

    async fn update_task(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        patch: UpdateTask,
    ) -> StoreResult<Option<Task>>;

    async fn delete_task(&self, tenant_id: Uuid, id: Uuid) -> StoreResult<bool>;
}

/// Append-only audit trail
#[async_trait]
pub trait AuditRepository: Send + Sync {
    async fn append_audit_entry(&self, entry: &NewAuditEntry) -> StoreResult<()>;

    /// Newest first, at most `limit` entries
    async fn list_audit_entries(
        &self,
        tenant_id: Uuid,
        limit: i64,
    ) -> StoreResult<Vec<AuditLogEntry>>;
}

/// Session token blocklist
#[async_trait]
pub trait RevocationRepository: Send + Sync {
    async fn revoke_token(&self, jti: Uuid, expires_at: DateTime<Utc>) -> StoreResult<()>;

    async fn is_token_revoked(&self, jti: Uuid) -> StoreResult<bool>;

    /// Removes entries that expired by `now`, returning how many
    async fn purge_expired_revocations(&self, now: DateTime<Utc>) -> StoreResult<u64>;
}

/// Everything the core needs from persistence
#[async_trait]
pub trait Store:
    TenantRepository
    + UserRepository
    + ProjectRepository
    + TaskRepository
    + AuditRepository
    + RevocationRepository
{
    /// Connectivity check for health endpoints
    async fn ping(&self) -> StoreResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_messages() {
        assert_eq!(
            StoreError::conflict_for(Some(SUBDOMAIN_CONSTRAINT)).to_string(),
            "Subdomain already exists"
        );
        assert_eq!(
            StoreError::conflict_for(Some(TENANT_EMAIL_CONSTRAINT)).to_string(),
            "User already exists"
        );
        assert_eq!(StoreError::conflict_for(None).to_string(), "Duplicate record");
    }

    #[test]
    fn test_quota_error_conversion() {
        let err = StoreError::from(QuotaError::LimitExceeded {
            quota_type: QuotaType::Projects,
            limit: 3,
            current: 3,
        });

        assert!(matches!(
            err,
            StoreError::QuotaExceeded {
                quota: QuotaType::Projects,
                limit: 3,
                current: 3
            }
        ));
        assert_eq!(err.to_string(), "Project limit exceeded (3/3)");
    }

    #[test]
    fn test_pool_timeout_is_unavailable() {
        let err = StoreError::from(sqlx::Error::PoolTimedOut);
        assert!(matches!(err, StoreError::Unavailable(_)));
    }
}
