/// In-memory store
///
/// Implements every repository trait over plain vectors behind a single
/// `tokio::sync::RwLock`. Writes take the write lock for their whole
/// check-then-insert sequence, which gives quota checks and uniqueness the
/// same atomicity the PostgreSQL store gets from row locks and constraints.
///
/// Used by the test suites and for running the API without a database.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use tenantdesk_shared::store::{MemoryStore, Store};
///
/// # async fn example() {
/// let store = Arc::new(MemoryStore::new());
/// store.ping().await.unwrap();
///
/// // Simulate an outage of the audit table only
/// store.fail_audit_writes(true);
/// # }
/// ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    AuditRepository, ProjectRepository, RevocationRepository, Store, StoreError, StoreResult,
    TaskRepository, TenantRepository, UserRepository, SUBDOMAIN_CONSTRAINT,
    TENANT_EMAIL_CONSTRAINT,
};
use crate::models::{
    audit::{AuditLogEntry, NewAuditEntry},
    project::{NewProject, Project, ProjectFilter, UpdateProject},
    task::{NewTask, Task, TaskFilter, UpdateTask},
    tenant::{NewTenant, Tenant, TenantStatus, UpdateTenant},
    user::{NewUser, UpdateUser, User},
};
use crate::quota::{self, QuotaType};

/// Rows in insertion order
#[derive(Debug, Default)]
struct Tables {
    tenants: Vec<Tenant>,
    users: Vec<User>,
    projects: Vec<Project>,
    tasks: Vec<Task>,
    audit_logs: Vec<AuditLogEntry>,
    revoked_tokens: HashMap<Uuid, DateTime<Utc>>,
}

impl Tables {
    fn tenant(&self, id: Uuid) -> StoreResult<&Tenant> {
        self.tenants
            .iter()
            .find(|t| t.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("Tenant {} not found", id)))
    }

    fn email_taken(&self, tenant_id: Uuid, email: &str) -> bool {
        self.users
            .iter()
            .any(|u| u.tenant_id == tenant_id && u.email == email)
    }

    fn build_user(data: NewUser, now: DateTime<Utc>) -> User {
        User {
            id: Uuid::new_v4(),
            tenant_id: data.tenant_id,
            email: data.email,
            password_hash: data.password_hash,
            full_name: data.full_name,
            role: data.role,
            is_active: data.is_active,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Store keeping all rows in process memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    audit_outage: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every audit append fail with `StoreError::Unavailable`
    ///
    /// All other tables keep working.
    pub fn fail_audit_writes(&self, fail: bool) {
        self.audit_outage.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl TenantRepository for MemoryStore {
    async fn create_tenant_with_admin(
        &self,
        tenant: NewTenant,
        mut admin: NewUser,
    ) -> StoreResult<(Tenant, User)> {
        let mut tables = self.tables.write().await;

        if tables.tenants.iter().any(|t| t.subdomain == tenant.subdomain) {
            return Err(StoreError::conflict_for(Some(SUBDOMAIN_CONSTRAINT)));
        }

        let now = Utc::now();
        let tenant = Tenant {
            id: Uuid::new_v4(),
            name: tenant.name,
            subdomain: tenant.subdomain,
            status: TenantStatus::Active,
            subscription_plan: tenant.plan,
            max_users: tenant.max_users,
            max_projects: tenant.max_projects,
            created_at: now,
            updated_at: now,
        };
        admin.tenant_id = tenant.id;
        let admin = Tables::build_user(admin, now);

        tables.tenants.push(tenant.clone());
        tables.users.push(admin.clone());

        Ok((tenant, admin))
    }

    async fn find_tenant(&self, id: Uuid) -> StoreResult<Option<Tenant>> {
        let tables = self.tables.read().await;
        Ok(tables.tenants.iter().find(|t| t.id == id).cloned())
    }

    async fn find_tenant_by_subdomain(&self, subdomain: &str) -> StoreResult<Option<Tenant>> {
        let tables = self.tables.read().await;
        Ok(tables
            .tenants
            .iter()
            .find(|t| t.subdomain == subdomain)
            .cloned())
    }

    async fn update_tenant(&self, id: Uuid, patch: UpdateTenant) -> StoreResult<Option<Tenant>> {
        let mut tables = self.tables.write().await;
        let Some(tenant) = tables.tenants.iter_mut().find(|t| t.id == id) else {
            return Ok(None);
        };

        if let Some(name) = patch.name {
            tenant.name = name;
        }
        if let Some(status) = patch.status {
            tenant.status = status;
        }
        tenant.updated_at = Utc::now();

        Ok(Some(tenant.clone()))
    }

    async fn list_tenants(&self) -> StoreResult<Vec<Tenant>> {
        let tables = self.tables.read().await;
        Ok(tables.tenants.iter().rev().cloned().collect())
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create_user_within_quota(&self, user: NewUser) -> StoreResult<User> {
        let mut tables = self.tables.write().await;

        let max_users = tables.tenant(user.tenant_id)?.max_users;
        let current = tables
            .users
            .iter()
            .filter(|u| u.tenant_id == user.tenant_id)
            .count();
        quota::enforce(QuotaType::Users, current as i64, max_users)?;

        if tables.email_taken(user.tenant_id, &user.email) {
            return Err(StoreError::conflict_for(Some(TENANT_EMAIL_CONSTRAINT)));
        }

        let user = Tables::build_user(user, Utc::now());
        tables.users.push(user.clone());

        Ok(user)
    }

    async fn find_user(&self, tenant_id: Uuid, id: Uuid) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .iter()
            .find(|u| u.id == id && u.tenant_id == tenant_id)
            .cloned())
    }

    async fn find_active_user_by_email(
        &self,
        tenant_id: Uuid,
        email: &str,
    ) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .iter()
            .find(|u| u.tenant_id == tenant_id && u.email == email && u.is_active)
            .cloned())
    }

    async fn list_users(&self, tenant_id: Uuid) -> StoreResult<Vec<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .iter()
            .filter(|u| u.tenant_id == tenant_id)
            .cloned()
            .collect())
    }

    async fn update_user(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        patch: UpdateUser,
    ) -> StoreResult<Option<User>> {
        let mut tables = self.tables.write().await;
        let Some(user) = tables
            .users
            .iter_mut()
            .find(|u| u.id == id && u.tenant_id == tenant_id)
        else {
            return Ok(None);
        };

        if let Some(full_name) = patch.full_name {
            user.full_name = full_name;
        }
        if let Some(role) = patch.role {
            user.role = role;
        }
        if let Some(is_active) = patch.is_active {
            user.is_active = is_active;
        }
        user.updated_at = Utc::now();

        Ok(Some(user.clone()))
    }

    async fn delete_user(&self, tenant_id: Uuid, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;

        let before = tables.users.len();
        tables
            .users
            .retain(|u| !(u.id == id && u.tenant_id == tenant_id));
        if tables.users.len() == before {
            return Ok(false);
        }

        // ON DELETE SET NULL
        for project in tables.projects.iter_mut() {
            if project.created_by == Some(id) {
                project.created_by = None;
            }
        }
        for task in tables.tasks.iter_mut() {
            if task.created_by == Some(id) {
                task.created_by = None;
            }
            if task.assigned_to == Some(id) {
                task.assigned_to = None;
            }
        }

        Ok(true)
    }

    async fn count_users(&self, tenant_id: Uuid) -> StoreResult<i64> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().filter(|u| u.tenant_id == tenant_id).count() as i64)
    }
}

#[async_trait]
impl ProjectRepository for MemoryStore {
    async fn create_project_within_quota(&self, project: NewProject) -> StoreResult<Project> {
        let mut tables = self.tables.write().await;

        let max_projects = tables.tenant(project.tenant_id)?.max_projects;
        let current = tables
            .projects
            .iter()
            .filter(|p| p.tenant_id == project.tenant_id)
            .count();
        quota::enforce(QuotaType::Projects, current as i64, max_projects)?;

        let now = Utc::now();
        let project = Project {
            id: Uuid::new_v4(),
            tenant_id: project.tenant_id,
            name: project.name,
            description: project.description,
            status: project.status,
            created_by: project.created_by,
            created_at: now,
            updated_at: now,
        };
        tables.projects.push(project.clone());

        Ok(project)
    }

    async fn find_project(&self, tenant_id: Uuid, id: Uuid) -> StoreResult<Option<Project>> {
        let tables = self.tables.read().await;
        Ok(tables
            .projects
            .iter()
            .find(|p| p.id == id && p.tenant_id == tenant_id)
            .cloned())
    }

    async fn list_projects(
        &self,
        tenant_id: Uuid,
        filter: &ProjectFilter,
    ) -> StoreResult<Vec<Project>> {
        let tables = self.tables.read().await;
        Ok(tables
            .projects
            .iter()
            .rev()
            .filter(|p| p.tenant_id == tenant_id)
            .filter(|p| filter.status.map_or(true, |s| p.status == s))
            .cloned()
            .collect())
    }

    async fn update_project(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        patch: UpdateProject,
    ) -> StoreResult<Option<Project>> {
        let mut tables = self.tables.write().await;
        let Some(project) = tables
            .projects
            .iter_mut()
            .find(|p| p.id == id && p.tenant_id == tenant_id)
        else {
            return Ok(None);
        };

        if let Some(name) = patch.name {
            project.name = name;
        }
        if let Some(description) = patch.description {
            project.description = description;
        }
        if let Some(status) = patch.status {
            project.status = status;
        }
        project.updated_at = Utc::now();

        Ok(Some(project.clone()))
    }

    async fn delete_project(&self, tenant_id: Uuid, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;

        let before = tables.projects.len();
        tables
            .projects
            .retain(|p| !(p.id == id && p.tenant_id == tenant_id));
        if tables.projects.len() == before {
            return Ok(false);
        }

        tables.tasks.retain(|t| t.project_id != id);

        Ok(true)
    }

    async fn count_projects(&self, tenant_id: Uuid) -> StoreResult<i64> {
        let tables = self.tables.read().await;
        Ok(tables
            .projects
            .iter()
            .filter(|p| p.tenant_id == tenant_id)
            .count() as i64)
    }
}

#[async_trait]
impl TaskRepository for MemoryStore {
    async fn create_task(&self, task: NewTask) -> StoreResult<Option<Task>> {
        let mut tables = self.tables.write().await;

        let project_in_tenant = tables
            .projects
            .iter()
            .any(|p| p.id == task.project_id && p.tenant_id == task.tenant_id);
        if !project_in_tenant {
            return Ok(None);
        }

        let now = Utc::now();
        let task = Task {
            id: Uuid::new_v4(),
            tenant_id: task.tenant_id,
            project_id: task.project_id,
            title: task.title,
            description: task.description,
            status: task.status,
            priority: task.priority,
            due_date: task.due_date,
            created_by: task.created_by,
            assigned_to: task.assigned_to,
            created_at: now,
            updated_at: now,
        };
        tables.tasks.push(task.clone());

        Ok(Some(task))
    }

    async fn find_task(&self, tenant_id: Uuid, id: Uuid) -> StoreResult<Option<Task>> {
        let tables = self.tables.read().await;
        Ok(tables
            .tasks
            .iter()
            .find(|t| t.id == id && t.tenant_id == tenant_id)
            .cloned())
    }

    async fn list_tasks(
        &self,
        tenant_id: Uuid,
        project_id: Uuid,
        filter: &TaskFilter,
    ) -> StoreResult<Vec<Task>> {
        let tables = self.tables.read().await;
        Ok(tables
            .tasks
            .iter()
            .rev()
            .filter(|t| t.tenant_id == tenant_id && t.project_id == project_id)
            .filter(|t| filter.status.map_or(true, |s| t.status == s))
            .filter(|t| filter.priority.map_or(true, |p| t.priority == p))
            .filter(|t| filter.assigned_to.map_or(true, |a| t.assigned_to == Some(a)))
            .cloned()
            .collect())
    }

    async fn update_task(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        patch: UpdateTask,
    ) -> StoreResult<Option<Task>> {
        let mut tables = self.tables.write().await;
        let Some(task) = tables
            .tasks
            .iter_mut()
            .find(|t| t.id == id && t.tenant_id == tenant_id)
        else {
            return Ok(None);
        };

        if let Some(title) = patch.title {
            task.title = title;
        }
        if let Some(description) = patch.description {
            task.description = description;
        }
        if let Some(status) = patch.status {
            task.status = status;
        }
        if let Some(priority) = patch.priority {
            task.priority = priority;
        }
        if let Some(due_date) = patch.due_date {
            task.due_date = due_date;
        }
        if let Some(assigned_to) = patch.assigned_to {
            task.assigned_to = assigned_to;
        }
        task.updated_at = Utc::now();

        Ok(Some(task.clone()))
    }

    async fn delete_task(&self, tenant_id: Uuid, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;

        let before = tables.tasks.len();
        tables
            .tasks
            .retain(|t| !(t.id == id && t.tenant_id == tenant_id));

        Ok(tables.tasks.len() < before)
    }
}

#[async_trait]
impl AuditRepository for MemoryStore {
    async fn append_audit_entry(&self, entry: &NewAuditEntry) -> StoreResult<()> {
        if self.audit_outage.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(
                "audit_logs is not accepting writes".to_string(),
            ));
        }

        let mut tables = self.tables.write().await;
        tables.audit_logs.push(AuditLogEntry {
            id: Uuid::new_v4(),
            tenant_id: entry.tenant_id,
            user_id: entry.user_id,
            action: entry.action,
            entity_type: entry.entity_type,
            entity_id: entry.entity_id,
            ip_address: entry.ip_address.clone(),
            created_at: Utc::now(),
        });

        Ok(())
    }

    async fn list_audit_entries(
        &self,
        tenant_id: Uuid,
        limit: i64,
    ) -> StoreResult<Vec<AuditLogEntry>> {
        let tables = self.tables.read().await;
        let limit = usize::try_from(limit.max(0)).unwrap_or(usize::MAX);
        Ok(tables
            .audit_logs
            .iter()
            .rev()
            .filter(|e| e.tenant_id == tenant_id)
            .take(limit)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl RevocationRepository for MemoryStore {
    async fn revoke_token(&self, jti: Uuid, expires_at: DateTime<Utc>) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        tables.revoked_tokens.entry(jti).or_insert(expires_at);
        Ok(())
    }

    async fn is_token_revoked(&self, jti: Uuid) -> StoreResult<bool> {
        let tables = self.tables.read().await;
        Ok(tables.revoked_tokens.contains_key(&jti))
    }

    async fn purge_expired_revocations(&self, now: DateTime<Utc>) -> StoreResult<u64> {
        let mut tables = self.tables.write().await;
        let before = tables.revoked_tokens.len();
        tables.revoked_tokens.retain(|_, expires_at| *expires_at > now);
        Ok((before - tables.revoked_tokens.len()) as u64)
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
