/// Tenant-scoped tasks
///
/// Tasks live inside projects of the same tenant. Creating a task in a
/// project the principal's tenant does not own is `Forbidden` and writes
/// nothing; assignees must be users of the same tenant.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use super::audit::AuditRecorder;
use super::ensure_live_actor;
use crate::auth::authorization::{require, scope_to_tenant, Action};
use crate::auth::guard::{Principal, RequestContext};
use crate::error::{CoreError, CoreResult};
use crate::models::audit::{AuditAction, EntityType};
use crate::models::task::{CreateTask, NewTask, Task, TaskFilter, UpdateTask, UpdateTaskStatus};
use crate::store::Store;

#[derive(Clone)]
pub struct TaskService {
    store: Arc<dyn Store>,
    audit: AuditRecorder,
}

impl TaskService {
    pub fn new(store: Arc<dyn Store>, audit: AuditRecorder) -> Self {
        Self { store, audit }
    }

    async fn ensure_assignee_in_tenant(&self, tenant_id: Uuid, assignee: Option<Uuid>) -> CoreResult<()> {
        let Some(assignee) = assignee else {
            return Ok(());
        };

        if self.store.find_user(tenant_id, assignee).await?.is_none() {
            return Err(CoreError::Forbidden(
                "Assignee must belong to the tenant".to_string(),
            ));
        }
        Ok(())
    }

    /// Tasks of one project, newest first
    ///
    /// # Errors
    ///
    /// `CoreError::NotFound` if the project is not in the principal's tenant
    pub async fn list_tasks(
        &self,
        principal: &Principal,
        project_id: Uuid,
        filter: &TaskFilter,
    ) -> CoreResult<Vec<Task>> {
        require(principal, Action::ReadTasks)?;
        let tenant_id = scope_to_tenant(principal);

        if self.store.find_project(tenant_id, project_id).await?.is_none() {
            return Err(CoreError::not_found("Project"));
        }

        Ok(self.store.list_tasks(tenant_id, project_id, filter).await?)
    }

    /// Creates a task in a project of the principal's tenant
    ///
    /// # Errors
    ///
    /// `CoreError::Forbidden` if the project belongs to another tenant (or
    /// does not exist) or the assignee is not a user of the tenant
    pub async fn create_task(
        &self,
        ctx: &RequestContext,
        project_id: Uuid,
        mut request: CreateTask,
    ) -> CoreResult<Task> {
        require(&ctx.principal, Action::WriteTasks)?;
        request.title = request.title.trim().to_string();
        request.validate()?;
        ensure_live_actor(self.store.as_ref(), &ctx.principal).await?;

        let tenant_id = scope_to_tenant(&ctx.principal);
        self.ensure_assignee_in_tenant(tenant_id, request.assigned_to)
            .await?;

        let task = self
            .store
            .create_task(NewTask {
                tenant_id,
                project_id,
                title: request.title,
                description: request.description,
                status: request.status,
                priority: request.priority,
                due_date: request.due_date,
                created_by: Some(ctx.principal.user_id),
                assigned_to: request.assigned_to,
            })
            .await?
            .ok_or_else(|| {
                warn!(
                    tenant_id = %tenant_id,
                    project_id = %project_id,
                    user_id = %ctx.principal.user_id,
                    "Task creation rejected: project not in tenant"
                );
                CoreError::Forbidden("Invalid project for tenant".to_string())
            })?;

        info!(tenant_id = %tenant_id, entity_id = %task.id, project_id = %project_id, "Task created");

        self.audit
            .record_for(ctx, AuditAction::Create, EntityType::Task, task.id)
            .await;

        Ok(task)
    }

    pub async fn update_task(
        &self,
        ctx: &RequestContext,
        task_id: Uuid,
        mut patch: UpdateTask,
    ) -> CoreResult<Task> {
        require(&ctx.principal, Action::WriteTasks)?;
        patch.normalize();
        patch.validate()?;
        ensure_live_actor(self.store.as_ref(), &ctx.principal).await?;

        let tenant_id = scope_to_tenant(&ctx.principal);
        self.ensure_assignee_in_tenant(tenant_id, patch.new_assignee())
            .await?;

        let task = self
            .store
            .update_task(tenant_id, task_id, patch)
            .await?
            .ok_or_else(|| CoreError::not_found("Task"))?;

        self.audit
            .record_for(ctx, AuditAction::Update, EntityType::Task, task.id)
            .await;

        Ok(task)
    }

    /// Moves a task to another status column
    pub async fn update_task_status(
        &self,
        ctx: &RequestContext,
        task_id: Uuid,
        request: UpdateTaskStatus,
    ) -> CoreResult<Task> {
        let patch = UpdateTask {
            status: Some(request.status),
            ..Default::default()
        };

        self.update_task(ctx, task_id, patch).await
    }

    pub async fn delete_task(&self, ctx: &RequestContext, task_id: Uuid) -> CoreResult<()> {
        require(&ctx.principal, Action::WriteTasks)?;
        ensure_live_actor(self.store.as_ref(), &ctx.principal).await?;

        let tenant_id = scope_to_tenant(&ctx.principal);
        if !self.store.delete_task(tenant_id, task_id).await? {
            return Err(CoreError::not_found("Task"));
        }

        info!(tenant_id = %tenant_id, entity_id = %task_id, "Task deleted");

        self.audit
            .record_for(ctx, AuditAction::Delete, EntityType::Task, task_id)
            .await;

        Ok(())
    }
}
