/// Tenant-scoped projects
///
/// Every call filters by the principal's tenant. A project ID from another
/// tenant behaves exactly like an unknown ID (`NotFound`). Creation is
/// capped by the tenant's `max_projects`.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;
use validator::Validate;

use super::audit::AuditRecorder;
use super::ensure_live_actor;
use crate::auth::authorization::{require, scope_to_tenant, Action};
use crate::auth::guard::{Principal, RequestContext};
use crate::error::{CoreError, CoreResult};
use crate::models::audit::{AuditAction, EntityType};
use crate::models::project::{CreateProject, NewProject, Project, ProjectFilter, UpdateProject};
use crate::store::Store;

#[derive(Clone)]
pub struct ProjectService {
    store: Arc<dyn Store>,
    audit: AuditRecorder,
}

impl ProjectService {
    pub fn new(store: Arc<dyn Store>, audit: AuditRecorder) -> Self {
        Self { store, audit }
    }

    /// Projects of the principal's tenant, newest first
    pub async fn list_projects(
        &self,
        principal: &Principal,
        filter: &ProjectFilter,
    ) -> CoreResult<Vec<Project>> {
        require(principal, Action::ReadProjects)?;

        Ok(self
            .store
            .list_projects(scope_to_tenant(principal), filter)
            .await?)
    }

    pub async fn get_project(&self, principal: &Principal, project_id: Uuid) -> CoreResult<Project> {
        require(principal, Action::ReadProjects)?;

        self.store
            .find_project(scope_to_tenant(principal), project_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Project"))
    }

    /// Creates a project unless the tenant is at `max_projects`
    pub async fn create_project(
        &self,
        ctx: &RequestContext,
        mut request: CreateProject,
    ) -> CoreResult<Project> {
        require(&ctx.principal, Action::WriteProjects)?;
        request.name = request.name.trim().to_string();
        request.validate()?;
        ensure_live_actor(self.store.as_ref(), &ctx.principal).await?;

        let tenant_id = scope_to_tenant(&ctx.principal);
        let project = self
            .store
            .create_project_within_quota(NewProject {
                tenant_id,
                name: request.name,
                description: request.description,
                status: request.status,
                created_by: Some(ctx.principal.user_id),
            })
            .await
            .map_err(|e| {
                info!(tenant_id = %tenant_id, error = %e, "Project creation rejected");
                CoreError::from(e)
            })?;

        info!(tenant_id = %tenant_id, entity_id = %project.id, "Project created");

        self.audit
            .record_for(ctx, AuditAction::Create, EntityType::Project, project.id)
            .await;

        Ok(project)
    }

    pub async fn update_project(
        &self,
        ctx: &RequestContext,
        project_id: Uuid,
        mut patch: UpdateProject,
    ) -> CoreResult<Project> {
        require(&ctx.principal, Action::WriteProjects)?;
        patch.normalize();
        patch.validate()?;
        ensure_live_actor(self.store.as_ref(), &ctx.principal).await?;

        let project = self
            .store
            .update_project(scope_to_tenant(&ctx.principal), project_id, patch)
            .await?
            .ok_or_else(|| CoreError::not_found("Project"))?;

        self.audit
            .record_for(ctx, AuditAction::Update, EntityType::Project, project.id)
            .await;

        Ok(project)
    }

    /// Deletes a project and its tasks
    pub async fn delete_project(&self, ctx: &RequestContext, project_id: Uuid) -> CoreResult<()> {
        require(&ctx.principal, Action::WriteProjects)?;
        ensure_live_actor(self.store.as_ref(), &ctx.principal).await?;

        let tenant_id = scope_to_tenant(&ctx.principal);
        if !self.store.delete_project(tenant_id, project_id).await? {
            return Err(CoreError::not_found("Project"));
        }

        info!(tenant_id = %tenant_id, entity_id = %project_id, "Project deleted");

        self.audit
            .record_for(ctx, AuditAction::Delete, EntityType::Project, project_id)
            .await;

        Ok(())
    }
}
