/// Project model and database operations
///
/// # Schema
///
/// ```sql
/// CREATE TYPE project_status AS ENUM ('active', 'completed', 'archived');
///
/// CREATE TABLE projects (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     tenant_id UUID NOT NULL REFERENCES tenants(id) ON DELETE CASCADE,
///     name VARCHAR(255) NOT NULL,
///     description TEXT,
///     status project_status NOT NULL DEFAULT 'active',
///     created_by UUID REFERENCES users(id) ON DELETE SET NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// Every query filters by `tenant_id`; a project ID from another tenant
/// behaves exactly like a missing one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;
use validator::Validate;

use super::double_option;
use crate::quota::{self, QuotaError, QuotaType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "project_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    Active,
    Completed,
    Archived,
}

fn default_status() -> ProjectStatus {
    ProjectStatus::Active
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Project {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub status: ProjectStatus,
    /// Creator, None once the creating user is deleted
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Store input for a new project row
#[derive(Debug, Clone)]
pub struct NewProject {
    pub tenant_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub status: ProjectStatus,
    pub created_by: Option<Uuid>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateProject {
    #[validate(length(min = 1, max = 255, message = "Project name is required"))]
    pub name: String,

    pub description: Option<String>,

    #[serde(default = "default_status")]
    pub status: ProjectStatus,
}

/// Partial project update
///
/// `description: null` clears the description, a missing key leaves it alone.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateProject {
    #[validate(length(min = 1, max = 255, message = "Project name must not be empty"))]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,

    pub status: Option<ProjectStatus>,
}

impl UpdateProject {
    /// Trims the new name so blank values fail validation
    pub fn normalize(&mut self) {
        if let Some(name) = self.name.as_mut() {
            *name = name.trim().to_string();
        }
    }
}

/// Listing filter
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectFilter {
    pub status: Option<ProjectStatus>,
}

const PROJECT_COLUMNS: &str =
    "id, tenant_id, name, description, status, created_by, created_at, updated_at";

impl Project {
    async fn insert(conn: &mut PgConnection, data: &NewProject) -> Result<Self, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(&format!(
            r#"
            INSERT INTO projects (tenant_id, name, description, status, created_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {PROJECT_COLUMNS}
            "#
        ))
        .bind(data.tenant_id)
        .bind(&data.name)
        .bind(&data.description)
        .bind(data.status)
        .bind(data.created_by)
        .fetch_one(conn)
        .await?;

        Ok(project)
    }

    /// Creates a project if the tenant has room under `max_projects`
    ///
    /// Locks the tenant row for the count and insert, see
    /// [`crate::models::user::User::create_within_quota`].
    pub async fn create_within_quota(pool: &PgPool, data: NewProject) -> Result<Self, QuotaError> {
        let mut tx = pool.begin().await?;

        let max_projects: Option<i32> =
            sqlx::query_scalar("SELECT max_projects FROM tenants WHERE id = $1 FOR UPDATE")
                .bind(data.tenant_id)
                .fetch_optional(&mut *tx)
                .await?;
        let max_projects = max_projects.ok_or(QuotaError::TenantNotFound(data.tenant_id))?;

        let current: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM projects WHERE tenant_id = $1")
                .bind(data.tenant_id)
                .fetch_one(&mut *tx)
                .await?;

        quota::enforce(QuotaType::Projects, current, max_projects)?;

        let project = Project::insert(&mut tx, &data).await?;
        tx.commit().await?;

        Ok(project)
    }

    pub async fn find_by_id(
        pool: &PgPool,
        tenant_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1 AND tenant_id = $2"
        ))
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(pool)
        .await?;

        Ok(project)
    }

    /// Lists a tenant's projects, newest first
    pub async fn list_by_tenant(
        pool: &PgPool,
        tenant_id: Uuid,
        filter: &ProjectFilter,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let projects = sqlx::query_as::<_, Project>(&format!(
            r#"
            SELECT {PROJECT_COLUMNS}
            FROM projects
            WHERE tenant_id = $1 AND ($2::project_status IS NULL OR status = $2)
            ORDER BY created_at DESC
            "#
        ))
        .bind(tenant_id)
        .bind(filter.status)
        .fetch_all(pool)
        .await?;

        Ok(projects)
    }

    /// Updates a project within a tenant
    ///
    /// # Returns
    ///
    /// The updated project, or None if no such project exists in the tenant
    pub async fn update(
        pool: &PgPool,
        tenant_id: Uuid,
        id: Uuid,
        data: UpdateProject,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE projects SET updated_at = NOW()");
        let mut bind_count = 2;

        if data.name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", name = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }
        if data.status.is_some() {
            bind_count += 1;
            query.push_str(&format!(", status = ${}", bind_count));
        }

        query.push_str(&format!(
            " WHERE id = $1 AND tenant_id = $2 RETURNING {PROJECT_COLUMNS}"
        ));

        let mut q = sqlx::query_as::<_, Project>(&query).bind(id).bind(tenant_id);

        if let Some(name) = data.name {
            q = q.bind(name);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(status) = data.status {
            q = q.bind(status);
        }

        let project = q.fetch_optional(pool).await?;

        Ok(project)
    }

    /// Deletes a project and, through the foreign key, its tasks
    pub async fn delete(pool: &PgPool, tenant_id: Uuid, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1 AND tenant_id = $2")
            .bind(id)
            .bind(tenant_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn count_by_tenant(pool: &PgPool, tenant_id: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM projects WHERE tenant_id = $1")
                .bind(tenant_id)
                .fetch_one(pool)
                .await?;

        Ok(count)
    }
}
