/// Task model and database operations
///
/// Tasks belong to a project and redundantly carry the project's tenant ID,
/// so every read and write can be scoped without a join.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_status AS ENUM ('todo', 'in_progress', 'done');
/// CREATE TYPE task_priority AS ENUM ('low', 'medium', 'high');
///
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     tenant_id UUID NOT NULL REFERENCES tenants(id) ON DELETE CASCADE,
///     project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     title VARCHAR(255) NOT NULL,
///     description TEXT,
///     status task_status NOT NULL DEFAULT 'todo',
///     priority task_priority NOT NULL DEFAULT 'medium',
///     due_date DATE,
///     created_by UUID REFERENCES users(id) ON DELETE SET NULL,
///     assigned_to UUID REFERENCES users(id) ON DELETE SET NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Cross-tenant protection
///
/// [`Task::create`] inserts through `INSERT ... SELECT FROM projects WHERE
/// id = $project AND tenant_id = $tenant`, so a project ID from another
/// tenant yields no row rather than a misplaced task.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use super::double_option;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

fn default_status() -> TaskStatus {
    TaskStatus::Todo
}

fn default_priority() -> TaskPriority {
    TaskPriority::Medium
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub project_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: Option<NaiveDate>,
    pub created_by: Option<Uuid>,
    pub assigned_to: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Store input for a new task row
#[derive(Debug, Clone)]
pub struct NewTask {
    pub tenant_id: Uuid,
    pub project_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: Option<NaiveDate>,
    pub created_by: Option<Uuid>,
    pub assigned_to: Option<Uuid>,
}

/// Payload for creating a task in a project
///
/// ```json
/// { "title": "Draft copy", "priority": "high", "due_date": "2026-11-01" }
/// ```
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTask {
    #[validate(length(min = 1, max = 255, message = "Task title is required"))]
    pub title: String,

    pub description: Option<String>,

    #[serde(default = "default_status")]
    pub status: TaskStatus,

    #[serde(default = "default_priority")]
    pub priority: TaskPriority,

    pub due_date: Option<NaiveDate>,

    /// Must be a user of the acting tenant
    pub assigned_to: Option<Uuid>,
}

/// Partial task update
///
/// Nullable columns use `Option<Option<_>>`: `null` clears, absent keeps.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateTask {
    #[validate(length(min = 1, max = 255, message = "Task title must not be empty"))]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,

    pub status: Option<TaskStatus>,

    pub priority: Option<TaskPriority>,

    #[serde(default, deserialize_with = "double_option")]
    pub due_date: Option<Option<NaiveDate>>,

    #[serde(default, deserialize_with = "double_option")]
    pub assigned_to: Option<Option<Uuid>>,
}

impl UpdateTask {
    /// Trims the new title so blank values fail validation
    pub fn normalize(&mut self) {
        if let Some(title) = self.title.as_mut() {
            *title = title.trim().to_string();
        }
    }

    /// The assignee this update introduces, if any
    pub fn new_assignee(&self) -> Option<Uuid> {
        self.assigned_to.flatten()
    }
}

/// Status-only update used by board drag-and-drop
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateTaskStatus {
    pub status: TaskStatus,
}

/// Listing filter
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub assigned_to: Option<Uuid>,
}

const TASK_COLUMNS: &str = "id, tenant_id, project_id, title, description, status, priority, due_date, created_by, assigned_to, created_at, updated_at";

impl Task {
    /// Creates a task in a project of the given tenant
    ///
    /// # Returns
    ///
    /// The new task, or None if the project doesn't exist in `data.tenant_id`
    /// (nothing is inserted in that case)
    pub async fn create(pool: &PgPool, data: NewTask) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(&format!(
            r#"
            INSERT INTO tasks
                (tenant_id, project_id, title, description, status, priority,
                 due_date, created_by, assigned_to)
            SELECT p.tenant_id, p.id, $3::text, $4::text, $5::task_status,
                   $6::task_priority, $7::date, $8::uuid, $9::uuid
            FROM projects p
            WHERE p.id = $2 AND p.tenant_id = $1
            RETURNING {TASK_COLUMNS}
            "#
        ))
        .bind(data.tenant_id)
        .bind(data.project_id)
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.status)
        .bind(data.priority)
        .bind(data.due_date)
        .bind(data.created_by)
        .bind(data.assigned_to)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    pub async fn find_by_id(
        pool: &PgPool,
        tenant_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1 AND tenant_id = $2"
        ))
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Lists a project's tasks, newest first
    pub async fn list_by_project(
        pool: &PgPool,
        tenant_id: Uuid,
        project_id: Uuid,
        filter: &TaskFilter,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            r#"
            SELECT {TASK_COLUMNS}
            FROM tasks
            WHERE tenant_id = $1
              AND project_id = $2
              AND ($3::task_status IS NULL OR status = $3)
              AND ($4::task_priority IS NULL OR priority = $4)
              AND ($5::uuid IS NULL OR assigned_to = $5)
            ORDER BY created_at DESC
            "#
        ))
        .bind(tenant_id)
        .bind(project_id)
        .bind(filter.status)
        .bind(filter.priority)
        .bind(filter.assigned_to)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Updates a task within a tenant
    ///
    /// # Returns
    ///
    /// The updated task, or None if no such task exists in the tenant
    pub async fn update(
        pool: &PgPool,
        tenant_id: Uuid,
        id: Uuid,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE tasks SET updated_at = NOW()");
        let mut bind_count = 2;

        if data.title.is_some() {
            bind_count += 1;
            query.push_str(&format!(", title = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }
        if data.status.is_some() {
            bind_count += 1;
            query.push_str(&format!(", status = ${}", bind_count));
        }
        if data.priority.is_some() {
            bind_count += 1;
            query.push_str(&format!(", priority = ${}", bind_count));
        }
        if data.due_date.is_some() {
            bind_count += 1;
            query.push_str(&format!(", due_date = ${}", bind_count));
        }
        if data.assigned_to.is_some() {
            bind_count += 1;
            query.push_str(&format!(", assigned_to = ${}", bind_count));
        }

        query.push_str(&format!(
            " WHERE id = $1 AND tenant_id = $2 RETURNING {TASK_COLUMNS}"
        ));

        let mut q = sqlx::query_as::<_, Task>(&query).bind(id).bind(tenant_id);

        if let Some(title) = data.title {
            q = q.bind(title);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(status) = data.status {
            q = q.bind(status);
        }
        if let Some(priority) = data.priority {
            q = q.bind(priority);
        }
        if let Some(due_date) = data.due_date {
            q = q.bind(due_date);
        }
        if let Some(assigned_to) = data.assigned_to {
            q = q.bind(assigned_to);
        }

        let task = q.fetch_optional(pool).await?;

        Ok(task)
    }

    pub async fn delete(pool: &PgPool, tenant_id: Uuid, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND tenant_id = $2")
            .bind(id)
            .bind(tenant_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
