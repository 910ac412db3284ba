/// Task endpoints
///
/// # Endpoints
///
/// - `GET /api/projects/:project_id/tasks?status=todo&priority=high&assigned_to=…`
/// - `POST /api/projects/:project_id/tasks` - Create a task in an own project
/// - `PUT /api/tasks/:task_id` - Partial update
/// - `PATCH /api/tasks/:task_id/status` - Status only, `{ "status": "done" }`
/// - `DELETE /api/tasks/:task_id`
///
/// Creating a task under another tenant's project answers 403, as does
/// assigning it to a user outside the tenant.

use crate::{app::AppState, error::ApiResult, extract::{ApiJson, ApiPath, ApiQuery}, response::ApiResponse};
use axum::{
    extract::State,
    http::StatusCode,
    Extension, Json,
};
use serde::Serialize;
use tenantdesk_shared::{
    auth::RequestContext,
    models::task::{CreateTask, Task, TaskFilter, UpdateTask, UpdateTaskStatus},
};
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct TaskListResponse {
    pub tasks: Vec<Task>,
}

#[derive(Debug, Serialize)]
pub struct TaskResponse {
    pub task: Task,
}

pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    ApiPath(project_id): ApiPath<Uuid>,
    ApiQuery(filter): ApiQuery<TaskFilter>,
) -> ApiResult<Json<ApiResponse<TaskListResponse>>> {
    let tasks = state
        .services
        .tasks
        .list_tasks(&ctx.principal, project_id, &filter)
        .await?;

    Ok(ApiResponse::ok(TaskListResponse { tasks }))
}

pub async fn create_task(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    ApiPath(project_id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<CreateTask>,
) -> ApiResult<(StatusCode, Json<ApiResponse<TaskResponse>>)> {
    let task = state
        .services
        .tasks
        .create_task(&ctx, project_id, request)
        .await?;

    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message(TaskResponse { task }, "Task created successfully"),
    ))
}

pub async fn update_task(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    ApiPath(task_id): ApiPath<Uuid>,
    ApiJson(patch): ApiJson<UpdateTask>,
) -> ApiResult<Json<ApiResponse<TaskResponse>>> {
    let task = state.services.tasks.update_task(&ctx, task_id, patch).await?;

    Ok(ApiResponse::with_message(
        TaskResponse { task },
        "Task updated successfully",
    ))
}

pub async fn update_task_status(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    ApiPath(task_id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<UpdateTaskStatus>,
) -> ApiResult<Json<ApiResponse<TaskResponse>>> {
    let task = state
        .services
        .tasks
        .update_task_status(&ctx, task_id, request)
        .await?;

    Ok(ApiResponse::ok(TaskResponse { task }))
}

pub async fn delete_task(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    ApiPath(task_id): ApiPath<Uuid>,
) -> ApiResult<Json<ApiResponse<()>>> {
    state.services.tasks.delete_task(&ctx, task_id).await?;

    Ok(ApiResponse::message("Task deleted successfully"))
}
