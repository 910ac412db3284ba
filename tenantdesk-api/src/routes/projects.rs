/// Project endpoints
///
/// # Endpoints
///
/// - `GET /api/projects?status=active` - Projects of the caller's tenant, newest first
/// - `POST /api/projects` - Create a project (counts against the project quota)
/// - `GET /api/projects/:project_id` - One project
/// - `PUT /api/projects/:project_id` - Partial update
/// - `DELETE /api/projects/:project_id` - Delete with its tasks
///
/// # Create
///
/// ```json
/// POST /api/projects
/// { "name": "Launch", "description": "Q4 launch plan" }
/// ```
///
/// Responds `201 Created` with `data.project`, `403` once the tenant's
/// `max_projects` is reached. A project of another tenant is reported as 404.

use crate::{app::AppState, error::ApiResult, extract::{ApiJson, ApiPath, ApiQuery}, response::ApiResponse};
use axum::{
    extract::State,
    http::StatusCode,
    Extension, Json,
};
use serde::Serialize;
use tenantdesk_shared::{
    auth::RequestContext,
    models::project::{CreateProject, Project, ProjectFilter, UpdateProject},
};
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct ProjectListResponse {
    pub projects: Vec<Project>,
}

#[derive(Debug, Serialize)]
pub struct ProjectResponse {
    pub project: Project,
}

pub async fn list_projects(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    ApiQuery(filter): ApiQuery<ProjectFilter>,
) -> ApiResult<Json<ApiResponse<ProjectListResponse>>> {
    let projects = state
        .services
        .projects
        .list_projects(&ctx.principal, &filter)
        .await?;

    Ok(ApiResponse::ok(ProjectListResponse { projects }))
}

pub async fn get_project(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    ApiPath(project_id): ApiPath<Uuid>,
) -> ApiResult<Json<ApiResponse<ProjectResponse>>> {
    let project = state
        .services
        .projects
        .get_project(&ctx.principal, project_id)
        .await?;

    Ok(ApiResponse::ok(ProjectResponse { project }))
}

pub async fn create_project(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    ApiJson(request): ApiJson<CreateProject>,
) -> ApiResult<(StatusCode, Json<ApiResponse<ProjectResponse>>)> {
    let project = state.services.projects.create_project(&ctx, request).await?;

    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message(ProjectResponse { project }, "Project created successfully"),
    ))
}

pub async fn update_project(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    ApiPath(project_id): ApiPath<Uuid>,
    ApiJson(patch): ApiJson<UpdateProject>,
) -> ApiResult<Json<ApiResponse<ProjectResponse>>> {
    let project = state
        .services
        .projects
        .update_project(&ctx, project_id, patch)
        .await?;

    Ok(ApiResponse::with_message(
        ProjectResponse { project },
        "Project updated successfully",
    ))
}

pub async fn delete_project(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    ApiPath(project_id): ApiPath<Uuid>,
) -> ApiResult<Json<ApiResponse<()>>> {
    state.services.projects.delete_project(&ctx, project_id).await?;

    Ok(ApiResponse::message("Project deleted successfully"))
}
