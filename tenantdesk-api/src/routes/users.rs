/// User management endpoints
///
/// # Endpoints
///
/// - `GET /api/tenants/:tenant_id/users` - Users of the caller's tenant, oldest first
/// - `POST /api/tenants/:tenant_id/users` - Add a user (`tenant_admin`, counts against quota)
/// - `PUT /api/users/:user_id` - Change name, role or active flag (`tenant_admin`)
/// - `DELETE /api/users/:user_id` - Remove a user (`tenant_admin`, never oneself)
///
/// Password hashes are never part of a response.

use crate::{app::AppState, error::ApiResult, extract::{ApiJson, ApiPath}, response::ApiResponse};
use axum::{
    extract::State,
    http::StatusCode,
    Extension, Json,
};
use serde::Serialize;
use tenantdesk_shared::{
    auth::RequestContext,
    models::user::{CreateUserRequest, UpdateUser, User},
};
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct UserListResponse {
    pub users: Vec<User>,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: User,
}

pub async fn list_users(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    ApiPath(tenant_id): ApiPath<Uuid>,
) -> ApiResult<Json<ApiResponse<UserListResponse>>> {
    let users = state
        .services
        .users
        .list_users(&ctx.principal, tenant_id)
        .await?;

    Ok(ApiResponse::ok(UserListResponse { users }))
}

pub async fn create_user(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    ApiPath(tenant_id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<UserResponse>>)> {
    let user = state
        .services
        .users
        .create_user(&ctx, tenant_id, request)
        .await?;

    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message(UserResponse { user }, "User created successfully"),
    ))
}

pub async fn update_user(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    ApiPath(user_id): ApiPath<Uuid>,
    ApiJson(patch): ApiJson<UpdateUser>,
) -> ApiResult<Json<ApiResponse<UserResponse>>> {
    let user = state.services.users.update_user(&ctx, user_id, patch).await?;

    Ok(ApiResponse::with_message(
        UserResponse { user },
        "User updated successfully",
    ))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    ApiPath(user_id): ApiPath<Uuid>,
) -> ApiResult<Json<ApiResponse<()>>> {
    state.services.users.delete_user(&ctx, user_id).await?;

    Ok(ApiResponse::message("User deleted successfully"))
}
