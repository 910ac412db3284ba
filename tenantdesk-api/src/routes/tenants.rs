/// Tenant endpoints
///
/// # Endpoints
///
/// - `GET /api/tenants` - All tenants (`super_admin` only)
/// - `GET /api/tenants/:tenant_id` - Own tenant with usage against limits
/// - `PUT /api/tenants/:tenant_id` - Rename or change status
///
/// A `tenant_id` other than the caller's own answers 404.

use crate::{app::AppState, error::ApiResult, extract::{ApiJson, ApiPath}, response::ApiResponse};
use axum::{
    extract::State,
    Extension, Json,
};
use serde::Serialize;
use tenantdesk_shared::{
    auth::RequestContext,
    models::tenant::{Tenant, UpdateTenant},
    service::registry::TenantDetails,
};
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct TenantListResponse {
    pub tenants: Vec<Tenant>,
}

#[derive(Debug, Serialize)]
pub struct TenantResponse {
    pub tenant: Tenant,
}

pub async fn list_tenants(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
) -> ApiResult<Json<ApiResponse<TenantListResponse>>> {
    let tenants = state.services.registry.list_all(&ctx.principal).await?;

    Ok(ApiResponse::ok(TenantListResponse { tenants }))
}

/// Tenant details handler
///
/// ```json
/// {
///   "success": true,
///   "data": {
///     "tenant": { "id": "…", "subdomain": "acme", "max_projects": 3, … },
///     "usage": { "projects": { "current": 1, "limit": 3, "remaining": 2, … }, … }
///   }
/// }
/// ```
pub async fn get_tenant(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    ApiPath(tenant_id): ApiPath<Uuid>,
) -> ApiResult<Json<ApiResponse<TenantDetails>>> {
    let details = state
        .services
        .registry
        .get_tenant(&ctx.principal, tenant_id)
        .await?;

    Ok(ApiResponse::ok(details))
}

pub async fn update_tenant(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    ApiPath(tenant_id): ApiPath<Uuid>,
    ApiJson(patch): ApiJson<UpdateTenant>,
) -> ApiResult<Json<ApiResponse<TenantResponse>>> {
    let tenant = state
        .services
        .registry
        .update_tenant(&ctx, tenant_id, patch)
        .await?;

    Ok(ApiResponse::with_message(
        TenantResponse { tenant },
        "Tenant updated successfully",
    ))
}
