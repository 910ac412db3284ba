/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /api/auth/register-tenant` - Create a tenant and its first admin
/// - `POST /api/auth/login` - Exchange credentials for a session token
/// - `GET /api/auth/me` - Profile of the authenticated user
/// - `POST /api/auth/logout` - Revoke the presented token
///
/// # Login
///
/// ```json
/// POST /api/auth/login
/// { "email": "ada@acme.test", "password": "correct horse", "tenantSubdomain": "acme" }
/// ```
///
/// ```json
/// {
///   "success": true,
///   "data": { "user": { "id": "…", "tenant": { "subdomain": "acme", … } }, "token": "eyJ…", "expiresIn": 86400 },
///   "message": "Login successful"
/// }
/// ```

use crate::{
    app::AppState,
    error::ApiResult,
    extract::{ApiJson, ClientAddr},
    response::ApiResponse,
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::Serialize;
use tenantdesk_shared::{
    auth::RequestContext,
    models::{
        tenant::{RegisterTenant, Tenant},
        user::{LoginRequest, User, UserProfile},
    },
    service::session::LoginResult,
};

/// Registration response data
#[derive(Debug, Serialize)]
pub struct RegisterTenantResponse {
    pub tenant: Tenant,

    /// The tenant's first administrator
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct CurrentUserResponse {
    pub user: UserProfile,
}

/// Register handler
///
/// Creates the tenant on the free plan together with a `tenant_admin` user.
/// Both rows are written atomically; a taken subdomain yields 409.
pub async fn register_tenant(
    State(state): State<AppState>,
    ClientAddr(source_addr): ClientAddr,
    ApiJson(request): ApiJson<RegisterTenant>,
) -> ApiResult<(StatusCode, Json<ApiResponse<RegisterTenantResponse>>)> {
    let registration = state
        .services
        .registry
        .register_tenant(request, source_addr)
        .await?;

    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message(
            RegisterTenantResponse {
                tenant: registration.tenant,
                user: registration.admin,
            },
            "Tenant registered successfully",
        ),
    ))
}

/// Login handler
pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> ApiResult<Json<ApiResponse<LoginResult>>> {
    let result = state.services.sessions.login(request).await?;

    Ok(ApiResponse::with_message(result, "Login successful"))
}

pub async fn me(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
) -> ApiResult<Json<ApiResponse<CurrentUserResponse>>> {
    let user = state.services.sessions.current_user(&ctx.principal).await?;

    Ok(ApiResponse::ok(CurrentUserResponse { user }))
}

/// Logout handler
///
/// The token stays revoked until its natural expiry.
pub async fn logout(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
) -> ApiResult<Json<ApiResponse<()>>> {
    state.services.sessions.logout(&ctx.principal).await?;

    Ok(ApiResponse::message("Logged out successfully"))
}
