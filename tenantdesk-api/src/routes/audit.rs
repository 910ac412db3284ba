/// Audit trail endpoint
///
/// ```text
/// GET /api/audit-logs?limit=50
/// ```
///
/// Newest entries of the caller's tenant first. `tenant_admin` only; `limit`
/// defaults to 100 and is clamped to 1..=500.

use crate::{app::AppState, error::ApiResult, extract::ApiQuery, response::ApiResponse};
use axum::{
    extract::State,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use tenantdesk_shared::{auth::RequestContext, models::audit::AuditLogEntry};

#[derive(Debug, Default, Deserialize)]
pub struct AuditLogQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct AuditLogResponse {
    pub logs: Vec<AuditLogEntry>,
}

pub async fn list_audit_logs(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    ApiQuery(query): ApiQuery<AuditLogQuery>,
) -> ApiResult<Json<ApiResponse<AuditLogResponse>>> {
    let logs = state
        .services
        .audit
        .list(&ctx.principal, query.limit)
        .await?;

    Ok(ApiResponse::ok(AuditLogResponse { logs }))
}
