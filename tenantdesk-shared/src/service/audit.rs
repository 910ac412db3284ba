/// Audit recorder
///
/// Appends one entry per successful mutation. Recording is best-effort: a
/// failed append is logged and dropped, the mutation that triggered it has
/// already happened and still succeeds.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use tenantdesk_shared::models::audit::{AuditAction, EntityType, NewAuditEntry};
/// use tenantdesk_shared::service::audit::AuditRecorder;
/// use tenantdesk_shared::store::MemoryStore;
/// use uuid::Uuid;
///
/// # async fn example(tenant_id: Uuid, user_id: Uuid, project_id: Uuid) {
/// let recorder = AuditRecorder::new(Arc::new(MemoryStore::new()));
///
/// recorder
///     .record(NewAuditEntry {
///         tenant_id,
///         user_id: Some(user_id),
///         action: AuditAction::Create,
///         entity_type: EntityType::Project,
///         entity_id: project_id,
///         ip_address: Some("203.0.113.7".to_string()),
///     })
///     .await;
/// # }
/// ```

use std::sync::Arc;

use tracing::{debug, warn};
use uuid::Uuid;

use crate::auth::authorization::{require, scope_to_tenant, Action};
use crate::auth::guard::{Principal, RequestContext};
use crate::error::CoreResult;
use crate::models::audit::{AuditAction, AuditLogEntry, EntityType, NewAuditEntry};
use crate::store::AuditRepository;

/// Entries returned when the caller gives no limit
pub const DEFAULT_AUDIT_PAGE: i64 = 100;

/// Upper bound on a single audit listing
pub const MAX_AUDIT_PAGE: i64 = 500;

#[derive(Clone)]
pub struct AuditRecorder {
    repo: Arc<dyn AuditRepository>,
}

impl AuditRecorder {
    pub fn new(repo: Arc<dyn AuditRepository>) -> Self {
        Self { repo }
    }

    /// Appends an entry, swallowing any failure
    pub async fn record(&self, entry: NewAuditEntry) {
        match self.repo.append_audit_entry(&entry).await {
            Ok(()) => debug!(
                tenant_id = %entry.tenant_id,
                entity_id = %entry.entity_id,
                action = ?entry.action,
                entity_type = ?entry.entity_type,
                "Audit entry recorded"
            ),
            Err(e) => warn!(
                error = %e,
                tenant_id = %entry.tenant_id,
                entity_id = %entry.entity_id,
                action = ?entry.action,
                entity_type = ?entry.entity_type,
                "Failed to record audit entry"
            ),
        }
    }

    /// Records a mutation performed by the request's principal in its tenant
    pub async fn record_for(
        &self,
        ctx: &RequestContext,
        action: AuditAction,
        entity_type: EntityType,
        entity_id: Uuid,
    ) {
        self.record(NewAuditEntry {
            tenant_id: ctx.principal.tenant_id,
            user_id: Some(ctx.principal.user_id),
            action,
            entity_type,
            entity_id,
            ip_address: ctx.source_addr.clone(),
        })
        .await;
    }

    /// Audit trail of the principal's tenant, newest first
    ///
    /// `limit` defaults to [`DEFAULT_AUDIT_PAGE`] and is clamped to
    /// `1..=MAX_AUDIT_PAGE`.
    pub async fn list(
        &self,
        principal: &Principal,
        limit: Option<i64>,
    ) -> CoreResult<Vec<AuditLogEntry>> {
        require(principal, Action::ViewAuditLog)?;

        let limit = limit.unwrap_or(DEFAULT_AUDIT_PAGE).clamp(1, MAX_AUDIT_PAGE);
        let entries = self
            .repo
            .list_audit_entries(scope_to_tenant(principal), limit)
            .await?;

        Ok(entries)
    }
}
