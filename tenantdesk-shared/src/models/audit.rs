/// Audit log model
///
/// Append-only record of every mutation. Rows are inserted and read, never
/// updated or deleted.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE audit_action AS ENUM ('CREATE', 'UPDATE', 'DELETE');
/// CREATE TYPE audit_entity AS ENUM ('tenant', 'user', 'project', 'task');
///
/// CREATE TABLE audit_logs (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     tenant_id UUID NOT NULL,
///     user_id UUID,
///     action audit_action NOT NULL,
///     entity_type audit_entity NOT NULL,
///     entity_id UUID NOT NULL,
///     ip_address VARCHAR(64),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "audit_action", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "audit_entity", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Tenant,
    User,
    Project,
    Task,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AuditLogEntry {
    pub id: Uuid,
    pub tenant_id: Uuid,
    /// Acting user, None for system-initiated changes
    pub user_id: Option<Uuid>,
    pub action: AuditAction,
    pub entity_type: EntityType,
    pub entity_id: Uuid,
    /// Source address of the triggering request
    pub ip_address: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Store input for a new audit row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAuditEntry {
    pub tenant_id: Uuid,
    pub user_id: Option<Uuid>,
    pub action: AuditAction,
    pub entity_type: EntityType,
    pub entity_id: Uuid,
    pub ip_address: Option<String>,
}

impl AuditLogEntry {
    pub async fn append(pool: &PgPool, entry: &NewAuditEntry) -> Result<Self, sqlx::Error> {
        let row = sqlx::query_as::<_, AuditLogEntry>(
            r#"
            INSERT INTO audit_logs (tenant_id, user_id, action, entity_type, entity_id, ip_address)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, tenant_id, user_id, action, entity_type, entity_id, ip_address, created_at
            "#,
        )
        .bind(entry.tenant_id)
        .bind(entry.user_id)
        .bind(entry.action)
        .bind(entry.entity_type)
        .bind(entry.entity_id)
        .bind(&entry.ip_address)
        .fetch_one(pool)
        .await?;

        Ok(row)
    }

    /// Most recent entries of a tenant, newest first
    pub async fn list_by_tenant(
        pool: &PgPool,
        tenant_id: Uuid,
        limit: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let rows = sqlx::query_as::<_, AuditLogEntry>(
            r#"
            SELECT id, tenant_id, user_id, action, entity_type, entity_id, ip_address, created_at
            FROM audit_logs
            WHERE tenant_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(tenant_id)
        .bind(limit)
        .fetch_all(pool)
        .await?;

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audit_action_wire_format() {
        assert_eq!(serde_json::to_string(&AuditAction::Create).unwrap(), "\"CREATE\"");
        assert_eq!(serde_json::to_string(&EntityType::Project).unwrap(), "\"project\"");
    }
}
