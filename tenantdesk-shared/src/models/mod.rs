/// Domain models for TenantDesk
///
/// This module contains the persisted entities, their request payloads and
/// the PostgreSQL operations behind them.
///
/// # Models
///
/// - `tenant`: Customer organizations, subscription plans and limits
/// - `user`: Accounts owned by exactly one tenant, with roles
/// - `project`: Tenant-owned projects
/// - `task`: Tasks owned by a project of the same tenant
/// - `audit`: Append-only audit trail of mutations
/// - `revoked_token`: Session token blocklist used by logout
///
/// Every tenant-owned query takes the tenant ID as an explicit argument and
/// filters on it; an entity ID alone never reaches the database.
///
/// # Example
///
/// ```no_run
/// use tenantdesk_shared::models::project::{NewProject, Project, ProjectStatus};
/// use tenantdesk_shared::db::pool::{create_pool, DatabaseConfig};
/// use uuid::Uuid;
///
/// # async fn example(tenant_id: Uuid, user_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let project = Project::create_within_quota(&pool, NewProject {
///     tenant_id,
///     name: "Website relaunch".to_string(),
///     description: None,
///     status: ProjectStatus::Active,
///     created_by: Some(user_id),
/// }).await?;
/// # Ok(())
/// # }
/// ```

pub mod audit;
pub mod project;
pub mod revoked_token;
pub mod task;
pub mod tenant;
pub mod user;

use serde::{Deserialize, Deserializer};

/// Deserializes a field that distinguishes "absent" from "explicit null"
///
/// Used with `#[serde(default, deserialize_with = "double_option")]` on
/// `Option<Option<T>>` patch fields: a missing key stays `None`, `null`
/// becomes `Some(None)` (clear the column) and a value becomes `Some(Some(v))`.
pub(crate) fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
