/// Tenant model and database operations
///
/// This module provides the Tenant model, the unit of data partitioning.
/// Every user, project and task belongs to exactly one tenant.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE tenant_status AS ENUM ('active', 'inactive');
/// CREATE TYPE subscription_plan AS ENUM ('free', 'pro', 'enterprise');
///
/// CREATE TABLE tenants (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL,
///     subdomain VARCHAR(63) NOT NULL,
///     status tenant_status NOT NULL DEFAULT 'active',
///     subscription_plan subscription_plan NOT NULL DEFAULT 'free',
///     max_users INTEGER NOT NULL DEFAULT 3,
///     max_projects INTEGER NOT NULL DEFAULT 3,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     CONSTRAINT tenants_subdomain_key UNIQUE (subdomain)
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use tenantdesk_shared::models::tenant::Tenant;
/// use tenantdesk_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// if let Some(tenant) = Tenant::find_by_subdomain(&pool, "acme").await? {
///     println!("{} is {:?}", tenant.name, tenant.status);
/// }
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::user::{NewUser, User};

/// Tenant lifecycle status
///
/// Inactive tenants keep their data but reject every login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "tenant_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TenantStatus {
    Active,
    Inactive,
}

/// Subscription plan types
///
/// Plans seed the tenant's `max_users` / `max_projects` at registration,
/// see [`crate::quota::QuotaLimits::for_plan`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "subscription_plan", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionPlan {
    /// Default plan for self-service registrations
    Free,

    Pro,

    Enterprise,
}

impl SubscriptionPlan {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionPlan::Free => "free",
            SubscriptionPlan::Pro => "pro",
            SubscriptionPlan::Enterprise => "enterprise",
        }
    }
}

/// Tenant model representing a customer organization
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Tenant {
    /// Unique tenant ID (UUID v4)
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// Globally unique login slug, immutable after registration
    pub subdomain: String,

    pub status: TenantStatus,

    pub subscription_plan: SubscriptionPlan,

    /// Maximum number of users (authoritative for quota checks)
    pub max_users: i32,

    /// Maximum number of projects (authoritative for quota checks)
    pub max_projects: i32,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Tenant {
    /// Whether logins are currently accepted
    pub fn is_active(&self) -> bool {
        self.status == TenantStatus::Active
    }

    /// Short form embedded in user profiles
    pub fn summary(&self) -> TenantSummary {
        TenantSummary {
            id: self.id,
            name: self.name.clone(),
            subdomain: self.subdomain.clone(),
        }
    }
}

/// Tenant identity shown alongside a user profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantSummary {
    pub id: Uuid,
    pub name: String,
    pub subdomain: String,
}

/// Store input for a new tenant row
#[derive(Debug, Clone)]
pub struct NewTenant {
    pub name: String,
    pub subdomain: String,
    pub plan: SubscriptionPlan,
    pub max_users: i32,
    pub max_projects: i32,
}

/// Self-service registration payload
///
/// Creates the tenant and its first `tenant_admin` user in one step.
///
/// ```json
/// {
///   "tenantName": "Acme Corp",
///   "subdomain": "acme",
///   "adminEmail": "admin@acme.test",
///   "adminPassword": "correct horse",
///   "adminFullName": "Ada Admin"
/// }
/// ```
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterTenant {
    #[validate(length(min = 1, max = 255, message = "Tenant name is required"))]
    pub tenant_name: String,

    #[validate(custom(function = "validate_subdomain"))]
    pub subdomain: String,

    #[validate(email(message = "Invalid email format"))]
    pub admin_email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub admin_password: String,

    #[validate(length(min = 1, max = 255, message = "Full name is required"))]
    pub admin_full_name: String,
}

impl RegisterTenant {
    /// Trims names and lower-cases the login identifiers
    pub fn normalize(&mut self) {
        self.tenant_name = self.tenant_name.trim().to_string();
        self.subdomain = normalize_subdomain(&self.subdomain);
        self.admin_email = super::user::normalize_email(&self.admin_email);
        self.admin_full_name = self.admin_full_name.trim().to_string();
    }
}

/// Partial tenant update
///
/// Status transitions are not restricted; any value may replace any other.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateTenant {
    #[validate(length(min = 1, max = 255, message = "Tenant name must not be empty"))]
    pub name: Option<String>,

    pub status: Option<TenantStatus>,
}

impl UpdateTenant {
    /// Trims the new name so blank values fail validation
    pub fn normalize(&mut self) {
        if let Some(name) = self.name.as_mut() {
            *name = name.trim().to_string();
        }
    }
}

/// Canonical form of a subdomain: trimmed and lower-cased
pub fn normalize_subdomain(raw: &str) -> String {
    raw.trim().to_ascii_lowercase()
}

/// Validates a subdomain slug
///
/// 3 to 63 characters of `a-z`, `0-9` and `-`, not starting or ending with `-`.
pub fn validate_subdomain(subdomain: &str) -> Result<(), ValidationError> {
    let valid_chars = subdomain
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');

    if !(3..=63).contains(&subdomain.len())
        || !valid_chars
        || subdomain.starts_with('-')
        || subdomain.ends_with('-')
    {
        let mut err = ValidationError::new("subdomain");
        err.message = Some(
            "Subdomain must be 3-63 lowercase letters, digits or hyphens".into(),
        );
        return Err(err);
    }

    Ok(())
}

const TENANT_COLUMNS: &str = "id, name, subdomain, status, subscription_plan, max_users, max_projects, created_at, updated_at";

impl Tenant {
    /// Inserts a tenant row on an open connection or transaction
    ///
    /// # Errors
    ///
    /// Returns a unique violation on `tenants_subdomain_key` if the subdomain is taken
    pub async fn insert(conn: &mut PgConnection, data: &NewTenant) -> Result<Self, sqlx::Error> {
        let tenant = sqlx::query_as::<_, Tenant>(&format!(
            r#"
            INSERT INTO tenants (name, subdomain, subscription_plan, max_users, max_projects)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {TENANT_COLUMNS}
            "#
        ))
        .bind(&data.name)
        .bind(&data.subdomain)
        .bind(data.plan)
        .bind(data.max_users)
        .bind(data.max_projects)
        .fetch_one(conn)
        .await?;

        Ok(tenant)
    }

    /// Creates a tenant together with its first admin user
    ///
    /// Both rows are written in one transaction. If either insert fails the
    /// transaction is dropped without commit and nothing persists.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use tenantdesk_shared::models::tenant::{NewTenant, SubscriptionPlan, Tenant};
    /// # use tenantdesk_shared::models::user::{NewUser, Role};
    /// # use sqlx::PgPool;
    /// # use uuid::Uuid;
    /// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
    /// let (tenant, admin) = Tenant::create_with_admin(
    ///     &pool,
    ///     NewTenant {
    ///         name: "Acme Corp".to_string(),
    ///         subdomain: "acme".to_string(),
    ///         plan: SubscriptionPlan::Free,
    ///         max_users: 3,
    ///         max_projects: 3,
    ///     },
    ///     NewUser {
    ///         tenant_id: Uuid::nil(), // replaced by the new tenant's ID
    ///         email: "admin@acme.test".to_string(),
    ///         password_hash: "$argon2id$...".to_string(),
    ///         full_name: "Ada Admin".to_string(),
    ///         role: Role::TenantAdmin,
    ///         is_active: true,
    ///     },
    /// ).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn create_with_admin(
        pool: &PgPool,
        tenant: NewTenant,
        mut admin: NewUser,
    ) -> Result<(Self, User), sqlx::Error> {
        let mut tx = pool.begin().await?;

        let tenant = Tenant::insert(&mut tx, &tenant).await?;
        admin.tenant_id = tenant.id;
        let admin = User::insert(&mut tx, &admin).await?;

        tx.commit().await?;

        Ok((tenant, admin))
    }

    /// Finds a tenant by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let tenant = sqlx::query_as::<_, Tenant>(&format!(
            "SELECT {TENANT_COLUMNS} FROM tenants WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(tenant)
    }

    /// Finds a tenant by its (already normalized) subdomain
    pub async fn find_by_subdomain(
        pool: &PgPool,
        subdomain: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let tenant = sqlx::query_as::<_, Tenant>(&format!(
            "SELECT {TENANT_COLUMNS} FROM tenants WHERE subdomain = $1"
        ))
        .bind(subdomain)
        .fetch_optional(pool)
        .await?;

        Ok(tenant)
    }

    /// Updates an existing tenant
    ///
    /// Only non-None fields in `data` are written.
    ///
    /// # Returns
    ///
    /// The updated tenant, or None if it doesn't exist
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateTenant,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE tenants SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", name = ${}", bind_count));
        }
        if data.status.is_some() {
            bind_count += 1;
            query.push_str(&format!(", status = ${}", bind_count));
        }

        query.push_str(&format!(" WHERE id = $1 RETURNING {TENANT_COLUMNS}"));

        let mut q = sqlx::query_as::<_, Tenant>(&query).bind(id);

        if let Some(name) = data.name {
            q = q.bind(name);
        }
        if let Some(status) = data.status {
            q = q.bind(status);
        }

        let tenant = q.fetch_optional(pool).await?;

        Ok(tenant)
    }

    /// Lists all tenants, newest first
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let tenants = sqlx::query_as::<_, Tenant>(&format!(
            "SELECT {TENANT_COLUMNS} FROM tenants ORDER BY created_at DESC"
        ))
        .fetch_all(pool)
        .await?;

        Ok(tenants)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registration() -> RegisterTenant {
        RegisterTenant {
            tenant_name: "Acme Corp".to_string(),
            subdomain: "acme".to_string(),
            admin_email: "admin@acme.test".to_string(),
            admin_password: "correct horse".to_string(),
            admin_full_name: "Ada Admin".to_string(),
        }
    }

    #[test]
    fn test_validate_subdomain() {
        assert!(validate_subdomain("acme").is_ok());
        assert!(validate_subdomain("acme-2").is_ok());
        assert!(validate_subdomain("ab").is_err());
        assert!(validate_subdomain("-acme").is_err());
        assert!(validate_subdomain("acme-").is_err());
        assert!(validate_subdomain("Acme").is_err());
        assert!(validate_subdomain("ac me").is_err());
        assert!(validate_subdomain(&"a".repeat(64)).is_err());
    }

    #[test]
    fn test_register_tenant_normalize() {
        let mut req = registration();
        req.subdomain = "  ACME ".to_string();
        req.admin_email = " Admin@Acme.TEST".to_string();
        req.normalize();

        assert_eq!(req.subdomain, "acme");
        assert_eq!(req.admin_email, "admin@acme.test");
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_register_tenant_rejects_short_password() {
        let mut req = registration();
        req.admin_password = "short".to_string();

        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("admin_password"));
    }

    #[test]
    fn test_register_tenant_camel_case_body() {
        let req: RegisterTenant = serde_json::from_str(
            r#"{
                "tenantName": "Acme Corp",
                "subdomain": "acme",
                "adminEmail": "admin@acme.test",
                "adminPassword": "correct horse",
                "adminFullName": "Ada Admin"
            }"#,
        )
        .unwrap();

        assert_eq!(req.tenant_name, "Acme Corp");
        assert_eq!(req.admin_full_name, "Ada Admin");
    }

    #[test]
    fn test_update_tenant_default() {
        let update = UpdateTenant::default();
        assert!(update.name.is_none());
        assert!(update.status.is_none());
    }

    #[test]
    fn test_plan_serialization() {
        assert_eq!(
            serde_json::to_string(&SubscriptionPlan::Enterprise).unwrap(),
            "\"enterprise\""
        );
        assert_eq!(SubscriptionPlan::Free.as_str(), "free");
    }
}
