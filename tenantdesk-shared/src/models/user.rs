/// User model and database operations
///
/// Every user belongs to exactly one tenant. Email addresses are unique per
/// tenant only; two tenants may each have a user with the same email.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE user_role AS ENUM ('user', 'tenant_admin', 'super_admin');
///
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     tenant_id UUID NOT NULL REFERENCES tenants(id) ON DELETE CASCADE,
///     email VARCHAR(255) NOT NULL,
///     password_hash VARCHAR(255) NOT NULL,
///     full_name VARCHAR(255) NOT NULL,
///     role user_role NOT NULL DEFAULT 'user',
///     is_active BOOLEAN NOT NULL DEFAULT TRUE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     CONSTRAINT users_tenant_email_key UNIQUE (tenant_id, email)
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use tenantdesk_shared::models::user::User;
/// use tenantdesk_shared::db::pool::{create_pool, DatabaseConfig};
/// use uuid::Uuid;
///
/// # async fn example(tenant_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let user = User::find_active_by_email(&pool, tenant_id, "ada@acme.test").await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;
use validator::Validate;

use super::tenant::TenantSummary;
use crate::quota::{self, QuotaError, QuotaType};

/// User roles
///
/// Closed set; what each role may do lives in
/// [`crate::auth::authorization::Action::allowed_roles`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Regular tenant member
    User,

    /// Manages the tenant's users and settings
    TenantAdmin,

    /// Platform operator; may list every tenant
    SuperAdmin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::TenantAdmin => "tenant_admin",
            Role::SuperAdmin => "super_admin",
        }
    }
}

fn default_role() -> Role {
    Role::User
}

fn default_active() -> bool {
    true
}

/// User account
///
/// The password hash is never serialized into responses.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,

    /// Owning tenant (exclusive, non-transferable)
    pub tenant_id: Uuid,

    /// Lower-cased email, unique within the tenant
    pub email: String,

    /// Argon2id password hash
    #[serde(skip_serializing, default)]
    pub password_hash: String,

    pub full_name: String,

    pub role: Role,

    /// Inactive users cannot log in
    pub is_active: bool,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// User profile returned by the current-user lookup
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub is_active: bool,
    pub tenant: TenantSummary,
}

impl UserProfile {
    pub fn new(user: User, tenant: TenantSummary) -> Self {
        Self {
            id: user.id,
            email: user.email,
            full_name: user.full_name,
            role: user.role,
            is_active: user.is_active,
            tenant,
        }
    }
}

/// Store input for a new user row
///
/// Carries the already-computed password hash, never the plaintext.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub tenant_id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub role: Role,
    pub is_active: bool,
}

/// Payload for adding a user to the acting tenant
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, max = 255, message = "Full name is required"))]
    pub full_name: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    #[serde(default = "default_role")]
    pub role: Role,

    #[serde(default = "default_active")]
    pub is_active: bool,
}

/// Partial user update
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateUser {
    #[validate(length(min = 1, max = 255, message = "Full name must not be empty"))]
    pub full_name: Option<String>,

    pub role: Option<Role>,

    pub is_active: Option<bool>,
}

impl UpdateUser {
    /// Trims `full_name`
    pub fn normalize(&mut self) {
        if let Some(full_name) = self.full_name.as_mut() {
            *full_name = full_name.trim().to_string();
        }
    }
}

/// Login payload
///
/// ```json
/// { "email": "ada@acme.test", "password": "correct horse", "tenantSubdomain": "acme" }
/// ```
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,

    #[validate(length(min = 1, message = "Tenant subdomain is required"))]
    pub tenant_subdomain: String,
}

/// Canonical form of an email: trimmed and lower-cased
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

const USER_COLUMNS: &str =
    "id, tenant_id, email, password_hash, full_name, role, is_active, created_at, updated_at";

impl User {
    /// Inserts a user row on an open connection or transaction
    ///
    /// # Errors
    ///
    /// Returns a unique violation on `users_tenant_email_key` if the email is
    /// already used in the tenant
    pub async fn insert(conn: &mut PgConnection, data: &NewUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (tenant_id, email, password_hash, full_name, role, is_active)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(data.tenant_id)
        .bind(&data.email)
        .bind(&data.password_hash)
        .bind(&data.full_name)
        .bind(data.role)
        .bind(data.is_active)
        .fetch_one(conn)
        .await?;

        Ok(user)
    }

    /// Creates a user if the tenant has room under `max_users`
    ///
    /// The tenant row is locked with `FOR UPDATE` for the duration of the
    /// count and insert, so concurrent creations in the same tenant serialize.
    ///
    /// # Errors
    ///
    /// - `QuotaError::TenantNotFound` if the tenant doesn't exist
    /// - `QuotaError::LimitExceeded` if the tenant is full (nothing is inserted)
    /// - `QuotaError::DatabaseError` for everything else, including duplicate emails
    pub async fn create_within_quota(pool: &PgPool, data: NewUser) -> Result<Self, QuotaError> {
        let mut tx = pool.begin().await?;

        let max_users: Option<i32> =
            sqlx::query_scalar("SELECT max_users FROM tenants WHERE id = $1 FOR UPDATE")
                .bind(data.tenant_id)
                .fetch_optional(&mut *tx)
                .await?;
        let max_users = max_users.ok_or(QuotaError::TenantNotFound(data.tenant_id))?;

        let current: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE tenant_id = $1")
            .bind(data.tenant_id)
            .fetch_one(&mut *tx)
            .await?;

        quota::enforce(QuotaType::Users, current, max_users)?;

        let user = User::insert(&mut tx, &data).await?;
        tx.commit().await?;

        Ok(user)
    }

    /// Finds a user by ID within a tenant
    pub async fn find_by_id(
        pool: &PgPool,
        tenant_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1 AND tenant_id = $2"
        ))
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds an active user by (normalized) email within a tenant
    ///
    /// Inactive users are treated as absent.
    pub async fn find_active_by_email(
        pool: &PgPool,
        tenant_id: Uuid,
        email: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE email = $1 AND tenant_id = $2 AND is_active = TRUE
            "#
        ))
        .bind(email)
        .bind(tenant_id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Lists a tenant's users in creation order (oldest first)
    pub async fn list_by_tenant(pool: &PgPool, tenant_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE tenant_id = $1 ORDER BY created_at ASC"
        ))
        .bind(tenant_id)
        .fetch_all(pool)
        .await?;

        Ok(users)
    }

    /// Updates a user within a tenant
    ///
    /// Only non-None fields in `data` are written.
    ///
    /// # Returns
    ///
    /// The updated user, or None if no such user exists in the tenant
    pub async fn update(
        pool: &PgPool,
        tenant_id: Uuid,
        id: Uuid,
        data: UpdateUser,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE users SET updated_at = NOW()");
        let mut bind_count = 2;

        if data.full_name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", full_name = ${}", bind_count));
        }
        if data.role.is_some() {
            bind_count += 1;
            query.push_str(&format!(", role = ${}", bind_count));
        }
        if data.is_active.is_some() {
            bind_count += 1;
            query.push_str(&format!(", is_active = ${}", bind_count));
        }

        query.push_str(&format!(
            " WHERE id = $1 AND tenant_id = $2 RETURNING {USER_COLUMNS}"
        ));

        let mut q = sqlx::query_as::<_, User>(&query).bind(id).bind(tenant_id);

        if let Some(full_name) = data.full_name {
            q = q.bind(full_name);
        }
        if let Some(role) = data.role {
            q = q.bind(role);
        }
        if let Some(is_active) = data.is_active {
            q = q.bind(is_active);
        }

        let user = q.fetch_optional(pool).await?;

        Ok(user)
    }

    /// Deletes a user within a tenant
    ///
    /// Projects and tasks keep their rows; `created_by` / `assigned_to`
    /// references are nulled by the foreign keys.
    ///
    /// # Returns
    ///
    /// True if a row was deleted
    pub async fn delete(pool: &PgPool, tenant_id: Uuid, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1 AND tenant_id = $2")
            .bind(id)
            .bind(tenant_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Counts a tenant's users
    pub async fn count_by_tenant(pool: &PgPool, tenant_id: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE tenant_id = $1")
            .bind(tenant_id)
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}
