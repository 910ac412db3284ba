/// Per-tenant quota limits and enforcement
///
/// Quotas cap how many users and projects a tenant may hold. The ceilings are
/// stored on the tenant row (`max_users`, `max_projects`) and seeded from the
/// subscription plan when the tenant is registered. Tasks carry no quota.
///
/// # Quota Limits by Plan
///
/// **Free Plan:**
/// - Users: 3
/// - Projects: 3
///
/// **Pro Plan:**
/// - Users: 25
/// - Projects: 50
///
/// **Enterprise Plan:**
/// - Users: 500
/// - Projects: 1,000
///
/// # Enforcement
///
/// The count and the insert that follows it must happen atomically; the store
/// implementations call [`enforce`] while holding the tenant row lock (PostgreSQL)
/// or the store write lock (in-memory), so concurrent creations cannot overshoot.
///
/// # Example
///
/// ```
/// use tenantdesk_shared::quota::{enforce, QuotaType};
///
/// // Two projects out of three: one more is allowed
/// let check = enforce(QuotaType::Projects, 2, 3).unwrap();
/// assert_eq!(check.remaining, 1);
///
/// // Three out of three: denied
/// assert!(enforce(QuotaType::Projects, 3, 3).is_err());
/// ```

use crate::models::tenant::SubscriptionPlan;
use std::fmt;
use uuid::Uuid;

/// Quota enforcement error
#[derive(Debug)]
pub enum QuotaError {
    /// Quota limit reached
    LimitExceeded {
        quota_type: QuotaType,
        limit: u32,
        current: u32,
    },

    /// Database error while counting or inserting
    DatabaseError(sqlx::Error),

    /// Tenant not found
    TenantNotFound(Uuid),
}

impl fmt::Display for QuotaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuotaError::LimitExceeded {
                quota_type,
                limit,
                current,
            } => write!(
                f,
                "{} limit exceeded ({}/{})",
                quota_type.as_str(),
                current,
                limit
            ),
            QuotaError::DatabaseError(err) => write!(f, "Database error: {}", err),
            QuotaError::TenantNotFound(id) => write!(f, "Tenant not found: {}", id),
        }
    }
}

impl std::error::Error for QuotaError {}

impl From<sqlx::Error> for QuotaError {
    fn from(err: sqlx::Error) -> Self {
        QuotaError::DatabaseError(err)
    }
}

/// Type of quota to check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaType {
    /// Maximum users in a tenant
    Users,

    /// Maximum projects in a tenant
    Projects,
}

impl QuotaType {
    /// Human-readable name
    pub fn as_str(&self) -> &'static str {
        match self {
            QuotaType::Users => "User",
            QuotaType::Projects => "Project",
        }
    }
}

/// Quota limits configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaLimits {
    /// Maximum users
    pub max_users: u32,

    /// Maximum projects
    pub max_projects: u32,
}

impl QuotaLimits {
    /// Gets quota limits for a subscription plan
    pub fn for_plan(plan: SubscriptionPlan) -> Self {
        match plan {
            SubscriptionPlan::Free => QuotaLimits {
                max_users: 3,
                max_projects: 3,
            },
            SubscriptionPlan::Pro => QuotaLimits {
                max_users: 25,
                max_projects: 50,
            },
            SubscriptionPlan::Enterprise => QuotaLimits {
                max_users: 500,
                max_projects: 1_000,
            },
        }
    }

    /// Gets limit for a specific quota type
    pub fn get(&self, quota_type: QuotaType) -> u32 {
        match quota_type {
            QuotaType::Users => self.max_users,
            QuotaType::Projects => self.max_projects,
        }
    }
}

/// Result of a quota check
#[derive(Debug, Clone, serde::Serialize)]
pub struct QuotaCheckResult {
    /// Whether one more resource may be created
    pub allowed: bool,

    /// Current usage
    pub current: u32,

    /// Maximum allowed
    pub limit: u32,

    /// Remaining quota
    pub remaining: u32,
}

impl QuotaCheckResult {
    /// Evaluates current usage against a limit
    pub fn evaluate(current: u32, limit: u32) -> Self {
        QuotaCheckResult {
            allowed: current < limit,
            current,
            limit,
            remaining: limit.saturating_sub(current),
        }
    }
}

/// Checks usage against a limit and fails when no room is left
///
/// `current` and `limit` come straight from the store (`COUNT(*)` is `i64`,
/// limit columns are `INTEGER`); negative values are clamped to zero.
///
/// # Errors
///
/// Returns `QuotaError::LimitExceeded` when `current >= limit`
pub fn enforce(quota_type: QuotaType, current: i64, limit: i32) -> Result<QuotaCheckResult, QuotaError> {
    let current = u32::try_from(current.max(0)).unwrap_or(u32::MAX);
    let limit = u32::try_from(limit.max(0)).unwrap_or(0);

    let result = QuotaCheckResult::evaluate(current, limit);
    if !result.allowed {
        return Err(QuotaError::LimitExceeded {
            quota_type,
            limit,
            current,
        });
    }

    Ok(result)
}
